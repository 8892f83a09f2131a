//! Scripted in-memory driver used by the executor and session tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use super::{Column, Connection, ConnectionInfo, Cursor, Driver, ResultSetStep, Row, Value};
use crate::error::{ConnectionError, Result};

/// One scripted outcome of a statement
#[derive(Debug, Clone)]
pub enum MockSet {
    Rows {
        columns: Vec<Column>,
        rows: Vec<Row>,
        hint: Option<u64>,
    },
    NoResultSet,
}

impl MockSet {
    /// Result set whose row count the driver reports
    pub fn rows(names: &[&str], rows: Vec<Row>) -> Self {
        let hint = Some(rows.len() as u64);
        Self::Rows {
            columns: names.iter().map(|name| Column::new(*name, None)).collect(),
            rows,
            hint,
        }
    }

    /// `count` rows of `(n, "row n")`
    pub fn numbered(count: i64) -> Self {
        Self::rows(
            &["n", "label"],
            (1..=count)
                .map(|n| vec![Value::Integer(n), Value::Text(format!("row {n}"))])
                .collect(),
        )
    }
}

type Responder = Rc<dyn Fn(&str) -> Result<Vec<MockSet>>>;

/// Everything the mock saw, shared with the test
#[derive(Default, Clone)]
pub struct MockLog {
    pub executed: Rc<RefCell<Vec<(String, Vec<String>)>>>,
    pub connects: Rc<Cell<usize>>,
}

impl MockLog {
    pub fn last_query(&self) -> Option<String> {
        self.executed.borrow().last().map(|(sql, _)| sql.clone())
    }
}

pub struct MockDriver {
    pub log: MockLog,
    respond: Responder,
    reject_timeout: bool,
    fail_connect: Rc<Cell<bool>>,
}

impl MockDriver {
    pub fn new(respond: impl Fn(&str) -> Result<Vec<MockSet>> + 'static) -> Self {
        Self {
            log: MockLog::default(),
            respond: Rc::new(respond),
            reject_timeout: false,
            fail_connect: Rc::new(Cell::new(false)),
        }
    }

    /// Driver answering every query with the same sets
    pub fn fixed(sets: Vec<MockSet>) -> Self {
        Self::new(move |_| Ok(sets.clone()))
    }

    pub fn rejecting_timeout(mut self) -> Self {
        self.reject_timeout = true;
        self
    }

    /// Switch that makes later connection attempts fail
    pub fn connect_failure(&self) -> Rc<Cell<bool>> {
        self.fail_connect.clone()
    }
}

impl Driver for MockDriver {
    fn connect(&self, timeout_secs: u64) -> Result<Box<dyn Connection>> {
        if self.fail_connect.get() {
            return Err(ConnectionError::ConnectionFailed("mock server is down".to_string()).into());
        }
        self.log.connects.set(self.log.connects.get() + 1);
        Ok(Box::new(MockConnection {
            log: self.log.clone(),
            respond: self.respond.clone(),
            reject_timeout: self.reject_timeout,
            timeout: timeout_secs,
        }))
    }

    fn describe(&self) -> ConnectionInfo {
        ConnectionInfo {
            server: "mock".to_string(),
            database: "testdb".to_string(),
        }
    }
}

struct MockConnection {
    log: MockLog,
    respond: Responder,
    reject_timeout: bool,
    timeout: u64,
}

impl Connection for MockConnection {
    fn execute<'a>(
        &'a mut self,
        sql: &'a str,
        params: &[String],
    ) -> Result<Box<dyn Cursor + 'a>> {
        self.log
            .executed
            .borrow_mut()
            .push((sql.to_string(), params.to_vec()));
        let sets = (self.respond)(sql)?;
        Ok(Box::new(MockCursor {
            sets: sets.into(),
            current: None,
        }))
    }

    fn set_timeout(&mut self, seconds: u64) -> Result<()> {
        if self.reject_timeout {
            return Err(ConnectionError::SettingRejected {
                setting: "timeout".to_string(),
                reason: "optional feature not implemented".to_string(),
            }
            .into());
        }
        self.timeout = seconds;
        Ok(())
    }

    fn timeout(&self) -> u64 {
        self.timeout
    }
}

struct MockCursor {
    sets: VecDeque<MockSet>,
    current: Option<(VecDeque<Row>, Option<u64>)>,
}

impl Cursor for MockCursor {
    fn next_result_set(&mut self) -> Result<ResultSetStep> {
        self.current = None;
        Ok(match self.sets.pop_front() {
            Some(MockSet::Rows {
                columns,
                rows,
                hint,
            }) => {
                self.current = Some((rows.into(), hint));
                ResultSetStep::Produced(columns)
            }
            Some(MockSet::NoResultSet) => ResultSetStep::EmptyNoResultSet,
            None => ResultSetStep::NoMoreSets,
        })
    }

    fn fetch(&mut self, limit: Option<usize>) -> Result<Vec<Row>> {
        let Some((rows, _)) = self.current.as_mut() else {
            return Ok(Vec::new());
        };
        let take = limit.unwrap_or(rows.len()).min(rows.len());
        Ok(rows.drain(..take).collect())
    }

    fn row_count_hint(&self) -> Option<u64> {
        self.current.as_ref().and_then(|(_, hint)| *hint)
    }

    fn rows_affected(&self) -> Option<u64> {
        None
    }
}
