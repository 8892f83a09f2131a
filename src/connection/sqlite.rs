//! SQLite backend
//!
//! Query text is split into statements with [`rusqlite::Batch`]; every
//! statement becomes one result set of the cursor. Statements are prepared
//! only when the cursor reaches them and rows are stepped only as far as
//! they are fetched. Statements without result columns (DDL, DML) report
//! [`ResultSetStep::EmptyNoResultSet`].
//!
//! SQLite only has five storage classes, so the declared column type is used
//! to recover booleans, dates, times and timestamps.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::ValueRef;
use rusqlite::{Batch, OpenFlags, Statement};
use tracing::debug;

use crate::error::{ConnectionError, ExecutionError, QueryshError, Result};

use super::{
    CatalogRequest, Column, Connection, ConnectionInfo, Cursor, Driver, ResultSetStep, Row, Value,
};

/// Path understood by SQLite as a private in-memory database
pub const MEMORY_DATABASE: &str = ":memory:";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Driver opening SQLite database files
#[derive(Debug, Clone)]
pub struct SqliteDriver {
    /// Database file, or `:memory:`
    path: String,
}

impl SqliteDriver {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Driver for SqliteDriver {
    fn connect(&self, timeout_secs: u64) -> Result<Box<dyn Connection>> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = rusqlite::Connection::open_with_flags(&self.path, flags).map_err(|e| {
            ConnectionError::ConnectionFailed(format!("cannot open \"{}\": {e}", self.path))
        })?;
        let mut connection = SqliteConnection {
            conn,
            timeout_secs: 0,
        };
        connection.set_timeout(timeout_secs)?;
        debug!("Opened SQLite database {}", self.path);
        Ok(Box::new(connection))
    }

    fn describe(&self) -> ConnectionInfo {
        let database = if self.path == MEMORY_DATABASE {
            "memory".to_string()
        } else {
            PathBuf::from(&self.path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.clone())
        };
        ConnectionInfo {
            server: "sqlite".to_string(),
            database,
        }
    }
}

/// A live SQLite connection
pub struct SqliteConnection {
    conn: rusqlite::Connection,
    timeout_secs: u64,
}

impl Connection for SqliteConnection {
    fn execute<'a>(
        &'a mut self,
        sql: &'a str,
        params: &[String],
    ) -> Result<Box<dyn Cursor + 'a>> {
        let changes_before = total_changes(&self.conn)?;
        Ok(Box::new(SqliteCursor {
            conn: &self.conn,
            batch: Batch::new(&self.conn, sql),
            params: params.to_vec(),
            next_param: 0,
            current: None,
            changes_before,
            rows_affected: None,
        }))
    }

    fn set_timeout(&mut self, seconds: u64) -> Result<()> {
        self.conn
            .busy_timeout(Duration::from_secs(seconds))
            .map_err(|e| ConnectionError::SettingRejected {
                setting: "timeout".to_string(),
                reason: e.to_string(),
            })?;
        self.timeout_secs = seconds;
        Ok(())
    }

    fn timeout(&self) -> u64 {
        self.timeout_secs
    }

    fn catalog_query(&self, request: &CatalogRequest) -> String {
        match request {
            CatalogRequest::Tables { pattern, exact } => {
                let mut sql = String::from(
                    "SELECT name AS table_name, type AS table_type FROM sqlite_master \
                     WHERE type IN ('table', 'view')",
                );
                if let Some(pattern) = pattern {
                    sql.push_str(" AND ");
                    sql.push_str(&CatalogRequest::name_predicate("name", pattern, *exact));
                }
                sql.push_str(" ORDER BY name");
                sql
            }
            CatalogRequest::Columns { table, exact } => format!(
                "SELECT m.name AS table_name, p.name AS column_name, p.type AS data_type, \
                 p.\"notnull\" AS not_null, p.pk AS primary_key \
                 FROM sqlite_master m JOIN pragma_table_info(m.name) p \
                 WHERE m.type IN ('table', 'view') AND {} ORDER BY m.name, p.cid",
                CatalogRequest::name_predicate("m.name", table, *exact)
            ),
        }
    }
}

/// Rows changed by INSERT/UPDATE/DELETE since the connection was opened
fn total_changes(conn: &rusqlite::Connection) -> Result<u64> {
    let total: i64 = conn.query_row("SELECT total_changes()", [], |row| row.get(0))?;
    Ok(total.max(0) as u64)
}

fn query_failed(e: rusqlite::Error) -> QueryshError {
    ExecutionError::QueryFailed(e.to_string()).into()
}

/// The query statement whose rows are being read
struct OpenSet<'a> {
    stmt: Statement<'a>,
    declared_types: Vec<Option<String>>,
    fetched: u64,
    exhausted: bool,
}

/// Cursor preparing and stepping one statement of the batch at a time
struct SqliteCursor<'a> {
    conn: &'a rusqlite::Connection,
    batch: Batch<'a, 'a>,
    params: Vec<String>,
    next_param: usize,
    current: Option<OpenSet<'a>>,
    changes_before: u64,
    rows_affected: Option<u64>,
}

impl SqliteCursor<'_> {
    /// Bind the next positional parameters to `stmt`
    fn bind(&mut self, stmt: &mut Statement<'_>) -> Result<()> {
        let wanted = stmt.parameter_count();
        let left = self.params.len() - self.next_param;
        if left < wanted {
            return Err(ExecutionError::InvalidParameters(format!(
                "statement expects {wanted} parameter(s), only {left} left"
            ))
            .into());
        }
        for (offset, value) in self.params[self.next_param..self.next_param + wanted]
            .iter()
            .enumerate()
        {
            stmt.raw_bind_parameter(offset + 1, value.as_str())
                .map_err(query_failed)?;
        }
        self.next_param += wanted;
        Ok(())
    }
}

impl Cursor for SqliteCursor<'_> {
    fn next_result_set(&mut self) -> Result<ResultSetStep> {
        self.current = None;
        let Some(mut stmt) = self.batch.next().map_err(query_failed)? else {
            if self.next_param < self.params.len() {
                debug!("More parameters collected than the statements consumed");
            }
            return Ok(ResultSetStep::NoMoreSets);
        };
        self.bind(&mut stmt)?;

        if stmt.column_count() == 0 {
            stmt.raw_execute().map_err(query_failed)?;
            let changed = total_changes(self.conn)?.saturating_sub(self.changes_before);
            self.rows_affected = Some(changed);
            return Ok(ResultSetStep::EmptyNoResultSet);
        }

        let columns: Vec<Column> = stmt
            .columns()
            .iter()
            .map(|col| Column::new(col.name(), col.decl_type()))
            .collect();
        self.current = Some(OpenSet {
            declared_types: columns
                .iter()
                .map(|column| column.declared_type.clone())
                .collect(),
            stmt,
            fetched: 0,
            exhausted: false,
        });
        Ok(ResultSetStep::Produced(columns))
    }

    fn fetch(&mut self, limit: Option<usize>) -> Result<Vec<Row>> {
        let Some(current) = self.current.as_mut() else {
            return Ok(Vec::new());
        };
        if current.exhausted {
            return Ok(Vec::new());
        }

        let mut fetched = Vec::new();
        let mut rows = current.stmt.raw_query();
        while limit.is_none_or(|limit| fetched.len() < limit) {
            let row = match rows.next() {
                Ok(Some(row)) => row,
                Ok(None) => {
                    current.exhausted = true;
                    break;
                }
                Err(e) => {
                    current.exhausted = true;
                    return Err(query_failed(e));
                }
            };
            let mut values = Vec::with_capacity(current.declared_types.len());
            for (idx, declared) in current.declared_types.iter().enumerate() {
                let value = row.get_ref(idx).map_err(query_failed)?;
                values.push(convert_value(value, declared.as_deref()));
            }
            fetched.push(values);
        }
        current.fetched += fetched.len() as u64;
        if !current.exhausted {
            // dropping `Rows` resets the statement; the next fetch resumes here
            std::mem::forget(rows);
        }
        Ok(fetched)
    }

    fn row_count_hint(&self) -> Option<u64> {
        self.current
            .as_ref()
            .filter(|current| current.exhausted)
            .map(|current| current.fetched)
    }

    fn rows_affected(&self) -> Option<u64> {
        self.rows_affected
    }
}

/// Convert a SQLite cell into a [`Value`] using the declared column type
fn convert_value(value: ValueRef<'_>, declared_type: Option<&str>) -> Value {
    let declared = declared_type.map(str::to_ascii_uppercase).unwrap_or_default();
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) if declared.contains("BOOL") => Value::Bool(n != 0),
        ValueRef::Integer(n) => Value::Integer(n),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            convert_text(text, &declared)
        }
        ValueRef::Blob(bytes) => Value::Binary(bytes.to_vec()),
    }
}

fn convert_text(text: String, declared: &str) -> Value {
    // DATETIME contains both DATE and TIME, so it goes first
    let parsed = if declared.contains("DATETIME") || declared.contains("TIMESTAMP") {
        parse_timestamp(&text).map(Value::Timestamp)
    } else if declared.contains("DATE") {
        NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .ok()
            .map(Value::Date)
    } else if declared.contains("TIME") {
        parse_time(&text).map(Value::Time)
    } else {
        None
    };
    parsed.unwrap_or(Value::Text(text))
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect() -> Box<dyn Connection> {
        SqliteDriver::new(MEMORY_DATABASE).connect(5).unwrap()
    }

    fn collect_steps(cursor: &mut dyn Cursor) -> Vec<ResultSetStep> {
        let mut steps = Vec::new();
        loop {
            let step = cursor.next_result_set().unwrap();
            let done = step == ResultSetStep::NoMoreSets;
            steps.push(step);
            if done {
                return steps;
            }
        }
    }

    #[test]
    fn test_select_produces_one_set() {
        let mut conn = connect();
        let mut cursor = conn.execute("SELECT 1 AS one, 'a' AS letter", &[]).unwrap();
        match cursor.next_result_set().unwrap() {
            ResultSetStep::Produced(columns) => {
                assert_eq!(columns[0].name, "one");
                assert_eq!(columns[1].name, "letter");
            }
            other => panic!("unexpected step {other:?}"),
        }
        let rows = cursor.fetch(None).unwrap();
        assert_eq!(rows, vec![vec![Value::Integer(1), Value::from("a")]]);
        assert_eq!(cursor.next_result_set().unwrap(), ResultSetStep::NoMoreSets);
    }

    #[test]
    fn test_batch_yields_each_statement() {
        let mut conn = connect();
        let mut cursor = conn
            .execute(
                "CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (1), (2); SELECT x FROM t; SELECT 2",
                &[],
            )
            .unwrap();
        let steps = collect_steps(cursor.as_mut());
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0], ResultSetStep::EmptyNoResultSet);
        assert_eq!(steps[1], ResultSetStep::EmptyNoResultSet);
        assert!(matches!(steps[2], ResultSetStep::Produced(_)));
        assert!(matches!(steps[3], ResultSetStep::Produced(_)));
        assert_eq!(cursor.rows_affected(), Some(2));
    }

    #[test]
    fn test_fetch_window_and_hint() {
        let mut conn = connect();
        let mut cursor = conn
            .execute(
                "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 12) SELECT i FROM n",
                &[],
            )
            .unwrap();
        cursor.next_result_set().unwrap();
        assert_eq!(cursor.row_count_hint(), None);
        assert_eq!(cursor.fetch(Some(5)).unwrap().len(), 5);
        assert_eq!(cursor.row_count_hint(), None);
        assert_eq!(cursor.fetch(Some(5)).unwrap()[0], vec![Value::Integer(6)]);
        assert_eq!(cursor.fetch(None).unwrap().len(), 2);
        assert_eq!(cursor.row_count_hint(), Some(12));
        assert!(cursor.fetch(None).unwrap().is_empty());
    }

    #[test]
    fn test_rows_past_the_window_are_never_evaluated() {
        let mut conn = connect();
        let mut cursor = conn
            .execute(
                "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 200) \
                 SELECT i, CASE WHEN i = 100 THEN abs(i - 100 - 9223372036854775807 - 1) ELSE i END \
                 FROM n",
                &[],
            )
            .unwrap();
        cursor.next_result_set().unwrap();
        let rows = cursor.fetch(Some(5)).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4][0], Value::Integer(5));

        let err = cursor.fetch(None).unwrap_err();
        assert!(err.to_string().contains("Query failed: integer overflow"));
    }

    #[test]
    fn test_failing_statement_after_a_result_set() {
        let mut conn = connect();
        let mut cursor = conn.execute("SELECT 1 AS one; SELECT bogus", &[]).unwrap();
        assert!(matches!(
            cursor.next_result_set().unwrap(),
            ResultSetStep::Produced(_)
        ));
        assert_eq!(cursor.fetch(None).unwrap(), vec![vec![Value::Integer(1)]]);

        let err = cursor.next_result_set().unwrap_err();
        assert!(err.to_string().starts_with("Execution error: Query failed: no such column: bogus"));
    }

    #[test]
    fn test_parameters_are_distributed_across_statements() {
        let mut conn = connect();
        let params = vec!["1".to_string(), "b".to_string()];
        let mut cursor = conn.execute("SELECT ?; SELECT ?", &params).unwrap();
        cursor.next_result_set().unwrap();
        assert_eq!(cursor.fetch(None).unwrap(), vec![vec![Value::from("1")]]);
        cursor.next_result_set().unwrap();
        assert_eq!(cursor.fetch(None).unwrap(), vec![vec![Value::from("b")]]);
    }

    #[test]
    fn test_missing_parameters_is_an_error() {
        let mut conn = connect();
        let params = vec!["1".to_string()];
        let mut cursor = conn.execute("SELECT ?, ?", &params).unwrap();
        let err = cursor.next_result_set().unwrap_err();
        assert!(err.to_string().contains("expects 2 parameter(s), only 1 left"));
    }

    #[test]
    fn test_declared_types_recover_rich_values() {
        let mut conn = connect();
        let mut cursor = conn
            .execute(
                "CREATE TABLE e (flag BOOLEAN, day DATE, at DATETIME, tm TIME, raw BLOB);
                 INSERT INTO e VALUES (1, '2024-01-31', '2024-01-31 08:30:00', '12:15:30', x'ff00');
                 SELECT * FROM e",
                &[],
            )
            .unwrap();
        cursor.next_result_set().unwrap();
        cursor.next_result_set().unwrap();
        cursor.next_result_set().unwrap();
        let row = cursor.fetch(None).unwrap().remove(0);
        assert_eq!(row[0], Value::Bool(true));
        assert_eq!(row[1], Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(matches!(row[2], Value::Timestamp(_)));
        assert_eq!(row[3], Value::Time(NaiveTime::from_hms_opt(12, 15, 30).unwrap()));
        assert_eq!(row[4], Value::Binary(vec![0xff, 0x00]));
    }

    #[test]
    fn test_unparseable_date_stays_text() {
        assert_eq!(
            convert_text("not a date".to_string(), "DATE"),
            Value::from("not a date")
        );
    }

    #[test]
    fn test_catalog_tables_query_runs() {
        let mut conn = connect();
        conn.execute("CREATE TABLE orders (id INTEGER)", &[])
            .unwrap()
            .next_result_set()
            .unwrap();
        let sql = conn.catalog_query(&CatalogRequest::Tables {
            pattern: Some("ord".to_string()),
            exact: false,
        });
        let mut cursor = conn.execute(&sql, &[]).unwrap();
        cursor.next_result_set().unwrap();
        let rows = cursor.fetch(None).unwrap();
        assert_eq!(rows[0][0], Value::from("orders"));
    }

    #[test]
    fn test_catalog_columns_query_runs() {
        let mut conn = connect();
        conn.execute("CREATE TABLE orders (id INTEGER, total REAL)", &[])
            .unwrap()
            .next_result_set()
            .unwrap();
        let sql = conn.catalog_query(&CatalogRequest::Columns {
            table: "orders".to_string(),
            exact: true,
        });
        let mut cursor = conn.execute(&sql, &[]).unwrap();
        cursor.next_result_set().unwrap();
        assert_eq!(cursor.fetch(None).unwrap().len(), 2);
    }

    #[test]
    fn test_describe_memory_database() {
        let info = SqliteDriver::new(MEMORY_DATABASE).describe();
        assert_eq!(info.prompt_header(), "sqlite@memory");
    }

    #[test]
    fn test_set_timeout() {
        let mut conn = connect();
        conn.set_timeout(12).unwrap();
        assert_eq!(conn.timeout(), 12);
    }
}
