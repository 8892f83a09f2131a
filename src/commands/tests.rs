use super::*;
use crate::connection::mock::{MockDriver, MockLog, MockSet};
use crate::repl::terminal::scripted::ScriptedTerminal;

struct Fixture {
    connections: ConnectionManager,
    config: SessionConfig,
    log: MockLog,
}

impl Fixture {
    fn new() -> Self {
        Self::with_driver(MockDriver::fixed(vec![MockSet::numbered(1)]))
    }

    fn with_driver(driver: MockDriver) -> Self {
        let log = driver.log.clone();
        Self {
            connections: ConnectionManager::new(Box::new(driver), 30),
            config: SessionConfig::default(),
            log,
        }
    }

    fn run(&mut self, line: &str, terminal: &mut ScriptedTerminal) -> Result<Option<String>> {
        Dispatcher::new(&mut self.connections, &mut self.config).dispatch(line, terminal)
    }

    /// Dispatch a line that needs no input and return what it printed
    fn printed(&mut self, line: &str) -> String {
        let mut terminal = ScriptedTerminal::new(&[]);
        self.run(line, &mut terminal).unwrap();
        terminal.printed()
    }
}

#[test]
fn test_exit_keywords() {
    assert!(is_exit(":exit"));
    assert!(is_exit("  :quit "));
    assert!(!is_exit(":exits"));
}

#[test]
fn test_rows_set_and_show() {
    let mut fixture = Fixture::new();
    assert_eq!(
        fixture.printed(":rows 5"),
        "Printing 5 rows of each result set.\n"
    );
    assert_eq!(fixture.config.rows_to_print, 5);
    assert_eq!(
        fixture.printed(":rows 0"),
        "Printing ALL rows of each result set.\n"
    );
}

#[test]
fn test_rows_rejects_negative_and_keeps_value() {
    let mut fixture = Fixture::new();
    fixture.printed(":rows 7");
    let printed = fixture.printed(":rows -5");
    assert!(printed.starts_with("Invalid value \"-5\" for :rows"));
    assert_eq!(fixture.config.rows_to_print, 7);

    fixture.printed(":rows many");
    assert_eq!(fixture.config.rows_to_print, 7);
}

#[test]
fn test_counts_beyond_usize_are_rejected() {
    let mut fixture = Fixture::new();
    let too_big = (usize::MAX as u128 + 1).to_string();

    let printed = fixture.printed(&format!(":rows {too_big}"));
    assert!(printed.starts_with(&format!("Invalid value \"{too_big}\" for :rows")));
    assert_eq!(fixture.config.rows_to_print, 100);

    let printed = fixture.printed(&format!(":chars {too_big}"));
    assert!(printed.starts_with(&format!("Invalid value \"{too_big}\" for :chars")));
    assert_eq!(fixture.config.column_display_width, 100);
}

#[test]
fn test_chars_rejects_non_numeric() {
    let mut fixture = Fixture::new();
    let printed = fixture.printed(":chars wide");
    assert!(printed.contains("expected a non-negative integer"));
    assert_eq!(fixture.config.column_display_width, 100);
    fixture.printed(":chars 0");
    assert_eq!(fixture.config.column_display_width, 0);
}

#[test]
fn test_null_off_and_custom() {
    let mut fixture = Fixture::new();
    fixture.printed(":null OFF");
    assert_eq!(fixture.config.null_string, "");
    assert_eq!(
        fixture.printed(":null N/A"),
        "Using the string \"N/A\" to print NULL values.\n"
    );
    assert_eq!(fixture.config.null_string, "N/A");
}

#[test]
fn test_newline_and_tab_off_restore_raw() {
    let mut fixture = Fixture::new();
    let printed = fixture.printed(":newline OFF");
    assert_eq!(fixture.config.newline_replacement, "\n");
    assert!(printed.starts_with("Printing newlines with no conversion"));

    fixture.printed(":newline <NL>");
    assert_eq!(fixture.config.newline_replacement, "<NL>");

    fixture.printed(":tab OFF");
    assert_eq!(fixture.config.tab_replacement, "\t");
}

#[test]
fn test_show_leaves_setting_alone() {
    let mut fixture = Fixture::new();
    fixture.printed(":null");
    assert_eq!(fixture.config.null_string, "[NULL]");
}

#[test]
fn test_timeout_sets_connection_and_config() {
    let mut fixture = Fixture::new();
    assert_eq!(
        fixture.printed(":timeout 90"),
        "Command timeout set to 90 seconds.\n"
    );
    assert_eq!(fixture.config.timeout_secs, 90);
    assert_eq!(fixture.connections.timeout(), 90);
}

#[test]
fn test_timeout_refused_by_driver_is_a_warning() {
    let mut fixture = Fixture::with_driver(
        MockDriver::fixed(vec![MockSet::numbered(1)]).rejecting_timeout(),
    );
    let mut terminal = ScriptedTerminal::new(&[]);
    let result = fixture.run(":timeout 5", &mut terminal);
    assert!(matches!(result, Ok(None)));
    let printed = terminal.printed();
    assert!(printed.starts_with("Warning: the driver refused the timeout"));
    assert!(printed.ends_with("Command timeout set to 30 seconds.\n"));
    assert_eq!(fixture.config.timeout_secs, 30);
}

#[test]
fn test_csv_arm_and_disable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let mut fixture = Fixture::new();

    let printed = fixture.printed(&format!(":csv {}", path.display()));
    assert_eq!(printed, format!("CSV target \"{}\"\n", path.display()));
    assert_eq!(fixture.config.csv_export_path.as_deref(), Some(path.as_path()));
    assert!(path.exists());

    assert_eq!(fixture.printed(":csv"), "Disabled CSV writing\n");
    assert!(fixture.config.csv_export_path.is_none());
}

#[test]
fn test_csv_bad_path_keeps_prior_setting() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.csv");
    let bad = dir.path().join("no_such_dir").join("bad.csv");
    let mut fixture = Fixture::new();

    fixture.printed(&format!(":csv {}", good.display()));
    let printed = fixture.printed(&format!(":csv {}", bad.display()));
    assert!(printed.starts_with("ERROR opening file"));
    assert!(printed.contains("bad.csv"));
    assert_eq!(fixture.config.csv_export_path.as_deref(), Some(good.as_path()));
}

#[test]
fn test_script_without_path() {
    let mut fixture = Fixture::new();
    assert_eq!(fixture.printed(":script"), "No input path provided\n");
}

#[test]
fn test_script_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.sql");
    let mut fixture = Fixture::new();
    let mut terminal = ScriptedTerminal::new(&[]);
    let result = fixture
        .run(&format!(":script {}", path.display()), &mut terminal)
        .unwrap();
    assert_eq!(result, None);
    assert_eq!(
        terminal.printed(),
        format!("File \"{}\" does not exist\n", path.display())
    );
}

#[test]
fn test_script_is_trimmed_and_expanded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.sql");
    std::fs::write(&path, "\n  SELECT * FROM orders WHERE region = '{region}'  \n\n").unwrap();
    let mut fixture = Fixture::new();
    let mut terminal = ScriptedTerminal::new(&["north"]);
    let query = fixture
        .run(&format!(":script {}", path.display()), &mut terminal)
        .unwrap();
    assert_eq!(
        query.as_deref(),
        Some("SELECT * FROM orders WHERE region = 'north'")
    );
    assert_eq!(terminal.prompts, vec!["region> "]);
}

#[test]
fn test_reconnect_opens_new_connection() {
    let mut fixture = Fixture::new();
    fixture.connections.get().unwrap();
    assert_eq!(fixture.printed(":reconnect"), "Opened new connection.\n");
    assert_eq!(fixture.log.connects.get(), 2);
}

#[test]
fn test_reconnect_failure_propagates() {
    let driver = MockDriver::fixed(vec![]);
    let down = driver.connect_failure();
    let mut fixture = Fixture::with_driver(driver);
    down.set(true);
    let mut terminal = ScriptedTerminal::new(&[]);
    assert!(fixture.run(":reconnect", &mut terminal).is_err());
    assert!(terminal.printed().is_empty());
}

#[test]
fn test_named_command_prompts_once_per_placeholder() {
    let mut fixture = Fixture::new();
    fixture.config.named_commands.insert(
        "greet",
        "SELECT * FROM users WHERE name = '{name}' OR nick = '{name}'",
    );
    let mut terminal = ScriptedTerminal::new(&["ann"]);
    let query = fixture.run(":greet", &mut terminal).unwrap();
    assert_eq!(
        query.as_deref(),
        Some("SELECT * FROM users WHERE name = 'ann' OR nick = 'ann'")
    );
    assert_eq!(terminal.prompts, vec!["name> "]);
    assert!(terminal.printed().contains("Command query:\nSELECT * FROM users"));
}

#[test]
fn test_named_command_template_error_is_returned() {
    let mut fixture = Fixture::new();
    fixture.config.named_commands.insert("broken", "SELECT {0}");
    let mut terminal = ScriptedTerminal::new(&[]);
    let err = fixture.run(":broken", &mut terminal).unwrap_err();
    assert!(err.to_string().starts_with("Template error"));
}

#[test]
fn test_unknown_command() {
    let mut fixture = Fixture::new();
    assert_eq!(fixture.printed(":nope"), format!("{INVALID_COMMAND}\n"));
    assert_eq!(fixture.printed(":"), format!("{INVALID_COMMAND}\n"));
}

#[test]
fn test_builtin_shadows_named_command() {
    let mut fixture = Fixture::new();
    fixture.config.named_commands.insert("rows", "SELECT 1");
    let mut terminal = ScriptedTerminal::new(&[]);
    assert_eq!(fixture.run(":rows", &mut terminal).unwrap(), None);
}

#[test]
fn test_help_lists_named_commands() {
    let mut fixture = Fixture::new();
    fixture.config.named_commands.insert("greet", "SELECT 1");
    fixture.config.named_commands.insert("orders", "SELECT 2");
    let printed = fixture.printed(":help");
    assert!(printed.starts_with("--Available commands--"));
    assert!(printed.contains(":timeout [seconds]"));
    assert!(printed.ends_with("configuration file:\ngreet, orders\n"));
}

#[test]
fn test_tables_exact_match() {
    let mut fixture = Fixture::new();
    let mut terminal = ScriptedTerminal::new(&[]);
    let query = fixture
        .run(":tables -eq orders", &mut terminal)
        .unwrap()
        .unwrap();
    assert!(query.ends_with("TABLE_NAME = 'orders'"));
}

#[test]
fn test_cols_requires_table() {
    let mut fixture = Fixture::new();
    let printed = fixture.printed(":cols -eq");
    assert!(printed.starts_with("Invalid arguments. Usage: :cols"));
}
