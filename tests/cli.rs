use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, Statement};
use serde_json::Value;
use tempfile::TempDir;
use url::Url;

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_partyplan"))
}

fn run_cmd_in(data_dir: &Path, cwd: Option<&Path>, args: &[&str]) -> Output {
    let mut cmd = Command::new(bin_path());
    cmd.arg("--data-dir").arg(data_dir);
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }
    cmd.args(args)
        .env_remove("PARTYPLAN_HOME")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd.output().expect("run command")
}

fn run_cmd(dir: &TempDir, args: &[&str]) -> Output {
    run_cmd_in(dir.path(), None, args)
}

fn output_stdout(output: Output) -> String {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout utf8")
}

fn output_stderr(output: Output) -> String {
    assert!(!output.status.success(), "command unexpectedly succeeded");
    String::from_utf8(output.stderr).expect("stderr utf8")
}

fn parse_created_id(stdout: &str, prefix: &str) -> i64 {
    let line = stdout
        .lines()
        .find(|line| line.starts_with(prefix))
        .unwrap_or_else(|| panic!("missing '{prefix}' in: {stdout}"));
    let rest = line.strip_prefix(prefix).expect("prefix");
    rest.split(':').next().expect("id").trim().parse().expect("id parse")
}

fn create_party(dir: &TempDir, name: &str) -> i64 {
    let stdout = output_stdout(run_cmd(
        dir,
        &["party", "add", name, "--guests", "20", "--select"],
    ));
    parse_created_id(&stdout, "Created party ID: ")
}

fn snapshot_bytes(dir: &TempDir) -> Vec<u8> {
    let raw = fs::read_to_string(dir.path().join("party-planner-db.store")).expect("snapshot");
    serde_json::from_str(&raw).expect("snapshot bytes")
}

async fn query_snapshot(dir: &TempDir, sql: &str) -> Vec<Value> {
    let scratch = TempDir::new().expect("scratch");
    let db_path = scratch.path().join("copy.db");
    fs::write(&db_path, snapshot_bytes(dir)).expect("write copy");
    let mut url = Url::from_file_path(&db_path).expect("file url");
    url.set_query(Some("mode=ro"));
    let sqlite_url = url.as_str().replacen("file://", "sqlite://", 1);
    let db = Database::connect(sqlite_url).await.expect("connect");
    let rows = db
        .query_all(Statement::from_string(DatabaseBackend::Sqlite, sql))
        .await
        .expect("query");
    rows.iter()
        .map(|row| {
            let count: i64 = row.try_get("", "n").expect("n column");
            Value::from(count)
        })
        .collect()
}

#[test]
fn party_selection_survives_between_runs() {
    let dir = TempDir::new().expect("temp dir");
    let first = create_party(&dir, "Birthday");
    let second = create_party(&dir, "Picnic");

    let list = output_stdout(run_cmd(&dir, &["party", "list"]));
    let lines: Vec<&str> = list.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&format!("* {second}: Picnic")));
    assert!(lines[1].starts_with(&format!("  {first}: Birthday")));

    output_stdout(run_cmd(&dir, &["party", "select", &first.to_string()]));
    let shown = output_stdout(run_cmd(&dir, &["party", "show"]));
    assert!(shown.contains("Name: Birthday"));

    output_stdout(run_cmd(&dir, &["party", "remove", &first.to_string()]));
    let selected = output_stdout(run_cmd(&dir, &["party", "show-selected"]));
    assert_eq!(selected.trim(), "No party selected.");
}

#[test]
fn commands_need_a_party() {
    let dir = TempDir::new().expect("temp dir");
    let stderr = output_stderr(run_cmd(&dir, &["guest", "list"]));
    assert!(stderr.contains("Error: Invalid input: no party selected"), "{stderr}");

    let stderr = output_stderr(run_cmd(&dir, &["--party", "42", "guest", "add", "Ana"]));
    assert!(stderr.contains("Not found: party id 42"), "{stderr}");
}

#[test]
fn guests_and_stats() {
    let dir = TempDir::new().expect("temp dir");
    create_party(&dir, "Housewarming");
    output_stdout(run_cmd(
        &dir,
        &["guest", "add", "Ana", "--rsvp", "yes", "--additional", "2"],
    ));
    let ben = parse_created_id(
        &output_stdout(run_cmd(&dir, &["guest", "add", "Ben"])),
        "Created guest ID: ",
    );
    output_stdout(run_cmd(&dir, &["guest", "rsvp", &ben.to_string(), "no"]));

    let stats = output_stdout(run_cmd(&dir, &["guest", "stats"]));
    assert!(stats.contains("Confirmed: 1"));
    assert!(stats.contains("Declined: 1"));
    assert!(stats.contains("Total attending: 3"));

    let stderr = output_stderr(run_cmd(&dir, &["guest", "add", "Cy", "--additional=-1"]));
    assert!(stderr.contains("Invalid input"), "{stderr}");
}

#[test]
fn timeline_is_seeded_and_toggles() {
    let dir = TempDir::new().expect("temp dir");
    create_party(&dir, "Graduation");
    let list = output_stdout(run_cmd(&dir, &["timeline", "list"]));
    assert!(list.starts_with("4-6 weeks before:"));
    assert!(list.contains("0/21 tasks complete (0%)"));

    let task_id = list
        .lines()
        .nth(1)
        .and_then(|line| line.trim().strip_prefix("[ ] "))
        .and_then(|rest| rest.split(':').next())
        .and_then(|id| id.parse::<i64>().ok())
        .expect("first task id");
    let toggled = output_stdout(run_cmd(&dir, &["timeline", "toggle", &task_id.to_string()]));
    assert_eq!(toggled.trim(), format!("Timeline task ID: {task_id} is done"));
    let progress = output_stdout(run_cmd(&dir, &["timeline", "progress"]));
    assert_eq!(progress.trim(), "1/21 tasks complete (5%)");
}

#[test]
fn todo_workflow() {
    let dir = TempDir::new().expect("temp dir");
    create_party(&dir, "Gala");
    let cake = parse_created_id(
        &output_stdout(run_cmd(
            &dir,
            &["todo", "add", "Order cake", "--priority", "high", "--estimated-cost", "40"],
        )),
        "Created todo ID: ",
    );
    let venue = parse_created_id(
        &output_stdout(run_cmd(&dir, &["todo", "add", "Book venue", "--category", "booking"])),
        "Created todo ID: ",
    );
    output_stdout(run_cmd(&dir, &["todo", "subtask-add", &cake.to_string(), "Pick flavour"]));
    output_stdout(run_cmd(
        &dir,
        &["todo", "depend", &cake.to_string(), &venue.to_string()],
    ));
    let stderr = output_stderr(run_cmd(
        &dir,
        &["todo", "depend", &venue.to_string(), &cake.to_string()],
    ));
    assert!(stderr.contains("Invalid input"), "{stderr}");

    output_stdout(run_cmd(&dir, &["todo", "toggle", &cake.to_string()]));
    let shown = output_stdout(run_cmd(&dir, &["todo", "show", &cake.to_string()]));
    assert!(shown.contains("Status: done"));
    assert!(shown.contains("Completed: "));
    assert!(shown.contains(&format!("Waits on: {venue}")));
    assert!(shown.contains("[ ] Pick flavour"));

    let stats = output_stdout(run_cmd(&dir, &["todo", "stats"]));
    assert!(stats.contains("Todos: 2 (1 done, 1 open, 0 overdue)"));
    assert!(stats.contains("Total cost: 40.00"));
}

#[test]
fn itinerary_template_replaces_plan() {
    let dir = TempDir::new().expect("temp dir");
    create_party(&dir, "Birthday");
    output_stdout(run_cmd(&dir, &["itinerary", "add", "12:00", "13:00", "Lunch"]));
    for _ in 0..2 {
        output_stdout(run_cmd(
            &dir,
            &["itinerary", "apply-template", "birthday-party-3h", "--start", "18:00"],
        ));
    }
    let list = output_stdout(run_cmd(&dir, &["itinerary", "list"]));
    assert!(!list.contains("Lunch"));
    assert!(list.lines().next().expect("first").starts_with("[ ] 18:00-18:30"));

    let templates = output_stdout(run_cmd(&dir, &["itinerary", "templates"]));
    assert!(templates.contains("birthday-party-3h"));
    assert!(templates.contains("dinner-party-4h"));
}

#[test]
fn calculators_record_history() {
    let dir = TempDir::new().expect("temp dir");
    create_party(&dir, "Game night");
    let pizza = output_stdout(run_cmd(&dir, &["calc", "pizza"]));
    assert!(pizza.contains("20 guests -> 7 pizzas"), "{pizza}");
    let drinks = output_stdout(run_cmd(
        &dir,
        &["calc", "beverages", "20", "--hours", "4", "--type", "formal", "--alcohol"],
    ));
    assert!(
        drinks.contains("water 30, soft drinks 23, beer 24, wine 3, cocktails 10"),
        "{drinks}"
    );
    let history = output_stdout(run_cmd(&dir, &["calc", "history"]));
    assert!(history.contains("Pizza:\n  "));
    assert!(!history.contains("(none)"));
}

#[test]
fn export_then_import_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let out = TempDir::new().expect("out dir");
    create_party(&dir, "Summer Bash");
    output_stdout(run_cmd(&dir, &["guest", "add", "Ana"]));

    let exported = output_stdout(run_cmd_in(dir.path(), Some(out.path()), &["data", "export"]));
    let path = exported
        .trim()
        .strip_prefix("Exported to ")
        .map(PathBuf::from)
        .expect("export path");
    assert!(path.starts_with(out.path()));
    let file_name = path.file_name().and_then(|n| n.to_str()).expect("name");
    assert!(file_name.starts_with("party-summer-bash-"));

    let imported = output_stdout(run_cmd(&dir, &["data", "import", path.to_str().expect("path")]));
    assert!(imported.contains("Successfully imported party \"Summer Bash\""));
    assert!(imported.contains("Guests: 1"));
    assert!(imported.contains("Timeline tasks: 21"));

    let list = output_stdout(run_cmd(&dir, &["party", "list"]));
    assert!(list.contains("Summer Bash (Imported)"));

    let stderr = output_stderr(run_cmd(&dir, &["data", "import", "--json", "{oops"]));
    assert!(stderr.contains("Invalid JSON data"), "{stderr}");
}

#[tokio::test]
async fn snapshot_is_a_migrated_database() {
    let dir = TempDir::new().expect("temp dir");
    create_party(&dir, "Launch");
    let ledger = query_snapshot(&dir, "SELECT COUNT(*) AS n FROM migrations").await;
    assert_eq!(ledger, vec![Value::from(3)]);
    let tasks = query_snapshot(&dir, "SELECT COUNT(*) AS n FROM timeline_tasks").await;
    assert_eq!(tasks, vec![Value::from(21)]);
}
