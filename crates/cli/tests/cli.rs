use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::{fs, path::PathBuf, process::Command};
use tempfile::TempDir;

const SCHEDULE: &str = r#"<html><body><table>
<tr class="event"><td class="date">10/05</td><td>08:00</td><td>Abertura</td><td>1A, 1B</td></tr>
<tr class="event"><td>09:00</td><td>Palestra</td></tr>
</table></body></html>"#;

// With --year 2024, Campo Grande local times are UTC-4.
const OPENING: &str = "20240510T120000Z20240510T130000Z";
const TALK: &str = "20240510T130000Z20240510T140000Z";

fn setup() -> (TempDir, PathBuf) {
	let dir = TempDir::new().unwrap();
	let schedule = dir.path().join("schedule.html");
	fs::write(&schedule, SCHEDULE).unwrap();
	(dir, schedule)
}

fn cmd(dir: &TempDir) -> Command {
	let mut cmd = Command::cargo_bin("schedule-reminders").unwrap();
	cmd.env_remove("SCHEDULE_REMINDERS_STORE")
		.env_remove("SCHEDULE_REMINDERS_YEAR")
		.args(["--year", "2024", "--store"])
		.arg(dir.path().join("reminders.json"));
	cmd
}

#[test]
fn list_prints_links_and_identities() {
	let (dir, schedule) = setup();

	cmd(&dir)
		.arg("list")
		.arg(&schedule)
		.assert()
		.success()
		.stdout(predicate::str::contains(format!("[ ] 10/05 08:00-09:00 Abertura  {OPENING}")))
		.stdout(predicate::str::contains(format!("[ ] 10/05 09:00-10:00 Palestra  {TALK}")))
		.stdout(predicate::str::contains(
			"?text=Abertura&details=Evento%20para%20as%20turmas%20de%201A%2C%201B&dates=20240510T120000Z/20240510T130000Z&ctz=America/Campo_Grande",
		));
}

#[test]
fn toggle_persists_between_runs() {
	let (dir, schedule) = setup();

	cmd(&dir)
		.args(["toggle", OPENING])
		.assert()
		.success()
		.stdout(format!("{OPENING} on\n"));

	let stored: serde_json::Value =
		serde_json::from_str(&fs::read_to_string(dir.path().join("reminders.json")).unwrap()).unwrap();
	assert_eq!(stored[OPENING], "true");

	let output = cmd(&dir)
		.args(["list", "--format", "json"])
		.arg(&schedule)
		.output()
		.unwrap();
	let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
	assert_eq!(listed[0]["reminded"], true);
	assert_eq!(listed[1]["reminded"], false);
	assert_eq!(listed[1]["details"], "Evento para as turmas de 1A, 1B");

	cmd(&dir)
		.args(["toggle", OPENING])
		.assert()
		.success()
		.stdout(format!("{OPENING} off\n"));
}

#[test]
fn export_only_reminded_events() {
	let (dir, schedule) = setup();
	let ics = dir.path().join("agenda.ics");

	cmd(&dir).args(["toggle", TALK]).assert().success();
	cmd(&dir)
		.arg("export")
		.arg(&schedule)
		.arg("--only-reminded")
		.arg("-o")
		.arg(&ics)
		.assert()
		.success();

	let calendar = fs::read_to_string(&ics).unwrap();
	assert_eq!(calendar.matches("BEGIN:VEVENT").count(), 1);
	assert!(calendar.contains("SUMMARY:Palestra"));
}

#[test]
fn rejects_malformed_rows() {
	let (dir, _) = setup();
	let broken = dir.path().join("broken.html");
	fs::write(
		&broken,
		r#"<table><tr class="event"><td class="date">10/05</td><td>08:00</td></tr></table>"#,
	)
	.unwrap();

	cmd(&dir)
		.arg("list")
		.arg(&broken)
		.assert()
		.failure()
		.stderr(predicate::str::contains("event row 1: 2 cells"));
}

#[test]
fn rejects_unknown_identities() {
	let (dir, _) = setup();

	cmd(&dir)
		.args(["toggle", "tomorrow"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("invalid reminder identity"));
}
