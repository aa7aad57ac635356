use std::{fs, path::Path};

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::{
	matchers::{method, path, query_param},
	Mock, MockServer, ResponseTemplate,
};

/// `syl2ics` with an isolated data dir and no ambient key or log filter.
fn syl2ics(data_dir: &Path) -> Result<Command> {
	let mut cmd = Command::cargo_bin("syl2ics")?;
	cmd.arg("--data-dir")
		.arg(data_dir)
		.env_remove("SYL2ICS_API_KEY")
		.env_remove("SYL2ICS_DATA_DIR")
		.env_remove("RUST_LOG");
	Ok(cmd)
}

fn seed_deadlines(data_dir: &Path, deadlines: &Value) -> Result<()> {
	fs::create_dir_all(data_dir)?;
	fs::write(data_dir.join("deadlines"), serde_json::to_string(deadlines)?)?;
	Ok(())
}

fn two_deadlines() -> Value {
	json!([
		{ "title": "Essay", "date": "2026-01-25", "type": "assignment" },
		{ "title": "Midterm", "date": "2026-02-15", "type": "exam", "description": "Chapters 1-4" }
	])
}

#[test]
fn list_without_saved_deadlines() -> Result<()> {
	let data = TempDir::new()?;

	syl2ics(data.path())?
		.arg("list")
		.assert()
		.success()
		.stdout(predicate::str::contains("No saved deadlines"));

	Ok(())
}

#[test]
fn list_shows_numbered_entries() -> Result<()> {
	let data = TempDir::new()?;
	seed_deadlines(data.path(), &two_deadlines())?;

	syl2ics(data.path())?
		.arg("list")
		.assert()
		.success()
		.stdout(predicate::str::contains("1. [ASSIGNMENT]"))
		.stdout(predicate::str::contains("2. [EXAM]"))
		.stdout(predicate::str::contains("Sun, Feb 15, 2026"))
		.stdout(predicate::str::contains("Chapters 1-4"));

	Ok(())
}

#[test]
fn export_all_day_to_file() -> Result<()> {
	let data = TempDir::new()?;
	seed_deadlines(data.path(), &two_deadlines())?;
	let output = data.path().join("deadlines.ics");

	syl2ics(data.path())?
		.args(["export", "-o"])
		.arg(&output)
		.assert()
		.success();

	let ics = fs::read_to_string(&output)?;
	assert!(ics.starts_with("BEGIN:VCALENDAR"));
	assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
	assert!(ics.contains("SUMMARY:Midterm"));
	assert!(ics.contains("UID:1-20260215@syl2ics"));
	assert!(ics.contains("20260125"));
	assert!(!ics.contains("TZID"));

	Ok(())
}

#[test]
fn export_is_reproducible() -> Result<()> {
	let data = TempDir::new()?;
	seed_deadlines(data.path(), &two_deadlines())?;

	let first = syl2ics(data.path())?.arg("export").output()?;
	let second = syl2ics(data.path())?.arg("export").output()?;

	assert!(first.status.success());
	assert_eq!(first.stdout, second.stdout);

	Ok(())
}

#[test]
fn export_with_due_time_uses_zone() -> Result<()> {
	let data = TempDir::new()?;
	seed_deadlines(data.path(), &two_deadlines())?;

	syl2ics(data.path())?
		.args(["export", "--due-time", "23:59", "--tz", "America/Toronto", "--name", "PHYS 101"])
		.assert()
		.success()
		.stdout(predicate::str::contains("TZID=America/Toronto"))
		.stdout(predicate::str::contains("20260125T235900"))
		.stdout(predicate::str::contains("PHYS 101"));

	Ok(())
}

#[test]
fn export_rejects_unknown_zone() -> Result<()> {
	let data = TempDir::new()?;
	seed_deadlines(data.path(), &two_deadlines())?;

	syl2ics(data.path())?
		.args(["export", "--due-time", "23:59", "--tz", "Mars/Olympus_Mons"])
		.assert()
		.failure();

	Ok(())
}

#[test]
fn export_nothing_fails() -> Result<()> {
	let data = TempDir::new()?;

	syl2ics(data.path())?
		.arg("export")
		.assert()
		.failure()
		.stderr(predicate::str::contains("no saved deadlines"));

	Ok(())
}

#[test]
fn remove_by_number() -> Result<()> {
	let data = TempDir::new()?;
	seed_deadlines(data.path(), &two_deadlines())?;

	syl2ics(data.path())?
		.args(["remove", "1"])
		.assert()
		.success()
		.stdout(predicate::str::contains("Essay"));

	let saved: Vec<Value> = serde_json::from_str(&fs::read_to_string(data.path().join("deadlines"))?)?;
	assert_eq!(saved.len(), 1);
	assert_eq!(saved[0]["title"], "Midterm");

	syl2ics(data.path())?
		.args(["remove", "5"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("no deadline #5"));

	syl2ics(data.path())?.args(["remove", "0"]).assert().failure();

	Ok(())
}

#[test]
fn clear_empties_the_list() -> Result<()> {
	let data = TempDir::new()?;
	seed_deadlines(data.path(), &two_deadlines())?;

	syl2ics(data.path())?.arg("clear").assert().success();

	syl2ics(data.path())?
		.arg("list")
		.assert()
		.success()
		.stdout(predicate::str::contains("No saved deadlines"));

	Ok(())
}

#[test]
fn key_set_and_clear() -> Result<()> {
	let data = TempDir::new()?;
	let key_file = data.path().join("openai_api_key");

	syl2ics(data.path())?
		.args(["key", "set", "  sk-test  ", "--provider", "openai"])
		.assert()
		.success();
	assert_eq!(fs::read_to_string(&key_file)?, "sk-test");

	syl2ics(data.path())?
		.args(["key", "clear", "--provider", "openai"])
		.assert()
		.success();
	assert!(!key_file.exists());

	syl2ics(data.path())?.args(["key", "set", "   "]).assert().failure();

	Ok(())
}

#[test]
fn extract_without_key_explains_how_to_add_one() -> Result<()> {
	let data = TempDir::new()?;
	let syllabus = data.path().join("syllabus.txt");
	fs::write(&syllabus, "Essay due January 25")?;

	syl2ics(data.path())?
		.arg("extract")
		.arg(&syllabus)
		.assert()
		.failure()
		.stderr(predicate::str::contains("syl2ics key set"));

	Ok(())
}

#[test]
fn extract_empty_syllabus_fails() -> Result<()> {
	let data = TempDir::new()?;

	syl2ics(data.path())?
		.args(["extract", "--api-key", "AIza-test"])
		.write_stdin("   \n")
		.assert()
		.failure();

	Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn extract_from_stdin_saves_sorted_deadlines() -> Result<()> {
	let server = MockServer::start().await;
	let completion = "```json\n[\
		{\"title\":\"Midterm\",\"date\":\"Feb 15\",\"type\":\"exam\"},\
		{\"title\":\"Essay\",\"date\":\"2026-01-25\",\"type\":\"assignment\"},\
		{\"title\":\"\",\"date\":\"2026-03-01\"}\
	]\n```";

	Mock::given(method("POST"))
		.and(path("/v1beta/models/gemini-1.5-flash-latest:generateContent"))
		.and(query_param("key", "AIza-test"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"candidates": [{ "content": { "parts": [{ "text": completion }] } }]
		})))
		.expect(1)
		.mount(&server)
		.await;

	let data = TempDir::new()?;
	let base_url = format!("{}/v1beta/models", server.uri());

	syl2ics(data.path())?
		.args(["extract", "--api-key", "AIza-test", "--year", "2026", "--base-url", &base_url])
		.write_stdin("Essay due January 25. Midterm on February 15.")
		.assert()
		.success()
		.stdout(predicate::str::contains("Found 2 deadlines"))
		.stdout(predicate::str::contains("1 extracted items"));

	let saved: Vec<Value> = serde_json::from_str(&fs::read_to_string(data.path().join("deadlines"))?)?;
	assert_eq!(saved.len(), 2);
	assert_eq!(saved[0]["title"], "Essay");
	assert_eq!(saved[1]["date"], "2026-02-15");

	Ok(())
}

#[test]
fn version_and_package_metadata() -> Result<()> {
	assert!(!env!("CARGO_PKG_AUTHORS").is_empty());
	assert!(env!("CARGO_PKG_REPOSITORY").starts_with("https://"));

	Command::cargo_bin("syl2ics")?
		.arg("--version")
		.assert()
		.success()
		.stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));

	Ok(())
}
