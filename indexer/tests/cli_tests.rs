use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn termindex() -> Command {
    let mut cmd = Command::cargo_bin("termindex").unwrap();
    cmd.env_remove("TERMINDEX_STORE").env_remove("TERMINDEX_CONFIG");
    cmd
}

#[test]
fn demo_prints_counts_for_the() {
    termindex()
        .args(["--store", "memory", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://en.wikipedia.org/wiki/Java_(programming_language)=1",
        ))
        .stdout(predicate::str::contains("https://en.wikipedia.org/wiki/Programming_language=2"));
}

#[test]
fn index_then_query_sled_store() {
    let dir = tempdir().unwrap();
    let pages = dir.path().join("pages.jsonl");
    fs::write(
        &pages,
        "{\"url\": \"A\", \"body\": \"the cat sat\"}\n\n{\"url\": \"B\", \"body\": \"the dog the cat\"}\n",
    )
    .unwrap();
    let store = format!("sled:{}", dir.path().join("db").display());

    termindex().args(["--store", &store, "index", "--input"]).arg(&pages).assert().success();

    termindex()
        .args(["--store", &store, "counts", "--term", "the"])
        .assert()
        .success()
        .stdout("A 1\nB 2\n");
    termindex()
        .args(["--store", &store, "urls", "--term", "cat"])
        .assert()
        .success()
        .stdout("A\nB\n");
    termindex()
        .args(["--store", &store, "count", "--url", "B", "--term", "dog"])
        .assert()
        .success()
        .stdout("1\n");

    termindex()
        .args(["--store", &store, "purge", "--target", "all"])
        .assert()
        .success()
        .stdout("removed 6 keys\n");
    termindex().args(["--store", &store, "terms"]).assert().success().stdout("");
}

#[test]
fn count_for_unindexed_url_fails() {
    termindex()
        .args(["--store", "memory", "count", "--url", "nowhere", "--term", "the"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has not been indexed"));
}

#[test]
fn index_rejects_unsupported_input_file() {
    let dir = tempdir().unwrap();
    let notes = dir.path().join("notes.md");
    fs::write(&notes, "# the cat sat").unwrap();

    termindex()
        .args(["--store", "memory", "index", "--input"])
        .arg(&notes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a .json, .jsonl or .txt file"));
}

#[test]
fn rejects_unknown_store_spec() {
    termindex()
        .args(["--store", "mongo://x", "terms"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid store spec"));
}
