//! End-to-end tests for the `ingest-modularize migrate-koza` command.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_migrate_prints_rewritten_source() {
    let fixture = TestFixture::new().with_file("transform.py", scripts::KOZA_TRANSFORM);

    fixture
        .command()
        .arg("migrate-koza")
        .arg("transform.py")
        .assert()
        .success()
        .stdout(scripts::KOZA_MIGRATED);

    // the file itself is untouched
    fixture
        .child("transform.py")
        .assert(scripts::KOZA_TRANSFORM);
}

#[test]
fn test_migrate_in_place() {
    let fixture = TestFixture::new()
        .with_file("hpoa/transform.py", scripts::KOZA_TRANSFORM)
        .with_file("hpoa/README.md", "row row row\n");

    fixture
        .command()
        .arg("migrate-koza")
        .arg("--in-place")
        .arg("hpoa")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    fixture
        .child("hpoa/transform.py")
        .assert(scripts::KOZA_MIGRATED);
    fixture.child("hpoa/README.md").assert("row row row\n");
}

#[test]
fn test_migrate_several_files_prints_headers() {
    let fixture = TestFixture::new()
        .with_file("a.py", "x = row['a']\n")
        .with_file("b.py", "y = row['b']\n");

    fixture
        .command()
        .args(["migrate-koza", "a.py", "b.py"])
        .assert()
        .success()
        .stdout("# ==> a.py <==\nx = record['a']\n# ==> b.py <==\ny = record['b']\n");
}

#[test]
fn test_migrate_directory_without_python_files() {
    let fixture = TestFixture::new().with_dir("empty");

    fixture
        .command()
        .args(["migrate-koza", "empty"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No Python files found"));
}

#[test]
fn test_migrate_syntax_error() {
    let fixture = TestFixture::new().with_file("broken.py", "x = 'unterminated\n");

    fixture
        .command()
        .args(["migrate-koza", "--in-place", "broken.py"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("broken.py"));

    fixture.child("broken.py").assert("x = 'unterminated\n");
}

#[test]
fn test_migrate_requires_a_path() {
    let fixture = TestFixture::new();

    fixture.command().arg("migrate-koza").assert().code(2);
}
