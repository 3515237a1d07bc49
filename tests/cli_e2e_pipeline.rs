//! End-to-end tests of the extraction pipeline against a real git
//! repository.
//!
//! These need `git` on the PATH and run with
//! `cargo test --features integration-tests`.

#[allow(dead_code)]
mod common;
use common::prelude::*;

fn upstream_fixture() -> TestFixture {
    let fixture = TestFixture::new();
    fixture.with_upstream(
        "source",
        &[
            &[
                ("src/monarch_ingest/ingests/hpoa/transform.py", "x = 1\n"),
                ("README.md", "# monarch-ingest\n"),
            ],
            &[
                ("src/monarch_ingest/ingests/hpoa/transform.py", "x = 2\n"),
                ("docs/Sources/hpoa.md", "# HPOA\n"),
            ],
            &[("tests/unit/hpoa/test_transform.py", "def test(): pass\n")],
        ],
    );
    fixture
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_find_files_lists_ingest_history() {
    let fixture = upstream_fixture();
    let source = fixture.path().join("source");

    fixture
        .command()
        .arg("find-files")
        .arg("hpoa")
        .arg("--upstream-git")
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "src/monarch_ingest/ingests/hpoa/transform.py",
        ))
        .stdout(predicate::str::contains("docs/Sources/hpoa.md"))
        .stdout(predicate::str::contains("tests/unit/hpoa/test_transform.py"))
        .stdout(predicate::str::contains("README.md").not());

    fixture
        .child("monarch-ingest/.git")
        .assert(predicate::path::is_dir());
    fixture
        .child("hpoa-files.txt")
        .assert(predicate::str::contains("docs/Sources/hpoa.md"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_find_files_unknown_ingest() {
    let fixture = upstream_fixture();
    let source = fixture.path().join("source");

    fixture
        .command()
        .arg("find-files")
        .arg("mondo")
        .arg("--upstream-git")
        .arg(&source)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "No files were ever committed for ingest 'mondo'",
        ));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_find_files_output_copy_and_quiet() {
    let fixture = upstream_fixture();
    let source = fixture.path().join("source");

    fixture
        .command()
        .env("MONARCH_INGEST_GIT", &source)
        .args(["find-files", "hpoa", "--quiet", "--output", "list.txt"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    fixture
        .child("list.txt")
        .assert(predicate::str::contains("hpoa/transform.py"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_find_files_with_relative_work_dir() {
    let fixture = upstream_fixture();
    let source = fixture.path().join("source");

    fixture
        .command()
        .args(["find-files", "hpoa", "--quiet", "--work-dir", "build"])
        .arg("--upstream-git")
        .arg(&source)
        .assert()
        .success();

    fixture
        .child("build/monarch-ingest/.git")
        .assert(predicate::path::is_dir());
    fixture
        .child("build/hpoa-files.txt")
        .assert(predicate::str::contains("tests/unit/hpoa/test_transform.py"));
}
