mod content_origin;

use std::path::Path;

use content_origin::ContentOrigin;
use predicates::prelude::*;

fn write_content(root: &Path) {
    std::fs::create_dir_all(root.join("docs/guides")).expect("create docs dir");
    std::fs::write(
        root.join("docs/guides/intro.md"),
        "---\ntitle: Intro\norder: 1\n---\n# Getting started\n",
    )
    .expect("write intro");
    std::fs::write(
        root.join("docs/manifest.json"),
        r#"{"docs":[{"slug":"guides/intro","frontmatter":{"title":"Intro","order":1}}]}"#,
    )
    .expect("write manifest");
}

#[test]
fn doc_prints_rendered_html_from_directory_origin() {
    let temp = tempfile::TempDir::new().expect("tempdir");
    write_content(temp.path());

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docportal");
    cmd.env_remove("DOCPORTAL_CONTENT")
        .args(["--content"])
        .arg(temp.path())
        .args(["doc", "--slug", "guides/intro"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<h1 id="getting-started">"#));
}

#[test]
fn doc_json_over_http_origin() {
    let origin = ContentOrigin::spawn();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docportal");
    cmd.env("DOCPORTAL_CONTENT", &origin.base_url)
        .args(["doc", "--slug", "guides/intro", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""title": "Introduction""#))
        .stdout(predicate::str::contains("<script").not());
}

#[test]
fn missing_doc_exits_non_zero() {
    let origin = ContentOrigin::spawn();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docportal");
    cmd.args(["--content", &origin.base_url, "doc", "--slug", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found: nope"));
}

#[test]
fn toc_prints_yaml() {
    let temp = tempfile::TempDir::new().expect("tempdir");
    write_content(temp.path());

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docportal");
    cmd.args(["--content"])
        .arg(temp.path())
        .args(["toc", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("guides:"))
        .stdout(predicate::str::contains("title: Guides"))
        .stdout(predicate::str::contains("slug: guides/intro"));
}

#[test]
fn render_local_file_without_origin() {
    let temp = tempfile::TempDir::new().expect("tempdir");
    let input = temp.path().join("page.md");
    std::fs::write(&input, "---\ntitle: Page\n---\n## Hello\n\n$x^2$\n").expect("write input");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docportal");
    cmd.env("DOCPORTAL_CONTENT", "ftp://not-used.example")
        .args(["render", "--json", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""title": "Page""#))
        .stdout(predicate::str::contains("math-inline"));
}

#[test]
fn export_writes_site_and_refuses_to_overwrite() {
    let temp = tempfile::TempDir::new().expect("tempdir");
    write_content(&temp.path().join("content"));
    let out = temp.path().join("site");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docportal");
    cmd.args(["--content"])
        .arg(temp.path().join("content"))
        .args(["export", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported 1 docs"));
    assert!(out.join("docs/guides/intro.html").is_file());
    assert!(out.join("toc.json").is_file());

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docportal");
    cmd.args(["--content"])
        .arg(temp.path().join("content"))
        .args(["export", "--out"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    let temp = tempfile::TempDir::new().expect("tempdir");
    let input = temp.path().join("page.md");
    std::fs::write(&input, "# Hi\n").expect("write input");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docportal");
    cmd.env("RUST_LOG", "debug")
        .args(["render", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}
