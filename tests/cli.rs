use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn titlecaser() -> Command {
    let mut cmd = Command::cargo_bin("titlecaser").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("TITLECASER_ORACLE")
        .env_remove("TITLECASER_TIMEOUT");
    cmd
}

#[test]
fn string_titlecase_with_builtin() {
    titlecaser()
        .args([
            "--oracle",
            "builtin",
            "string",
            r#"<h2>My favorite book is <i epub:type="se:name.book">the great gatsby</i></h2>"#,
        ])
        .assert()
        .success()
        .stdout(
            r#"<h2>My Favorite Book Is <i epub:type="se:name.book">The Great Gatsby</i></h2>"#
                .to_owned()
                + "\n",
        );
}

#[test]
fn string_upper_and_lower() {
    titlecaser()
        .args(["--case", "upper", "string", "Hello <b>World</b>"])
        .assert()
        .success()
        .stdout("HELLO <b>WORLD</b>\n");
    titlecaser()
        .args(["string", "--case", "lower", "h3>A TITLE</h3"])
        .assert()
        .success()
        .stdout("h3>a title</h3\n");
}

#[test]
fn missing_oracle_program_fails() {
    titlecaser()
        .args(["--oracle-command", "titlecaser-no-such-program", "string", "a title"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("titlecase oracle failed"));
}

#[cfg(unix)]
#[test]
fn command_oracle_receives_the_stripped_text() {
    titlecaser()
        .args([
            "--oracle-command",
            "sh",
            "--oracle-arg=-c",
            r#"--oracle-arg=printf '%s\n' "$1" | tr a-z A-Z"#,
            "--oracle-arg=sh",
            "string",
            "<p>the <em>end</em></p>",
        ])
        .assert()
        .success()
        .stdout("<p>THE <em>END</em></p>\n");
}

#[cfg(unix)]
#[test]
fn no_oracle_args_passes_the_text_alone() {
    titlecaser()
        .args(["--oracle-command", "echo", "--no-oracle-args", "string", "the end"])
        .assert()
        .success()
        .stdout("the end\n");
}

#[cfg(unix)]
#[test]
fn default_oracle_args_end_option_parsing() {
    titlecaser()
        .args(["--oracle-command", "echo", "string", "--", "-n title"])
        .assert()
        .success()
        .stdout("titlecase -- -n title\n");
}

#[test]
fn no_oracle_args_conflicts_with_oracle_arg() {
    titlecaser()
        .args(["--no-oracle-args", "--oracle-arg=x", "string", "a title"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn tree_rewrites_files_in_place() {
    let dir = TempDir::new().unwrap();
    let text = dir.path().join("src/epub/text");
    fs::create_dir_all(&text).unwrap();
    fs::write(
        text.join("chapter-1.xhtml"),
        "<h2 epub:type=\"title\">the storm</h2>\n",
    )
    .unwrap();
    fs::write(text.join("colophon.xhtml"), "<h2>the colophon</h2>\n").unwrap();
    fs::write(
        text.join("part-1.xhtml"),
        "<h2 epub:type=\"z3998:roman\">iv</h2>\n",
    )
    .unwrap();

    titlecaser()
        .args(["--oracle", "builtin", "tree"])
        .arg(dir.path())
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(text.join("chapter-1.xhtml")).unwrap(),
        "<h2 epub:type=\"title\">The Storm</h2>\n"
    );
    assert_eq!(
        fs::read_to_string(text.join("colophon.xhtml")).unwrap(),
        "<h2>the colophon</h2>\n"
    );
    assert_eq!(
        fs::read_to_string(text.join("part-1.xhtml")).unwrap(),
        "<h2 epub:type=\"z3998:roman\">iv</h2>\n"
    );
}

#[test]
fn tree_rejects_missing_directory() {
    let dir = TempDir::new().unwrap();
    titlecaser()
        .args(["--oracle", "builtin", "tree"])
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn file_writes_to_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.xhtml");
    let output = dir.path().join("out.xhtml");
    fs::write(&input, "<p>body</p>\n<h3>a calm sea</h3>\n").unwrap();

    titlecaser()
        .args(["--oracle", "builtin", "file"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&input).unwrap(),
        "<p>body</p>\n<h3>a calm sea</h3>\n"
    );
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "<p>body</p>\n<h3>A Calm Sea</h3>\n"
    );
}

#[cfg(unix)]
#[test]
fn file_with_failing_lines_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.xhtml");
    fs::write(&input, "<h2>the storm</h2>\n").unwrap();

    titlecaser()
        .args(["--oracle-command", "false", "--no-oracle-args", "file"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"));

    assert_eq!(fs::read_to_string(&input).unwrap(), "<h2>the storm</h2>\n");
}
