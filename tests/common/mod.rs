#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

/// A `rit` invocation rooted at the given repository directory.
pub fn rit(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rit").expect("rit binary builds");
    cmd.current_dir(dir);
    cmd
}

/// Same, with a pinned author identity so commit hashes are deterministic.
pub fn rit_with_author(dir: &Path, date: &str) -> Command {
    let mut cmd = rit(dir);
    cmd.env("GIT_AUTHOR_NAME", "Test User")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_AUTHOR_DATE", date);
    cmd
}

pub fn init_repo(dir: &Path) {
    rit(dir).arg("init").assert().success();
}

/// Capture a command's stdout as a trimmed string.
pub fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("utf8 stdout").trim().to_string()
}
