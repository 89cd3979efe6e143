use assert_fs::fixture::{FileWriteStr, PathChild};
use predicates::prelude::predicate;

mod common;

#[test]
fn write_tree_produces_the_canonical_root_hash() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repo(dir.path());

    dir.child("README.md").write_str("Hello, World!\n")?;
    common::rit(dir.path()).arg("add").arg("README.md").assert().success();

    let tree_oid = common::stdout_of(common::rit(dir.path()).arg("write-tree"));
    assert_eq!(tree_oid, "42986d465a13fdda7fc0f28b0eefd0f002f31aa8");

    Ok(())
}

#[test]
fn write_tree_on_empty_index_stores_the_empty_tree() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repo(dir.path());

    let tree_oid = common::stdout_of(common::rit(dir.path()).arg("write-tree"));
    assert_eq!(tree_oid, "4b825dc642cb6eb9a060e54bf8d69288fbee4904");

    Ok(())
}

#[test]
fn root_commit_is_deterministic_and_advances_head() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repo(dir.path());

    dir.child("README.md").write_str("Hello, World!\n")?;
    common::rit(dir.path()).arg("add").arg("README.md").assert().success();

    common::rit_with_author(dir.path(), "2024-03-01 12:00:00 +0200")
        .args(["commit", "-m", "Initial commit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[(root-commit) 1700561] Initial commit"));

    // the branch ref holds exactly "<hash>\n"
    let master = std::fs::read_to_string(dir.child(".git/refs/heads/master").path())?;
    assert_eq!(master, "1700561d449d57d4b6bbddc416992bc8a188b073\n");

    // HEAD stays symbolic
    let head = std::fs::read_to_string(dir.child(".git/HEAD").path())?;
    assert_eq!(head, "ref: refs/heads/master");

    common::rit(dir.path())
        .args(["cat-file", "-p", "1700561d449d57d4b6bbddc416992bc8a188b073"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "tree 42986d465a13fdda7fc0f28b0eefd0f002f31aa8",
        ))
        .stdout(predicate::str::contains(
            "author Test User <test@example.com> 1709287200 +0200",
        ))
        .stdout(predicate::str::contains("Initial commit"));

    Ok(())
}

#[test]
fn second_commit_links_to_its_parent() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repo(dir.path());

    dir.child("README.md").write_str("Hello, World!\n")?;
    common::rit(dir.path()).arg("add").arg("README.md").assert().success();
    common::rit_with_author(dir.path(), "2024-03-01 12:00:00 +0200")
        .args(["commit", "-m", "Initial commit"])
        .assert()
        .success();

    dir.child("src/main.rs").write_str("fn main() {}\n")?;
    common::rit(dir.path()).arg("add").arg("src").assert().success();
    common::rit_with_author(dir.path(), "2024-03-01 13:00:00 +0200")
        .args(["commit", "-m", "Add main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[6d101c1] Add main"));

    let master = std::fs::read_to_string(dir.child(".git/refs/heads/master").path())?;
    assert_eq!(master, "6d101c1b3f33a2f3c5daed7c730c2593c9fc2864\n");

    common::rit(dir.path())
        .args(["cat-file", "-p", "6d101c1b3f33a2f3c5daed7c730c2593c9fc2864"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "tree 6ab9095fa04f2680e2241933ff4f5c4b3a88bfc8",
        ))
        .stdout(predicate::str::contains(
            "parent 1700561d449d57d4b6bbddc416992bc8a188b073",
        ));

    Ok(())
}

#[test]
fn ls_tree_lists_committed_tree() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repo(dir.path());

    dir.child("README.md").write_str("Hello, World!\n")?;
    dir.child("src/main.rs").write_str("fn main() {}\n")?;
    common::rit(dir.path()).arg("add").arg(".").assert().success();
    common::rit_with_author(dir.path(), "2024-03-01 12:00:00 +0200")
        .args(["commit", "-m", "Initial commit"])
        .assert()
        .success();

    common::rit(dir.path())
        .args(["ls-tree", "HEAD"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "100644 blob 8ab686eafeb1f44702738c8b0f24f2567c36da6d\tREADME.md",
        ))
        .stdout(predicate::str::contains(
            "040000 tree 5d90422423db5ef6b431e8b9e60e0baf04b8742a\tsrc",
        ));

    common::rit(dir.path())
        .args(["ls-tree", "--recursive", "HEAD"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "100644 blob f328e4d9d04c31d0d70d16d21a07d1613be9d577\tsrc/main.rs",
        ));

    Ok(())
}
