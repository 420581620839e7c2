use std::{
    path::Path,
    process::{Command, Output},
};

fn altars(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_altars"))
        .arg("--data")
        .arg(dir.join("altars.toml"))
        .arg("--config")
        .arg(dir.join("config.toml"))
        .args(args)
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to run the altars binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn authored_altars_are_listed_as_json() {
    let dir = tempfile::tempdir().expect("temp dir");

    let created = altars(dir.path(), &["create", "shrine"]);
    assert!(created.status.success(), "{created:?}");
    assert!(stdout(&created).contains("Altar 'shrine' created."));

    for edit in [
        &["edit", "shrine", "set", "center", "world,0,64,0"][..],
        &["edit", "shrine", "add", "pedestal", "world,2,64,0"],
        &["edit", "shrine", "add", "item", "blaze_rod", "1"],
    ] {
        let output = altars(dir.path(), edit);
        assert!(output.status.success(), "{edit:?}: {output:?}");
    }
    assert!(dir.path().join("altars.toml").exists());

    let listed = altars(dir.path(), &["list", "--json"]);
    assert!(listed.status.success(), "{listed:?}");
    let listing: serde_json::Value =
        serde_json::from_str(&stdout(&listed)).expect("list prints json");
    let shrine = &listing[0];
    assert_eq!(shrine["name"], "shrine");
    assert_eq!(shrine["center"], "world,0,64,0");
    assert_eq!(shrine["pedestals"][0], "world,2,64,0");
    assert_eq!(shrine["required"][0]["amount"], 1);
}

#[test]
fn rejected_edits_fail_and_leave_the_file_unchanged() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert!(altars(dir.path(), &["create", "shrine"]).status.success());
    let before = std::fs::read_to_string(dir.path().join("altars.toml")).expect("saved");

    let output = altars(
        dir.path(),
        &["edit", "shrine", "add", "pedestal", "world,2,64,0"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Set the altar center"));

    let after = std::fs::read_to_string(dir.path().join("altars.toml")).expect("still there");
    assert_eq!(before, after);
}
