use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::{fs, path::Path, process::Command};

fn jpe() -> Command {
    Command::cargo_bin("jpe").unwrap()
}

const VALID: &str = "\
[Project]
name: Test Mod
id: test_mod
version: 1.0.0
end

[Buffs]
id: happy_buff
display_name: STR_HAPPY
trait: cheerful
end

[Traits]
id: cheerful
buff: happy_buff
end

[Strings]
key: STR_HAPPY
text: Happy
end
";

const GHOST_BUFF: &str = "\
[Project]
name: Test Mod
id: test_mod
version: 1.0.0
end

[Traits]
id: cheerful
buff: ghost_buff
end
";

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn help_lists_subcommands() {
    jpe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("decompile"));
}

#[test]
fn init_scaffolds_a_buildable_project() {
    let dir = tempfile::tempdir().unwrap();
    jpe().arg("init").arg(dir.path()).assert().success();
    assert!(dir.path().join("mod.jpe").is_file());
    assert!(dir.path().join("jpe.json").is_file());

    jpe()
        .arg("build")
        .arg(dir.path().join("mod.jpe"))
        .assert()
        .success();
    let out = dir.path().join("build");
    assert!(out.join("my_first_mod_buffs.xml").is_file());
    assert!(out.join("build-manifest.json").is_file());
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "mod.jpe", VALID);
    jpe().arg("init").arg(dir.path()).assert().failure();
    assert_eq!(fs::read_to_string(dir.path().join("mod.jpe")).unwrap(), VALID);
}

#[test]
fn check_valid_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "mod.jpe", VALID);
    jpe()
        .arg("check")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Looking good."));
}

#[test]
fn check_json_reports_dangling_reference() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "mod.jpe", GHOST_BUFF);
    jpe()
        .args(["check", "--json"])
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"isValid\": false"))
        .stdout(predicate::str::contains("dangling_reference"))
        .stdout(predicate::str::contains("ghost_buff"));
}

#[test]
fn build_json_has_build_id_and_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "mod.jpe", VALID);
    let out = dir.path().join("dist");
    let assert = jpe()
        .args(["build", "--json", "-o"])
        .arg(&out)
        .arg(&file)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let results: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let first = &results[0];
    assert_eq!(first["success"], true);
    assert!(first["buildId"].is_string());
    assert_eq!(first["artifacts"].as_array().unwrap().len(), 3);
    assert!(out.join("test_mod_traits.xml").is_file());
}

#[test]
fn build_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "mod.jpe", GHOST_BUFF);
    let out = dir.path().join("dist");
    jpe()
        .args(["build", "-o"])
        .arg(&out)
        .arg(&file)
        .assert()
        .failure();
    assert!(!out.join("test_mod_traits.xml").exists());
}

#[test]
fn strict_build_fails_on_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "mod.jpe",
        "[Project]\nname: M\nid: m\nversion: 1.0.0\nend\n\n[Buffs]\nid: b\ndisplay_name: STR_B\nend\n",
    );
    let out = dir.path().join("dist");
    jpe().args(["build", "-o"]).arg(&out).arg(&file).assert().success();
    jpe()
        .args(["build", "--strict", "-o"])
        .arg(dir.path().join("strict"))
        .arg(&file)
        .assert()
        .failure();
}

#[test]
fn build_several_files_into_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.jpe", VALID);
    let b = write(
        dir.path(),
        "b.jpe",
        "[Project]\nname: Other\nid: other\nversion: 2.0.0\nend\n\n[Traits]\nid: calm\nend\n",
    );
    let out = dir.path().join("dist");
    jpe().args(["build", "-o"]).arg(&out).arg(&a).arg(&b).assert().success();
    assert!(out.join("a").join("test_mod_buffs.xml").is_file());
    assert!(out.join("b").join("other_traits.xml").is_file());
}

#[test]
fn translate_then_decompile_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "mod.jpe", VALID);
    let xml_dir = dir.path().join("xml");
    jpe()
        .arg("translate")
        .arg(&file)
        .arg("-o")
        .arg(&xml_dir)
        .assert()
        .success();
    assert!(xml_dir.join("test_mod_strings.xml").is_file());

    let back = dir.path().join("back.jpe");
    jpe()
        .arg("decompile")
        .arg(&xml_dir)
        .arg("-o")
        .arg(&back)
        .assert()
        .success();

    let text = fs::read_to_string(&back).unwrap();
    assert!(text.contains("[Buffs]"));
    assert!(text.contains("id: happy_buff"));
    jpe().arg("check").arg(&back).assert().success();
}

#[test]
fn decompile_prints_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "m_traits.xml",
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<TraitTuning>\n  <Trait n=\"calm\"/>\n</TraitTuning>\n",
    );
    jpe()
        .arg("decompile")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[Traits]"))
        .stdout(predicate::str::contains("id: calm"));
}

#[test]
fn missing_input_is_reported() {
    jpe()
        .args(["check", "/definitely/not/here.jpe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("here.jpe"));
}
