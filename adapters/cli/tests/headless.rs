use std::{fs, process::Command};

use serde_json::Value;

fn lanecraft() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lanecraft"))
}

#[test]
fn headless_run_prints_one_snapshot_per_tick() {
    let output = lanecraft()
        .args(["--ticks", "3"])
        .output()
        .expect("run lanecraft");
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let ticks: Vec<u64> = stdout
        .lines()
        .map(|line| {
            let snapshot: Value = serde_json::from_str(line).expect("snapshot json");
            snapshot["tick"].as_u64().expect("tick")
        })
        .collect();
    assert_eq!(ticks, vec![1, 2, 3]);
}

#[test]
fn scripted_commands_reach_the_world() {
    let dir = std::env::temp_dir().join(format!("lanecraft-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let script = dir.join("script.jsonl");
    fs::write(
        &script,
        "{\"tick\": 1, \"type\": \"spawn-unit\", \"payload\": {\"playerId\": \"player1\", \"x\": 2, \"y\": 3.5}}\n",
    )
    .expect("write script");

    let output = lanecraft()
        .args(["--ticks", "2", "--dt", "50"])
        .arg("--script")
        .arg(&script)
        .output()
        .expect("run lanecraft");
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let units: Vec<usize> = stdout
        .lines()
        .map(|line| {
            let snapshot: Value = serde_json::from_str(line).expect("snapshot json");
            snapshot["units"].as_array().map_or(0, Vec::len)
        })
        .collect();
    assert_eq!(units, vec![0, 1]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unreadable_blueprints_fail_with_context() {
    let output = lanecraft()
        .args(["--blueprint", "/definitely/not/here.toml", "--ticks", "1"])
        .output()
        .expect("run lanecraft");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read blueprint"));
}

#[test]
fn unusable_tick_lengths_are_refused() {
    for dt in ["--dt=-5", "--dt=NaN", "--dt=inf"] {
        let output = lanecraft()
            .args(["--ticks", "1", dt])
            .output()
            .expect("run lanecraft");
        assert!(!output.status.success(), "{dt} was accepted");
        assert!(output.stdout.is_empty());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("--dt must be"), "{stderr}");
    }
}

#[test]
fn realtime_scripts_are_fed_once_the_clock_runs() {
    let dir = std::env::temp_dir().join(format!("lanecraft-rt-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let script = dir.join("script.jsonl");
    fs::write(
        &script,
        "{\"tick\": 2, \"type\": \"spawn-unit\", \"payload\": {\"playerId\": \"player1\", \"x\": 2, \"y\": 3.5}}\n",
    )
    .expect("write script");

    let output = lanecraft()
        .args(["--realtime", "0.6"])
        .arg("--script")
        .arg(&script)
        .output()
        .expect("run lanecraft");
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let last: Value =
        serde_json::from_str(stdout.lines().last().expect("final snapshot")).expect("snapshot json");
    assert_eq!(last["units"].as_array().map_or(0, Vec::len), 1);

    let _ = fs::remove_dir_all(&dir);
}
