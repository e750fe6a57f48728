use std::process::Command;

fn tower_sim() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_tower-sim"));
    let _ = command.env("RUST_LOG", "off");
    command
}

#[test]
fn prints_a_summary_after_the_requested_ticks() {
    let output = tower_sim()
        .args(["--ticks", "300", "--spawn-interval", "50", "--seed", "4"])
        .output()
        .expect("failed to launch tower-sim");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ticks simulated:   300"), "{stdout}");
    assert!(stdout.contains("aircraft spawned:  "), "{stdout}");
    assert!(stdout.contains("faults:            0"), "{stdout}");
}

#[test]
fn missing_config_file_is_reported() {
    let output = tower_sim()
        .args(["--config", "does/not/exist.toml", "--ticks", "1"])
        .output()
        .expect("failed to launch tower-sim");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read config file"), "{stderr}");
}
