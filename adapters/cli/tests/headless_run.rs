use std::process::Command;

#[test]
fn headless_run_clears_every_level() {
    let output = Command::new(env!("CARGO_BIN_EXE_tic-tac-maze"))
        .args([
            "--seed",
            "9",
            "--levels",
            "2",
            "--rows",
            "5",
            "--columns",
            "6",
            "--min-distance",
            "4",
            "--show-maze",
            "--log-level",
            "warn",
        ])
        .output()
        .expect("failed to launch tic-tac-maze");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "run failed: {stdout}");
    assert!(stdout.contains("level 1 cleared"), "missing level 1 summary: {stdout}");
    assert!(stdout.contains("level 2 cleared"), "missing level 2 summary: {stdout}");
    assert!(stdout.contains("all 2 levels cleared"), "missing completion line: {stdout}");
    assert!(stdout.contains('#'), "maze was not printed: {stdout}");
}

#[test]
fn invalid_dimensions_exit_with_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_tic-tac-maze"))
        .args(["--rows", "0"])
        .output()
        .expect("failed to launch tic-tac-maze");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid campaign configuration"), "unexpected stderr: {stderr}");
}
