use std::process::{Command, Output};

fn rampart(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rampart"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch the rampart binary")
}

#[test]
fn help_lists_the_runner_flags() {
    let output = rampart(&["--help"]);
    assert!(output.status.success());

    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--stage", "--ticks", "--speed", "--auto-waves", "--save-code", "--resume"] {
        assert!(help.contains(flag), "help output is missing {flag}");
    }
}

#[test]
fn builtin_stage_run_prints_a_summary_and_save_code() {
    let output = rampart(&["--ticks", "40", "--auto-waves", "--save-code"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stage:          meadow"));
    assert!(stdout.contains("ticks:          40"));
    let code = stdout
        .lines()
        .find(|line| line.starts_with("rampart:v1:"))
        .expect("save code printed");

    let resumed = rampart(&["--ticks", "1", "--resume", code]);
    assert!(resumed.status.success());
}

#[test]
fn unreadable_stage_file_is_reported() {
    let output = rampart(&["--stage", "does/not/exist.toml"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read stage"));
}
