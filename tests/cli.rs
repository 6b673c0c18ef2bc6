use std::process::Command;

fn ticktock() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ticktock"))
}

#[test]
fn test_week_bounds_prints_range() {
    let output = ticktock()
        .args(["week-bounds", "--week", "1", "--year", "2023"])
        .output()
        .expect("Failed to run ticktock");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2023-01-02 to 2023-01-08"), "unexpected output: {}", stdout);
}

#[test]
fn test_week_zero_is_rejected() {
    let output = ticktock()
        .args(["week-bounds", "--week", "0", "--year", "2023"])
        .output()
        .expect("Failed to run ticktock");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));
}

#[test]
fn test_help_lists_commands() {
    let output = ticktock().arg("--help").output().expect("Failed to run ticktock");

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["list", "show", "add", "edit", "delete", "draft", "catalog", "week-bounds"] {
        assert!(stdout.contains(command), "missing {} in help", command);
    }
}
