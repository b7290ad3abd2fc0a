use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

fn run_help(args: &[&str]) {
    let mut cmd = cargo_bin_cmd!("brainviset");
    cmd.args(args).arg("--help").assert().success();
}

#[test]
fn every_cli_command_has_help_path() {
    run_help(&[]);
    run_help(&["run"]);
    run_help(&["check"]);
}

#[test]
fn run_help_lists_flags() {
    let mut cmd = cargo_bin_cmd!("brainviset");
    cmd.args(["run", "--help"])
        .assert()
        .success()
        .stdout(contains("--max-iterations"))
        .stdout(contains("--yes"));
}
