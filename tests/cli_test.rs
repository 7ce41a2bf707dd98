use assert_cmd::Command;
use assert_cmd::cargo_bin;
use predicates::prelude::*;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("bank-server"));
    cmd.env_remove("RUST_LOG").write_stdin(
        "0 deposit 200\n0 withdraw 2000\n0 transfer 300 1\n3 view 0\nexit\n4 deposit 1\n",
    );

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("account,balance"))
        .stdout(predicate::str::contains("0,900\n"))
        .stdout(predicate::str::contains("1,1300\n"))
        .stdout(predicate::str::contains("3,1000\n"))
        // Requests after the sentinel are never processed.
        .stdout(predicate::str::contains("4,1000\n"))
        .stderr(predicate::str::contains("Insufficient funds in account 0"));

    Ok(())
}

#[test]
fn test_cli_end_of_input_drains_and_reports() {
    let mut cmd = Command::new(cargo_bin!("bank-server"));
    cmd.args(["--accounts", "2", "--initial-balance", "50"])
        .env_remove("RUST_LOG")
        .write_stdin("1 transfer 20 0\n0 deposit 5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::diff("account,balance\n0,75\n1,30\n"));
}

#[test]
fn test_cli_rejects_malformed_requests() {
    let mut cmd = Command::new(cargo_bin!("bank-server"));
    cmd.env_remove("RUST_LOG").write_stdin(
        "garbage\n7 deposit 10\n2 transfer 10 2\n2 deposit -5\n2 deposit 10\nexit\n",
    );

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2,1010\n"))
        .stderr(predicate::str::contains("rejected malformed message"))
        .stderr(predicate::str::contains("Invalid account index 7"))
        .stderr(predicate::str::contains("to itself"))
        .stderr(predicate::str::contains("Amount must be positive"));
}

#[test]
fn test_cli_transfer_delay_with_opposite_transfers() {
    let mut input = String::new();
    for _ in 0..50 {
        input.push_str("0 transfer 10 1\n1 transfer 10 0\n");
    }
    input.push_str("exit\n");

    let mut cmd = Command::new(cargo_bin!("bank-server"));
    cmd.args(["--transfer-delay-ms", "2", "--max-in-flight", "16"])
        .env_remove("RUST_LOG")
        .timeout(std::time::Duration::from_secs(60))
        .write_stdin(input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0,1000\n"))
        .stdout(predicate::str::contains("1,1000\n"));
}

#[cfg(unix)]
#[test]
fn test_cli_interrupt_with_open_stdin_reports_and_exits() {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::process::{Command as StdCommand, Stdio};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    let mut child = StdCommand::new(cargo_bin!("bank-server"))
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let stderr = child.stderr.take().unwrap();
    let (log_tx, log_rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in BufReader::new(stderr).lines() {
            let Ok(line) = line else { break };
            if log_tx.send(line).is_err() {
                break;
            }
        }
    });

    // Stdin stays open for the whole test, so only the signal can stop the run.
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"0 deposit 5\n").unwrap();
    stdin.flush().unwrap();

    let deadline = Instant::now() + Duration::from_secs(30);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let line = log_rx
            .recv_timeout(remaining)
            .expect("deposit was never processed");
        if line.contains("deposited 5 into account 0") {
            break;
        }
    }

    let status = StdCommand::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let exit = loop {
        if let Some(exit) = child.try_wait().unwrap() {
            break exit;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("server still running after Ctrl-C");
        }
        std::thread::sleep(Duration::from_millis(50));
    };
    assert!(exit.success());

    let mut report = String::new();
    child
        .stdout
        .take()
        .unwrap()
        .read_to_string(&mut report)
        .unwrap();
    assert!(report.starts_with("account,balance\n"));
    assert!(report.contains("0,1005\n"));
    assert!(report.contains("4,1000\n"));

    // The log reader stops once the exited server's stderr is closed.
    assert!(log_rx.iter().any(|line| line.contains("interrupted")));
    drop(stdin);
}

#[test]
fn test_cli_invalid_configuration() {
    let mut cmd = Command::new(cargo_bin!("bank-server"));
    cmd.args(["--accounts", "0"]).write_stdin("");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}
