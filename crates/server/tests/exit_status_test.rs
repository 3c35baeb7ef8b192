use std::net::TcpListener;
use std::process::Command;

#[test]
fn bind_failure_exits_with_failure() {
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port().to_string();

    let output = Command::new(env!("CARGO_BIN_EXE_nano-server")).args(["127.0.0.1", &port, "--bind-address"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("server failed at starting"));
}

#[test]
fn missing_port_exits_with_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_nano-server")).arg("0.0.0.0").output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}
