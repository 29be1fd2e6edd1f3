//! Process-level shutdown behaviour of the server binary.

#![cfg(unix)]

use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

const STARTUP: Duration = Duration::from_secs(15);

fn free_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("addr").to_string()
}

fn wait_until_listening(child: &mut Child, addr: &str) {
    let started = Instant::now();
    while TcpStream::connect(addr).is_err() {
        assert!(child.try_wait().expect("poll").is_none(), "server exited early");
        assert!(started.elapsed() < STARTUP, "server did not start");
        sleep(Duration::from_millis(50));
    }
}

#[test]
fn sigterm_writes_state_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("state.json");
    let addr = free_addr();

    let mut child = Command::new(env!("CARGO_BIN_EXE_idp_config_server"))
        .current_dir(dir.path())
        .env("BIND_ADDR", &addr)
        .env("STATE_FILE", &state)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn server");
    wait_until_listening(&mut child, &addr);

    let killed = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .expect("send SIGTERM");
    assert!(killed.success());

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().expect("poll") {
            break status;
        }
        if started.elapsed() > STARTUP {
            let _ = child.kill();
            panic!("server ignored SIGTERM");
        }
        sleep(Duration::from_millis(50));
    };
    assert!(status.success(), "{status:?}");

    let written = std::fs::read_to_string(&state).expect("state file");
    assert!(written.contains("\"formatVersion\""));
}
