//! Shared helpers for agent integration tests.
//!
//! Tests that need a real socket pick distinct fixed ports so the test
//! binaries can run in parallel without colliding.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use clustersh::error::Result;
use clustersh::listener::RequestListener;
use clustersh::protocol::{self, Frame, FrameKind};

pub fn local_addr(port: u16) -> SocketAddr {
    format!("127.0.0.1:{}", port).parse().unwrap()
}

/// Handle to a request listener running as a background task.
pub struct TestListener {
    pub addr: SocketAddr,
    pub token: CancellationToken,
    pub handle: JoinHandle<Result<()>>,
}

/// Start a request listener on the given port and wait for it to bind.
pub async fn spawn_listener(port: u16) -> TestListener {
    let addr = local_addr(port);
    let token = CancellationToken::new();
    let listener = RequestListener::new(addr);
    let task_token = token.clone();
    let handle = tokio::spawn(async move { listener.run(task_token).await });

    // Give the listener a moment to bind before tests dial it.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestListener {
        addr,
        token,
        handle,
    }
}

/// Play the coordinator's dispatch side: send one Input + Command pair and
/// return the Output frame the listener replies with.
pub async fn dispatch(addr: SocketAddr, input: &str, command: &str) -> Frame {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    protocol::write_frame(&mut stream, FrameKind::Input, input.as_bytes())
        .await
        .unwrap();
    protocol::write_frame(&mut stream, FrameKind::Command, command.as_bytes())
        .await
        .unwrap();
    protocol::read_frame_expecting(&mut stream, FrameKind::Output)
        .await
        .unwrap()
}
