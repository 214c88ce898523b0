use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::protocol::{read_frame_expecting, write_frame, FrameKind};

/// Passive role: serves execution requests dispatched by the coordinator.
///
/// Connections are served strictly one at a time. Each carries exactly one
/// request: an Input frame, then a Command frame, answered with one Output
/// frame. Any deviation from that exchange is fatal for the whole agent;
/// the coordinator is blocked on the reply and must see the failure.
pub struct RequestListener {
    listen_addr: SocketAddr,
    executor: CommandExecutor,
}

impl RequestListener {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            executor: CommandExecutor::new(),
        }
    }

    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(self.listen_addr).await?;
        tracing::info!(addr = %self.listen_addr, "request listener ready");

        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("request listener stopping");
                    return Ok(());
                }
                accepted = listener.accept() => accepted?,
            };

            tracing::debug!(%peer, "dispatch connection accepted");

            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                result = self.serve_connection(stream) => result?,
            }
        }
    }

    /// Handle one dispatched request. The connection closes when `stream`
    /// drops, reply sent or not.
    async fn serve_connection(&self, mut stream: TcpStream) -> Result<()> {
        let input = read_frame_expecting(&mut stream, FrameKind::Input).await?;
        let command = read_frame_expecting(&mut stream, FrameKind::Command).await?;

        let output = self
            .executor
            .execute(&input.payload_str(), &command.payload_str())
            .await?;

        write_frame(&mut stream, FrameKind::Output, output.as_bytes()).await?;
        tracing::debug!(output_bytes = output.len(), "reply sent");
        Ok(())
    }
}
