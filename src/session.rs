use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::protocol::{read_frame_expecting, write_frame, FrameKind};

const PROMPT: &[u8] = b"\n[shell]-> ";

/// How the interactive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The operator typed `exit` (or closed their input).
    Exited,
    /// The shared shutdown token fired while we were waiting.
    Cancelled,
}

/// Interactive role: forwards operator commands to the coordinator and
/// prints the aggregated output it sends back.
///
/// The loop is strictly one command in flight: send a Command frame, block
/// on the Output frame, print, re-prompt. The operator endpoints are generic
/// so tests can drive the loop over in-memory streams; the binary wires up
/// stdin and stdout.
pub struct SessionClient<S> {
    stream: S,
}

impl<S> SessionClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// `stream` is this role's own connection to the coordinator, never
    /// shared with the request listener.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub async fn run<I, O>(
        mut self,
        operator_in: I,
        mut operator_out: O,
        shutdown: CancellationToken,
    ) -> Result<SessionOutcome>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let mut lines = operator_in.lines();

        loop {
            operator_out.write_all(PROMPT).await?;
            operator_out.flush().await?;

            let line = tokio::select! {
                _ = shutdown.cancelled() => return Ok(SessionOutcome::Cancelled),
                line = lines.next_line() => line?,
            };

            let Some(line) = line else {
                tracing::info!("operator input closed, ending session");
                return Ok(SessionOutcome::Exited);
            };

            if line.is_empty() {
                continue;
            }

            if line == "exit" {
                operator_out.write_all(b"\nexiting shell\n").await?;
                operator_out.flush().await?;
                return Ok(SessionOutcome::Exited);
            }

            write_frame(&mut self.stream, FrameKind::Command, line.as_bytes()).await?;
            tracing::debug!(command = %line, "command sent, awaiting output");

            // Only an Output frame is a valid reply; anything else means the
            // coordinator and this agent disagree about the protocol.
            let reply = tokio::select! {
                _ = shutdown.cancelled() => return Ok(SessionOutcome::Cancelled),
                frame = read_frame_expecting(&mut self.stream, FrameKind::Output) => frame?,
            };

            operator_out.write_all(b"\n").await?;
            operator_out.write_all(&reply.payload).await?;
            operator_out.write_all(b"\n").await?;
            operator_out.flush().await?;
        }
    }
}
