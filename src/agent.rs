use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::listener::RequestListener;
use crate::session::{SessionClient, SessionOutcome};

/// Owns both roles of the agent and the only synchronization point between
/// them: a shared [`CancellationToken`].
///
/// The session client and the request listener each hold their own socket
/// and never exchange data. When either finishes, whether by operator
/// `exit` or by a fatal error, the token is cancelled so the other role
/// stops at its next await point and the whole process terminates.
pub struct Agent {
    config: AgentConfig,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }

    /// Run both roles with the terminal as the operator endpoint.
    ///
    /// Returns `Ok(())` only on a deliberate operator exit (or an external
    /// cancellation of `shutdown`, e.g. a terminal signal). Every other
    /// termination is the fatal error that caused it.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let operator_in = BufReader::new(tokio::io::stdin());
        let operator_out = tokio::io::stdout();
        self.run_with_operator(operator_in, operator_out, shutdown)
            .await
    }

    /// Same as [`Agent::run`] but with caller-supplied operator streams.
    pub async fn run_with_operator<I, O>(
        self,
        operator_in: I,
        operator_out: O,
        shutdown: CancellationToken,
    ) -> Result<()>
    where
        I: AsyncBufRead + Unpin + Send + 'static,
        O: AsyncWrite + Unpin + Send + 'static,
    {
        let session_stream = TcpStream::connect(self.config.coordinator_addr).await?;
        tracing::info!(coordinator = %self.config.coordinator_addr, "connected to coordinator");

        let listener = RequestListener::new(self.config.listen_addr);
        let listener_token = shutdown.clone();
        let mut listener_handle: JoinHandle<Result<()>> =
            tokio::spawn(async move { listener.run(listener_token).await });

        let session = SessionClient::new(session_stream);
        let session_token = shutdown.clone();
        let mut session_handle: JoinHandle<Result<SessionOutcome>> = tokio::spawn(async move {
            session.run(operator_in, operator_out, session_token).await
        });

        // Whichever role finishes first decides the fate of the other.
        tokio::select! {
            result = &mut session_handle => {
                shutdown.cancel();
                let listener_result = (&mut listener_handle).await;

                match flatten(result)? {
                    SessionOutcome::Exited => {
                        tracing::info!("operator exit, shutting down");
                    }
                    SessionOutcome::Cancelled => {
                        tracing::info!("session cancelled, shutting down");
                    }
                }
                // The listener saw the token; a failure it hit in the same
                // instant still makes the run fatal.
                flatten(listener_result)?;
                Ok(())
            }
            result = &mut listener_handle => {
                shutdown.cancel();
                let session_result = (&mut session_handle).await;

                flatten(result)?;
                // Listener returning Ok before the session means the token
                // was cancelled externally; the session unwinds gracefully.
                flatten(session_result)?;
                Ok(())
            }
        }
    }
}

fn flatten<T>(joined: std::result::Result<Result<T>, tokio::task::JoinError>) -> Result<T> {
    match joined {
        Ok(result) => result,
        Err(e) => Err(AgentError::Io(std::io::Error::other(e))),
    }
}
