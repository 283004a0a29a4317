//! The daemon's request/response loop.
//!
//! Steady state is a strict alternation: read one frame, decode it,
//! compile, write one frame. The loop is also the single place failures
//! get classified. Per-request problems (malformed request, compile
//! diagnostics) are already folded into the response by the compiler
//! adapter and never surface here. Everything this module returns as an
//! error — desync, oversized frame, undecodable payload, write failure —
//! poisons the channel itself: there is no way to find the next frame
//! boundary, so the caller must terminate the process.
//!
//! The loop never terminates the process on its own; `main` owns that.

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::compile;
use crate::daemon::codec::FrameCodec;
use crate::daemon::protocol::BuildRequest;
use crate::engine::{CompilationEngine, SourceFile};

/// The daemon: an engine, the startup-loaded externs, and the codec with
/// its reusable buffer.
pub struct Daemon<E> {
    engine: E,
    externs: Vec<SourceFile>,
    codec: FrameCodec,
}

impl<E: CompilationEngine> Daemon<E> {
    /// Daemon with the default frame-size guard.
    pub fn new(engine: E, externs: Vec<SourceFile>) -> Self {
        Self::with_codec(engine, externs, FrameCodec::new())
    }

    /// Daemon over a custom-configured codec.
    pub fn with_codec(engine: E, externs: Vec<SourceFile>, codec: FrameCodec) -> Self {
        Self { engine, externs, codec }
    }

    /// Serve requests until the peer closes the stream.
    ///
    /// `Ok(())` is the one clean exit: end of stream with no bytes
    /// pending while awaiting a request. Every `Err` means the channel
    /// cannot be trusted any more and the process should exit non-zero.
    pub async fn run<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            let request = match self.codec.read_frame(&mut reader).await {
                Ok(Some(payload)) => BuildRequest::decode(payload)
                    .context("undecodable request payload; stream is desynchronized")?,
                Ok(None) => {
                    tracing::info!("input stream closed, shutting down");
                    return Ok(());
                }
                Err(err) => return Err(err).context("failed to read request frame"),
            };

            tracing::debug!(files = request.files.len(), "request received");
            let response = compile::compile(&self.engine, &self.externs, &request);
            tracing::debug!(
                diagnostics = response.diagnostics.len(),
                compiled = response.code.is_some(),
                "request finished"
            );

            let payload = response.encode().context("failed to encode response")?;
            self.codec
                .write_frame(&mut writer, &payload)
                .await
                .context("failed to write response frame")?;
        }
    }
}
