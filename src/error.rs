//! Error taxonomy (§7): configuration errors fail `Session::start` outright;
//! back-end unavailability is recoverable and never surfaces as a
//! `RenderError`; it triggers a silent CPU fallback instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("out of memory while building render session: {0}")]
    OutOfMemory(String),
}

/// Recoverable GPU back-end failure. Logged at `warn!` and swallowed by
/// [`crate::session::Session::start`], which falls back to the CPU back end.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("device request failed: {0}")]
    DeviceRequestFailed(String),
    #[error("shader compilation failed: {0}")]
    ShaderCompileFailed(String),
}
