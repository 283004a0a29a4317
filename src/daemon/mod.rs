//! The protocol-serving core of the daemon.
//!
//! Keeping the compiler resident avoids paying its startup cost on every
//! build; this module is the contract that makes that possible: framed
//! messages over the daemon's stdio ([`codec`]), the request/response
//! payload types ([`protocol`]), and the serving loop with its fatal /
//! per-request error split ([`server`]).

pub mod codec;
pub mod protocol;
pub mod server;

// Re-export main types for convenience
pub use codec::{CodecError, FrameCodec, DEFAULT_MAX_FRAME_SIZE};
pub use protocol::{BuildRequest, BuildResponse, Define, DefineValue, Diagnostic, Severity};
pub use server::Daemon;
