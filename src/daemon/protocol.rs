//! Wire types for daemon communication.
//!
//! Requests and responses travel as MessagePack maps with field names
//! (`rmp_serde::to_vec_named`), framed by [`super::codec`]. Named maps
//! keep the payload decodable by clients in other languages without any
//! Rust type metadata, and every field carries a serde default so a
//! client omitting a field gets proto-style empty-value semantics rather
//! than a decode failure.
//!
//! Binary blobs (compiled code, source maps) are MessagePack `bin`
//! values via `serde_bytes`.

use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use serde_repr::{Deserialize_repr, Serialize_repr};

/// A compilation request, one per protocol exchange.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BuildRequest {
    /// Absolute directory all relative file paths resolve against.
    #[serde(default)]
    pub base_directory: String,

    /// Relative source paths, in compilation order. Must be non-empty.
    #[serde(default)]
    pub files: Vec<String>,

    /// Compile-time constant substitutions.
    #[serde(default)]
    pub defines: Vec<Define>,

    /// Module identifiers used to prune unreachable code. Empty means no
    /// pruning beyond defaults.
    #[serde(default)]
    pub entry_points: Vec<String>,

    /// Output path for the source map. Empty means no source map.
    #[serde(default)]
    pub output_source_map: String,
}

impl BuildRequest {
    /// Encode as a MessagePack named map.
    pub fn encode(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(self)
    }

    /// Decode from a MessagePack payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

/// A named compile-time constant.
///
/// `value` is optional on the wire; a define that arrives without one is
/// a malformed request, rejected before the engine is invoked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Define {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<DefineValue>,
}

/// The typed literal a define substitutes.
///
/// Untagged: MessagePack is self-describing, so the variant is recovered
/// from the wire type of the value itself.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum DefineValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

/// A compilation response, mirroring one [`BuildRequest`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BuildResponse {
    /// Diagnostics in the order the engine reported them.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,

    /// Compiled output. Present only when compilation produced no
    /// error-severity diagnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ByteBuf>,

    /// Rendered source map. Present only when one was requested and
    /// compilation succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<ByteBuf>,
}

impl BuildResponse {
    /// Response carrying a single ERROR diagnostic and nothing else.
    ///
    /// The shape used for malformed requests: the engine never ran, so
    /// there is no code and no other diagnostic.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            diagnostics: vec![Diagnostic::error(message)],
            code: None,
            source_map: None,
        }
    }

    /// Whether any diagnostic has ERROR severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Encode as a MessagePack named map.
    pub fn encode(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(self)
    }

    /// Decode from a MessagePack payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

/// One reported problem, with an optional source location.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Human-readable description.
    pub message: String,

    /// Source path the problem was found in, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// 1-based line, meaningful only when `file` is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// 0-based column, meaningful only when `file` is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Diagnostic {
    /// An ERROR diagnostic with no source location.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }

    /// A WARNING diagnostic with no source location.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }
}

/// Severity of a [`Diagnostic`].
#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Severity {
    Error = 1,
    Warning = 2,
}
