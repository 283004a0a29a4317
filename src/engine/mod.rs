//! The compilation-engine seam.
//!
//! The daemon treats the actual source-to-source compiler as a black box
//! behind [`CompilationEngine`]: a configuration is validated and frozen
//! once per request, then a single compile call consumes externs and
//! sources and reports diagnostics through the collector it is handed.
//! Everything the daemon knows about compilation goes through this
//! module; an optimizing backend plugs in without touching the protocol
//! loop.

pub mod passthrough;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::compile::options::CompilerOptions;
use crate::compile::reporter::DiagnosticReporter;

/// A named piece of JavaScript source handed to the engine.
///
/// Externs are typically inline (bundled with the binary), request
/// sources live on disk and are read when the engine asks for them.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    contents: Contents,
}

#[derive(Debug, Clone)]
enum Contents {
    Inline(String),
    OnDisk(PathBuf),
}

impl SourceFile {
    /// Source with inline contents.
    pub fn from_code(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self { name: name.into(), contents: Contents::Inline(code.into()) }
    }

    /// Source read from disk on demand; the path is also its name.
    pub fn from_path(path: PathBuf) -> Self {
        Self { name: path.display().to_string(), contents: Contents::OnDisk(path) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source text.
    pub fn read(&self) -> io::Result<String> {
        match &self.contents {
            Contents::Inline(code) => Ok(code.clone()),
            Contents::OnDisk(path) => std::fs::read_to_string(path),
        }
    }
}

/// The engine rejected a frozen configuration.
///
/// A per-request failure: the daemon reports it as a single ERROR
/// diagnostic and keeps serving.
#[derive(Debug, Error)]
#[error("unsupported configuration: {reason}")]
pub struct ConfigurationError {
    pub reason: String,
}

impl ConfigurationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// What one compile call produces.
///
/// Diagnostics travel separately, through the reporter; `code` is
/// meaningful only when the reporter recorded no errors.
pub struct CompileOutput {
    pub code: String,

    /// Present when the configuration requested a source map.
    pub source_map: Option<SourceMapBuilder>,
}

/// Accumulates the data for a version 3 source map.
#[derive(Debug, Clone, Default)]
pub struct SourceMapBuilder {
    /// Source references, already rewritten through the configured
    /// location mappings.
    pub sources: Vec<String>,

    /// Encoded mappings; empty when the backend tracks no positions.
    pub mappings: String,
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, path: impl Into<String>) {
        self.sources.push(path.into());
    }

    /// Render the map as JSON, named after `file`.
    pub fn render(&self, file: &str) -> String {
        serde_json::json!({
            "version": 3,
            "file": file,
            "sources": self.sources,
            "names": [],
            "mappings": self.mappings,
        })
        .to_string()
    }
}

/// Narrow interface to the compilation engine.
pub trait CompilationEngine {
    /// A validated, frozen configuration for one compile call.
    type Configured;

    /// Validate `options` and freeze them for a compile call.
    fn configure(&self, options: CompilerOptions) -> Result<Self::Configured, ConfigurationError>;

    /// Compile `sources` against `externs`, reporting every diagnostic
    /// event through `reporter`.
    fn compile(
        &self,
        configured: &Self::Configured,
        externs: &[SourceFile],
        sources: &[SourceFile],
        reporter: &mut DiagnosticReporter,
    ) -> CompileOutput;
}
