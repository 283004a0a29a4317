//! Engine configuration.
//!
//! A [`CompilerOptions`] value is built fresh for every request: the
//! fixed compiler policy (language level, optimization level, warning
//! verbosity) combined with the request's defines, entry points and
//! source-map settings. It is immutable once built and handed to the
//! engine's `configure` step.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::compile::reporter::CheckLevel;
use crate::daemon::protocol::{BuildRequest, Define, DefineValue};

/// Input language level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageMode {
    Ecmascript5,
    Ecmascript2015,
    Ecmascript2020,
}

/// Shape of the emitted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutputType {
    GlobalNamespace,
    EsModules,
}

/// How aggressively the engine may rewrite the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilationLevel {
    Whitespace,
    Simple,
    /// Whole-program optimization: may rename, inline or remove anything
    /// not reachable from an exported surface.
    Advanced,
}

/// Warning verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningLevel {
    Quiet,
    Default,
    Verbose,
}

/// Dead-code handling.
///
/// Carried as its own field rather than folded into the level presets;
/// backends apply it after the presets so the presets cannot override it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyOptions {
    /// No pruning beyond the engine's defaults.
    Default,
    /// Keep only code reachable from these entry points (absolute paths).
    PruneForEntryPoints(Vec<PathBuf>),
}

/// Source-map generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapConfig {
    /// Where the client intends to write the map.
    pub output_path: String,

    pub detail_level: SourceMapDetailLevel,

    /// Path rewrites applied to source references in the emitted map.
    pub location_mappings: Vec<LocationMapping>,
}

impl SourceMapConfig {
    /// Rewrite a source path through the first matching mapping.
    pub fn map_path(&self, path: &str) -> String {
        self.location_mappings
            .iter()
            .find_map(|m| m.apply(path))
            .unwrap_or_else(|| path.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMapDetailLevel {
    Symbols,
    All,
}

/// Replace a path prefix in source-map references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationMapping {
    pub prefix: String,
    pub replacement: String,
}

impl LocationMapping {
    /// `Some(rewritten)` when `path` starts with the prefix.
    pub fn apply(&self, path: &str) -> Option<String> {
        path.strip_prefix(&self.prefix).map(|rest| format!("{}{rest}", self.replacement))
    }
}

/// A define that cannot be installed as a compile-time constant.
///
/// This is a malformed request, not a protocol failure: the daemon keeps
/// serving after reporting it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidDefine {
    #[error("empty name for define")]
    EmptyName,

    #[error("empty value for define {name}")]
    MissingValue { name: String },
}

/// Check one define before it reaches the engine.
///
/// Returns the typed value so the caller cannot install a define it
/// never validated.
pub fn validate_define(define: &Define) -> Result<&DefineValue, InvalidDefine> {
    if define.name.is_empty() {
        return Err(InvalidDefine::EmptyName);
    }
    define
        .value
        .as_ref()
        .ok_or_else(|| InvalidDefine::MissingValue { name: define.name.clone() })
}

/// Everything the engine needs to know for one compile call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    pub language_in: LanguageMode,
    pub strict_mode_input: bool,
    pub chunk_output_type: ChunkOutputType,
    pub emit_use_strict: bool,

    pub compilation_level: CompilationLevel,
    pub use_types_for_optimization: bool,
    pub assume_function_wrapper: bool,

    pub warning_level: WarningLevel,
    pub report_unknown_types: CheckLevel,
    pub trusted_strings: bool,

    /// Compile-time constant substitutions, keyed by name.
    pub defines: BTreeMap<String, DefineValue>,

    pub dependencies: DependencyOptions,

    pub source_map: Option<SourceMapConfig>,
}

impl CompilerOptions {
    /// Build the configuration for one request.
    ///
    /// The fixed policy never varies; defines, entry points and the
    /// source-map request come from the client.
    pub fn for_request(request: &BuildRequest) -> Result<Self, InvalidDefine> {
        let root = Path::new(&request.base_directory);

        let mut defines = BTreeMap::new();
        for define in &request.defines {
            let value = validate_define(define)?;
            defines.insert(define.name.clone(), value.clone());
        }

        let dependencies = if request.entry_points.is_empty() {
            DependencyOptions::Default
        } else {
            DependencyOptions::PruneForEntryPoints(
                request.entry_points.iter().map(|entry| root.join(entry)).collect(),
            )
        };

        let source_map = if request.output_source_map.is_empty() {
            None
        } else {
            let mut prefix = request.base_directory.clone();
            if !prefix.ends_with('/') {
                prefix.push('/');
            }
            Some(SourceMapConfig {
                output_path: request.output_source_map.clone(),
                detail_level: SourceMapDetailLevel::All,
                location_mappings: vec![LocationMapping {
                    prefix,
                    replacement: "/".to_string(),
                }],
            })
        };

        Ok(Self {
            language_in: LanguageMode::Ecmascript2020,
            strict_mode_input: true,
            chunk_output_type: ChunkOutputType::GlobalNamespace,
            emit_use_strict: false,
            compilation_level: CompilationLevel::Advanced,
            use_types_for_optimization: true,
            assume_function_wrapper: true,
            warning_level: WarningLevel::Verbose,
            report_unknown_types: CheckLevel::Warning,
            trusted_strings: true,
            defines,
            dependencies,
            source_map,
        })
    }
}
