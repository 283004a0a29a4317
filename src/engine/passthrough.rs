//! The non-optimizing reference backend.
//!
//! Reads each source and concatenates them verbatim, in request order.
//! It performs none of the rewriting an optimizing backend would — no
//! define substitution, no pruning, no renaming — but it exercises the
//! whole engine seam: unreadable sources become ERROR diagnostics naming
//! the file, and a requested source map is built over the rewritten
//! source references with empty mappings.

use super::{CompilationEngine, CompileOutput, ConfigurationError, SourceFile, SourceMapBuilder};
use crate::compile::options::CompilerOptions;
use crate::compile::reporter::{CheckLevel, DiagnosticReporter, EngineDiagnostic};

pub struct PassthroughEngine;

impl CompilationEngine for PassthroughEngine {
    type Configured = CompilerOptions;

    fn configure(&self, options: CompilerOptions) -> Result<Self::Configured, ConfigurationError> {
        Ok(options)
    }

    fn compile(
        &self,
        configured: &Self::Configured,
        _externs: &[SourceFile],
        sources: &[SourceFile],
        reporter: &mut DiagnosticReporter,
    ) -> CompileOutput {
        let mut code = String::new();
        let mut builder = configured.source_map.as_ref().map(|_| SourceMapBuilder::new());

        for source in sources {
            match source.read() {
                Ok(text) => {
                    code.push_str(&text);
                    if !text.ends_with('\n') {
                        code.push('\n');
                    }
                    if let (Some(builder), Some(config)) =
                        (builder.as_mut(), configured.source_map.as_ref())
                    {
                        builder.add_source(config.map_path(source.name()));
                    }
                }
                Err(err) => {
                    reporter.report(
                        CheckLevel::Error,
                        EngineDiagnostic::in_file(
                            format!("cannot read source: {err}"),
                            source.name(),
                        ),
                    );
                }
            }
        }

        CompileOutput { code, source_map: builder }
    }
}
