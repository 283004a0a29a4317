//! The compiler adapter: one request in, one response out.
//!
//! Sits between the daemon loop and the engine. It validates the
//! request, derives the engine configuration, runs the engine once with
//! a fresh diagnostic reporter, and assembles the response. It never
//! fails the daemon: every failure mode at this layer is folded into the
//! response and the loop keeps serving.

pub mod externs;
pub mod options;
pub mod reporter;

use std::path::Path;

use serde_bytes::ByteBuf;

use crate::daemon::protocol::{BuildRequest, BuildResponse};
use crate::engine::{CompilationEngine, SourceFile};
use options::CompilerOptions;
use reporter::DiagnosticReporter;

/// Compile one request.
///
/// Malformed requests (no files, invalid define, rejected configuration)
/// short-circuit into a response with a single ERROR diagnostic; the
/// engine is never invoked for them. Otherwise the engine runs once and
/// the response carries its diagnostics in report order, with `code`
/// (and a rendered source map, when requested) only if no diagnostic has
/// ERROR severity.
pub fn compile<E: CompilationEngine>(
    engine: &E,
    externs: &[SourceFile],
    request: &BuildRequest,
) -> BuildResponse {
    if request.files.is_empty() {
        return BuildResponse::from_error("No source files");
    }

    let root = Path::new(&request.base_directory);
    let sources: Vec<SourceFile> =
        request.files.iter().map(|file| SourceFile::from_path(root.join(file))).collect();

    let options = match CompilerOptions::for_request(request) {
        Ok(options) => options,
        Err(err) => return BuildResponse::from_error(err.to_string()),
    };
    let wants_source_map = options.source_map.is_some();

    let configured = match engine.configure(options) {
        Ok(configured) => configured,
        Err(err) => return BuildResponse::from_error(err.to_string()),
    };

    let mut reporter = DiagnosticReporter::new();
    let output = engine.compile(&configured, externs, &sources, &mut reporter);

    let mut response = BuildResponse::default();
    if !reporter.has_errors() {
        response.code = Some(ByteBuf::from(output.code.into_bytes()));
        if wants_source_map {
            if let Some(builder) = output.source_map {
                // The map is named after the first input file.
                let map_name = Path::new(&request.files[0]).file_name().map_or_else(
                    || request.files[0].clone(),
                    |name| name.to_string_lossy().into_owned(),
                );
                response.source_map =
                    Some(ByteBuf::from(builder.render(&map_name).into_bytes()));
            }
        }
    }
    response.diagnostics = reporter.into_diagnostics();
    response
}
