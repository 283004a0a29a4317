//! Builtin environment declarations ("externs").
//!
//! Loaded once at daemon startup and shared read-only by every compile
//! call. A failure here is fatal to startup: the engine cannot type-check
//! anything without its ambient declarations.

use std::io;
use std::path::Path;

use crate::engine::SourceFile;

/// Runtime environment whose ambient API surface is assumed present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Browser,
}

/// Compact browser externs bundled with the binary.
const BROWSER_EXTERNS: &str = include_str!("../../assets/externs/browser.js");

/// Load the builtin declarations for `environment`.
///
/// Extra `.js` extern files from `extra_dir` are appended in name order;
/// other files in the directory are ignored.
pub fn load_builtins(
    environment: Environment,
    extra_dir: Option<&Path>,
) -> io::Result<Vec<SourceFile>> {
    let mut externs = Vec::new();

    match environment {
        Environment::Browser => {
            externs.push(SourceFile::from_code("browser.js", BROWSER_EXTERNS));
        }
    }

    if let Some(dir) = extra_dir {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .collect::<io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "js"))
            .collect();
        paths.sort();
        for path in paths {
            let code = std::fs::read_to_string(&path)?;
            externs.push(SourceFile::from_code(path.display().to_string(), code));
        }
    }

    // Module-style sources reference the goog global before any loader
    // runs; declare it so the engine does not flag it.
    externs.push(SourceFile::from_code("ccl.js", "var goog;\n"));

    Ok(externs)
}
