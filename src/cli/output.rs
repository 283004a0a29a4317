use crate::cli::args::OutputFormat;
use crate::daemon::protocol::{BuildResponse, Diagnostic, Severity};
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Formats a [`BuildResponse`] for the one-shot `check` command.
pub struct OutputFormatter {
    format: OutputFormat,
    colors: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        let colors = supports_color::on(supports_color::Stream::Stdout).is_some();
        Self { format, colors }
    }

    #[cfg(test)]
    fn plain(format: OutputFormat) -> Self {
        Self { format, colors: false }
    }

    pub fn format_response(&self, response: &BuildResponse) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(response),
            OutputFormat::Json => Self::format_json(response),
        }
    }

    fn format_human(&self, response: &BuildResponse) -> String {
        let mut output = String::new();
        for diagnostic in &response.diagnostics {
            let _ = writeln!(output, "{}", self.format_diagnostic(diagnostic));
        }

        let errors = response.diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
        let warnings = response.diagnostics.len() - errors;
        let _ = write!(output, "{errors} error(s), {warnings} warning(s)");

        if let Some(code) = &response.code {
            let _ = write!(output, "\ncompiled output: {} bytes", code.len());
        }
        if let Some(map) = &response.source_map {
            let _ = write!(output, "\nsource map: {} bytes", map.len());
        }
        output
    }

    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let tag = match diagnostic.severity {
            Severity::Error => {
                if self.colors {
                    "ERROR".red().bold().to_string()
                } else {
                    "ERROR".to_string()
                }
            }
            Severity::Warning => {
                if self.colors {
                    "WARNING".yellow().bold().to_string()
                } else {
                    "WARNING".to_string()
                }
            }
        };

        match &diagnostic.file {
            Some(file) => {
                let mut location = file.clone();
                if let Some(line) = diagnostic.line {
                    let _ = write!(location, ":{line}");
                    if let Some(column) = diagnostic.column {
                        let _ = write!(location, ":{column}");
                    }
                }
                format!("{location}: {tag}: {}", diagnostic.message)
            }
            None => format!("{tag}: {}", diagnostic.message),
        }
    }

    fn format_json(response: &BuildResponse) -> String {
        let value = serde_json::json!({
            "diagnostics": response.diagnostics,
            "code": response.code.as_ref().map(|c| String::from_utf8_lossy(c).into_owned()),
            "source_map": response.source_map.as_ref().map(|m| String::from_utf8_lossy(m).into_owned()),
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }
}
