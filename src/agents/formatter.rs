use crate::agents::module_lister::ModuleListing;
use crate::error::{ReportError, Result};
use crate::modules::DependencyRecord;
use std::fs::File;
use std::process::{Command, Stdio};

/// Which slice of the dependency graph a fragment covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Direct dependencies with a newer version available.
    OutdatedDirect,
    /// Every dependency, unfiltered.
    All,
}

impl FormatMode {
    pub fn describe(self) -> &'static str {
        match self {
            FormatMode::OutdatedDirect => "outdated dependencies",
            FormatMode::All => "all dependencies",
        }
    }
}

/// Turns a module listing into a markdown fragment.
pub trait ReportFormatter {
    fn format(&self, listing: &ModuleListing, mode: FormatMode) -> Result<String>;
}

const HEADERS: [&str; 5] = [
    "MODULE",
    "VERSION",
    "NEW VERSION",
    "DIRECT",
    "VALID TIMESTAMPS",
];

/// Built-in markdown table renderer following go-mod-outdated's columns
#[derive(Debug, Default)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    fn selected<'a>(
        records: &'a [DependencyRecord],
        mode: FormatMode,
    ) -> impl Iterator<Item = &'a DependencyRecord> {
        records.iter().filter(move |record| match mode {
            FormatMode::OutdatedDirect => record.direct && record.is_outdated(),
            FormatMode::All => true,
        })
    }

    fn row(record: &DependencyRecord) -> [String; 5] {
        [
            record.path.clone(),
            record.version.clone(),
            record.available.clone().unwrap_or_default(),
            record.direct.to_string(),
            record.valid_timestamps.to_string(),
        ]
    }

    pub fn render_table(records: &[DependencyRecord], mode: FormatMode) -> String {
        let rows: Vec<[String; 5]> = Self::selected(records, mode).map(Self::row).collect();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.len());
            }
        }

        let line = |cells: &[&str]| -> String {
            let padded: Vec<String> = cells
                .iter()
                .zip(widths.iter())
                .map(|(cell, &width)| format!(" {cell:<width$} "))
                .collect();
            format!("|{}|", padded.join("|"))
        };

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(line(&HEADERS));
        let separator: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        lines.push(format!("|{}|", separator.join("|")));
        for row in &rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            lines.push(line(&cells));
        }

        lines.join("\n")
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, listing: &ModuleListing, mode: FormatMode) -> Result<String> {
        Ok(Self::render_table(listing.records(), mode))
    }
}

/// Pipes the listing file through an external go-mod-outdated compatible tool
pub struct ExternalFormatter {
    program: String,
}

impl ExternalFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(mode: FormatMode) -> &'static [&'static str] {
        match mode {
            FormatMode::OutdatedDirect => &["--direct", "--update", "--style=markdown"],
            FormatMode::All => &["--style=markdown"],
        }
    }
}

impl ReportFormatter for ExternalFormatter {
    fn format(&self, listing: &ModuleListing, mode: FormatMode) -> Result<String> {
        let args = Self::args(mode);
        tracing::debug!(
            "Executing: {} {} < {}",
            self.program,
            args.join(" "),
            listing.path().display()
        );

        let input = File::open(listing.path()).map_err(|e| {
            ReportError::Format(format!("retrieving {}: {e}", mode.describe()))
        })?;

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::from(input))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                ReportError::Format(format!(
                    "retrieving {}: failed to execute '{}': {e}",
                    mode.describe(),
                    self.program
                ))
            })?;

        if !output.status.success() {
            return Err(ReportError::Format(format!(
                "retrieving {}: '{}' exited with code {}: {}",
                mode.describe(),
                self.program,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end_matches(['\n', '\r'])
            .to_string())
    }
}
