use itertools::Itertools;
use owo_colors::OwoColorize;
use std::{fmt::Display, path::Path};
use txb_codec::PackReport;

/// Number of block lines shown under each error
const CONTEXT_LINES: usize = 4;

/// The blocks of one file that could not be packed
pub struct FileReport<'a> {
    path: &'a Path,
    report: &'a PackReport,
}

impl<'a> FileReport<'a> {
    pub fn new(path: &'a Path, report: &'a PackReport) -> Self {
        Self { path, report }
    }
}

impl Display for FileReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "❌ {} ({} blocks skipped)",
            self.path.display().bold(),
            self.report.len()
        )?;

        for error in self.report {
            writeln!(
                f,
                "  * {}: {}",
                format!("block {}, line {}", error.block, error.line).yellow(),
                error.kind.red()
            )?;

            let mut context = error
                .content
                .lines()
                .take(CONTEXT_LINES)
                .map(|l| format!("    {}", l.dimmed()))
                .join("\n");
            if error.content.lines().count() > CONTEXT_LINES {
                context.push_str("\n    ...");
            }
            writeln!(f, "{context}")?;
        }

        Ok(())
    }
}
