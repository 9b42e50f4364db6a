use std::{fmt, path::Path};

use wordsets::ImportSummary;

#[derive(Debug, Copy, Clone)]
pub struct SummaryFormatter<'a> {
    summary: &'a ImportSummary,
    source: &'a Path,
    format: OutputFormat,
}

impl fmt::Display for SummaryFormatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let SummaryFormatter {
            summary,
            source,
            format,
        } = *self;
        match format {
            OutputFormat::Human => {
                if !summary.has_changes() {
                    write!(f, "No changes made from {}.", source.display())?;
                    if summary.skipped_count() > 0 {
                        write!(
                            f,
                            "\n - {} lines skipped",
                            summary.skipped_count(),
                        )?;
                    }
                    return Ok(());
                }
                if summary.written {
                    writeln!(
                        f,
                        "Successfully processed {}:",
                        source.display(),
                    )?;
                    writeln!(f, " - {} words added", summary.added)?;
                    // The formatter shouldn't leave a trailing newline
                    write!(f, " - {} words updated", summary.updated)?;
                } else {
                    writeln!(
                        f,
                        "Dry run of {}, nothing written:",
                        source.display(),
                    )?;
                    writeln!(f, " - {} words would be added", summary.added)?;
                    write!(
                        f,
                        " - {} words would be updated",
                        summary.updated,
                    )?;
                }
                if summary.skipped_count() > 0 {
                    write!(f, "\n - {} lines skipped", summary.skipped_count())?;
                }
            },
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone)]
pub enum OutputFormat {
    Human,
}

pub trait FormatSummary<'a> {
    fn format(
        &'a self,
        source: &'a Path,
        format: OutputFormat,
    ) -> SummaryFormatter<'a>;
}

impl<'a> FormatSummary<'a> for ImportSummary {
    fn format(
        &'a self,
        source: &'a Path,
        format: OutputFormat,
    ) -> SummaryFormatter<'a> {
        SummaryFormatter {
            summary: self,
            source,
            format,
        }
    }
}
