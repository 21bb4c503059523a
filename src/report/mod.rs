// Sink implementations - some accessors only used through the library surface
#![allow(dead_code)]

mod json;
mod terminal;

pub use json::JsonSink;
pub use terminal::TerminalSink;

use miette::Result;
use std::path::PathBuf;

use crate::analysis::{Decision, RunSummary};

/// Receives decisions as the engine finds them, and the summary once at the
/// end of the run.
pub trait ResultSink {
    fn accept(&mut self, decision: Decision);

    fn finish(&mut self, summary: &RunSummary);
}

/// Buffers everything in memory; the library-consumer and test sink.
#[derive(Debug, Default)]
pub struct CollectingSink {
    decisions: Vec<Decision>,
    summary: Option<RunSummary>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn into_parts(self) -> (Vec<Decision>, Option<RunSummary>) {
        (self.decisions, self.summary)
    }
}

impl ResultSink for CollectingSink {
    fn accept(&mut self, decision: Decision) {
        self.decisions.push(decision);
    }

    fn finish(&mut self, summary: &RunSummary) {
        self.summary = Some(summary.clone());
    }
}

/// Output format for reports
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// Writes a collected result set in the chosen format.
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
        }
    }

    pub fn report(&self, decisions: &[Decision], summary: &RunSummary) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                let reporter = TerminalSink::new();
                reporter.report(decisions, summary);
                Ok(())
            }
            ReportFormat::Json => {
                let reporter = JsonSink::new(self.output_path.clone());
                reporter.report(decisions, summary)
            }
        }
    }
}
