use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::analysis::{Decision, RunSummary};

/// JSON reporter for programmatic output
pub struct JsonSink {
    output_path: Option<PathBuf>,
}

impl JsonSink {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, decisions: &[Decision], summary: &RunSummary) -> Result<()> {
        let report = JsonReport::new(decisions, summary);
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{json}");
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    total_decisions: usize,
    decisions: Vec<JsonDecision<'a>>,
    summary: JsonSummary<'a>,
}

#[derive(Serialize)]
struct JsonDecision<'a> {
    code: &'static str,
    symbol: &'a str,
    line: u32,
    message: &'a str,
    reference_count: usize,
    #[serde(flatten)]
    kind: &'a crate::analysis::DecisionKind,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    decisions_emitted: usize,
    symbols_searched: usize,
    duration_ms: u128,
    problems: Vec<String>,
    aborted: Option<&'a str>,
}

impl<'a> JsonReport<'a> {
    fn new(decisions: &'a [Decision], summary: &'a RunSummary) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            total_decisions: decisions.len(),
            decisions: decisions
                .iter()
                .map(|decision| JsonDecision {
                    code: decision.kind.code(),
                    symbol: decision.symbol_id.as_str(),
                    line: decision.line,
                    message: &decision.message,
                    reference_count: decision.reference_count,
                    kind: &decision.kind,
                })
                .collect(),
            summary: JsonSummary {
                decisions_emitted: summary.decisions_emitted,
                symbols_searched: summary.symbols_searched,
                duration_ms: summary.duration.as_millis(),
                problems: summary.problems.iter().map(|p| p.to_string()).collect(),
                aborted: summary.aborted.map(|reason| reason.as_str()),
            },
        }
    }
}
