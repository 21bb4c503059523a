use colored::Colorize;
use std::collections::BTreeMap;

use crate::analysis::{Decision, DecisionKind, RunSummary};

/// Terminal reporter with colored output, grouped by symbol
pub struct TerminalSink;

impl TerminalSink {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, decisions: &[Decision], summary: &RunSummary) {
        if decisions.is_empty() {
            println!("{}", "No findings.".green().bold());
        } else {
            println!();
            println!(
                "{}",
                format!("Found {} opportunities:", decisions.len())
                    .yellow()
                    .bold()
            );
            println!();

            // Group by symbol, keeping a stable order
            let mut by_symbol: BTreeMap<String, Vec<&Decision>> = BTreeMap::new();
            for decision in decisions {
                by_symbol
                    .entry(decision.symbol_id.to_string())
                    .or_default()
                    .push(decision);
            }

            for (symbol, items) in &by_symbol {
                println!("{}", symbol.cyan().bold());
                for item in items {
                    self.print_item(item);
                }
                println!();
            }
        }

        self.print_summary(summary);
    }

    fn print_item(&self, decision: &Decision) {
        let label = match decision.kind {
            DecisionKind::Unused => "unused".red().bold(),
            DecisionKind::RarelyUsed => "rarely used".yellow().bold(),
            DecisionKind::NeverRead => "never read".yellow().bold(),
            DecisionKind::CanBeFinal => "final".blue().bold(),
            DecisionKind::ReduceVisibility { .. } => "visibility".blue().bold(),
        };
        println!(
            "  {} {} [{}] {}",
            format!("line {}", decision.line).dimmed(),
            label,
            decision.kind.code().dimmed(),
            decision.message
        );
    }

    fn print_summary(&self, summary: &RunSummary) {
        println!("{}", "─".repeat(60).dimmed());
        println!(
            "Summary: {} decisions from {} symbols in {:.1?}",
            summary.decisions_emitted, summary.symbols_searched, summary.duration
        );
        if !summary.problems.is_empty() {
            println!(
                "{}",
                format!(
                    "⚠ {} errors happened during detection",
                    summary.problems.len()
                )
                .yellow()
            );
        }
        if let Some(reason) = summary.aborted {
            println!("{}", format!("✗ Run aborted: {reason}").red().bold());
        }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}
