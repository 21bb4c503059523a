use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{
    AbortReason, Decision, DecisionKind, FinalityAnalyzer, ReachabilityAnalyzer, RunSummary,
    VisibilityAnalyzer,
};
use crate::catalog::{Symbol, SymbolCatalog, SymbolId, SymbolKind, TypeRecord, Visibility};
use crate::config::Config;
use crate::report::ResultSink;
use crate::search::{
    filter, CancelFlag, HierarchyProvider, LiteralSearchProvider, Reference,
    ReferenceSearchProvider, SearchFailure, SearchKind, SearchOutcome,
};

/// The external capabilities a run draws on.
#[derive(Clone, Copy)]
pub struct Providers<'a> {
    pub searcher: &'a dyn ReferenceSearchProvider,
    pub literal: &'a dyn LiteralSearchProvider,
    pub hierarchy: &'a dyn HierarchyProvider,
}

/// Drives the per-symbol analysis pipeline over the catalog, one symbol at a
/// time (the backing search mechanism is not reentrant), streaming decisions
/// to the sink as they are found.
pub struct AnalysisOrchestrator<'a> {
    catalog: &'a SymbolCatalog,
    providers: Providers<'a>,
    config: &'a Config,
    cancel: CancelFlag,
    reachability: ReachabilityAnalyzer,
    finality: FinalityAnalyzer,
    visibility: VisibilityAnalyzer,
}

/// Mutable bookkeeping of one run, touched only by the orchestrator's single
/// control thread.
struct RunState {
    /// Types proven to have zero accepted references; members of these types
    /// skip their reference-based analyses
    no_reference_types: HashSet<SymbolId>,

    /// Decision identities already streamed to the sink
    emitted: HashSet<(SymbolId, &'static str)>,

    decisions_emitted: usize,
    symbols_searched: usize,
    problems: Vec<SearchFailure>,
    started: Instant,
}

impl RunState {
    fn new() -> Self {
        Self {
            no_reference_types: HashSet::new(),
            emitted: HashSet::new(),
            decisions_emitted: 0,
            symbols_searched: 0,
            problems: Vec::new(),
            started: Instant::now(),
        }
    }
}

/// Everything that can end a per-symbol pipeline early.
enum Interrupt {
    /// Recoverable: recorded, the loop continues with the next symbol
    Failure(SearchFailure),
    /// Fatal: propagates out of the run loop immediately
    Abort(AbortReason),
}

impl From<SearchFailure> for Interrupt {
    fn from(failure: SearchFailure) -> Self {
        Interrupt::Failure(failure)
    }
}

/// One reference search pass over a symbol: the aggregate outcome, the
/// accepted references, and the broadest access level they demand so far.
struct ReferencePass {
    outcome: SearchOutcome,
    references: Vec<Reference>,
    required: Visibility,
}

impl ReferencePass {
    fn empty() -> Self {
        Self {
            outcome: SearchOutcome::default(),
            references: Vec::new(),
            required: Visibility::Private,
        }
    }
}

impl<'a> AnalysisOrchestrator<'a> {
    pub fn new(catalog: &'a SymbolCatalog, providers: Providers<'a>, config: &'a Config) -> Self {
        Self {
            catalog,
            providers,
            config,
            cancel: CancelFlag::new(),
            reachability: ReachabilityAnalyzer::new(),
            finality: FinalityAnalyzer::new(),
            visibility: VisibilityAnalyzer::new(),
        }
    }

    /// Attach an externally shared cancellation flag.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the full analysis. Decisions stream to `sink` as they are found;
    /// the summary is both pushed to the sink and returned.
    pub fn run(&self, sink: &mut dyn ResultSink) -> RunSummary {
        let mut state = RunState::new();
        info!(
            "analysis start: {} types, {} symbols",
            self.catalog.type_count(),
            self.catalog.symbol_count()
        );

        let aborted = self.run_loop(&mut state, sink).err();

        let summary = RunSummary {
            decisions_emitted: state.decisions_emitted,
            symbols_searched: state.symbols_searched,
            duration: state.started.elapsed(),
            problems: state.problems,
            aborted,
        };
        if !summary.problems.is_empty() {
            warn!(
                "{} errors happened during detection",
                summary.problems.len()
            );
        }
        match summary.aborted {
            Some(reason) => info!("analysis aborted: {reason}"),
            None => info!(
                "analysis end: {} decisions from {} symbols in {:.1?}",
                summary.decisions_emitted, summary.symbols_searched, summary.duration
            ),
        }
        sink.finish(&summary);
        summary
    }

    fn run_loop(&self, state: &mut RunState, sink: &mut dyn ResultSink) -> Result<(), AbortReason> {
        let total = self.catalog.type_count();
        for (index, record) in self.catalog.records().iter().enumerate() {
            self.log_progress(index + 1, total, state, record);
            if let Some(ty) = &record.declaration {
                self.process_symbol(ty, state, sink)?;
            }
            for method in &record.methods {
                self.process_symbol(method, state, sink)?;
            }
            for field in &record.fields {
                self.process_symbol(field, state, sink)?;
            }
        }
        Ok(())
    }

    /// Dispatch one symbol and absorb its failures: a recoverable problem is
    /// recorded and the run continues; the run only dies on cancellation,
    /// resource exhaustion, or crossing the failure threshold.
    fn process_symbol(
        &self,
        symbol: &Symbol,
        state: &mut RunState,
        sink: &mut dyn ResultSink,
    ) -> Result<(), AbortReason> {
        if self.cancel.is_cancelled() {
            return Err(AbortReason::Cancelled);
        }
        state.symbols_searched += 1;

        let result = match symbol.kind {
            SymbolKind::Type => self.process_type(symbol, state, sink),
            SymbolKind::Method => self.process_method(symbol, state, sink),
            SymbolKind::Field => self.process_field(symbol, state, sink),
        };
        match result {
            Ok(()) => Ok(()),
            Err(Interrupt::Abort(reason)) => Err(reason),
            Err(Interrupt::Failure(failure)) if failure.is_fatal() => {
                warn!("{failure}");
                Err(AbortReason::ResourceExhausted)
            }
            Err(Interrupt::Failure(failure)) => {
                warn!("{failure}");
                state.problems.push(failure);
                if state.problems.len() > self.config.failure_abort_threshold {
                    return Err(AbortReason::TooManyFailures);
                }
                Ok(())
            }
        }
    }

    fn process_type(
        &self,
        symbol: &Symbol,
        state: &mut RunState,
        sink: &mut dyn ResultSink,
    ) -> Result<(), Interrupt> {
        let mut pass = self.collect_references(symbol)?;

        // Literal fallback is pointless once references exist and nothing
        // narrower than public could be suggested anyway.
        let skip_literal = pass.outcome.count > 0 && pass.required == Visibility::Public;
        if self.config.literal.enabled && !skip_literal {
            self.run_literal_search(symbol, &mut pass)?;
        }

        if pass.outcome.count == 0 {
            debug!("no references: {}", symbol.display());
            state.no_reference_types.insert(symbol.id.clone());
        }

        if let Some(decision) =
            self.reachability
                .classify(symbol, &pass.outcome, false, self.config)
        {
            self.emit(decision, state, sink);
        }
        if pass.outcome.count > 0 {
            if let Some(decision) = self.visibility.suggest(
                symbol,
                &pass.references,
                pass.required,
                self.providers.hierarchy,
                self.config,
            ) {
                self.emit(decision, state, sink);
            }
        }
        Ok(())
    }

    fn process_method(
        &self,
        symbol: &Symbol,
        state: &mut RunState,
        sink: &mut dyn ResultSink,
    ) -> Result<(), Interrupt> {
        let declaring = symbol
            .declaring_type
            .as_ref()
            .and_then(|id| self.catalog.get(id));
        if declaring.is_some_and(|ty| ty.is_anonymous) {
            return Ok(());
        }
        if symbol.is_object_boilerplate() || symbol.modifiers.is_serialization_member {
            return Ok(());
        }
        if symbol
            .declaring_type
            .as_ref()
            .is_some_and(|id| state.no_reference_types.contains(id))
        {
            return Ok(());
        }

        // Expensive; resolved once and reused by all three analyses.
        let is_override = self.providers.hierarchy.is_overridden(symbol)?;

        if !is_override && self.finality.method_can_be_final(symbol, declaring, self.config) {
            self.emit(Decision::new(symbol, DecisionKind::CanBeFinal, 0), state, sink);
        }

        let pass = self.collect_references(symbol)?;
        if let Some(decision) =
            self.reachability
                .classify(symbol, &pass.outcome, is_override, self.config)
        {
            self.emit(decision, state, sink);
        }
        // Narrowing an overriding method would break the override contract.
        if !is_override && pass.outcome.count > 0 {
            if let Some(decision) = self.visibility.suggest(
                symbol,
                &pass.references,
                pass.required,
                self.providers.hierarchy,
                self.config,
            ) {
                self.emit(decision, state, sink);
            }
        }
        Ok(())
    }

    fn process_field(
        &self,
        symbol: &Symbol,
        state: &mut RunState,
        sink: &mut dyn ResultSink,
    ) -> Result<(), Interrupt> {
        if symbol.modifiers.is_serialization_member {
            return Ok(());
        }

        // Final candidacy is evaluated even for fields of unreferenced types.
        if self
            .finality
            .field_can_be_final(symbol, self.providers.searcher, self.config)?
        {
            self.emit(Decision::new(symbol, DecisionKind::CanBeFinal, 0), state, sink);
        }

        if symbol.visibility == Visibility::Private {
            return Ok(());
        }
        let declaring = symbol
            .declaring_type
            .as_ref()
            .and_then(|id| self.catalog.get(id));
        if declaring.is_some_and(|ty| ty.is_anonymous) {
            return Ok(());
        }
        if symbol
            .declaring_type
            .as_ref()
            .is_some_and(|id| state.no_reference_types.contains(id))
        {
            return Ok(());
        }

        let pass = self.collect_references(symbol)?;
        if let Some(decision) =
            self.reachability
                .classify(symbol, &pass.outcome, false, self.config)
        {
            self.emit(decision, state, sink);
        }
        if pass.outcome.count > 0 {
            if let Some(decision) = self.visibility.suggest(
                symbol,
                &pass.references,
                pass.required,
                self.providers.hierarchy,
                self.config,
            ) {
                self.emit(decision, state, sink);
            }
            if !self.has_read_access(symbol)? {
                self.emit(
                    Decision::new(symbol, DecisionKind::NeverRead, pass.outcome.count),
                    state,
                    sink,
                );
            }
        }
        Ok(())
    }

    /// Fold one reference search into a pass, applying the acceptance filter
    /// and stopping enumeration once nothing further can change the verdict.
    fn collect_references(&self, symbol: &Symbol) -> Result<ReferencePass, Interrupt> {
        let stream = self.providers.searcher.search(symbol, SearchKind::References)?;
        let mut pass = ReferencePass::empty();
        for raw in stream {
            if self.cancel.is_cancelled() {
                return Err(Interrupt::Abort(AbortReason::Cancelled));
            }
            if !filter::accept(symbol, &raw) {
                continue;
            }
            pass.outcome.count += 1;
            if self.config.detect_test_only && raw.is_test_code {
                pass.outcome.test_only_count += 1;
            }
            pass.required = pass.required.max(self.visibility.required_for(
                symbol,
                &raw,
                self.providers.hierarchy,
            ));
            pass.references.push(raw);
            if self.should_stop_enumeration(symbol, &pass) {
                pass.outcome.cancelled_early = true;
                break;
            }
        }
        Ok(pass)
    }

    /// Past the warn limit, more matches only matter while a narrower
    /// visibility verdict is still possible. While test-only detection is on
    /// and every match so far is test code, counting must continue.
    fn should_stop_enumeration(&self, symbol: &Symbol, pass: &ReferencePass) -> bool {
        if self.config.detect_test_only && pass.outcome.count == pass.outcome.test_only_count {
            return false;
        }
        if pass.outcome.count <= self.config.warn_limit {
            return false;
        }
        pass.required == Visibility::Public
            || !self.config.visibility.any_enabled_for(symbol.kind)
    }

    /// Fold accepted literal matches into the same pass. A match inside a
    /// known same-package container demands `default`; any other accepted
    /// match demands `public`.
    fn run_literal_search(
        &self,
        symbol: &Symbol,
        pass: &mut ReferencePass,
    ) -> Result<(), Interrupt> {
        let token = if self.config.literal.fully_qualified {
            symbol.qualified_name()
        } else {
            symbol.name.clone()
        };
        if token.is_empty() {
            return Ok(());
        }
        let stream = self
            .providers
            .literal
            .search_literal(&token, &self.config.literal.file_patterns)?;
        let mut accepted = 0usize;
        for candidate in stream {
            if self.cancel.is_cancelled() {
                return Err(Interrupt::Abort(AbortReason::Cancelled));
            }
            if !candidate.is_word_match() {
                continue;
            }
            accepted += 1;
            pass.outcome.count += 1;
            let required = candidate
                .enclosing_container
                .as_ref()
                .and_then(|id| self.catalog.get(id))
                .map(|container| {
                    if container.package == symbol.package {
                        Visibility::Default
                    } else {
                        Visibility::Public
                    }
                })
                .unwrap_or(Visibility::Public);
            pass.required = pass.required.max(required);
            if self.should_stop_enumeration(symbol, pass) {
                pass.outcome.cancelled_early = true;
                break;
            }
        }
        if accepted > 0 {
            debug!("literal matches for '{}': {}", token, accepted);
        }
        Ok(())
    }

    /// The first resolved read settles the question; enumeration stops there.
    fn has_read_access(&self, field: &Symbol) -> Result<bool, Interrupt> {
        let stream = self
            .providers
            .searcher
            .search(field, SearchKind::ReadAccesses)?;
        for reference in stream {
            if reference.enclosing.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn emit(&self, decision: Decision, state: &mut RunState, sink: &mut dyn ResultSink) {
        if !state.emitted.insert(decision.identity()) {
            return;
        }
        state.decisions_emitted += 1;
        sink.accept(decision);
    }

    fn log_progress(&self, pos: usize, total: usize, state: &RunState, record: &TypeRecord) {
        let name = record
            .declaration
            .as_ref()
            .map(Symbol::qualified_name)
            .or_else(|| {
                record
                    .methods
                    .first()
                    .or_else(|| record.fields.first())
                    .and_then(|member| member.declaring_type.as_ref())
                    .map(SymbolId::to_string)
            })
            .unwrap_or_else(|| "<unknown>".to_string());
        let message = format!(
            "search {pos:>4} of {total:>4} types, decisions {:>4}, problems {:>2}, type {name}",
            state.decisions_emitted,
            state.problems.len()
        );
        if pos == 1 || pos % 10 == 0 || pos == total {
            info!("{message}");
        } else {
            debug!("{message}");
        }
    }
}
