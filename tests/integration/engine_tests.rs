//! End-to-end engine tests over snapshot-backed providers.

use std::collections::HashMap;

use refaudit::analysis::{AnalysisOrchestrator, Decision, DecisionKind, Providers, RunSummary};
use refaudit::catalog::{Location, Symbol, SymbolId, SymbolKind, Visibility};
use refaudit::config::Config;
use refaudit::index::{FileLiteralSearch, ReferenceIndex, Snapshot};
use refaudit::report::CollectingSink;
use refaudit::search::{EnclosingElement, EnclosingKind, Reference, ReferenceKind};

fn type_symbol(id: &str, package: &str) -> Symbol {
    let mut symbol = Symbol::new(
        SymbolId::new(id),
        id.rsplit('.').next().unwrap_or(id),
        SymbolKind::Type,
        Location::new("src/T.java", 1),
    );
    symbol.package = package.to_string();
    symbol
}

fn method_symbol(type_id: &str, package: &str, name: &str) -> Symbol {
    let mut symbol = Symbol::new(
        SymbolId::new(format!("{type_id}#{name}()")),
        name,
        SymbolKind::Method,
        Location::new("src/T.java", 10),
    );
    symbol.package = package.to_string();
    symbol.declaring_type = Some(SymbolId::new(type_id));
    symbol
}

fn field_symbol(type_id: &str, package: &str, name: &str) -> Symbol {
    let mut symbol = Symbol::new(
        SymbolId::new(format!("{type_id}#{name}")),
        name,
        SymbolKind::Field,
        Location::new("src/T.java", 5),
    );
    symbol.package = package.to_string();
    symbol.declaring_type = Some(SymbolId::new(type_id));
    symbol
}

fn reference(target: &str, from_type: &str, from_package: &str, kind: ReferenceKind) -> Reference {
    Reference::new(
        SymbolId::new(target),
        Location::new("src/From.java", 20),
        kind,
    )
    .with_enclosing(EnclosingElement {
        id: SymbolId::new(format!("{from_type}#site()")),
        kind: EnclosingKind::Method,
        declaring_type: Some(SymbolId::new(from_type)),
        package: from_package.to_string(),
    })
}

fn write_from_declaration(field_id: &str, type_id: &str, package: &str) -> Reference {
    Reference::new(
        SymbolId::new(field_id),
        Location::new("src/T.java", 5),
        ReferenceKind::Write,
    )
    .with_enclosing(EnclosingElement {
        id: SymbolId::new(field_id),
        kind: EnclosingKind::Field,
        declaring_type: Some(SymbolId::new(type_id)),
        package: package.to_string(),
    })
}

fn run(snapshot: &Snapshot, config: &Config) -> (Vec<Decision>, RunSummary) {
    let project = tempfile::tempdir().expect("temp project dir");
    run_in_project(snapshot, config, project.path())
}

fn run_in_project(
    snapshot: &Snapshot,
    config: &Config,
    project: &std::path::Path,
) -> (Vec<Decision>, RunSummary) {
    let catalog = snapshot.to_catalog();
    let index = ReferenceIndex::from_snapshot(snapshot);
    let literal = FileLiteralSearch::new(project);
    let orchestrator = AnalysisOrchestrator::new(
        &catalog,
        Providers {
            searcher: &index,
            literal: &literal,
            hierarchy: &index,
        },
        config,
    );
    let mut sink = CollectingSink::new();
    let summary = orchestrator.run(&mut sink);
    let (decisions, _) = sink.into_parts();
    (decisions, summary)
}

fn decisions_for<'a>(decisions: &'a [Decision], id: &str) -> Vec<&'a Decision> {
    decisions
        .iter()
        .filter(|decision| decision.symbol_id.as_str() == id)
        .collect()
}

#[test]
fn test_private_field_with_declaration_write_only_can_be_final() {
    // Scenario: `private int x = 1;`, never written elsewhere
    let ty = type_symbol("a.Holder", "a");
    let mut field = field_symbol("a.Holder", "a", "x");
    field.visibility = Visibility::Private;

    let snapshot = Snapshot {
        symbols: vec![ty, field],
        references: vec![
            reference("a.Holder", "a.User", "a", ReferenceKind::TypeUse),
            write_from_declaration("a.Holder#x", "a.Holder", "a"),
        ],
        ..Snapshot::default()
    };

    let (decisions, summary) = run(&snapshot, &Config::default());
    assert!(!summary.is_aborted());

    let field_decisions = decisions_for(&decisions, "a.Holder#x");
    assert_eq!(field_decisions.len(), 1);
    assert_eq!(field_decisions[0].kind, DecisionKind::CanBeFinal);
}

#[test]
fn test_public_method_without_matches_is_unused() {
    let ty = type_symbol("a.Service", "a");
    let method = method_symbol("a.Service", "a", "orphan");

    let snapshot = Snapshot {
        symbols: vec![ty, method],
        references: vec![reference("a.Service", "b.Client", "b", ReferenceKind::TypeUse)],
        ..Snapshot::default()
    };

    let (decisions, _) = run(&snapshot, &Config::default());
    let kinds: Vec<_> = decisions_for(&decisions, "a.Service#orphan()")
        .iter()
        .map(|decision| decision.kind)
        .collect();
    assert!(kinds.contains(&DecisionKind::Unused));
}

#[test]
fn test_public_field_used_only_in_package_reduces_to_default() {
    let ty = type_symbol("a.Holder", "a");
    let field = field_symbol("a.Holder", "a", "shared");

    let snapshot = Snapshot {
        symbols: vec![ty, field],
        references: vec![
            reference("a.Holder", "b.Client", "b", ReferenceKind::TypeUse),
            reference("a.Holder#shared", "a.Neighbour", "a", ReferenceKind::Read),
        ],
        ..Snapshot::default()
    };

    let (decisions, _) = run(&snapshot, &Config::default());
    let kinds: Vec<_> = decisions_for(&decisions, "a.Holder#shared")
        .iter()
        .map(|decision| decision.kind)
        .collect();
    assert!(kinds.contains(&DecisionKind::ReduceVisibility {
        to: Visibility::Default
    }));
    // the read access keeps it off the never-read list
    assert!(!kinds.contains(&DecisionKind::NeverRead));
}

#[test]
fn test_overridden_method_gets_no_decisions() {
    let ty = type_symbol("a.Base", "a");
    let method = method_symbol("a.Base", "a", "hook");

    let snapshot = Snapshot {
        symbols: vec![ty, method],
        references: vec![reference("a.Base", "b.Client", "b", ReferenceKind::TypeUse)],
        overridden_methods: vec![SymbolId::new("a.Base#hook()")],
        ..Snapshot::default()
    };

    let (decisions, _) = run(&snapshot, &Config::default());
    assert!(decisions_for(&decisions, "a.Base#hook()").is_empty());
}

#[test]
fn test_literal_match_saves_type_from_unused_and_members_from_skip() {
    // Scenario: zero code references, one whole-token occurrence in an XML
    // file inside the literal search scope
    let ty = type_symbol("a.Bean", "a");
    let method = method_symbol("a.Bean", "a", "init");

    let snapshot = Snapshot {
        symbols: vec![ty, method],
        ..Snapshot::default()
    };

    let project = tempfile::tempdir().expect("temp project dir");
    std::fs::write(
        project.path().join("beans.xml"),
        "<bean class=\"Bean\" init-method=\"init\"/>\n",
    )
    .expect("fixture file");

    let mut config = Config::default();
    config.literal.enabled = true;

    let (decisions, _) = run_in_project(&snapshot, &config, project.path());

    let type_kinds: Vec<_> = decisions_for(&decisions, "a.Bean")
        .iter()
        .map(|decision| decision.kind)
        .collect();
    assert!(!type_kinds.contains(&DecisionKind::Unused));

    // members of the type were analyzed, not short-circuited
    let method_kinds: Vec<_> = decisions_for(&decisions, "a.Bean#init()")
        .iter()
        .map(|decision| decision.kind)
        .collect();
    assert!(method_kinds.contains(&DecisionKind::Unused));
}

#[test]
fn test_members_of_unreferenced_type_skip_reference_work_but_fields_keep_final_check() {
    let ty = type_symbol("a.Orphan", "a");
    let method = method_symbol("a.Orphan", "a", "work");
    let field = field_symbol("a.Orphan", "a", "state");

    let snapshot = Snapshot {
        symbols: vec![ty, method, field],
        references: vec![write_from_declaration("a.Orphan#state", "a.Orphan", "a")],
        ..Snapshot::default()
    };

    let (decisions, _) = run(&snapshot, &Config::default());

    let type_kinds: Vec<_> = decisions_for(&decisions, "a.Orphan")
        .iter()
        .map(|decision| decision.kind)
        .collect();
    assert!(type_kinds.contains(&DecisionKind::Unused));

    // methods of a no-reference type are skipped entirely, final check included
    assert!(decisions_for(&decisions, "a.Orphan#work()").is_empty());

    // fields still get exactly the final check
    let field_kinds: Vec<_> = decisions_for(&decisions, "a.Orphan#state")
        .iter()
        .map(|decision| decision.kind)
        .collect();
    assert_eq!(field_kinds, vec![DecisionKind::CanBeFinal]);
}

#[test]
fn test_written_but_never_read_field_is_reported() {
    let ty = type_symbol("a.Holder", "a");
    let field = field_symbol("a.Holder", "a", "counter");

    let snapshot = Snapshot {
        symbols: vec![ty, field],
        references: vec![
            reference("a.Holder", "b.Client", "b", ReferenceKind::TypeUse),
            reference("a.Holder#counter", "a.Writer", "a", ReferenceKind::Write),
        ],
        ..Snapshot::default()
    };

    let (decisions, _) = run(&snapshot, &Config::default());
    let kinds: Vec<_> = decisions_for(&decisions, "a.Holder#counter")
        .iter()
        .map(|decision| decision.kind)
        .collect();
    assert!(kinds.contains(&DecisionKind::NeverRead));
    // the method write also disqualifies finality
    assert!(!kinds.contains(&DecisionKind::CanBeFinal));
}

#[test]
fn test_test_only_references_reported_as_unused() {
    let ty = type_symbol("a.Service", "a");
    let method = method_symbol("a.Service", "a", "helper");

    let mut test_reference =
        reference("a.Service#helper()", "a.ServiceTest", "a", ReferenceKind::Call);
    test_reference.is_test_code = true;

    let snapshot = Snapshot {
        symbols: vec![ty, method],
        references: vec![
            reference("a.Service", "b.Client", "b", ReferenceKind::TypeUse),
            test_reference,
        ],
        ..Snapshot::default()
    };

    let mut config = Config::default();
    config.detect_test_only = true;

    let (decisions, _) = run(&snapshot, &config);
    let helper = decisions_for(&decisions, "a.Service#helper()");
    let unused: Vec<_> = helper
        .iter()
        .filter(|decision| decision.kind == DecisionKind::Unused)
        .collect();
    assert_eq!(unused.len(), 1);
    assert!(unused[0].message.contains("test code"));
}

#[test]
fn test_runs_are_deterministic_and_identities_unique() {
    let ty = type_symbol("a.Holder", "a");
    let method = method_symbol("a.Holder", "a", "helper");
    let field = field_symbol("a.Holder", "a", "shared");

    let snapshot = Snapshot {
        symbols: vec![ty, method, field],
        references: vec![
            reference("a.Holder", "b.Client", "b", ReferenceKind::TypeUse),
            reference("a.Holder#shared", "a.Neighbour", "a", ReferenceKind::Read),
            reference("a.Holder#helper()", "a.Neighbour", "a", ReferenceKind::Call),
        ],
        ..Snapshot::default()
    };
    let config = Config::default();

    let (first, _) = run(&snapshot, &config);
    let (second, _) = run(&snapshot, &config);

    let describe = |decisions: &[Decision]| -> Vec<(String, String, usize)> {
        decisions
            .iter()
            .map(|decision| {
                (
                    decision.symbol_id.to_string(),
                    decision.message.clone(),
                    decision.reference_count,
                )
            })
            .collect()
    };
    assert_eq!(describe(&first), describe(&second));

    // no identity is ever emitted twice
    let mut seen = std::collections::HashSet::new();
    for decision in &first {
        assert!(
            seen.insert(decision.identity()),
            "duplicate decision for {}",
            decision.symbol_id
        );
    }

    // and no symbol carries both an unused and a rarely-used verdict
    let mut reachability_kinds: HashMap<String, usize> = HashMap::new();
    for decision in &first {
        if matches!(decision.kind, DecisionKind::Unused | DecisionKind::RarelyUsed) {
            *reachability_kinds
                .entry(decision.symbol_id.to_string())
                .or_default() += 1;
        }
    }
    assert!(reachability_kinds.values().all(|&count| count <= 1));
}
