//! Analyzer behavior exercised through the snapshot-backed index.

use refaudit::analysis::{
    AnalysisOrchestrator, Decision, DecisionKind, FinalityAnalyzer, Providers,
};
use refaudit::catalog::{Location, Symbol, SymbolId, SymbolKind, Visibility};
use refaudit::config::Config;
use refaudit::index::{FileLiteralSearch, ReferenceIndex, Snapshot};
use refaudit::report::CollectingSink;
use refaudit::search::{EnclosingElement, EnclosingKind, Reference, ReferenceKind};
use std::collections::HashMap;

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

fn call(target: &str, from_type: &str, from_package: &str, line: u32) -> Reference {
    Reference::new(
        SymbolId::new(target),
        Location::new("src/From.java", line),
        ReferenceKind::Call,
    )
    .with_enclosing(EnclosingElement {
        id: SymbolId::new(format!("{from_type}#site{line}()")),
        kind: EnclosingKind::Method,
        declaring_type: Some(SymbolId::new(from_type)),
        package: from_package.to_string(),
    })
}

fn constructor_write(target: &str, ctor_type: &str, package: &str) -> Reference {
    Reference::new(
        SymbolId::new(target),
        Location::new("src/T.java", 15),
        ReferenceKind::Write,
    )
    .with_enclosing(EnclosingElement {
        id: SymbolId::new(format!("{ctor_type}#<init>()")),
        kind: EnclosingKind::Constructor,
        declaring_type: Some(SymbolId::new(ctor_type)),
        package: package.to_string(),
    })
}

fn run(snapshot: &Snapshot, config: &Config) -> Vec<Decision> {
    let project = tempfile::tempdir().expect("temp project dir");
    let catalog = snapshot.to_catalog();
    let index = ReferenceIndex::from_snapshot(snapshot);
    let literal = FileLiteralSearch::new(project.path());
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
    orchestrator.run(&mut sink);
    sink.into_parts().0
}

fn kinds_for(decisions: &[Decision], id: &str) -> Vec<DecisionKind> {
    decisions
        .iter()
        .filter(|decision| decision.symbol_id.as_str() == id)
        .map(|decision| decision.kind)
        .collect()
}

#[test]
fn test_warn_limit_boundary() {
    let build = |call_count: u32| -> Snapshot {
        let ty = type_symbol("a.Service", "a");
        let method = method_symbol("a.Service", "a", "busy");
        let mut references = vec![call("a.Service", "b.Client", "b", 2)];
        for line in 0..call_count {
            references.push(call("a.Service#busy()", "a.Caller", "a", 30 + line));
        }
        Snapshot {
            symbols: vec![ty, method],
            references,
            ..Snapshot::default()
        }
    };
    let config = Config {
        warn_limit: 2,
        ..Config::default()
    };

    // exactly at the limit: rarely used, with the count attached
    let decisions = run(&build(2), &config);
    let rarely: Vec<_> = decisions
        .iter()
        .filter(|decision| {
            decision.symbol_id.as_str() == "a.Service#busy()"
                && decision.kind == DecisionKind::RarelyUsed
        })
        .collect();
    assert_eq!(rarely.len(), 1);
    assert_eq!(rarely[0].reference_count, 2);

    // one past the limit: sufficiently used
    let decisions = run(&build(3), &config);
    let kinds = kinds_for(&decisions, "a.Service#busy()");
    assert!(!kinds.contains(&DecisionKind::RarelyUsed));
    assert!(!kinds.contains(&DecisionKind::Unused));
}

#[test]
fn test_subclass_in_other_package_requires_protected() {
    let ty = type_symbol("a.Base", "a");
    let field = field_symbol("a.Base", "a", "slot");
    let reference = Reference::new(
        SymbolId::new("a.Base#slot"),
        Location::new("src/Sub.java", 9),
        ReferenceKind::Read,
    )
    .with_enclosing(EnclosingElement {
        id: SymbolId::new("b.Sub#user()"),
        kind: EnclosingKind::Method,
        declaring_type: Some(SymbolId::new("b.Sub")),
        package: "b".to_string(),
    });

    let snapshot = Snapshot {
        symbols: vec![ty, field],
        references: vec![
            call("a.Base", "c.Client", "c", 2),
            reference,
        ],
        supertypes: HashMap::from([(SymbolId::new("b.Sub"), vec![SymbolId::new("a.Base")])]),
        ..Snapshot::default()
    };

    let decisions = run(&snapshot, &Config::default());
    let kinds = kinds_for(&decisions, "a.Base#slot");
    assert!(kinds.contains(&DecisionKind::ReduceVisibility {
        to: Visibility::Protected
    }));
}

#[test]
fn test_visibility_toggle_disables_suggestion() {
    let ty = type_symbol("a.Holder", "a");
    let field = field_symbol("a.Holder", "a", "shared");
    let snapshot = Snapshot {
        symbols: vec![ty, field],
        references: vec![
            call("a.Holder", "b.Client", "b", 2),
            call("a.Holder#shared", "a.Neighbour", "a", 9),
        ],
        ..Snapshot::default()
    };

    let mut config = Config::default();
    config.visibility.fields.to_default = false;

    let decisions = run(&snapshot, &config);
    let kinds = kinds_for(&decisions, "a.Holder#shared");
    assert!(!kinds
        .iter()
        .any(|kind| matches!(kind, DecisionKind::ReduceVisibility { .. })));
}

#[test]
fn test_instance_field_constructor_write_keeps_final_candidacy() {
    let field = field_symbol("a.Holder", "a", "value");
    let snapshot = Snapshot {
        symbols: vec![type_symbol("a.Holder", "a"), field.clone()],
        references: vec![constructor_write("a.Holder#value", "a.Holder", "a")],
        ..Snapshot::default()
    };
    let index = ReferenceIndex::from_snapshot(&snapshot);
    let analyzer = FinalityAnalyzer::new();

    assert!(analyzer
        .field_can_be_final(&field, &index, &Config::default())
        .unwrap());

    // the same write disqualifies a static field
    let mut static_field = field;
    static_field.modifiers.is_static = true;
    assert!(!analyzer
        .field_can_be_final(&static_field, &index, &Config::default())
        .unwrap());
}

#[test]
fn test_subclassed_type_blocks_method_finality() {
    let mut ty = type_symbol("a.Base", "a");
    ty.has_subclasses = true;
    let method = method_symbol("a.Base", "a", "step");

    let snapshot = Snapshot {
        symbols: vec![ty, method],
        references: vec![
            call("a.Base", "b.Client", "b", 2),
            call("a.Base#step()", "b.Client", "b", 3),
        ],
        ..Snapshot::default()
    };

    let decisions = run(&snapshot, &Config::default());
    assert!(!kinds_for(&decisions, "a.Base#step()").contains(&DecisionKind::CanBeFinal));
}

#[test]
fn test_eligible_method_gets_final_candidacy() {
    let ty = type_symbol("a.Leaf", "a");
    let method = method_symbol("a.Leaf", "a", "step");

    let snapshot = Snapshot {
        symbols: vec![ty, method],
        references: vec![
            call("a.Leaf", "b.Client", "b", 2),
            call("a.Leaf#step()", "b.Client", "b", 3),
        ],
        ..Snapshot::default()
    };

    let decisions = run(&snapshot, &Config::default());
    assert!(kinds_for(&decisions, "a.Leaf#step()").contains(&DecisionKind::CanBeFinal));
}
