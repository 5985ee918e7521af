//! Rule compilation: ids, legacy conversion, traversal, validation

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::*;
use genast_ir::features::rule_model::domain::{Formula, PFormula, PatternId};
use genast_ir::features::rule_model::{
    convert_legacy, formula_of_pformula, partition_rules, visit_new_formula,
    RuleCompilationSession,
};
use pretty_assertions::assert_eq;

#[test]
fn test_pattern_ids_unique_across_threads() {
    let session = Arc::new(RuleCompilationSession::new());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let session = Arc::clone(&session);
            std::thread::spawn(move || {
                (0..250)
                    .map(|i| spacegrep(&session, &format!("p{}_{}", t, i)).pid)
                    .collect::<Vec<PatternId>>()
            })
        })
        .collect();

    let mut all = Vec::new();
    for h in handles {
        all.extend(h.join().unwrap());
    }
    let unique: HashSet<_> = all.iter().copied().collect();
    assert_eq!(all.len(), 2000);
    assert_eq!(unique.len(), 2000);
    assert!(all.iter().all(|id| id.0 >= 1 && id.0 <= 2000));
}

#[test]
fn test_legacy_and_canonical_agree() {
    let session = RuleCompilationSession::new();
    let from_legacy = formula_of_pformula("r", PFormula::Old(legacy_sample(&session))).unwrap();
    let canonical = formula_of_pformula("r", PFormula::New(canonical_sample(&session))).unwrap();
    assert_eq!(from_legacy, canonical);
}

#[test]
fn test_visit_order_follows_allocation_order() {
    let session = RuleCompilationSession::new();
    let formula = convert_legacy("r", legacy_sample(&session)).unwrap();
    let mut ids = Vec::new();
    visit_new_formula(&formula, &mut |xpat, _| ids.push(xpat.pid.0));
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_converted_legacy_rule_validates() {
    let session = RuleCompilationSession::new();
    let rule = search_rule("no-eval", PFormula::Old(legacy_sample(&session)));
    assert!(rule.validate().is_ok());
}

#[test]
fn test_partition_after_validation() {
    let session = RuleCompilationSession::new();
    let rules = vec![
        search_rule("a", PFormula::New(Formula::pattern(spacegrep(&session, "a")))),
        search_rule("b", PFormula::Old(legacy_sample(&session))),
    ];
    for rule in &rules {
        rule.validate().unwrap();
    }
    let (search, taint) = partition_rules(rules);
    assert_eq!(search.len(), 2);
    assert!(taint.is_empty());
    assert_eq!(search[0].id(), "a");
    assert!(matches!(search[1].mode, PFormula::Old(_)));
}
