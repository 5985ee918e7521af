//! Split rules by mode

use crate::features::rule_model::domain::{Mode, Rule, SearchRule, TaintRule};

/// Stable partition into search and taint rules
pub fn partition_rules(rules: Vec<Rule<Mode>>) -> (Vec<SearchRule>, Vec<TaintRule>) {
    let mut search = Vec::new();
    let mut taint = Vec::new();
    for rule in rules {
        let (mode, rest) = rule.into_parts();
        match mode {
            Mode::Search(formula) => search.push(rest.with_mode(formula)),
            Mode::Taint(spec) => taint.push(rest.with_mode(spec)),
        }
    }
    tracing::debug!(search = search.len(), taint = taint.len(), "partitioned rules");
    (search, taint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::rule_model::application::RuleCompilationSession;
    use crate::features::rule_model::domain::{
        Formula, PFormula, Severity, TaintSpec, Xlang, XpatternKind,
    };
    use crate::shared::models::Tok;

    fn rule(id: &str, mode: Mode) -> Rule<Mode> {
        Rule {
            id: (id.to_string(), Tok::fake(id)),
            mode,
            message: String::new(),
            severity: Severity::Info,
            languages: Xlang::LGeneric,
            file: "rules.yaml".to_string(),
            paths: None,
            fix: None,
            fix_regexp: None,
            metadata: None,
        }
    }

    #[test]
    fn test_partition_is_stable() {
        let s = RuleCompilationSession::new();
        let search = |id: &str| {
            let xpat = s.mk_pattern(
                XpatternKind::Spacegrep("x".to_string()),
                ("x".to_string(), Tok::fake("x")),
            );
            rule(id, Mode::Search(PFormula::New(Formula::pattern(xpat))))
        };
        let taint = |id: &str| {
            rule(
                id,
                Mode::Taint(TaintSpec {
                    sources: vec![],
                    sanitizers: vec![],
                    sinks: vec![],
                }),
            )
        };

        let rules = vec![search("s1"), taint("t1"), search("s2"), taint("t2"), search("s3")];
        let (search_rules, taint_rules) = partition_rules(rules);

        let ids = |rs: &[&str]| rs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            search_rules.iter().map(|r| r.id().to_string()).collect::<Vec<_>>(),
            ids(&["s1", "s2", "s3"])
        );
        assert_eq!(
            taint_rules.iter().map(|r| r.id().to_string()).collect::<Vec<_>>(),
            ids(&["t1", "t2"])
        );
    }
}
