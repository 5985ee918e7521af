//! Rule compilation session
//!
//! Owns the pattern-id counter. Ids start at 1, are never reused within a
//! session, and allocation is a single atomic increment so rules can be
//! compiled from several threads sharing one session.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::features::rule_model::domain::{PatternId, Xpattern, XpatternKind};
use crate::shared::models::Wrap;

#[derive(Debug)]
pub struct RuleCompilationSession {
    next_id: AtomicU64,
}

impl Default for RuleCompilationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleCompilationSession {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    /// Build a leaf pattern with a fresh id
    pub fn mk_pattern(&self, kind: XpatternKind, pstr: Wrap<String>) -> Xpattern {
        let pid = PatternId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::trace!(pid = pid.0, kind = kind.name(), pattern = pstr.0.as_str(), "allocated pattern");
        Xpattern { kind, pstr, pid }
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::rule_model::domain::Regexp;
    use crate::shared::models::Tok;
    use rayon::prelude::*;
    use std::collections::HashSet;

    fn regexp(s: &str) -> XpatternKind {
        XpatternKind::Regexp(Regexp::new(s))
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let session = RuleCompilationSession::new();
        let a = session.mk_pattern(regexp("a"), ("a".to_string(), Tok::fake("a")));
        let b = session.mk_pattern(regexp("b"), ("b".to_string(), Tok::fake("b")));
        assert_eq!(a.pid, PatternId(1));
        assert_eq!(b.pid, PatternId(2));
        assert_eq!(session.allocated(), 2);
    }

    #[test]
    fn test_equality_ignores_id_and_text() {
        let session = RuleCompilationSession::new();
        let a = session.mk_pattern(regexp("x+"), ("x+".to_string(), Tok::fake("x+")));
        let b = session.mk_pattern(regexp("x+"), ("'x+'".to_string(), Tok::fake("'x+'")));
        assert_ne!(a.pid, b.pid);
        assert_eq!(a, b);
    }

    #[test]
    fn test_concurrent_allocation_is_unique() {
        let session = RuleCompilationSession::new();
        let ids: Vec<PatternId> = (0..1000)
            .into_par_iter()
            .map(|i| {
                session
                    .mk_pattern(regexp("p"), (i.to_string(), Tok::fake("p")))
                    .pid
            })
            .collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 1000);
        assert_eq!(session.allocated(), 1000);
    }
}
