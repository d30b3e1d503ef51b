//! Substring filtering using nucleo-matcher.

use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Config, Matcher, Utf32Str};

use crate::option::OptionRegistry;

/// Case-insensitive substring matcher for a single query.
///
/// Both the query and the haystacks are trimmed. The query is matched as one
/// literal atom: whitespace inside it is significant and nothing is fuzzy.
pub struct QueryMatcher {
    atom: Option<Atom>,
    matcher: Matcher,
    buf: Vec<char>,
}

impl QueryMatcher {
    pub fn new(query: &str) -> Self {
        let query = query.trim();
        let atom = (!query.is_empty()).then(|| {
            Atom::new(
                query,
                CaseMatching::Ignore,
                Normalization::Never,
                AtomKind::Substring,
                false,
            )
        });
        Self {
            atom,
            matcher: Matcher::new(Config::DEFAULT),
            buf: Vec::new(),
        }
    }

    /// Empty queries match every label.
    pub fn matches(&mut self, label: &str) -> bool {
        let Some(atom) = &self.atom else {
            return true;
        };
        let haystack = Utf32Str::new(label.trim(), &mut self.buf);
        atom.score(haystack, &mut self.matcher).is_some()
    }
}

/// Recompute the visibility of every option from scratch.
///
/// Returns the number of visible options afterwards.
///
/// # Example
///
/// ```ignore
/// // labels: "Apple", "Banana", "apple pie"
/// apply(&mut registry, "app");
/// // visible: true, false, true
/// ```
pub fn apply(registry: &mut OptionRegistry, query: &str) -> usize {
    let mut matcher = QueryMatcher::new(query);
    let verdicts: Vec<bool> = registry
        .iter()
        .map(|option| matcher.matches(option.label()))
        .collect();
    for (index, visible) in verdicts.iter().enumerate() {
        registry.set_visible(index, *visible);
    }
    registry.visible_count()
}
