use ctrl_core::{TokenId, Vocabulary};

/// Predicate deciding whether a ranked candidate may be chosen.
pub trait CandidateFilter {
    /// `true` keeps the candidate.
    fn allows(&self, id: TokenId, token: &str) -> bool;
}

impl<F> CandidateFilter for F
where
    F: Fn(TokenId, &str) -> bool,
{
    fn allows(&self, id: TokenId, token: &str) -> bool {
        self(id, token)
    }
}

/// Rejects candidates whose text contains any of the given substrings.
#[derive(Debug, Clone, Default)]
pub struct SubstringFilter {
    needles: Vec<String>,
}

impl SubstringFilter {
    /// Empty needles are ignored (they would match every token).
    pub fn new<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            needles: needles
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }
}

impl CandidateFilter for SubstringFilter {
    fn allows(&self, _id: TokenId, token: &str) -> bool {
        !self.needles.iter().any(|n| token.contains(n.as_str()))
    }
}

/// Drop disallowed candidates, keeping survivors in rank order.
pub fn retain(candidates: &mut Vec<TokenId>, vocab: &Vocabulary, filter: &dyn CandidateFilter) {
    candidates.retain(|&id| vocab.token(id).is_some_and(|t| filter.allows(id, t)));
}
