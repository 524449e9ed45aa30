use ctrl_core::TokenId;

/// Highest-ranked survivor.
pub fn pick(candidates: &[TokenId]) -> Option<TokenId> {
    candidates.first().copied()
}
