use std::collections::HashSet;

use ctrl_core::TokenId;

/// Divide the logit of every distinct token in `history` by `penalty`, once.
///
/// `exempt` (the newline sentinel) is never discounted. A token repeated
/// ten times is still divided a single time. `penalty <= 0` disables the
/// stage. Returns the number of logits touched.
pub fn apply(logits: &mut [f32], history: &[TokenId], penalty: f32, exempt: TokenId) -> usize {
    if penalty <= 0.0 {
        return 0;
    }
    let mut penalized: HashSet<TokenId> = HashSet::new();
    for &id in history {
        if id == exempt || !penalized.insert(id) {
            continue;
        }
        if let Some(l) = logits.get_mut(id as usize) {
            *l /= penalty;
        }
    }
    penalized.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn each_distinct_token_divided_once() {
        let mut l = vec![4.0, 4.0, 4.0, 4.0];
        let n = apply(&mut l, &[1, 1, 1, 2], 2.0, 3);
        assert_eq!(n, 2);
        assert_eq!(l, vec![4.0, 2.0, 2.0, 4.0]);
    }

    #[test]
    fn newline_is_exempt() {
        let mut l = vec![4.0, 4.0];
        apply(&mut l, &[1, 1, 0], 2.0, 1);
        assert_eq!(l, vec![2.0, 4.0]);
    }

    #[test]
    fn non_positive_penalty_disables() {
        let mut l = vec![4.0, 4.0];
        assert_eq!(apply(&mut l, &[0, 1], 0.0, 9), 0);
        assert_eq!(l, vec![4.0, 4.0]);
    }

    proptest! {
        #[test]
        fn unit_penalty_is_identity(
            logits in prop::collection::vec(-50.0f32..50.0, 16),
            history in prop::collection::vec(0u32..16, 0..40),
        ) {
            let mut l = logits.clone();
            apply(&mut l, &history, 1.0, 15);
            prop_assert_eq!(l, logits);
        }

        #[test]
        fn repetition_count_does_not_matter(
            logits in prop::collection::vec(1.0f32..50.0, 8),
            history in prop::collection::vec(0u32..8, 1..20),
            repeat in 1usize..5,
        ) {
            let mut once = logits.clone();
            apply(&mut once, &history, 1.5, 7);
            let repeated: Vec<TokenId> = history.iter().flat_map(|&t| std::iter::repeat(t).take(repeat)).collect();
            let mut many = logits.clone();
            apply(&mut many, &repeated, 1.5, 7);
            prop_assert_eq!(once, many);
        }
    }
}
