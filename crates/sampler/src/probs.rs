use std::cmp::Ordering;

use ctrl_core::TokenId;

/// `exp(l) / sum(exp(l))` without max subtraction.
///
/// Computed in `f64`; an overflowing distribution turns into NaN and is
/// caught by the nucleus stage.
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let exps: Vec<f64> = logits.iter().map(|&l| f64::from(l).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// IDs sorted by descending probability; equal probabilities put the higher ID first.
pub fn rank(probs: &[f64]) -> Vec<TokenId> {
    let mut ids: Vec<TokenId> = (0..probs.len() as TokenId).collect();
    let p = |id: TokenId| probs.get(id as usize).copied().unwrap_or(f64::NEG_INFINITY);
    ids.sort_by(|&a, &b| match p(b).total_cmp(&p(a)) {
        Ordering::Equal => b.cmp(&a),
        o => o,
    });
    ids
}
