use ctrl_core::{GenError, GenResult, TokenId};

/// Length of the smallest prefix of `ranked` whose cumulative probability
/// strictly exceeds `threshold`. Always at least 1.
///
/// Fails with `NucleusUnreachable` when the whole list never gets there
/// (threshold of 1.0, rounding, or a NaN distribution).
pub fn cutoff(probs: &[f64], ranked: &[TokenId], threshold: f64) -> GenResult<usize> {
    let mut cumulative = 0.0;
    for (i, &id) in ranked.iter().enumerate() {
        cumulative += probs.get(id as usize).copied().unwrap_or(0.0);
        if cumulative > threshold {
            return Ok(i + 1);
        }
    }
    Err(GenError::NucleusUnreachable {
        threshold,
        total: cumulative,
    })
}
