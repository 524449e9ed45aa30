use ctrl_core::{GenError, GenResult, TokenId};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Draw one candidate with probability `softmax(logits[candidates])`.
///
/// `logits` is the full transformed vector (temperature, penalty and bans
/// applied); only the candidates' entries take part.
pub fn sample<R: Rng + ?Sized>(
    logits: &[f32],
    candidates: &[TokenId],
    rng: &mut R,
) -> GenResult<TokenId> {
    let restricted: Vec<f64> = candidates
        .iter()
        .map(|&id| {
            logits
                .get(id as usize)
                .map(|&l| f64::from(l))
                .ok_or(GenError::InvalidTokenId(id))
        })
        .collect::<GenResult<_>>()?;
    let max = restricted.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights = restricted.iter().map(|l| (l - max).exp());
    let dist = WeightedIndex::new(weights).map_err(|e| GenError::Sampling(e.to_string()))?;
    candidates
        .get(dist.sample(rng))
        .copied()
        .ok_or_else(|| GenError::Sampling("index outside candidate list".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctrl_core::make_rng;

    #[test]
    fn only_candidates_are_drawn() {
        let logits = [5.0, 0.0, 0.0, 5.0];
        let mut rng = make_rng(1);
        for _ in 0..200 {
            let t = sample(&logits, &[1, 2], &mut rng).unwrap();
            assert!(t == 1 || t == 2);
        }
    }

    #[test]
    fn frequencies_follow_logits() {
        let logits = [0.0, (3.0f32).ln()];
        let mut rng = make_rng(42);
        let hits = (0..4000)
            .filter(|_| sample(&logits, &[0, 1], &mut rng).unwrap() == 1)
            .count();
        // expected 3000
        assert!((2800..3200).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn banned_weight_is_never_drawn() {
        let logits = [0.0, -1e8];
        let mut rng = make_rng(3);
        assert!((0..500).all(|_| sample(&logits, &[0, 1], &mut rng).unwrap() == 0));
    }

    #[test]
    fn empty_or_nan_weights_fail() {
        let mut rng = make_rng(0);
        assert!(matches!(sample(&[1.0], &[], &mut rng), Err(GenError::Sampling(_))));
        assert!(matches!(sample(&[f32::NAN], &[0], &mut rng), Err(GenError::Sampling(_))));
    }
}
