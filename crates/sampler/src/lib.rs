#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
#![deny(missing_docs, unused_must_use)]

//! Token sampling strategies: greedy, top-k, nucleus, temperature.
//!
//! Each stage lives in its own module and works on a plain `&mut [f32]`
//! logit row. `LogitPipeline` runs them in the fixed order of one decoding
//! step:
//!
//! 1. temperature scaling
//! 2. repetition penalty
//! 3. hard bans
//! 4. probabilities (naive softmax) and ranking
//! 5. nucleus / top-k truncation
//! 6. candidate filtering
//! 7. greedy pick or categorical draw

use ctrl_core::{make_rng, GenError, GenResult, GenerationConfig, TokenId, Vocabulary};
use rand_chacha::ChaCha8Rng;

/// Hard bans (`<unk>`, reserved words).
pub mod ban;
/// Categorical draw over surviving candidates.
pub mod categorical;
/// Candidate predicates.
pub mod filter;
/// Argmax selection.
pub mod greedy;
/// Nucleus (top-p) cutoff.
pub mod nucleus;
/// Repetition penalty.
pub mod penalty;
/// Softmax and ranking.
pub mod probs;
/// Temperature scaling.
pub mod temperature;
/// Top-k cutoff.
pub mod top_k;

pub use filter::{CandidateFilter, SubstringFilter};

/// How the ranked list is cut before filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Truncation {
    /// Smallest prefix whose mass exceeds the threshold.
    Nucleus(f64),
    /// Fixed number of candidates.
    TopK(usize),
    /// Whole vocabulary.
    Full,
}

impl Truncation {
    /// Nucleus wins over top-k; neither set means the full list.
    pub fn from_config(cfg: &GenerationConfig) -> Self {
        if cfg.nucleus > 0.0 {
            Self::Nucleus(f64::from(cfg.nucleus))
        } else if cfg.topk > 0 {
            Self::TopK(cfg.topk)
        } else {
            Self::Full
        }
    }

    /// Number of ranked candidates to keep.
    pub fn cutoff(&self, probs: &[f64], ranked: &[TokenId]) -> GenResult<usize> {
        match *self {
            Self::Nucleus(p) => nucleus::cutoff(probs, ranked, p),
            Self::TopK(k) => Ok(top_k::cutoff(k, ranked.len())),
            Self::Full => Ok(ranked.len()),
        }
    }
}

/// Outcome of one decoding step.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Token committed to the buffer.
    pub token: TokenId,
    /// Survivors of truncation and filtering, best first.
    pub candidates: Vec<TokenId>,
}

/// The per-step logit transform pipeline, bound to one vocabulary.
pub struct LogitPipeline<'v> {
    vocab: &'v Vocabulary,
    temperature: f32,
    penalty: f32,
    truncation: Truncation,
    banned: Vec<TokenId>,
    filter: Box<dyn CandidateFilter + 'v>,
    rng: ChaCha8Rng,
}

impl<'v> LogitPipeline<'v> {
    /// Build from a validated config: resolves bans, installs the substring
    /// filter and seeds the RNG.
    pub fn new(vocab: &'v Vocabulary, cfg: &GenerationConfig) -> Self {
        Self {
            vocab,
            temperature: cfg.temperature,
            penalty: cfg.penalty,
            truncation: Truncation::from_config(cfg),
            banned: ban::resolve(vocab, &cfg.banned_tokens),
            filter: Box::new(SubstringFilter::new(cfg.disallowed_substrings.iter().cloned())),
            rng: make_rng(cfg.seed),
        }
    }

    /// Replace the candidate filter.
    pub fn with_filter(mut self, filter: impl CandidateFilter + 'v) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Hard-banned IDs (`<unk>` first).
    pub fn banned(&self) -> &[TokenId] {
        &self.banned
    }

    fn is_greedy(&self) -> bool {
        self.temperature == 0.0
    }

    /// Transform `logits` in place and choose the token for `position`.
    ///
    /// `history` is the committed prefix of the sequence; it drives the
    /// repetition penalty.
    pub fn select(
        &mut self,
        logits: &mut [f32],
        history: &[TokenId],
        position: usize,
    ) -> GenResult<Selection> {
        temperature::apply(logits, self.temperature);
        let penalized = penalty::apply(logits, history, self.penalty, self.vocab.newline_id());
        ban::apply(logits, &self.banned);

        let probs = probs::softmax(logits);
        let mut candidates = probs::rank(&probs);
        let keep = self.truncation.cutoff(&probs, &candidates)?;
        candidates.truncate(keep);

        let banned = &self.banned;
        candidates.retain(|id| !banned.contains(id));
        filter::retain(&mut candidates, self.vocab, self.filter.as_ref());

        let token = if self.is_greedy() {
            greedy::pick(&candidates)
        } else if candidates.is_empty() {
            None
        } else {
            Some(categorical::sample(logits, &candidates, &mut self.rng)?)
        }
        .ok_or(GenError::NoCandidates { position })?;

        tracing::debug!(position, penalized, kept = keep, survivors = candidates.len(), token, "selected token");
        Ok(Selection { token, candidates })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::from_tokens(["a", "b", "http@@", "Sco@@", "c"]).unwrap()
    }

    fn greedy_cfg() -> GenerationConfig {
        GenerationConfig {
            penalty: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn truncation_precedence() {
        let both = GenerationConfig { nucleus: 0.9, topk: 5, ..Default::default() };
        assert_eq!(Truncation::from_config(&both), Truncation::Nucleus(f64::from(0.9f32)));
        let k = GenerationConfig { topk: 5, ..Default::default() };
        assert_eq!(Truncation::from_config(&k), Truncation::TopK(5));
        assert_eq!(Truncation::from_config(&GenerationConfig::default()), Truncation::Full);
    }

    #[test]
    fn greedy_skips_banned_and_filtered() {
        let v = vocab();
        let mut p = LogitPipeline::new(&v, &greedy_cfg());
        // http@@ and Sco@@ and <unk> outrank everything
        let mut logits = vec![1.0, 2.0, 9.0, 9.0, 0.5, 9.0, 0.0];
        let s = p.select(&mut logits, &[0], 1).unwrap();
        assert_eq!(s.token, 1);
        assert_eq!(s.candidates.first(), Some(&1));
        assert!(!s.candidates.contains(&2));
        assert!(!s.candidates.contains(&v.unk_id()));
    }

    #[test]
    fn penalty_changes_the_winner() {
        let v = vocab();
        let cfg = GenerationConfig { penalty: 2.0, ..Default::default() };
        let mut p = LogitPipeline::new(&v, &cfg);
        let mut logits = vec![4.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        // "a" already emitted: 4.0 / 2 = 2.0 < 3.0
        assert_eq!(p.select(&mut logits, &[0, 0, 0], 3).unwrap().token, 1);
    }

    #[test]
    fn top_k_limits_candidates() {
        let v = vocab();
        let cfg = GenerationConfig { topk: 2, penalty: 0.0, ..Default::default() };
        let mut p = LogitPipeline::new(&v, &cfg);
        let mut logits = vec![3.0, 2.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let s = p.select(&mut logits, &[], 0).unwrap();
        assert_eq!(s.candidates, vec![0, 1]);
    }

    #[test]
    fn everything_filtered_is_an_error() {
        let v = vocab();
        let mut p = LogitPipeline::new(&v, &greedy_cfg()).with_filter(|_: TokenId, _: &str| false);
        let mut logits = vec![0.0; v.len()];
        assert!(matches!(
            p.select(&mut logits, &[], 4),
            Err(GenError::NoCandidates { position: 4 })
        ));
    }

    #[test]
    fn sampling_is_reproducible_per_seed() {
        let v = vocab();
        let cfg = GenerationConfig { temperature: 1.0, penalty: 0.0, seed: 9, ..Default::default() };
        let run = || {
            let mut p = LogitPipeline::new(&v, &cfg);
            (0..20)
                .map(|i| {
                    let mut logits = vec![1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
                    p.select(&mut logits, &[], i).unwrap().token
                })
                .collect::<Vec<_>>()
        };
        let first = run();
        assert_eq!(first, run());
        // http@@ is filtered, <unk> and Sco@@ are banned
        assert!(first.iter().all(|t| [0, 1, 4, 6].contains(t)));
    }
}
