use std::cell::RefCell;
use std::collections::HashMap;

use ctrl_core::{Logits, LogitsOracle, OracleError, TokenId};

/// Scripted oracle: the row predicted at a window position depends only on
/// the token at that position.
///
/// Every input window is recorded so callers can check what the decoder fed.
#[derive(Debug, Clone)]
pub struct TransitionOracle {
    vocab_size: usize,
    context_window: usize,
    rows: HashMap<TokenId, Vec<f32>>,
    fallback: Vec<f32>,
    seen: RefCell<Vec<Vec<TokenId>>>,
}

impl TransitionOracle {
    /// All-zero scores for every token.
    pub fn new(vocab_size: usize, context_window: usize) -> Self {
        Self {
            vocab_size,
            context_window,
            rows: HashMap::new(),
            fallback: vec![0.0; vocab_size],
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Give `next` the score `score` whenever `prev` is at the read position.
    pub fn prefer(mut self, prev: TokenId, next: TokenId, score: f32) -> Self {
        let fallback = &self.fallback;
        let row = self.rows.entry(prev).or_insert_with(|| fallback.clone());
        if let Some(slot) = row.get_mut(next as usize) {
            *slot = score;
        }
        self
    }

    /// Replace the scores used when no row was scripted for a token.
    pub fn with_fallback(mut self, fallback: Vec<f32>) -> Result<Self, OracleError> {
        if fallback.len() != self.vocab_size {
            return Err(OracleError::VocabMismatch {
                oracle: self.vocab_size,
                vocab: fallback.len(),
            });
        }
        self.fallback = fallback;
        Ok(self)
    }

    /// Number of `predict` calls so far.
    pub fn calls(&self) -> usize {
        self.seen.borrow().len()
    }

    /// Windows passed to `predict`, oldest first.
    pub fn windows(&self) -> Vec<Vec<TokenId>> {
        self.seen.borrow().clone()
    }
}

impl LogitsOracle for TransitionOracle {
    fn context_window(&self) -> usize {
        self.context_window
    }

    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn predict(&self, window: &[TokenId]) -> Result<Logits, OracleError> {
        self.seen.borrow_mut().push(window.to_vec());
        let mut data = Vec::with_capacity(window.len() * self.vocab_size);
        for id in window {
            data.extend_from_slice(self.rows.get(id).unwrap_or(&self.fallback));
        }
        Logits::new(window.len(), self.vocab_size, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_follow_tokens() {
        let o = TransitionOracle::new(3, 4).prefer(0, 2, 5.0);
        let l = o.predict(&[1, 0]).unwrap();
        assert_eq!(l.row(0), Some(&[0.0, 0.0, 0.0][..]));
        assert_eq!(l.row(1), Some(&[0.0, 0.0, 5.0][..]));
        assert_eq!(o.calls(), 1);
        assert_eq!(o.windows(), vec![vec![1, 0]]);
    }

    #[test]
    fn fallback_must_cover_vocab() {
        assert!(TransitionOracle::new(3, 4).with_fallback(vec![1.0]).is_err());
    }
}
