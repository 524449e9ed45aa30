use crate::{OracleError, TokenId};

/// Dense row-major logits matrix: one row of vocabulary scores per window position.
#[derive(Debug, Clone, PartialEq)]
pub struct Logits {
    rows: usize,
    vocab: usize,
    data: Vec<f32>,
}

impl Logits {
    /// Wrap `data` as a `rows x vocab` matrix. Fails when the length disagrees.
    pub fn new(rows: usize, vocab: usize, data: Vec<f32>) -> Result<Self, OracleError> {
        if rows.checked_mul(vocab) != Some(data.len()) {
            return Err(OracleError::Backend(format!(
                "{} values cannot form a {rows}x{vocab} matrix",
                data.len()
            )));
        }
        Ok(Self { rows, vocab, data })
    }

    /// Number of window positions.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Scores per row.
    pub fn vocab(&self) -> usize {
        self.vocab
    }

    /// Scores predicted at window position `i`.
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let start = i.checked_mul(self.vocab)?;
        self.data.get(start..start.checked_add(self.vocab)?)
    }

    /// Owned copy of row `i`.
    pub fn row_vec(&self, i: usize) -> Option<Vec<f32>> {
        self.row(i).map(<[f32]>::to_vec)
    }
}

/// Opaque next-token scorer.
///
/// Maps a window of token IDs (batch of one) to a `window.len() x vocab`
/// matrix. The decoder trusts the numbers but checks the shape.
pub trait LogitsOracle {
    /// Longest window the oracle accepts in one call.
    fn context_window(&self) -> usize;

    /// Columns in every returned row.
    fn vocab_size(&self) -> usize;

    /// Score every vocabulary entry at every window position.
    fn predict(&self, window: &[TokenId]) -> Result<Logits, OracleError>;
}

impl<O: LogitsOracle + ?Sized> LogitsOracle for &O {
    fn context_window(&self) -> usize {
        (**self).context_window()
    }

    fn vocab_size(&self) -> usize {
        (**self).vocab_size()
    }

    fn predict(&self, window: &[TokenId]) -> Result<Logits, OracleError> {
        (**self).predict(window)
    }
}

impl<O: LogitsOracle + ?Sized> LogitsOracle for Box<O> {
    fn context_window(&self) -> usize {
        (**self).context_window()
    }

    fn vocab_size(&self) -> usize {
        (**self).vocab_size()
    }

    fn predict(&self, window: &[TokenId]) -> Result<Logits, OracleError> {
        (**self).predict(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_contiguous_slices() {
        let l = Logits::new(2, 3, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(l.row(0), Some(&[0.0, 1.0, 2.0][..]));
        assert_eq!(l.row(1), Some(&[3.0, 4.0, 5.0][..]));
        assert_eq!(l.row(2), None);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        assert!(Logits::new(2, 3, vec![0.0; 5]).is_err());
    }
}
