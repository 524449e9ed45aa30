use std::path::Path;

use ctrl_core::{Logits, LogitsOracle, OracleError, TokenId};

use crate::loader;

/// Tied embedding/softmax scorer without the transformer stack.
///
/// Weights: `w` (vocab x dim, row-major) followed by `b` (vocab). The
/// hidden state at window position `i` is the mean of the embeddings of
/// positions `0..=i`, and its scores are `w · h + b`, reusing `w` as the
/// output projection.
pub struct TiedEmbeddingOracle {
    vocab: usize,
    dim: usize,
    context_window: usize,
    weights: Vec<f32>,
    bias: Vec<f32>,
}

impl TiedEmbeddingOracle {
    /// Split a flat weight buffer. Its length must be exactly `vocab * dim + vocab`.
    pub fn from_raw(
        vocab: usize,
        dim: usize,
        context_window: usize,
        mut raw: Vec<f32>,
    ) -> Result<Self, OracleError> {
        let expected = vocab
            .checked_mul(dim)
            .and_then(|n| n.checked_add(vocab))
            .ok_or_else(|| OracleError::Weights(format!("{vocab}x{dim} overflows")))?;
        if raw.len() != expected {
            return Err(OracleError::Weights(format!(
                "expected {expected} values for vocab {vocab} x dim {dim} (+bias), found {}",
                raw.len()
            )));
        }
        if dim == 0 {
            return Err(OracleError::Weights("embedding dimension is zero".into()));
        }
        let bias = raw.split_off(vocab * dim);
        Ok(Self {
            vocab,
            dim,
            context_window,
            weights: raw,
            bias,
        })
    }

    /// Load a little-endian `f32` weight file.
    pub fn load(
        path: impl AsRef<Path>,
        vocab: usize,
        dim: usize,
        context_window: usize,
    ) -> Result<Self, OracleError> {
        let raw = loader::load_f32_file(path.as_ref())
            .map_err(|e| OracleError::Weights(format!("{}: {e}", path.as_ref().display())))?;
        tracing::info!(path = %path.as_ref().display(), values = raw.len(), "loaded weights");
        Self::from_raw(vocab, dim, context_window, raw)
    }

    fn embedding(&self, id: TokenId) -> Result<&[f32], OracleError> {
        let start = id as usize * self.dim;
        self.weights
            .get(start..start + self.dim)
            .ok_or_else(|| OracleError::Backend(format!("token {id} outside embedding table")))
    }

    /// `out = w · h + b`
    fn project(&self, hidden: &[f32], out: &mut Vec<f32>) {
        for (row, b) in self.weights.chunks_exact(self.dim).zip(&self.bias) {
            let dot: f32 = row.iter().zip(hidden).map(|(w, h)| w * h).sum();
            out.push(dot + b);
        }
    }
}

impl LogitsOracle for TiedEmbeddingOracle {
    fn context_window(&self) -> usize {
        self.context_window
    }

    fn vocab_size(&self) -> usize {
        self.vocab
    }

    fn predict(&self, window: &[TokenId]) -> Result<Logits, OracleError> {
        if window.len() > self.context_window {
            return Err(OracleError::Backend(format!(
                "window of {} exceeds context {}",
                window.len(),
                self.context_window
            )));
        }
        let mut data = Vec::with_capacity(window.len() * self.vocab);
        let mut sum = vec![0.0f32; self.dim];
        let mut hidden = vec![0.0f32; self.dim];
        for (i, &id) in window.iter().enumerate() {
            for (s, e) in sum.iter_mut().zip(self.embedding(id)?) {
                *s += e;
            }
            let n = (i + 1) as f32;
            for (h, s) in hidden.iter_mut().zip(&sum) {
                *h = s / n;
            }
            self.project(&hidden, &mut data);
        }
        Logits::new(window.len(), self.vocab, data)
    }
}
