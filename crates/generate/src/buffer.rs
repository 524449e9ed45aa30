use ctrl_core::{GenError, GenResult, TokenId};

/// Fixed-length token sequence filled strictly left to right.
///
/// Starts as the prompt followed by zero padding; each decoding step
/// commits exactly one more position. Never shrinks or reorders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBuffer {
    ids: Vec<TokenId>,
    committed: usize,
}

impl TokenBuffer {
    /// Lay out `prompt` in a buffer of `total` positions.
    pub fn new(prompt: &[TokenId], total: usize) -> GenResult<Self> {
        if prompt.is_empty() {
            return Err(GenError::EmptyPrompt);
        }
        if prompt.len() > total {
            return Err(GenError::PromptTooLong {
                prompt: prompt.len(),
                total,
            });
        }
        let mut ids = Vec::with_capacity(total);
        ids.extend_from_slice(prompt);
        ids.resize(total, 0);
        Ok(Self {
            ids,
            committed: prompt.len(),
        })
    }

    /// Every position, padding included.
    pub fn as_slice(&self) -> &[TokenId] {
        &self.ids
    }

    /// Positions written so far.
    pub fn committed(&self) -> &[TokenId] {
        self.ids.get(..self.committed).unwrap_or_default()
    }

    /// Number of committed positions.
    pub fn committed_len(&self) -> usize {
        self.committed
    }

    /// Total length.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Never true once constructed.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All positions committed.
    pub fn is_full(&self) -> bool {
        self.committed == self.ids.len()
    }

    /// Write `id` at the next position and return that position,
    /// or `None` when the buffer is already full.
    pub fn commit(&mut self, id: TokenId) -> Option<usize> {
        let position = self.committed;
        *self.ids.get_mut(position)? = id;
        self.committed += 1;
        Some(position)
    }

    /// Hand back the sequence.
    pub fn into_vec(self) -> Vec<TokenId> {
        self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_then_padding() {
        let b = TokenBuffer::new(&[7, 8], 5).unwrap();
        assert_eq!(b.as_slice(), &[7, 8, 0, 0, 0]);
        assert_eq!(b.committed(), &[7, 8]);
        assert!(!b.is_full());
    }

    #[test]
    fn commits_left_to_right_until_full() {
        let mut b = TokenBuffer::new(&[1], 3).unwrap();
        assert_eq!(b.commit(4), Some(1));
        assert_eq!(b.commit(5), Some(2));
        assert!(b.is_full());
        assert_eq!(b.commit(6), None);
        assert_eq!(b.into_vec(), vec![1, 4, 5]);
    }

    #[test]
    fn rejects_bad_prompts() {
        assert!(matches!(TokenBuffer::new(&[], 4), Err(GenError::EmptyPrompt)));
        assert!(matches!(
            TokenBuffer::new(&[1, 2, 3], 2),
            Err(GenError::PromptTooLong { prompt: 3, total: 2 })
        ));
    }

    #[test]
    fn prompt_may_fill_the_buffer() {
        let b = TokenBuffer::new(&[1, 2], 2).unwrap();
        assert!(b.is_full());
    }
}
