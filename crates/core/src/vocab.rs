use std::collections::HashMap;
use std::path::Path;

use crate::{GenError, GenResult, TokenId};

/// Sentinel for words the tokenizer could not place.
pub const UNK_TOKEN: &str = "<unk>";
/// Sentinel for a line break.
pub const NEWLINE_TOKEN: &str = "\n";

/// Ordered token table with a bijective string <-> ID mapping.
///
/// Built once, immutable afterwards. The two sentinels always occupy the
/// last two IDs, `<unk>` first.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, TokenId>,
}

impl Vocabulary {
    /// Parse a vocabulary file body (`token count` per line).
    ///
    /// Splits on `'\n'` without dropping the empty segment after a trailing
    /// newline, so IDs line up with models trained against the same file.
    pub fn from_lines(text: &str) -> GenResult<Self> {
        Self::from_tokens(
            text.split('\n')
                .map(|line| line.split(' ').next().unwrap_or_default()),
        )
    }

    /// Read and parse a vocabulary file.
    pub fn load(path: impl AsRef<Path>) -> GenResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let vocab = Self::from_lines(&text)?;
        tracing::info!(path = %path.as_ref().display(), size = vocab.len(), "loaded vocabulary");
        Ok(vocab)
    }

    /// Build from explicit entries, then append `<unk>` and the newline sentinel.
    pub fn from_tokens<I, S>(entries: I) -> GenResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = Vec::new();
        let mut index = HashMap::new();
        let sentinels = [UNK_TOKEN, NEWLINE_TOKEN].map(String::from);
        for token in entries.into_iter().map(Into::<String>::into).chain(sentinels) {
            let id = TokenId::try_from(tokens.len())
                .map_err(|_| GenError::InvalidConfig("vocabulary exceeds u32 ids".into()))?;
            if index.insert(token.clone(), id).is_some() {
                return Err(GenError::DuplicateToken { token });
            }
            tokens.push(token);
        }
        Ok(Self { tokens, index })
    }

    /// Number of entries, sentinels included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Never true: the sentinels are always present.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// ID of `token`, if present.
    pub fn id(&self, token: &str) -> Option<TokenId> {
        self.index.get(token).copied()
    }

    /// Surface text of `id`, if in range.
    pub fn token(&self, id: TokenId) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Surface text of `id`, or `InvalidTokenId`.
    pub fn token_or_err(&self, id: TokenId) -> GenResult<&str> {
        self.token(id).ok_or(GenError::InvalidTokenId(id))
    }

    /// Whether `token` has an entry.
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// ID of the `<unk>` sentinel.
    pub fn unk_id(&self) -> TokenId {
        self.sentinel_id(2)
    }

    /// ID of the newline sentinel.
    pub fn newline_id(&self) -> TokenId {
        self.sentinel_id(1)
    }

    fn sentinel_id(&self, from_end: usize) -> TokenId {
        // len >= 2 by construction and fits u32 (checked in from_tokens)
        (self.tokens.len() - from_end) as TokenId
    }

    /// All entries in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &str)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (i as TokenId, t.as_str()))
    }
}
