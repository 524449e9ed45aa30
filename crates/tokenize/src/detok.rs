use std::sync::OnceLock;

use ctrl_core::{GenError, GenResult, TokenId, Vocabulary};
use regex::Regex;

use crate::BPE_MARKER;

/// Reassembles BPE pieces: joins with spaces, then deletes `marker + " "`
/// gaps and a marker dangling at the very end.
#[derive(Debug, Clone)]
pub struct Detokenizer {
    gap: Regex,
    trailing: Regex,
}

impl Detokenizer {
    /// Build for an arbitrary continuation marker.
    pub fn new(marker: &str) -> GenResult<Self> {
        let m = regex::escape(marker);
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| GenError::InvalidConfig(e.to_string()))
        };
        Ok(Self {
            gap: compile(format!("{m} "))?,
            trailing: compile(format!("{m} ?$"))?,
        })
    }

    /// Join `tokens` into text.
    pub fn join<S: AsRef<str>>(&self, tokens: &[S]) -> String {
        let joined = tokens.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
        let collapsed = self.gap.replace_all(&joined, "");
        self.trailing.replace(&collapsed, "").into_owned()
    }
}

impl Default for Detokenizer {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self::new(BPE_MARKER).expect("escaped marker always compiles")
    }
}

fn shared() -> &'static Detokenizer {
    static DETOK: OnceLock<Detokenizer> = OnceLock::new();
    DETOK.get_or_init(Detokenizer::default)
}

/// Join surface tokens using the `@@` marker.
pub fn detokenize<S: AsRef<str>>(tokens: &[S]) -> String {
    shared().join(tokens)
}

/// Look up every ID in `vocab`, then detokenize.
pub fn detokenize_ids(vocab: &Vocabulary, ids: &[TokenId]) -> GenResult<String> {
    let tokens = ids
        .iter()
        .map(|&id| vocab.token_or_err(id))
        .collect::<GenResult<Vec<_>>>()?;
    Ok(detokenize(&tokens))
}
