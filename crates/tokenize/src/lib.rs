#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
#![deny(missing_docs, unused_must_use)]

//! Subword tokenization for CTRL-style prompts.
//!
//! - `bpe.rs`: merge-codes table and the vocabulary-limited BPE applier
//! - `detok.rs`: joins subwords back into text by collapsing `@@` markers
//!
//! Tokenizers produce surface strings; `encode` turns them into vocabulary
//! IDs and is the only place an unknown prompt token is detected.

use ctrl_core::{GenError, GenResult, TokenId, Vocabulary};

/// BPE merge table and applier.
pub mod bpe;
/// Detokenization (marker collapsing).
pub mod detok;

pub use bpe::Bpe;
pub use detok::{detokenize, detokenize_ids};

/// Continuation marker appended to every non-final piece of a split word.
pub const BPE_MARKER: &str = "@@";

/// Anything that splits raw text into vocabulary-shaped subwords.
pub trait Tokenizer {
    /// Split `text` into surface tokens.
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Splits on whitespace only; every word must already be a vocabulary entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

/// Tokenize `text` and map every piece to its ID.
///
/// Fails with `UnknownToken` on the first piece absent from `vocab`.
pub fn encode<T: Tokenizer + ?Sized>(
    tokenizer: &T,
    vocab: &Vocabulary,
    text: &str,
) -> GenResult<Vec<TokenId>> {
    let pieces = tokenizer.tokenize(text);
    tracing::debug!(?pieces, "tokenized prompt");
    pieces
        .into_iter()
        .map(|piece| vocab.id(&piece).ok_or(GenError::UnknownToken { token: piece }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_split() {
        let toks = WhitespaceTokenizer.tokenize("  Bitcoin is\tnot \n money ");
        assert_eq!(toks, vec!["Bitcoin", "is", "not", "money"]);
    }

    #[test]
    fn encode_maps_ids_in_order() {
        let vocab = Vocabulary::from_tokens(["is", "Bitcoin"]).unwrap();
        let ids = encode(&WhitespaceTokenizer, &vocab, "Bitcoin is").unwrap();
        assert_eq!(ids, vec![1, 0]);
    }

    #[test]
    fn encode_reports_unknown_token() {
        let vocab = Vocabulary::from_tokens(["is"]).unwrap();
        let err = encode(&WhitespaceTokenizer, &vocab, "is gold").unwrap_err();
        assert!(matches!(err, GenError::UnknownToken { token } if token == "gold"));
    }
}
