#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
#![deny(missing_docs, unused_must_use)]

//! Autoregressive generation over a fixed-window logits oracle.
//!
//! This crate wires the pieces together: prompt IDs go into a
//! `TokenBuffer`, every step feeds a window of it to the oracle, the
//! sampler pipeline picks the next token, and the finished buffer is
//! detokenized.
//!
//! Layout (important files):
//! - `buffer.rs`: fixed-length sequence buffer
//! - `window.rs`: the sliding-window plan (anchor token + recent context)
//! - `decoder.rs`: `Decoder::generate` / `generate_with`
//! - `loader.rs`: little-endian `f32` weight files
//! - `oracle/`: tied-embedding and scripted oracles
//! - `bin/generate.rs`: `ctrl-generate` CLI

/// Token sequence buffer.
pub mod buffer;
/// Decoder loop.
pub mod decoder;
/// Weight loader (file helpers).
pub mod loader;
/// Concrete oracle backends.
pub mod oracle;
/// Windowing policy.
pub mod window;

pub use buffer::TokenBuffer;
pub use decoder::{Decoder, Generation, Step};
pub use oracle::{TiedEmbeddingOracle, TransitionOracle};

use ctrl_core::{GenResult, TokenId, Vocabulary};
use ctrl_tokenize::Tokenizer;

/// Join a control code and free text the way the model was conditioned:
/// control code first, one space, then the text.
pub fn build_prompt(control_code: &str, text: &str) -> String {
    match (control_code.trim(), text.trim()) {
        ("", t) => t.to_string(),
        (c, "") => c.to_string(),
        (c, t) => format!("{c} {t}"),
    }
}

/// Tokenize and encode a prompt in one go.
pub fn encode_prompt<T: Tokenizer + ?Sized>(
    tokenizer: &T,
    vocab: &Vocabulary,
    control_code: &str,
    text: &str,
) -> GenResult<Vec<TokenId>> {
    ctrl_tokenize::encode(tokenizer, vocab, &build_prompt(control_code, text))
}
