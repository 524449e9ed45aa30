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

//! Shared building blocks for CTRL-style autoregressive generation.
//!
//! The decoder, sampler and tokenizer crates all speak in terms of the
//! types defined here:
//! - `vocab.rs`: bijective token string <-> ID table with the `<unk>` and
//!   newline sentinels
//! - `oracle.rs`: the `LogitsOracle` capability and its `Logits` matrix
//! - `config.rs`: `GenerationConfig`, passed explicitly into a decoder
//! - `error.rs`: `GenError`, the one error type of a generation call
//!
//! Contract: nothing in this crate holds process-wide state.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generation configuration (serde value).
pub mod config;
/// Error types shared by every stage of generation.
pub mod error;
/// Logits oracle interface.
pub mod oracle;
/// Vocabulary table.
pub mod vocab;

pub use config::GenerationConfig;
pub use error::{GenError, GenResult, OracleError};
pub use oracle::{Logits, LogitsOracle};
pub use vocab::{Vocabulary, NEWLINE_TOKEN, UNK_TOKEN};

/// Integer ID of a vocabulary entry.
pub type TokenId = u32;

/// Seeded RNG used for categorical sampling. Same seed, same draws.
pub fn make_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
