use crate::TokenId;

/// Result alias used across the generation crates.
pub type GenResult<T> = Result<T, GenError>;

/// Failures reported by a logits oracle.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Returned matrix does not match the requested window or vocabulary.
    #[error("malformed logits: expected {expected_rows}x{expected_vocab}, got {rows}x{vocab}")]
    Shape {
        /// rows the decoder asked for (window length)
        expected_rows: usize,
        /// vocabulary size the decoder expects
        expected_vocab: usize,
        /// rows actually returned
        rows: usize,
        /// columns actually returned
        vocab: usize,
    },
    /// Oracle scores a different number of tokens than the vocabulary holds.
    #[error("oracle scores {oracle} tokens but the vocabulary has {vocab}")]
    VocabMismatch {
        /// `LogitsOracle::vocab_size`
        oracle: usize,
        /// `Vocabulary::len`
        vocab: usize,
    },
    /// Weight blob could not be turned into a model.
    #[error("invalid weights: {0}")]
    Weights(String),
    /// Any other backend failure.
    #[error("oracle backend failed: {0}")]
    Backend(String),
}

/// Everything that can abort a single generation call.
///
/// None of these are retried: they are input or configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// A prompt subword has no vocabulary entry.
    #[error("unknown token {token:?} in prompt")]
    UnknownToken {
        /// the offending subword
        token: String,
    },
    /// The sorted cumulative probability never exceeded the nucleus threshold.
    #[error("nucleus threshold {threshold} unreachable (cumulative probability {total})")]
    NucleusUnreachable {
        /// configured threshold
        threshold: f64,
        /// final cumulative probability of the ranked list
        total: f64,
    },
    /// The logits oracle failed or returned a malformed matrix.
    #[error(transparent)]
    Oracle(#[from] OracleError),
    /// Prompt encoded to zero tokens.
    #[error("prompt is empty")]
    EmptyPrompt,
    /// Prompt does not fit in the requested sequence length.
    #[error("prompt has {prompt} tokens but generate_num is {total}")]
    PromptTooLong {
        /// prompt length in tokens
        prompt: usize,
        /// configured total length
        total: usize,
    },
    /// Filtering left no candidate to choose from.
    #[error("no candidate survived filtering at position {position}")]
    NoCandidates {
        /// buffer position being predicted
        position: usize,
    },
    /// Categorical weights could not form a distribution.
    #[error("cannot sample: {0}")]
    Sampling(String),
    /// Token ID outside the vocabulary.
    #[error("token id {0} is outside the vocabulary")]
    InvalidTokenId(TokenId),
    /// Vocabulary contains the same string twice.
    #[error("duplicate vocabulary entry {token:?}")]
    DuplicateToken {
        /// repeated entry
        token: String,
    },
    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// File access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON configuration could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
