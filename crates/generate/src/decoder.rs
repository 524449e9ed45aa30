use ctrl_core::{GenError, GenResult, GenerationConfig, LogitsOracle, OracleError, TokenId, Vocabulary};
use ctrl_sampler::{CandidateFilter, LogitPipeline};
use ctrl_tokenize::detokenize_ids;
use tracing::{debug, info};

use crate::buffer::TokenBuffer;
use crate::window;

/// Finished generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Full sequence, prompt included; length is always `generate_num`.
    pub ids: Vec<TokenId>,
    /// Detokenized `ids`.
    pub text: String,
    /// Number of leading prompt tokens in `ids`.
    pub prompt_len: usize,
}

impl Generation {
    /// Tokens produced by the decoder.
    pub fn new_tokens(&self) -> &[TokenId] {
        self.ids.get(self.prompt_len..).unwrap_or_default()
    }
}

/// One committed token, handed to the step callback.
#[derive(Debug)]
pub struct Step<'a> {
    /// Buffer position just written.
    pub position: usize,
    /// Token written there.
    pub token: TokenId,
    /// Ranked survivors the token was picked from.
    pub candidates: &'a [TokenId],
    /// Committed prefix, `token` included.
    pub committed: &'a [TokenId],
}

/// Autoregressive decoder over an opaque logits oracle.
///
/// Single request, synchronous: each call owns its buffer and RNG, so
/// repeated calls with the same prompt and config give the same output.
pub struct Decoder<'v, O> {
    oracle: O,
    vocab: &'v Vocabulary,
    config: GenerationConfig,
    filter: Option<Box<dyn CandidateFilter + 'v>>,
}

impl<'v, O: LogitsOracle> Decoder<'v, O> {
    /// Validate `config` and check that `oracle` scores exactly `vocab`.
    pub fn new(oracle: O, vocab: &'v Vocabulary, config: GenerationConfig) -> GenResult<Self> {
        config.validate()?;
        if oracle.vocab_size() != vocab.len() {
            return Err(OracleError::VocabMismatch {
                oracle: oracle.vocab_size(),
                vocab: vocab.len(),
            }
            .into());
        }
        config.effective_window(oracle.context_window())?;
        Ok(Self {
            oracle,
            vocab,
            config,
            filter: None,
        })
    }

    /// Replace the substring filter built from `disallowed_substrings`.
    pub fn with_filter(mut self, filter: impl CandidateFilter + 'v) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Borrow the oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Extend `prompt` to `generate_num` tokens.
    pub fn generate(&self, prompt: &[TokenId]) -> GenResult<Generation> {
        self.generate_with(prompt, |_| {})
    }

    /// Like `generate`, calling `on_step` after every committed token.
    pub fn generate_with<F>(&self, prompt: &[TokenId], mut on_step: F) -> GenResult<Generation>
    where
        F: FnMut(&Step<'_>),
    {
        let total = self.config.generate_num;
        let mut buffer = TokenBuffer::new(prompt, total)?;
        let w = self.config.effective_window(self.oracle.context_window())?;

        let mut pipeline = LogitPipeline::new(self.vocab, &self.config);
        if let Some(filter) = &self.filter {
            pipeline = pipeline.with_filter(|id: TokenId, t: &str| filter.allows(id, t));
        }

        info!(prompt_len = prompt.len(), total, window = w, "generating");
        for t in prompt.len() - 1..total - 1 {
            let plan = window::plan(t, w);
            let input = plan
                .gather(buffer.as_slice())
                .ok_or_else(|| GenError::InvalidConfig(format!("window {plan:?} outside buffer of {total}")))?;
            let mut row = self.predict_row(&input, plan.read)?;

            let selection = pipeline.select(&mut row, buffer.committed(), t + 1)?;
            if self.config.topn > 0 {
                self.report(&selection.candidates, selection.token);
            }

            let position = buffer
                .commit(selection.token)
                .ok_or_else(|| GenError::InvalidConfig("buffer overflow".into()))?;
            debug!(position, token = selection.token, "committed");
            on_step(&Step {
                position,
                token: selection.token,
                candidates: &selection.candidates,
                committed: buffer.committed(),
            });
        }

        let ids = buffer.into_vec();
        let text = detokenize_ids(self.vocab, &ids)?;
        info!(tokens = ids.len(), "generation finished");
        Ok(Generation {
            ids,
            text,
            prompt_len: prompt.len(),
        })
    }

    /// Run the oracle and pull out row `read`, checking the shape.
    fn predict_row(&self, input: &[TokenId], read: usize) -> GenResult<Vec<f32>> {
        let logits = self.oracle.predict(input)?;
        let shape_error = || OracleError::Shape {
            expected_rows: input.len(),
            expected_vocab: self.vocab.len(),
            rows: logits.rows(),
            vocab: logits.vocab(),
        };
        if logits.rows() != input.len() || logits.vocab() != self.vocab.len() {
            return Err(shape_error().into());
        }
        logits.row_vec(read).ok_or_else(|| shape_error().into())
    }

    fn report(&self, candidates: &[TokenId], chosen: TokenId) {
        let name = |id: &TokenId| self.vocab.token(*id).unwrap_or("?").to_string();
        let alternatives: Vec<String> = candidates.iter().take(self.config.topn).map(&name).collect();
        info!(?alternatives, "top-n alternatives");
        info!(chosen = %name(&chosen), "chosen word");
    }
}
