use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{GenError, GenResult};

/// Knobs for one generation call.
///
/// Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Total sequence length, prompt included.
    pub generate_num: usize,
    /// Logit divisor; 0 selects greedy decoding.
    pub temperature: f32,
    /// Cumulative probability cutoff; 0 disables.
    pub nucleus: f32,
    /// Candidate count cutoff; 0 disables. Ignored when `nucleus > 0`.
    pub topk: usize,
    /// Repetition dampening factor; values <= 0 disable the penalty.
    pub penalty: f32,
    /// Number of surviving candidates reported each step; 0 = silent.
    pub topn: usize,
    /// Seed of the sampling RNG.
    pub seed: u64,
    /// Print only the finished completion instead of every step.
    pub print_once: bool,
    /// Tokens whose logits are forced to the ban value (on top of `<unk>`).
    pub banned_tokens: Vec<String>,
    /// Candidates whose text contains any of these are dropped.
    pub disallowed_substrings: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            generate_num: 256,
            temperature: 0.0,
            nucleus: 0.0,
            topk: 0,
            penalty: 1.2,
            topn: 0,
            seed: 1337,
            print_once: false,
            banned_tokens: vec!["Sco@@".to_string()],
            disallowed_substrings: vec!["http".to_string()],
        }
    }
}

impl GenerationConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json_str(s: &str) -> GenResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> GenResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Greedy decoding picks the top survivor instead of sampling.
    pub fn is_greedy(&self) -> bool {
        self.temperature == 0.0
    }

    /// Reject values the decoder cannot honour.
    pub fn validate(&self) -> GenResult<()> {
        if self.generate_num == 0 {
            return Err(GenError::InvalidConfig("generate_num must be positive".into()));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(GenError::InvalidConfig(format!(
                "temperature must be a finite value >= 0, got {}",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.nucleus) {
            return Err(GenError::InvalidConfig(format!(
                "nucleus must lie in [0, 1], got {}",
                self.nucleus
            )));
        }
        if !self.penalty.is_finite() {
            return Err(GenError::InvalidConfig(format!(
                "penalty must be finite, got {}",
                self.penalty
            )));
        }
        Ok(())
    }

    /// Window fed to an oracle that accepts at most `oracle_window` tokens.
    pub fn effective_window(&self, oracle_window: usize) -> GenResult<usize> {
        match self.generate_num.min(oracle_window) {
            0 => Err(GenError::InvalidConfig("oracle context window is zero".into())),
            w => Ok(w),
        }
    }
}
