//! `ctrl-generate`: extend a control-code prompt with a tied-embedding model.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ctrl_core::{GenerationConfig, Vocabulary};
use ctrl_generate::{encode_prompt, Decoder, TiedEmbeddingOracle};
use ctrl_tokenize::{detokenize_ids, Bpe};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ctrl-generate", about = "Generate text from a control code and a prompt")]
struct Args {
    /// Weight file (little-endian f32: embeddings then bias)
    #[arg(long)]
    model_path: PathBuf,

    /// Vocabulary file (`token count` per line)
    #[arg(long, default_value = "vocab")]
    vocab: PathBuf,

    /// BPE merge codes
    #[arg(long, default_value = "codes")]
    codes: PathBuf,

    /// JSON file with generation settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Control code placed in front of the prompt
    #[arg(long, default_value = "Bitcoin")]
    control_code: String,

    /// Prompt text following the control code
    #[arg(long, default_value = "is not a real money, but")]
    prompt: String,

    /// Embedding width of the weight file
    #[arg(long, default_value_t = 1280)]
    embedding_dim: usize,

    /// Longest window the model accepts
    #[arg(long, default_value_t = 256)]
    context_window: usize,

    /// Random seed for sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Total sequence length in tokens
    #[arg(long)]
    generate_num: Option<usize>,

    /// Sampling temperature; 0 means greedy
    #[arg(long)]
    temperature: Option<f32>,

    /// Cumulative probability cutoff for nucleus sampling; 0 disables
    #[arg(long)]
    nucleus: Option<f32>,

    /// Top-k cutoff; 0 disables
    #[arg(long)]
    topk: Option<usize>,

    /// Repetition penalty
    #[arg(long)]
    penalty: Option<f32>,

    /// Report the top-n candidates at every step
    #[arg(long)]
    topn: Option<usize>,

    /// Print the completion only at the end, not after every token
    #[arg(long)]
    print_once: bool,
}

impl Args {
    fn generation_config(&self) -> Result<GenerationConfig> {
        let mut cfg = match &self.config {
            Some(path) => GenerationConfig::from_json_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => GenerationConfig::default(),
        };
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        if let Some(v) = self.generate_num {
            cfg.generate_num = v;
        }
        if let Some(v) = self.temperature {
            cfg.temperature = v;
        }
        if let Some(v) = self.nucleus {
            cfg.nucleus = v;
        }
        if let Some(v) = self.topk {
            cfg.topk = v;
        }
        if let Some(v) = self.penalty {
            cfg.penalty = v;
        }
        if let Some(v) = self.topn {
            cfg.topn = v;
        }
        cfg.print_once |= self.print_once;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ctrl_generate=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let cfg = args.generation_config()?;
    info!(?cfg, "generation config");

    let vocab = Vocabulary::load(&args.vocab)
        .with_context(|| format!("loading vocabulary {}", args.vocab.display()))?;
    info!("{} unique words", vocab.len());

    let bpe = Bpe::load(&args.codes)
        .with_context(|| format!("loading codes {}", args.codes.display()))?
        .with_vocab(vocab.clone());

    let oracle = TiedEmbeddingOracle::load(&args.model_path, vocab.len(), args.embedding_dim, args.context_window)
        .with_context(|| format!("loading weights {}", args.model_path.display()))?;

    let prompt = encode_prompt(&bpe, &vocab, &args.control_code, &args.prompt)?;
    info!(control_code = %args.control_code, key_words = %args.prompt, tokens = prompt.len(), "start generating");

    let print_once = cfg.print_once;
    let decoder = Decoder::new(oracle, &vocab, cfg)?;
    let mut stdout = std::io::stdout();
    let generation = decoder.generate_with(&prompt, |step| {
        if print_once {
            return;
        }
        if let Ok(text) = detokenize_ids(&vocab, step.committed) {
            let _ = writeln!(stdout, "{text}");
        }
    })?;

    println!("{}", generation.text.trim());
    Ok(())
}
