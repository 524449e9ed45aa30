use std::io::Write;

use ctrl_core::{GenerationConfig, LogitsOracle, TokenId, Vocabulary};
use ctrl_generate::{encode_prompt, Decoder, TiedEmbeddingOracle, TransitionOracle};
use ctrl_tokenize::Bpe;

const WORDS: &[&str] = &[
    "Bitcoin", "is", "not", "a", "real", "money@@", ",", "but", "the", "currency", "of", "future",
    ".", "https://", "Sco@@",
];

fn vocab() -> Vocabulary {
    Vocabulary::from_tokens(WORDS.iter().copied()).unwrap()
}

/// Merge rules that assemble `word` left to right.
fn chain(word: &str, is_final: bool, out: &mut String) {
    let mut chars: Vec<String> = word.chars().map(String::from).collect();
    if is_final {
        if let Some(last) = chars.last_mut() {
            last.push_str("</w>");
        }
    }
    let mut acc = chars.remove(0);
    for c in chars {
        out.push_str(&format!("{acc} {c} 1\n"));
        acc.push_str(&c);
    }
}

fn bpe(vocab: &Vocabulary) -> Bpe {
    let mut codes = String::new();
    for w in ["Bitcoin", "is", "not", "real", "but"] {
        chain(w, true, &mut codes);
    }
    chain("money", false, &mut codes);
    Bpe::from_codes(&codes).unwrap().with_vocab(vocab.clone())
}

fn id(v: &Vocabulary, t: &str) -> TokenId {
    v.id(t).unwrap()
}

fn scripted(v: &Vocabulary) -> TransitionOracle {
    TransitionOracle::new(v.len(), 256)
        .prefer(id(v, "but"), id(v, "the"), 4.0)
        .prefer(id(v, "the"), id(v, "currency"), 4.0)
        .prefer(id(v, "currency"), id(v, "of"), 4.0)
        .prefer(id(v, "of"), id(v, "the"), 4.0)
        .prefer(id(v, "of"), id(v, "future"), 3.5)
        .prefer(id(v, "future"), id(v, "."), 4.0)
        .prefer(id(v, "."), id(v, "https://"), 9.0)
        .prefer(id(v, "."), id(v, "Sco@@"), 9.0)
        .prefer(id(v, "."), v.unk_id(), 9.0)
}

#[test]
fn bitcoin_prompt_greedy_scenario() {
    let v = vocab();
    let prompt = encode_prompt(&bpe(&v), &v, "Bitcoin", "is not a real money, but").unwrap();
    assert_eq!(prompt.len(), 8);

    let cfg = GenerationConfig {
        generate_num: 20,
        temperature: 0.0,
        penalty: 1.2,
        ..Default::default()
    };
    let decoder = Decoder::new(scripted(&v), &v, cfg).unwrap();
    let first = decoder.generate(&prompt).unwrap();
    let second = decoder.generate(&prompt).unwrap();

    assert_eq!(first.ids.len(), 20);
    assert_eq!(first, second);
    assert_eq!(&first.ids[..8], &prompt[..]);
    assert!(first.text.starts_with("Bitcoin is not a real money, but the currency of"));
    for banned in [v.unk_id(), id(&v, "Sco@@"), id(&v, "https://")] {
        assert!(!first.ids.contains(&banned));
    }
}

#[test]
fn unit_penalty_matches_unpenalized_run() {
    let v = vocab();
    let prompt = encode_prompt(&bpe(&v), &v, "Bitcoin", "is not a real money, but").unwrap();
    for temperature in [0.0, 0.8] {
        let run = |penalty: f32| {
            let cfg = GenerationConfig {
                generate_num: 30,
                temperature,
                penalty,
                seed: 5,
                ..Default::default()
            };
            Decoder::new(scripted(&v), &v, cfg).unwrap().generate(&prompt).unwrap().ids
        };
        assert_eq!(run(1.0), run(0.0), "temperature {temperature}");
    }
}

#[test]
fn sampling_past_the_context_window() {
    let v = vocab();
    let prompt = encode_prompt(&bpe(&v), &v, "Bitcoin", "is").unwrap();
    let oracle = TransitionOracle::new(v.len(), 6)
        .with_fallback((0..v.len()).map(|i| (i % 5) as f32).collect())
        .unwrap();
    let cfg = GenerationConfig {
        generate_num: 40,
        temperature: 1.0,
        nucleus: 0.9,
        seed: 11,
        ..Default::default()
    };
    let decoder = Decoder::new(oracle, &v, cfg).unwrap();
    let g = decoder.generate(&prompt).unwrap();
    assert_eq!(g.ids.len(), 40);
    assert!(!g.ids.contains(&v.unk_id()));
    assert!(decoder.oracle().windows().iter().all(|w| w.len() == 6));
    // every window past the boundary keeps the control code up front
    assert!(decoder.oracle().windows().iter().all(|w| w[0] == id(&v, "Bitcoin")));
    assert_eq!(decoder.generate(&prompt).unwrap(), g);
}

#[test]
fn tied_embedding_weights_from_disk() {
    let v = vocab();
    let dim = 4;
    let mut f = tempfile::NamedTempFile::new().unwrap();
    let values = (0..v.len() * dim + v.len()).map(|i| ((i * 37 % 11) as f32 - 5.0) / 10.0);
    for x in values {
        f.write_all(&x.to_le_bytes()).unwrap();
    }
    let oracle = TiedEmbeddingOracle::load(f.path(), v.len(), dim, 8).unwrap();
    assert_eq!(oracle.vocab_size(), v.len());

    let prompt = encode_prompt(&bpe(&v), &v, "Bitcoin", "is not").unwrap();
    let cfg = GenerationConfig {
        generate_num: 16,
        temperature: 0.7,
        topk: 5,
        ..Default::default()
    };
    let g = Decoder::new(oracle, &v, cfg).unwrap().generate(&prompt).unwrap();
    assert_eq!(g.ids.len(), 16);
    assert!(!g.ids.contains(&v.unk_id()));
    assert!(!g.ids.contains(&id(&v, "Sco@@")));
    assert!(!g.text.contains("http"));
}
