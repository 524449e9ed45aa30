use std::collections::HashMap;
use std::path::Path;

use ctrl_core::{GenError, GenResult, Vocabulary};

use crate::{Tokenizer, BPE_MARKER};

/// Internal end-of-word marker carried by the last piece during merging.
const END_WORD: &str = "</w>";

/// fastBPE-compatible applier.
///
/// Merge rules come from a codes file (`left right count` per line, earlier
/// lines merge first). With a vocabulary attached, merged pieces the
/// vocabulary does not know are split back along their merge history.
#[derive(Debug, Clone, Default)]
pub struct Bpe {
    ranks: HashMap<String, HashMap<String, usize>>,
    reversed: HashMap<String, (String, String)>,
    limit: Option<Vocabulary>,
}

impl Bpe {
    /// Parse the body of a codes file.
    pub fn from_codes(text: &str) -> GenResult<Self> {
        let mut bpe = Self::default();
        let mut rank = 0usize;
        for (lineno, line) in text.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let (left, right) = match (fields.next(), fields.next()) {
                (None, _) => continue,
                (Some(l), Some(r)) => (l, r),
                (Some(_), None) => {
                    return Err(GenError::InvalidConfig(format!(
                        "codes line {}: expected `left right [count]`",
                        lineno + 1
                    )))
                }
            };
            let slot = bpe.ranks.entry(left.to_string()).or_default();
            if slot.contains_key(right) {
                continue;
            }
            slot.insert(right.to_string(), rank);
            bpe.reversed
                .insert(format!("{left}{right}"), (left.to_string(), right.to_string()));
            rank += 1;
        }
        tracing::debug!(merges = rank, "parsed bpe codes");
        Ok(bpe)
    }

    /// Read and parse a codes file.
    pub fn load(path: impl AsRef<Path>) -> GenResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let bpe = Self::from_codes(&text)?;
        tracing::info!(path = %path.as_ref().display(), merges = bpe.reversed.len(), "loaded bpe codes");
        Ok(bpe)
    }

    /// Restrict output pieces to entries of `vocab`.
    pub fn with_vocab(mut self, vocab: Vocabulary) -> Self {
        self.limit = Some(vocab);
        self
    }

    fn rank(&self, left: &str, right: &str) -> Option<usize> {
        self.ranks.get(left).and_then(|m| m.get(right)).copied()
    }

    /// Merge one whitespace-free word; pieces keep the internal `</w>` form.
    fn merge_word(&self, word: &str) -> Vec<String> {
        let mut pieces: Vec<String> = word.chars().map(String::from).collect();
        if let Some(last) = pieces.last_mut() {
            last.push_str(END_WORD);
        }
        loop {
            let best = pieces
                .windows(2)
                .filter_map(|pair| match pair {
                    [l, r] => self.rank(l, r).map(|rank| (rank, l.clone(), r.clone())),
                    _ => None,
                })
                .min_by_key(|(rank, _, _)| *rank);
            let Some((_, left, right)) = best else { break };

            let mut merged = Vec::with_capacity(pieces.len());
            let mut iter = pieces.into_iter().peekable();
            while let Some(piece) = iter.next() {
                if piece == left {
                    if let Some(next) = iter.next_if(|n| *n == right) {
                        merged.push(piece + &next);
                        continue;
                    }
                }
                merged.push(piece);
            }
            pieces = merged;
        }
        pieces
    }

    /// Vocabulary form of an internal piece.
    fn surface(piece: &str, is_final: bool) -> String {
        if is_final {
            piece.strip_suffix(END_WORD).unwrap_or(piece).to_string()
        } else {
            format!("{piece}{BPE_MARKER}")
        }
    }

    fn limit_vocab(&self, vocab: &Vocabulary, pieces: Vec<String>) -> Vec<String> {
        let count = pieces.len();
        let mut out = Vec::with_capacity(count);
        for (i, piece) in pieces.into_iter().enumerate() {
            let is_final = i + 1 == count;
            if vocab.contains(&Self::surface(&piece, is_final)) {
                out.push(piece);
            } else {
                self.decompose(vocab, piece, is_final, &mut out);
            }
        }
        out
    }

    fn decompose(&self, vocab: &Vocabulary, piece: String, is_final: bool, out: &mut Vec<String>) {
        // single characters have no merge history and are kept as-is
        let Some((left, right)) = self.reversed.get(&piece) else {
            out.push(piece);
            return;
        };
        if vocab.contains(&Self::surface(left, false)) {
            out.push(left.clone());
        } else {
            self.decompose(vocab, left.clone(), false, out);
        }
        if vocab.contains(&Self::surface(right, is_final)) {
            out.push(right.clone());
        } else {
            self.decompose(vocab, right.clone(), is_final, out);
        }
    }

    /// Split one word into marked subwords.
    pub fn apply_word(&self, word: &str) -> Vec<String> {
        let mut pieces = self.merge_word(word);
        if let Some(vocab) = &self.limit {
            pieces = self.limit_vocab(vocab, pieces);
        }
        let count = pieces.len();
        pieces
            .iter()
            .enumerate()
            .map(|(i, p)| Self::surface(p, i + 1 == count))
            .collect()
    }
}

impl Tokenizer for Bpe {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .flat_map(|word| self.apply_word(word))
            .collect()
    }
}
