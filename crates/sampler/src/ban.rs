use ctrl_core::{TokenId, Vocabulary};

/// Logit assigned to hard-banned tokens.
pub const BANNED_LOGIT: f32 = -1e8;

/// Force the logit of every banned ID to `BANNED_LOGIT`.
pub fn apply(logits: &mut [f32], banned: &[TokenId]) {
    for &id in banned {
        if let Some(l) = logits.get_mut(id as usize) {
            *l = BANNED_LOGIT;
        }
    }
}

/// `<unk>` plus every entry of `words` the vocabulary knows.
///
/// Words without an entry cannot be generated anyway and are skipped.
pub fn resolve(vocab: &Vocabulary, words: &[String]) -> Vec<TokenId> {
    let mut ids = vec![vocab.unk_id()];
    for word in words {
        match vocab.id(word) {
            Some(id) if !ids.contains(&id) => ids.push(id),
            Some(_) => {}
            None => tracing::warn!(token = %word, "banned token not in vocabulary, skipping"),
        }
    }
    ids
}
