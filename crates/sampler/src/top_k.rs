/// Keep exactly `k` candidates, or all of them when fewer are ranked.
pub fn cutoff(k: usize, ranked_len: usize) -> usize {
    k.min(ranked_len)
}
