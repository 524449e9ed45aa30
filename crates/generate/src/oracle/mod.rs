//! Concrete `LogitsOracle` backends.
//!
//! The real transformer lives outside this workspace; these two stand in
//! for it. `TiedEmbeddingOracle` runs from a weight file so the binary
//! works end to end, `TransitionOracle` is a scripted table for tests.

mod embedding;
mod transition;

pub use embedding::TiedEmbeddingOracle;
pub use transition::TransitionOracle;
