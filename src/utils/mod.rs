//! Shared utility data structures.
//!
//! This module hosts the generic building blocks used across the engine.
//! Currently that is the persistent [`TrieMap`] backing program states.

mod triemap;

pub use triemap::TrieMap;
