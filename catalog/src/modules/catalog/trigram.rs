//! Trigram similarity with the same semantics as PostgreSQL's `pg_trgm`.
//!
//! Text is lower-cased and split into words on non-alphanumeric characters.
//! Every word is padded with two leading spaces and one trailing space and
//! contributes its distinct three-character windows. Similarity is the number
//! of shared trigrams divided by the size of the union of both sets.
//!
//! The in-process search path uses this so that SQLite and the in-memory store
//! rank exactly like `similarity()` does on PostgreSQL.

use std::collections::HashSet;

/// Minimum similarity (exclusive) for a fuzzy match to make a row a candidate.
pub const SIMILARITY_THRESHOLD: f32 = 0.1;

pub type Trigram = [char; 3];

/// Distinct trigrams of `text`.
pub fn trigrams(text: &str) -> HashSet<Trigram> {
    let lowered = text.to_lowercase();
    let mut set = HashSet::new();

    for word in lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();

        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }

    set
}

/// Similarity of two trigram sets, in `[0, 1]`.
pub fn set_similarity(a: &HashSet<Trigram>, b: &HashSet<Trigram>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    shared as f32 / union as f32
}

/// Similarity of two strings, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f32 {
    set_similarity(&trigrams(a), &trigrams(b))
}
