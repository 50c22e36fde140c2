//! TF-IDF keyword ranking for exact term matching.
//!
//! # Algorithm
//!
//! Chunks are tokenized into lowercase word runs (Unicode letters, digits,
//! underscore) over title and content together. For each distinct query token
//! present in a chunk:
//!
//! ```text
//! tf    = count(token, chunk) / max(total_tokens(chunk), 1)
//! idf   = ln((N + 1) / (df(token) + 1)) + 1
//! score = Σ tf × idf
//! ```
//!
//! `N` is the number of chunks and `df` the number of chunks containing the
//! token. Chunks are sorted by descending score with a stable sort, so equal
//! scores keep their original order.

use super::types::Ranker;
use crate::chunking::Chunk;
use crate::error::SearchError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// Lowercases `text` and splits it into word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// TF-IDF ranker. Stateless; every call scores the given chunk set from scratch.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalRanker;

impl LexicalRanker {
    /// Creates a new lexical ranker.
    pub fn new() -> Self {
        Self
    }

    /// Ranks `chunks` against `query` and returns up to `top_k` of them.
    ///
    /// A query with no word tokens returns the first `top_k` chunks unchanged.
    #[instrument(skip_all, fields(chunks = chunks.len(), top_k = top_k))]
    pub fn rank_chunks(&self, query: &str, chunks: &[Chunk], top_k: usize) -> Vec<Chunk> {
        let mut query_tokens = Vec::new();
        let mut seen = HashSet::new();
        for token in tokenize(query) {
            if seen.insert(token.clone()) {
                query_tokens.push(token);
            }
        }

        if query_tokens.is_empty() {
            debug!("Query has no tokens, returning chunks in original order");
            return chunks.iter().take(top_k).cloned().collect();
        }

        let chunk_tokens: Vec<Vec<String>> = chunks
            .iter()
            .map(|c| tokenize(&format!("{} {}", c.title, c.content)))
            .collect();

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for tokens in &chunk_tokens {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for token in unique {
                *doc_freq.entry(token).or_insert(0) += 1;
            }
        }

        let n = chunks.len() as f64;
        let mut scored: Vec<(usize, f64)> = chunk_tokens
            .iter()
            .enumerate()
            .map(|(idx, tokens)| {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for token in tokens {
                    *counts.entry(token.as_str()).or_insert(0) += 1;
                }
                let total = tokens.len().max(1) as f64;

                let score = query_tokens
                    .iter()
                    .filter_map(|qt| {
                        let count = *counts.get(qt.as_str())?;
                        let df = doc_freq.get(qt.as_str()).copied().unwrap_or(0) as f64;
                        let tf = count as f64 / total;
                        let idf = ((n + 1.0) / (df + 1.0)).ln() + 1.0;
                        Some(tf * idf)
                    })
                    .sum();
                (idx, score)
            })
            .collect();

        // Stable: equal scores keep chunk order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .take(top_k)
            .map(|(idx, _)| chunks[idx].clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl Ranker for LexicalRanker {
    fn name(&self) -> &'static str {
        "lexical"
    }

    async fn rank(
        &self,
        query: &str,
        _library: &str,
        chunks: &[Chunk],
        top_k: usize,
    ) -> Result<Vec<Chunk>, SearchError> {
        Ok(self.rank_chunks(query, chunks, top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(title: &str, content: &str) -> Chunk {
        Chunk::new(title, content, "readme.md")
    }

    fn titles(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Hello, World! snake_case v2.0"),
            vec!["hello", "world", "snake_case", "v2", "0"]
        );
        assert_eq!(tokenize("Überblick café"), vec!["überblick", "café"]);
        assert!(tokenize("  ?! -- ").is_empty());
    }

    #[test]
    fn test_setup_query_ranks_setup_first() {
        let chunks = vec![
            chunk("Setup", "How to install"),
            chunk("Usage", "How to use the API"),
        ];
        let ranked = LexicalRanker::new().rank_chunks("install setup", &chunks, 5);
        assert_eq!(titles(&ranked), vec!["Setup", "Usage"]);
    }

    #[test]
    fn test_term_frequency_wins() {
        let chunks = vec![
            chunk("A", "tokio runtime alpha beta gamma"),
            chunk("B", "tokio tokio tokio alpha beta"),
        ];
        let ranked = LexicalRanker::new().rank_chunks("tokio", &chunks, 2);
        assert_eq!(titles(&ranked), vec!["B", "A"]);
    }

    #[test]
    fn test_tokenless_query_keeps_original_order() {
        let chunks = vec![chunk("A", "x"), chunk("B", "y"), chunk("C", "z")];
        let ranked = LexicalRanker::new().rank_chunks("?!", &chunks, 2);
        assert_eq!(titles(&ranked), vec!["A", "B"]);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let chunks = vec![
            chunk("First", "nothing relevant"),
            chunk("Second", "nothing relevant"),
            chunk("Third", "match here"),
        ];
        let ranked = LexicalRanker::new().rank_chunks("match", &chunks, 3);
        assert_eq!(titles(&ranked), vec!["Third", "First", "Second"]);
    }

    #[test]
    fn test_top_k_larger_than_chunk_count() {
        let chunks = vec![chunk("A", "one"), chunk("B", "two")];
        let ranked = LexicalRanker::new().rank_chunks("two", &chunks, 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].title, "B");
    }

    #[test]
    fn test_title_tokens_count() {
        let chunks = vec![chunk("Body", "configure the server"), chunk("Install", "run it")];
        let ranked = LexicalRanker::new().rank_chunks("install", &chunks, 1);
        assert_eq!(titles(&ranked), vec!["Install"]);
    }

    #[test]
    fn test_case_insensitive() {
        let chunks = vec![chunk("A", "nothing"), chunk("B", "RUST Language")];
        let ranked = LexicalRanker::new().rank_chunks("rust", &chunks, 1);
        assert_eq!(titles(&ranked), vec!["B"]);
    }

    #[test]
    fn test_empty_chunks() {
        assert!(LexicalRanker::new().rank_chunks("query", &[], 5).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let chunks: Vec<Chunk> = (0..20)
            .map(|i| chunk(&format!("T{}", i), &format!("alpha beta {}", i % 3)))
            .collect();
        let ranker = LexicalRanker::new();
        let first = ranker.rank_chunks("beta 1", &chunks, 7);
        let second = ranker.rank_chunks("beta 1", &chunks, 7);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_ranker_trait() {
        let chunks = vec![chunk("Setup", "install"), chunk("Usage", "use")];
        let ranker: &dyn Ranker = &LexicalRanker::new();
        let ranked = ranker.rank("use", "o/r", &chunks, 1).await.unwrap();
        assert_eq!(titles(&ranked), vec!["Usage"]);
        assert_eq!(ranker.name(), "lexical");
    }
}
