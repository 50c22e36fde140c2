//! Ranker trait and strategy selection.

use crate::chunking::Chunk;
use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A strategy that orders chunks by relevance to a query.
#[async_trait::async_trait]
pub trait Ranker: Send + Sync {
    /// Short strategy name for logs.
    fn name(&self) -> &'static str;

    /// Returns up to `top_k` chunks, most relevant first.
    ///
    /// `library` is the library's cache key; strategies that persist state
    /// per library (the embedding cache) key it by this value.
    async fn rank(
        &self,
        query: &str,
        library: &str,
        chunks: &[Chunk],
        top_k: usize,
    ) -> Result<Vec<Chunk>, SearchError>;
}

/// Which ranking strategy a service uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankerKind {
    /// TF-IDF over word tokens
    Lexical,
    /// Embedding cosine similarity
    #[default]
    Semantic,
}

impl fmt::Display for RankerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankerKind::Lexical => write!(f, "lexical"),
            RankerKind::Semantic => write!(f, "semantic"),
        }
    }
}

impl FromStr for RankerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" | "tfidf" | "tf-idf" => Ok(RankerKind::Lexical),
            "semantic" | "vector" | "embedding" => Ok(RankerKind::Semantic),
            other => Err(format!(
                "unknown ranker '{}', expected 'lexical' or 'semantic'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranker_kind_parse() {
        assert_eq!("lexical".parse::<RankerKind>().unwrap(), RankerKind::Lexical);
        assert_eq!("TF-IDF".parse::<RankerKind>().unwrap(), RankerKind::Lexical);
        assert_eq!(" Semantic ".parse::<RankerKind>().unwrap(), RankerKind::Semantic);
        assert!("bm25".parse::<RankerKind>().is_err());
    }

    #[test]
    fn test_ranker_kind_display_roundtrips() {
        for kind in [RankerKind::Lexical, RankerKind::Semantic] {
            assert_eq!(kind.to_string().parse::<RankerKind>().unwrap(), kind);
        }
    }
}
