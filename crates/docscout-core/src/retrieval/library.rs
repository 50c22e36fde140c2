//! Library identifiers.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Malformed library identifier. The message is shown to users as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid library_id format: '{raw}'. Expected /{{owner}}/{{repo}}")]
pub struct LibraryIdError {
    pub raw: String,
}

/// A library addressed as `/owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryId {
    owner: String,
    repo: String,
}

impl LibraryId {
    /// Parses `"/owner/repo"`.
    ///
    /// Surrounding whitespace and `/` are ignored; what remains must be
    /// exactly two non-empty segments.
    ///
    /// ```
    /// use docscout_core::retrieval::LibraryId;
    ///
    /// let id = LibraryId::parse("/tokio-rs/tokio/").unwrap();
    /// assert_eq!(id.cache_key(), "tokio-rs/tokio");
    /// assert!(LibraryId::parse("not-valid").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, LibraryIdError> {
        let invalid = || LibraryIdError {
            raw: raw.to_string(),
        };

        let trimmed = raw.trim().trim_matches('/');
        let mut segments = trimmed.split('/');
        let (Some(owner), Some(repo), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(invalid());
        };
        let (owner, repo) = (owner.trim(), repo.trim());
        if owner.is_empty() || repo.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Key under which the library's documents and embeddings are stored.
    pub fn cache_key(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.owner, self.repo)
    }
}

impl FromStr for LibraryId {
    type Err = LibraryIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        for raw in ["/vercel/next.js", "vercel/next.js", "//vercel/next.js//", "  /vercel/next.js "] {
            let id = LibraryId::parse(raw).unwrap();
            assert_eq!(id.owner(), "vercel");
            assert_eq!(id.repo(), "next.js");
            assert_eq!(id.to_string(), "/vercel/next.js");
        }
    }

    #[test]
    fn test_parse_invalid() {
        for raw in ["not-valid", "", "/", "/a/b/c", "/a//b", "a/ /"] {
            let err = LibraryId::parse(raw).unwrap_err();
            assert_eq!(err.raw, raw);
        }
    }

    #[test]
    fn test_error_message() {
        let err = LibraryId::parse("not-valid").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid library_id format: 'not-valid'. Expected /{owner}/{repo}"
        );
    }

    #[test]
    fn test_from_str() {
        let id: LibraryId = "/tokio-rs/axum".parse().unwrap();
        assert_eq!(id.cache_key(), "tokio-rs/axum");
    }
}
