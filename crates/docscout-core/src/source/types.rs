//! Typed records decoded from GitHub REST responses.

use crate::error::SourceError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Repository metadata returned by search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub owner: String,
    pub repo: String,
    /// Empty when the repository has no description
    pub description: String,
    pub stars: u64,
    /// `"Unknown"` when GitHub reports no primary language
    pub language: String,
}

impl RepoInfo {
    /// Library identifier in `/owner/repo` form.
    pub fn library_id(&self) -> String {
        format!("/{}/{}", self.owner, self.repo)
    }
}

/// `GET /search/repositories` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    pub name: String,
    pub owner: SearchOwner,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchOwner {
    pub login: String,
}

impl From<SearchItem> for RepoInfo {
    fn from(item: SearchItem) -> Self {
        Self {
            owner: item.owner.login,
            repo: item.name,
            description: item.description.unwrap_or_default(),
            stars: item.stargazers_count,
            language: item.language.unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// One entry of a `GET /repos/{owner}/{repo}/contents/{path}` directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentsEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    /// `"file"`, `"dir"`, `"symlink"` or `"submodule"`
    #[serde(rename = "type")]
    pub kind: String,
}

impl ContentsEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }

    /// A regular file whose name ends in `.md` (any case).
    pub fn is_markdown_file(&self) -> bool {
        self.kind == "file" && self.name.to_lowercase().ends_with(".md")
    }
}

/// The contents endpoint answers with an array for directories and an
/// object for files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ContentsResponse {
    Listing(Vec<ContentsEntry>),
    Other(serde_json::Value),
}

/// A Markdown file found while walking a docs tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Repository-relative path (e.g. `docs/guide/intro.md`)
    pub path: String,
    /// Blob SHA used to fetch the content
    pub sha: String,
}

/// File content as returned by the readme and blob endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlob {
    #[serde(default)]
    pub content: String,
    pub encoding: Option<String>,
}

impl ContentBlob {
    /// Decodes the content to text.
    ///
    /// Base64 content (the default) may contain line breaks, which are
    /// ignored. Invalid UTF-8 is replaced rather than rejected.
    pub fn decode(&self) -> Result<String, SourceError> {
        match self.encoding.as_deref().unwrap_or("base64") {
            "base64" => {
                let cleaned: String = self
                    .content
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                let bytes = STANDARD
                    .decode(cleaned.as_bytes())
                    .map_err(|e| SourceError::Decode(format!("Invalid base64 content: {}", e)))?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => Ok(self.content.clone()),
        }
    }
}

/// `GET /repos/{owner}/{repo}` fields we use.
#[derive(Debug, Deserialize)]
pub(crate) struct RepoDetails {
    pub homepage: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_item_conversion() {
        let json = r#"{
            "items": [
                {"name": "tokio", "owner": {"login": "tokio-rs"}, "description": "Runtime",
                 "stargazers_count": 25000, "language": "Rust"},
                {"name": "bare", "owner": {"login": "someone"}, "description": null,
                 "language": null}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let repos: Vec<RepoInfo> = response.items.into_iter().map(RepoInfo::from).collect();

        assert_eq!(repos[0].library_id(), "/tokio-rs/tokio");
        assert_eq!(repos[0].stars, 25000);
        assert_eq!(repos[1].description, "");
        assert_eq!(repos[1].language, "Unknown");
        assert_eq!(repos[1].stars, 0);
    }

    #[test]
    fn test_contents_response_shapes() {
        let listing = r#"[{"name": "Intro.MD", "path": "docs/Intro.MD", "sha": "a1", "type": "file"},
                          {"name": "api", "path": "docs/api", "sha": "b2", "type": "dir"},
                          {"name": "logo.png", "path": "docs/logo.png", "sha": "c3", "type": "file"}]"#;
        match serde_json::from_str::<ContentsResponse>(listing).unwrap() {
            ContentsResponse::Listing(entries) => {
                assert!(entries[0].is_markdown_file());
                assert!(entries[1].is_dir());
                assert!(!entries[2].is_markdown_file());
            }
            ContentsResponse::Other(_) => panic!("expected a listing"),
        }

        let single = r#"{"name": "docs", "path": "docs", "sha": "x", "type": "file", "content": ""}"#;
        assert!(matches!(
            serde_json::from_str::<ContentsResponse>(single).unwrap(),
            ContentsResponse::Other(_)
        ));
    }

    #[test]
    fn test_blob_decode_base64_with_newlines() {
        let blob = ContentBlob {
            content: "IyBUaXRs\nZQpCb2R5\n".to_string(),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(blob.decode().unwrap(), "# Title\nBody");
    }

    #[test]
    fn test_blob_decode_plain_and_invalid() {
        let plain = ContentBlob {
            content: "raw text".to_string(),
            encoding: Some("utf-8".to_string()),
        };
        assert_eq!(plain.decode().unwrap(), "raw text");

        let invalid = ContentBlob {
            content: "!!!".to_string(),
            encoding: None,
        };
        assert_eq!(invalid.decode().unwrap_err().kind(), "DecodeError");
    }
}
