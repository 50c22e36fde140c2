//! Plain-text rendering of query and resolve results.

use crate::chunking::Chunk;
use crate::config::SECTION_SEPARATOR;
use crate::source::RepoInfo;

/// Renders ranked chunks as `### title` sections, in rank order.
pub fn format_sections(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| format!("### {}\nSource: {}\n\n{}", c.title, c.source, c.content))
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

/// Renders a repository search as a Markdown list, one blank line apart.
pub fn format_repos(repos: &[RepoInfo]) -> String {
    repos
        .iter()
        .map(|r| {
            let description = if r.description.is_empty() {
                "(no description)"
            } else {
                r.description.as_str()
            };
            format!(
                "- **{}**: {}\n  Stars: {} | Language: {}",
                r.library_id(),
                description,
                with_thousands(r.stars),
                r.language
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `1234567` -> `"1,234,567"`.
fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sections() {
        let chunks = vec![
            Chunk::new("Setup", "How to install", "readme.md"),
            Chunk::new("Usage", "How to use the API", "docs/usage.md"),
        ];
        assert_eq!(
            format_sections(&chunks),
            "### Setup\nSource: readme.md\n\nHow to install\n\n---\n\n\
             ### Usage\nSource: docs/usage.md\n\nHow to use the API"
        );
        assert_eq!(format_sections(&[]), "");
    }

    #[test]
    fn test_format_repos() {
        let repos = vec![
            RepoInfo {
                owner: "facebook".into(),
                repo: "react".into(),
                description: "UI library".into(),
                stars: 200_000,
                language: "JavaScript".into(),
            },
            RepoInfo {
                owner: "someone".into(),
                repo: "thing".into(),
                description: String::new(),
                stars: 7,
                language: "Unknown".into(),
            },
        ];
        assert_eq!(
            format_repos(&repos),
            "- **/facebook/react**: UI library\n  Stars: 200,000 | Language: JavaScript\n\n\
             - **/someone/thing**: (no description)\n  Stars: 7 | Language: Unknown"
        );
    }

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1000), "1,000");
        assert_eq!(with_thousands(1_234_567), "1,234,567");
    }
}
