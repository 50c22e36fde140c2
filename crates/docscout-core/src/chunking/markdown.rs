//! Heading-bounded Markdown chunker.
//!
//! Splits on level-1 and level-2 ATX headings (`# ` and `## `) and never inside
//! fenced code blocks, so code samples that contain `#` comments stay intact.
//! Deeper headings (`###` and below) stay inside their parent section.

use super::Chunk;
use crate::config::{MAX_CHUNK_CHARS, TRUNCATION_MARKER, UNTITLED};
use tracing::instrument;

/// Splits a Markdown document into heading-delimited chunks.
///
/// # Algorithm
///
/// 1. Scan line by line (`\n`, `\r\n` and a lone `\r` all end a line),
///    toggling an in-fence flag on every line whose trimmed text starts with
///    three backticks
/// 2. Outside a fence, a `# ` or `## ` line closes the lines accumulated so far
///    into a chunk titled with the previous heading, then becomes the pending title
/// 3. Whatever remains after the last line is flushed as the final chunk
///
/// Text before the first heading is titled with `source` (or `"(untitled)"`
/// when `source` is empty). Heading lines themselves are not part of any
/// chunk's content.
///
/// # Returns
///
/// Chunks in document order. Empty input returns an empty vector.
#[instrument(skip_all, fields(source = source, text_len = text.len()))]
pub fn chunk_markdown(text: &str, source: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut title = if source.is_empty() {
        UNTITLED.to_string()
    } else {
        source.to_string()
    };
    let mut lines: Vec<&str> = Vec::new();
    let mut in_code_block = false;

    for line in lines_inclusive(text) {
        let stripped = line.trim();

        if stripped.starts_with("```") {
            in_code_block = !in_code_block;
        }

        if !in_code_block && is_section_heading(stripped) {
            if !lines.is_empty() {
                chunks.push(make_chunk(&title, &lines, source));
                lines.clear();
            }
            title = stripped.trim_start_matches('#').trim().to_string();
        } else {
            lines.push(line);
        }
    }

    if !lines.is_empty() {
        chunks.push(make_chunk(&title, &lines, source));
    }

    chunks
}

/// Splits after each line terminator, keeping it on the line.
fn lines_inclusive(text: &str) -> impl Iterator<Item = &str> + '_ {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let end = match rest.find(['\n', '\r']) {
            Some(i) if rest[i..].starts_with("\r\n") => i + 2,
            Some(i) => i + 1,
            None => rest.len(),
        };
        let (line, tail) = rest.split_at(end);
        rest = tail;
        Some(line)
    })
}

/// `# Title` or `## Title`; `###` and deeper do not start a new chunk.
fn is_section_heading(stripped: &str) -> bool {
    stripped.starts_with("# ") || stripped.starts_with("## ")
}

fn make_chunk(title: &str, lines: &[&str], source: &str) -> Chunk {
    let joined = lines.concat();
    Chunk::new(title, truncate_content(joined.trim()), source)
}

/// Cuts content at [`MAX_CHUNK_CHARS`] characters and appends the marker.
fn truncate_content(content: &str) -> String {
    match content.char_indices().nth(MAX_CHUNK_CHARS) {
        Some((byte_idx, _)) => format!("{}{}", &content[..byte_idx], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_splits_on_h1() {
        let md = "# Title A\nHello\n# Title B\nWorld";
        let chunks = chunk_markdown(md, "test.md");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].title, "Title A");
        assert_eq!(chunks[0].content, "Hello");
        assert_eq!(chunks[1].title, "Title B");
        assert_eq!(chunks[1].content, "World");
        assert!(chunks.iter().all(|c| c.source == "test.md"));
    }

    #[test]
    fn test_splits_on_h2() {
        let md = "## First\nAAA\n## Second\nBBB";
        let chunks = chunk_markdown(md, "f.md");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].title, "Second");
    }

    #[test]
    fn test_h3_does_not_split() {
        let md = "## Install\nstep one\n### Linux\nstep two";
        let chunks = chunk_markdown(md, "f.md");
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.contains("### Linux"));
    }

    #[test]
    fn test_preserves_code_blocks() {
        let md = "# Header\nSome text\n```python\n# This is code, not heading\n\
                  def foo():\n    pass\n```\nMore text";
        let chunks = chunk_markdown(md, "f.md");
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.contains("# This is code, not heading"));
        assert!(chunks[0].content.ends_with("More text"));
    }

    #[test]
    fn test_heading_inside_fence_only_block() {
        let md = "# Header\n```\n# not a heading\n```\n";
        let chunks = chunk_markdown(md, "f.md");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].title, "Header");
    }

    #[test]
    fn test_truncates_long_chunks() {
        let md = format!("# Big\n{}", "x".repeat(5000));
        let chunks = chunk_markdown(&md, "f.md");
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            chunks[0].content.chars().count(),
            MAX_CHUNK_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let md = format!("# Wide\n{}", "é".repeat(MAX_CHUNK_CHARS + 10));
        let chunks = chunk_markdown(&md, "f.md");
        let body = chunks[0].content.trim_end_matches(TRUNCATION_MARKER);
        assert_eq!(body.chars().count(), MAX_CHUNK_CHARS);
    }

    #[test]
    fn test_exactly_max_chars_is_not_truncated() {
        let md = "y".repeat(MAX_CHUNK_CHARS);
        let chunks = chunk_markdown(&md, "f.md");
        assert_eq!(chunks[0].content.len(), MAX_CHUNK_CHARS);
        assert!(!chunks[0].content.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_default_title_when_no_heading() {
        let chunks = chunk_markdown("Just some plain text without any heading.", "readme.md");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].title, "readme.md");
        assert!(chunks[0].content.contains("plain text"));
    }

    #[test]
    fn test_untitled_fallback_without_source() {
        let chunks = chunk_markdown("orphan text", "");
        assert_eq!(chunks[0].title, UNTITLED);
    }

    #[test]
    fn test_preamble_before_first_heading() {
        let md = "Intro line\n# Guide\nBody";
        let chunks = chunk_markdown(md, "docs/guide.md");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].title, "docs/guide.md");
        assert_eq!(chunks[0].content, "Intro line");
        assert_eq!(chunks[1].title, "Guide");
    }

    #[test]
    fn test_empty_input() {
        assert!(chunk_markdown("", "empty.md").is_empty());
    }

    #[test]
    fn test_heading_only_document_has_no_chunks() {
        assert!(chunk_markdown("# Lonely heading\n", "f.md").is_empty());
    }

    #[test]
    fn test_windows_line_endings() {
        let md = "# One\r\nfirst\r\n## Two\r\nsecond\r\n";
        let chunks = chunk_markdown(md, "f.md");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].title, "One");
        assert_eq!(chunks[0].content, "first");
        assert_eq!(chunks[1].content, "second");
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let md = "# One\rfirst\r## Two\rsecond";
        let chunks = chunk_markdown(md, "f.md");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].title, "One");
        assert_eq!(chunks[0].content, "first");
        assert_eq!(chunks[1].title, "Two");
        assert_eq!(chunks[1].content, "second");
    }

    #[test]
    fn test_mixed_line_endings_keep_fences() {
        let md = "# A\r```\r# not a heading\r```\n## B\r\nend";
        let chunks = chunk_markdown(md, "f.md");
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].content.contains("# not a heading"));
        assert_eq!(chunks[1].title, "B");
        assert_eq!(chunks[1].content, "end");
    }

    #[test]
    fn test_hash_without_space_is_not_heading() {
        let chunks = chunk_markdown("#hashtag\ntext", "f.md");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].title, "f.md");
        assert!(chunks[0].content.starts_with("#hashtag"));
    }

    #[test]
    fn test_content_reconstructs_document() {
        let md = "Preamble\n\n# Setup\nHow to install\n\n```sh\n# comment\nmake\n```\n\
                  ## Usage\n  indented text\nlast line\n";
        let chunks = chunk_markdown(md, "readme.md");

        let rebuilt: String = chunks.iter().map(|c| c.content.as_str()).collect();
        let without_headings: String = md
            .lines()
            .filter(|l| *l != "# Setup" && *l != "## Usage")
            .collect();

        assert_eq!(strip_whitespace(&rebuilt), strip_whitespace(&without_headings));
    }

    #[test]
    fn test_content_never_exceeds_budget() {
        let big_section = "word ".repeat(1000);
        let md = format!("# A\n{big}\n# B\nshort\n## C\n{big}", big = big_section);
        let limit = MAX_CHUNK_CHARS + TRUNCATION_MARKER.chars().count();
        for chunk in chunk_markdown(&md, "f.md") {
            assert!(chunk.content.chars().count() <= limit);
        }
    }
}
