//! Splitting of `---` delimited metadata blocks.
//!
//! Used for staged records and for capability definition files.

/// Split `content` into its frontmatter and body.
///
/// Returns `None` when the content does not open with a `---` line or the
/// block is never closed. The returned frontmatter excludes both delimiters;
/// the body starts right after the closing delimiter line.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let content = content.trim_start_matches('\u{feff}');
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    // Empty frontmatter: closing delimiter directly after the opening one
    if let Some(body) = rest.strip_prefix("---") {
        return Some(("", strip_line_end(body)));
    }

    let end = rest.find("\n---")?;
    let frontmatter = &rest[..end];
    let after = &rest[end + 4..];
    Some((frontmatter, strip_line_end(after)))
}

fn strip_line_end(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_block_and_body() {
        let (fm, body) = split("---\ntype: invoice\n---\n\n## Body\n").unwrap();
        assert_eq!(fm, "type: invoice");
        assert_eq!(body, "\n## Body\n");
    }

    #[test]
    fn no_block_returns_none() {
        assert!(split("# Just a heading\n").is_none());
        assert!(split("---\nunterminated: true\n").is_none());
    }

    #[test]
    fn empty_block() {
        let (fm, body) = split("---\n---\nbody").unwrap();
        assert_eq!(fm, "");
        assert_eq!(body, "body");
    }

    #[test]
    fn handles_crlf() {
        let (fm, body) = split("---\r\nname: x\r\n---\r\nbody").unwrap();
        assert_eq!(fm.trim(), "name: x");
        assert_eq!(body, "body");
    }
}
