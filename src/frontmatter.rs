//! Defines the [`Document`] and [`RawFrontmatter`] types and the logic for
//! splitting a Markdown source file into its leading frontmatter block and its
//! body. Frontmatter is read leniently: only flat `key: value` lines are
//! recognized and a document without a block is passed through untouched.

use log::warn;
use std::path::{Path, PathBuf};

/// The delimiter line which opens and closes a frontmatter block.
pub const FENCE: &str = "---";

/// A Markdown source file split into frontmatter and body.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// The path of the document relative to the root of its source tree.
    pub source_path: PathBuf,

    /// The raw frontmatter block, or `None` when the document doesn't begin
    /// with a `---` fence.
    pub frontmatter: Option<RawFrontmatter>,

    /// Everything after the closing fence, starting with the line break that
    /// followed it. When there's no frontmatter this is the whole document.
    pub body: String,
}

impl Document {
    /// Parses a [`Document`] from the contents of a source file. A missing
    /// frontmatter block is logged as a warning and the whole input becomes
    /// the body.
    pub fn parse(source_path: &Path, input: &str) -> Document {
        let (block, body) = split(input);
        if block.is_none() {
            warn!("No frontmatter found in {}", source_path.display());
        }
        Document {
            source_path: source_path.to_owned(),
            frontmatter: block.map(RawFrontmatter::new),
            body: body.to_owned(),
        }
    }
}

/// Splits `input` into its frontmatter block (without fences) and its body.
/// The first line must be exactly `---`; the block ends at the next line that
/// is exactly `---`. If either fence is missing, the block is `None` and the
/// body is the whole input.
pub fn split(input: &str) -> (Option<&str>, &str) {
    let first_line_end = match input.find('\n') {
        Some(i) => i,
        None => return (None, input),
    };
    if trim_line_ending(&input[..first_line_end]) != FENCE {
        return (None, input);
    }

    let block_start = first_line_end + 1;
    let mut offset = block_start;
    for line in input[block_start..].split_inclusive('\n') {
        if trim_line_ending(line) == FENCE {
            let block = trim_line_ending(&input[block_start..offset]);
            return (Some(block), &input[offset + FENCE.len()..]);
        }
        offset += line.len();
    }
    (None, input)
}

fn trim_line_ending(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

/// The literal text between the fences of a frontmatter block.
#[derive(Clone, Debug, PartialEq)]
pub struct RawFrontmatter {
    block: String,
}

impl RawFrontmatter {
    pub fn new(block: &str) -> RawFrontmatter {
        RawFrontmatter {
            block: block.to_owned(),
        }
    }

    /// Looks up the first flat `key: value` line for `key` and returns its
    /// value with whitespace and surrounding quotes removed. Indented lines
    /// belong to nested structures and are never matched. Empty values are
    /// treated as absent.
    pub fn field(&self, key: &str) -> Option<String> {
        for line in self.block.lines() {
            if let Some(rest) = line.strip_prefix(key).and_then(|r| r.strip_prefix(':')) {
                let value = unquote(rest.trim());
                return match value.is_empty() {
                    true => None,
                    false => Some(value),
                };
            }
        }
        None
    }
}

/// The recognized fields of a frontmatter block. Each one is extracted
/// independently of the others.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub layout: Option<String>,
}

impl From<&RawFrontmatter> for RawFields {
    fn from(frontmatter: &RawFrontmatter) -> RawFields {
        RawFields {
            title: frontmatter.field("title"),
            description: frontmatter.field("description"),
            author: frontmatter.field("author"),
            image: frontmatter.field("image"),
            layout: frontmatter.field("layout"),
        }
    }
}

// A value in matching double quotes is a YAML double-quoted scalar, so its
// escapes are undone; this keeps re-normalization from escaping twice.
fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return unescape(&value[1..value.len() - 1]);
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return value[1..value.len() - 1].replace("''", "'");
    }
    let value = value
        .strip_prefix(|c: char| c == '"' || c == '\'')
        .unwrap_or(value);
    let value = value
        .strip_suffix(|c: char| c == '"' || c == '\'')
        .unwrap_or(value);
    value.trim().to_owned()
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split() {
        let (block, body) = split("---\ntitle: Hello\n---\n# Hello\n");
        assert_eq!(Some("title: Hello"), block);
        assert_eq!("\n# Hello\n", body);
    }

    #[test]
    fn test_split_crlf() {
        let (block, body) = split("---\r\ntitle: Hello\r\n---\r\nbody");
        assert_eq!(Some("title: Hello"), block);
        assert_eq!("\r\nbody", body);
    }

    #[test]
    fn test_split_empty_block() {
        let (block, body) = split("---\n---\nbody");
        assert_eq!(Some(""), block);
        assert_eq!("\nbody", body);
    }

    #[test]
    fn test_split_missing_start_fence() {
        let input = "# Hello\n---\ntitle: nope\n---\n";
        assert_eq!((None, input), split(input));
    }

    #[test]
    fn test_split_missing_end_fence() {
        let input = "---\ntitle: Hello\n# Hello\n";
        assert_eq!((None, input), split(input));
    }

    #[test]
    fn test_split_fence_must_be_whole_line() {
        let input = "---\ntitle: Hello\n----\nbody\n";
        assert_eq!((None, input), split(input));
    }

    #[test]
    fn test_parse_without_frontmatter_passes_through() {
        let input = "Just text.\n";
        let document = Document::parse(Path::new("plain.md"), input);
        assert_eq!(None, document.frontmatter);
        assert_eq!(input, document.body);
    }

    #[test]
    fn test_parse_warns_without_frontmatter() {
        testing_logger::setup();
        Document::parse(Path::new("tutorials/first-flow.md"), "# First flow\n");
        Document::parse(Path::new("index.md"), "---\ntitle: Home\n---\n");
        testing_logger::validate(|logs| {
            assert_eq!(1, logs.len());
            assert_eq!(log::Level::Warn, logs[0].level);
            assert_eq!("No frontmatter found in tutorials/first-flow.md", logs[0].body);
        });
    }

    #[test]
    fn test_field_quoting() {
        let raw = RawFrontmatter::new(concat!(
            "title: \"Nick O\\\"Leary\"\n",
            "description: 'It''s here'\n",
            "author:   dave  \n",
            "image: \"/images/a.png\n",
            "layout: \"\"",
        ));
        assert_eq!(Some(String::from("Nick O\"Leary")), raw.field("title"));
        assert_eq!(Some(String::from("It's here")), raw.field("description"));
        assert_eq!(Some(String::from("dave")), raw.field("author"));
        assert_eq!(Some(String::from("/images/a.png")), raw.field("image"));
        assert_eq!(None, raw.field("layout"));
    }

    #[test]
    fn test_field_ignores_nested_and_prefixed_keys() {
        let raw = RawFrontmatter::new("subtitle: nope\nsidebar:\n  title: nested\n");
        assert_eq!(None, raw.field("title"));
    }

    #[test]
    fn test_fields_are_independent() {
        let raw = RawFrontmatter::new("description: \"x\"\nlayout: page");
        let fields = RawFields::from(&raw);
        assert_eq!(
            RawFields {
                description: Some(String::from("x")),
                layout: Some(String::from("page")),
                ..RawFields::default()
            },
            fields
        );
    }

    #[test]
    fn test_unescape_keeps_unknown_escapes() {
        assert_eq!("C:\\path \"q\" \\", unescape("C:\\path \\\"q\\\" \\\\"));
    }
}
