//! Builds canonical frontmatter blocks. Each content [`Category`] has its own
//! field allow-list and defaults, captured by the [`CanonicalFrontmatter`]
//! variants. Normalization never fails: absent required fields get defaults
//! and absent optional fields are dropped.

use crate::frontmatter::{Document, RawFields, FENCE};
use std::fmt;
use std::str::FromStr;

/// The title used when a document doesn't declare one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// The author used when a blog post doesn't declare one.
pub const DEFAULT_AUTHOR: &str = "nick";

/// The kind of content being migrated. Each migration run handles exactly one
/// category; it's never inferred per file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Docs,
    Blog,
    About,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::Docs => "docs",
            Category::Blog => "blog",
            Category::About => "about",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = UnknownCategoryError;

    fn from_str(s: &str) -> Result<Category, UnknownCategoryError> {
        match s {
            "docs" | "doc" => Ok(Category::Docs),
            "blog" => Ok(Category::Blog),
            "about" => Ok(Category::About),
            _ => Err(UnknownCategoryError(s.to_owned())),
        }
    }
}

#[derive(Debug)]
pub struct UnknownCategoryError(String);

impl fmt::Display for UnknownCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unknown category `{}` (expected docs, blog, or about)",
            self.0
        )
    }
}

impl std::error::Error for UnknownCategoryError {}

/// Normalized metadata for a single document.
#[derive(Clone, Debug, PartialEq)]
pub enum CanonicalFrontmatter {
    Doc {
        title: String,
        description: Option<String>,
        sidebar_order: Option<u32>,
    },
    Blog {
        title: String,
        author: String,
        description: Option<String>,
        image: Option<String>,
    },
    About {
        title: String,
        description: Option<String>,
        layout: Option<String>,
    },
}

impl CanonicalFrontmatter {
    /// Applies the `category` schema to the extracted `fields`. The
    /// `sidebar_order` only applies to docs and is ignored otherwise.
    pub fn new(
        category: Category,
        fields: RawFields,
        sidebar_order: Option<u32>,
    ) -> CanonicalFrontmatter {
        let title = fields
            .title
            .unwrap_or_else(|| DEFAULT_TITLE.to_owned());
        match category {
            Category::Docs => CanonicalFrontmatter::Doc {
                title,
                description: fields.description,
                sidebar_order,
            },
            Category::Blog => CanonicalFrontmatter::Blog {
                title,
                author: fields
                    .author
                    .unwrap_or_else(|| DEFAULT_AUTHOR.to_owned()),
                description: fields.description,
                image: fields.image,
            },
            Category::About => CanonicalFrontmatter::About {
                title,
                description: fields.description,
                layout: fields.layout,
            },
        }
    }

    /// Renders the block, fences included. Fields appear in a fixed order with
    /// `title` first, each as a double-quoted scalar.
    pub fn render(&self) -> String {
        let mut out = String::from(FENCE);
        match self {
            CanonicalFrontmatter::Doc {
                title,
                description,
                sidebar_order,
            } => {
                push_field(&mut out, "title", Some(title));
                push_field(&mut out, "description", description.as_ref());
                if let Some(order) = sidebar_order {
                    out.push_str(&format!("\nsidebar:\n  order: {}", order));
                }
            }
            CanonicalFrontmatter::Blog {
                title,
                author,
                description,
                image,
            } => {
                push_field(&mut out, "title", Some(title));
                push_field(&mut out, "author", Some(author));
                push_field(&mut out, "description", description.as_ref());
                push_field(&mut out, "image", image.as_ref());
            }
            CanonicalFrontmatter::About {
                title,
                description,
                layout,
            } => {
                push_field(&mut out, "title", Some(title));
                push_field(&mut out, "description", description.as_ref());
                push_field(&mut out, "layout", layout.as_ref());
            }
        }
        out.push('\n');
        out.push_str(FENCE);
        out
    }
}

fn push_field(out: &mut String, key: &str, value: Option<&String>) {
    if let Some(value) = value {
        out.push('\n');
        out.push_str(key);
        out.push_str(": \"");
        out.push_str(&escape(value));
        out.push('"');
    }
}

/// Escapes a value for use inside a double-quoted scalar.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Returns the migrated text of `document`: its canonical frontmatter followed
/// by the untouched body. Documents without frontmatter come back unchanged.
pub fn normalize(
    document: &Document,
    category: Category,
    sidebar_order: Option<u32>,
) -> String {
    match &document.frontmatter {
        None => document.body.clone(),
        Some(raw) => {
            let canonical =
                CanonicalFrontmatter::new(category, RawFields::from(raw), sidebar_order);
            let mut out = canonical.render();
            out.push_str(&document.body);
            out
        }
    }
}
