//! Loads migrated content collections. Each document's canonical frontmatter
//! is checked against its category's schema ([`DocEntry`], [`BlogEntry`],
//! [`AboutEntry`]) as it's loaded, so migration output that a site build
//! would reject is caught here.

use crate::blog::{sequence, BlogIdentity, Post};
use crate::frontmatter::split;
use crate::normalize::Category;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The doc schema. Sidebar order is carried in its own nested structure.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DocEntry {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sidebar: Option<Sidebar>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Sidebar {
    #[serde(default)]
    pub order: Option<u32>,
}

/// The blog schema.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BlogEntry {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

/// The about-page schema.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AboutEntry {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
}

/// A document in a collection along with its validated frontmatter.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<T> {
    /// The path relative to the collection root without the `.md` extension,
    /// always `/`-separated.
    pub id: String,
    pub data: T,
    pub body: String,
}

/// Loads every Markdown file under `root`, in file-name order, validating
/// its frontmatter as a `T`.
pub fn load<T: DeserializeOwned>(root: &Path) -> Result<Vec<Entry<T>>> {
    let mut entries = Vec::new();
    for result in WalkDir::new(root)
        .follow_links(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = result?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "md") {
            continue;
        }
        let relative_path = path.strip_prefix(root).unwrap_or(path);
        let contents = fs::read_to_string(path).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        let (block, body) = split(&contents);
        let block = block.ok_or_else(|| Error::MissingFrontmatter(path.to_owned()))?;
        let data = serde_yaml::from_str(block).map_err(|err| Error::Schema {
            path: path.to_owned(),
            err,
        })?;
        entries.push(Entry {
            id: entry_id(relative_path),
            data,
            body: body.to_owned(),
        });
    }
    Ok(entries)
}

/// Validates the collection under `root` against the schema of `category`
/// and returns how many entries it holds.
pub fn check(category: Category, root: &Path) -> Result<usize> {
    Ok(match category {
        Category::Docs => load::<DocEntry>(root)?.len(),
        Category::Blog => load::<BlogEntry>(root)?.len(),
        Category::About => load::<AboutEntry>(root)?.len(),
    })
}

/// Loads the blog collection under `root` and returns its posts newest first.
/// Posts whose identifiers carry no usable date are kept (dated today) but
/// reported with a warning.
pub fn load_blog(root: &Path) -> Result<Vec<Post>> {
    let posts = load::<BlogEntry>(root)?
        .into_iter()
        .map(|entry| {
            let identity = BlogIdentity::derive(&entry.id);
            if identity.fallback {
                warn!(
                    "Blog post `{}` has no `YYYY-MM-DD-` date prefix; dating it {} and linking it as {}",
                    entry.id,
                    identity.date,
                    identity.url()
                );
            }
            Post {
                id: entry.id,
                title: entry.data.title,
                author: entry.data.author,
                description: entry.data.description,
                image: entry.data.image,
                draft: entry.data.draft,
                identity,
            }
        })
        .collect();
    Ok(sequence(posts))
}

fn entry_id(relative_path: &Path) -> String {
    relative_path
        .with_extension("")
        .iter()
        .map(|c| c.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// The result of a fallible collection-loading operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a collection.
#[derive(Debug)]
pub enum Error {
    /// Returned when a document doesn't start with a frontmatter block.
    MissingFrontmatter(PathBuf),

    /// Returned when a document's frontmatter doesn't match its schema.
    Schema {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when a document can't be read.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking the collection directory.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingFrontmatter(path) => {
                write!(f, "{}: missing frontmatter", path.display())
            }
            Error::Schema { path, err } => {
                write!(f, "{}: invalid frontmatter: {}", path.display(), err)
            }
            Error::Io { path, err } => {
                write!(f, "Reading '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingFrontmatter(_) => None,
            Error::Schema { path: _, err } => Some(err),
            Error::Io { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator while walking a collection.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
