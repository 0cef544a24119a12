//! Exports the [`Migrator`], which mirrors a source tree of Markdown files
//! into a destination tree with every document's frontmatter normalized for
//! one content [`Category`]. Docs, blog posts, and about pages are migrated by
//! separate runs of the same walker.

use crate::frontmatter::Document;
use crate::normalize::{normalize, Category};
use crate::sidebar::SidebarOrderTable;
use log::{debug, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = ".md";

/// Migrates one category of content.
pub struct Migrator<'a> {
    pub category: Category,

    /// Consulted for docs only.
    pub sidebar: &'a SidebarOrderTable,
}

/// Counts for a completed migration run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    /// Markdown files written to the destination.
    pub migrated: usize,

    /// Of `migrated`, the files copied unchanged for lack of frontmatter.
    pub without_frontmatter: usize,

    /// Non-Markdown files left behind.
    pub skipped: usize,
}

impl<'a> Migrator<'a> {
    pub fn new(category: Category, sidebar: &'a SidebarOrderTable) -> Migrator<'a> {
        Migrator { category, sidebar }
    }

    /// Returns the migrated text for the document at `relative_path` (relative
    /// to the source root) with contents `input`.
    pub fn migrate_str(&self, relative_path: &Path, input: &str) -> String {
        self.normalize(&Document::parse(relative_path, input))
    }

    fn normalize(&self, document: &Document) -> String {
        let order = match self.category {
            Category::Docs => self.sidebar.resolve_path(&document.source_path),
            _ => None,
        };
        normalize(document, self.category, order)
    }

    /// Walks `source` and writes the migrated tree under `destination`.
    /// Directories are created as needed and existing ones are reused, so a
    /// run can be repeated over old output. Non-Markdown files aren't copied.
    /// The first filesystem error aborts the run, possibly leaving partial
    /// output behind.
    pub fn run(&self, source: &Path, destination: &Path) -> Result<Summary> {
        info!(
            "Starting {} migration from {} to {}",
            self.category,
            source.display(),
            destination.display()
        );
        create_dir_all(destination)?;

        let mut summary = Summary::default();
        for result in WalkDir::new(source)
            .min_depth(1)
            .follow_links(true)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = result?;
            // strip_prefix() can't fail; every entry is under `source`
            let relative_path = entry.path().strip_prefix(source).unwrap_or(entry.path());
            let target = destination.join(relative_path);

            if entry.file_type().is_dir() {
                create_dir_all(&target)?;
            } else if entry.file_name().to_string_lossy().ends_with(MARKDOWN_EXTENSION) {
                let input = fs::read_to_string(entry.path()).map_err(|err| Error::Read {
                    path: entry.path().to_owned(),
                    err,
                })?;
                let document = Document::parse(relative_path, &input);
                if document.frontmatter.is_none() {
                    summary.without_frontmatter += 1;
                }
                let output = self.normalize(&document);
                if let Some(parent) = target.parent() {
                    create_dir_all(parent)?;
                }
                fs::write(&target, output).map_err(|err| Error::Write {
                    path: target.clone(),
                    err,
                })?;
                info!("Migrated: {}", relative_path.display());
                summary.migrated += 1;
            } else {
                debug!("Skipping non-Markdown file {}", relative_path.display());
                summary.skipped += 1;
            }
        }

        info!(
            "{} migration complete! Migrated {} files.",
            self.category, summary.migrated
        );
        Ok(summary)
    }
}

fn create_dir_all(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| Error::CreateDir {
        path: dir.to_owned(),
        err,
    })
}

/// The result of a fallible migration.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for migrations. Every variant is fatal to the run.
#[derive(Debug)]
pub enum Error {
    /// Returned when a source document can't be read.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when a migrated document can't be written.
    Write { path: PathBuf, err: std::io::Error },

    /// Returned when a destination directory can't be created.
    CreateDir { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking the source tree.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Reading '{}': {}", path.display(), err)
            }
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::CreateDir { path, err } => {
                write!(f, "Creating directory '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
            Error::CreateDir { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator while walking the source tree.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
