//! Defines the [`SidebarOrderTable`], which assigns docs an explicit position
//! within their section's navigation. The table is maintained by hand and is
//! therefore best effort: docs it doesn't list simply have no order.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const BUILTIN: &str = include_str!("../data/sidebar-order.yaml");

/// Maps a section name to the sidebar order of each doc in that section.
/// Doc names are paths relative to the section without the `.md` extension or
/// an `/index` suffix. The table is read-only once built.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SidebarOrderTable(BTreeMap<String, BTreeMap<String, u32>>);

impl SidebarOrderTable {
    /// Loads the table shipped in `data/sidebar-order.yaml`.
    pub fn builtin() -> Result<SidebarOrderTable, serde_yaml::Error> {
        serde_yaml::from_str(BUILTIN)
    }

    /// Returns the order of `file` within `section`, or `None` when either is
    /// missing from the table. `Some(0)` is a real position.
    pub fn resolve(&self, section: &str, file: &str) -> Option<u32> {
        self.0.get(section)?.get(doc_name(file)).copied()
    }

    /// Resolves a doc by its path relative to the docs root. The first
    /// component names the section; a doc at the root has no section.
    pub fn resolve_path(&self, relative_path: &Path) -> Option<u32> {
        let mut components = relative_path.iter();
        let section = components.next()?.to_str()?;
        let file = components
            .map(|c| c.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if file.is_empty() {
            return None;
        }
        self.resolve(section, &file)
    }

    /// Lists the Markdown files under `docs_root` whose order doesn't
    /// resolve, as paths relative to `docs_root`.
    pub fn unlisted(&self, docs_root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
        let mut unlisted = Vec::new();
        for result in WalkDir::new(docs_root)
            .follow_links(true)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = result?;
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            if let Ok(relative_path) = entry.path().strip_prefix(docs_root) {
                if self.resolve_path(relative_path).is_none() {
                    unlisted.push(relative_path.to_owned());
                }
            }
        }
        Ok(unlisted)
    }
}

fn doc_name(file: &str) -> &str {
    let name = file.strip_suffix(".md").unwrap_or(file);
    name.strip_suffix("/index").unwrap_or(name)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "md")
}
