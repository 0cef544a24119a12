//! Loads the project configuration from `mdmigrate.yaml`. Every field is
//! optional; a project without a configuration file runs on the built-in
//! defaults.

use crate::feed::FeedConfig;
use crate::sidebar::SidebarOrderTable;
use crate::status::ExpectedPages;
use log::debug;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "mdmigrate.yaml";

const DEFAULT_SITE: &str = "https://nodered.org";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Feed {
    title: String,
    description: String,
}

impl Default for Feed {
    fn default() -> Self {
        Feed {
            title: String::from("Node-RED Blog"),
            description: String::from("Low-code programming for event-driven applications"),
        }
    }
}

#[derive(Default, Deserialize)]
struct Project {
    #[serde(default)]
    site: Option<Url>,

    #[serde(default)]
    feed: Feed,

    #[serde(default)]
    blog_page_size: PageSize,

    #[serde(default)]
    expected_pages: ExpectedPages,

    #[serde(default)]
    sidebar_order: Option<SidebarOrderTable>,
}

pub struct Config {
    pub site: Url,
    pub feed_title: String,
    pub feed_description: String,
    pub blog_page_size: usize,
    pub expected_pages: ExpectedPages,
    pub sidebar_order: SidebarOrderTable,
}

impl Config {
    /// Searches `dir` and its ancestors for [`PROJECT_FILE`] and loads the
    /// first one found. Without one, the built-in defaults are used.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.is_file() {
            return Config::from_project_file(&path);
        }
        match dir.parent() {
            Some(parent) => Config::from_directory(parent),
            None => {
                debug!("No `{}` found; using built-in configuration", PROJECT_FILE);
                Config::from_project(Project::default())
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        debug!("Loading configuration from {}", path.display());
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        Config::from_project(project)
    }

    fn from_project(project: Project) -> Result<Config> {
        Ok(Config {
            site: match project.site {
                Some(site) => site,
                None => Url::parse(DEFAULT_SITE)?,
            },
            feed_title: project.feed.title,
            feed_description: project.feed.description,
            blog_page_size: project.blog_page_size.0,
            expected_pages: project.expected_pages,
            sidebar_order: match project.sidebar_order {
                Some(table) => table,
                None => SidebarOrderTable::builtin().map_err(Error::BuiltinSidebarOrder)?,
            },
        })
    }

    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            title: self.feed_title.clone(),
            description: self.feed_description.clone(),
            site: self.site.clone(),
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid.
    Parse {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when the sidebar order table shipped with the binary is
    /// broken.
    BuiltinSidebarOrder(serde_yaml::Error),

    /// Returned when the default site URL doesn't parse.
    UrlParse(url::ParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening project file `{}`: {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Loading configuration `{}`: {}", path.display(), err)
            }
            Error::BuiltinSidebarOrder(err) => {
                write!(f, "Loading built-in sidebar order: {}", err)
            }
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::BuiltinSidebarOrder(err) => Some(err),
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}
