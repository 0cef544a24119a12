//! The library code for the `mdmigrate` content migration tool. The work
//! breaks down into two independent pipelines:
//!
//! 1. Migration ([`crate::migrate`]): walk a tree of legacy Markdown files,
//!    parse each file's frontmatter ([`crate::frontmatter`]), rebuild it in
//!    the canonical form for its category ([`crate::normalize`]), placing docs
//!    in their sidebar position ([`crate::sidebar`]), and write the result to
//!    a mirrored tree.
//! 2. Publishing ([`crate::collection`], [`crate::blog`], [`crate::feed`]):
//!    load the migrated blog collection, derive each post's date and URL from
//!    its file name, order the posts newest first, and emit the RSS feed.
//!
//! After a site build, [`crate::status`] checks the built page and image
//! counts and produces the migration status report.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod blog;
pub mod collection;
pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod migrate;
pub mod normalize;
pub mod sidebar;
pub mod status;
