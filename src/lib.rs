//! The library code for the `ghostlib` static site generator, which turns a
//! directory of Markdown stories into a flat HTML archive. The architecture
//! is a single linear pipeline:
//!
//! 1. Parsing stories from source files on disk ([`crate::story`]), with the
//!    frontmatter ([`crate::frontmatter`]), tag ([`crate::tag`]) and
//!    Markdown ([`crate::markdown`]) helpers
//! 2. Grouping the files of each subdirectory into a linked series
//!    ([`crate::series`])
//! 3. Rendering every page and the index to disk ([`crate::write`]) and
//!    writing the Atom feed ([`crate::feed`])
//!
//! [`crate::build::build_site`] drives the whole thing. Each story file
//! directly inside the source directory becomes one page; each
//! subdirectory becomes a series with one page per chapter. The index lists
//! every story and series, newest first.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod index;
pub mod markdown;
pub mod series;
pub mod story;
pub mod tag;
pub mod value;
pub mod write;
