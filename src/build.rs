//! Exports the [`build_site`] function which stitches together the steps of
//! building the output site: loading the templates, preparing the output
//! directory, parsing stories and series ([`crate::story`],
//! [`crate::series`]), rendering their pages and the index page
//! ([`crate::write`]), and writing the Atom feed ([`crate::feed`]).

use crate::config::Config;
use crate::feed::{self, write_feed, FeedConfig, FEED_FILE};
use crate::index::{Index, Summary};
use crate::series::Series;
use crate::story::{self, is_markdown, Processor};
use crate::write::{self, load_template, Site, Writer};
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// The template for story and chapter pages.
pub const PAGE_TEMPLATE: &str = "base.html";

/// The template for the index page.
pub const INDEX_TEMPLATE: &str = "index.html";

/// The name of the output subdirectory that receives the static assets.
pub const STATIC_OUTPUT: &str = "static";

/// The version-control directory preserved when the output is cleaned.
const VCS_DIRECTORY: &str = ".git";

/// Counts of what a build produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildStats {
    /// Standalone stories.
    pub stories: usize,

    /// Series (each counted once, however many chapters it has).
    pub series: usize,

    /// Story and chapter pages written, excluding the index.
    pub pages: usize,
}

/// Builds the site from a [`Config`] object. Any error aborts the build;
/// there is no partial-output mode.
pub fn build_site(config: &Config) -> Result<BuildStats> {
    let start = Instant::now();
    info!(
        source = %config.source_directory.display(),
        output = %config.output_directory.display(),
        "starting build"
    );

    // Templates load before the output directory is touched.
    let page_template = load_template(&config.templates_directory.join(PAGE_TEMPLATE))?;
    let index_template = load_template(&config.templates_directory.join(INDEX_TEMPLATE))?;

    prepare_output(&config.output_directory, &config.static_directory)?;

    let writer = Writer {
        page_template: &page_template,
        index_template: &index_template,
        output_directory: &config.output_directory,
        site: Site {
            title: &config.site_title,
            description: &config.index_description,
            base_url: &config.base_url,
        },
    };
    let processor = Processor::new(config);
    let mut index = Index::default();
    let mut stats = BuildStats::default();

    for path in sorted_entries(&config.source_directory)? {
        if path.is_file() && is_markdown(&path) {
            let story = processor.parse(&path)?;
            let file_name = story.file_name();
            debug!(title = %story.title, file = %file_name, "story");
            writer.write_story(&story, &file_name)?;
            index.push(Summary::story(&story, file_name));
            stats.stories += 1;
            stats.pages += 1;
        } else if path.is_dir() {
            let series = match Series::parse(&path, &processor)? {
                Some(series) => series,
                None => continue,
            };
            debug!(
                title = %series.title,
                chapters = series.chapters.len(),
                "series"
            );
            writer.write_series(&series)?;
            index.push(series.summary());
            stats.series += 1;
            stats.pages += series.chapters.len();
        }
    }

    if index.is_empty() {
        warn!(source = %config.source_directory.display(), "no stories found");
    }
    let entries = index.len();
    let (summaries, tags) = index.finish();
    writer.write_index(&summaries, &tags)?;

    if config.feed {
        let path = config.output_directory.join(FEED_FILE);
        let file = File::create(&path).map_err(|err| Error::Io { path, err })?;
        write_feed(
            FeedConfig {
                title: &config.site_title,
                base_url: &config.base_url,
            },
            &summaries,
            file,
        )?;
    }

    info!(
        stories = stats.stories,
        series = stats.series,
        pages = stats.pages,
        entries,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "build complete"
    );
    Ok(stats)
}

/// Empties `output` (keeping any `.git` directory), creating it if it
/// doesn't exist, then copies `static_source` into `{output}/static` when
/// it exists.
pub fn prepare_output(output: &Path, static_source: &Path) -> Result<()> {
    clean_output(output)?;
    if static_source.is_dir() {
        copy_dir(static_source, &output.join(STATIC_OUTPUT))?;
    }
    Ok(())
}

fn clean_output(dir: &Path) -> Result<()> {
    let clean = |err: std::io::Error| Error::Clean {
        path: dir.to_owned(),
        err,
    };
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %dir.display(), "creating output directory");
            return fs::create_dir_all(dir).map_err(clean);
        }
        Err(e) => return Err(clean(e)),
    };

    for result in entries {
        let entry = result.map_err(clean)?;
        if entry.file_name() == VCS_DIRECTORY {
            continue;
        }
        let path = entry.path();
        let removed = match entry.file_type().map_err(clean)?.is_dir() {
            true => fs::remove_dir_all(&path),
            false => fs::remove_file(&path),
        };
        removed.map_err(|err| Error::Clean { path, err })?;
    }
    Ok(())
}

/// Recursively copies `src` into `dst`, overwriting existing files.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for result in WalkDir::new(src) {
        let entry = result?;
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        let copied = match entry.file_type().is_dir() {
            true => fs::create_dir_all(&target),
            false => fs::copy(entry.path(), &target).map(|_| ()),
        };
        copied.map_err(|err| Error::CopyStatic { path: target, err })?;
    }
    Ok(())
}

/// Lists the entries directly inside `dir`, sorted by path.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let read = |err: std::io::Error| Error::ReadSource {
        path: dir.to_owned(),
        err,
    };
    let mut paths = Vec::new();
    for result in fs::read_dir(dir).map_err(read)? {
        paths.push(result.map_err(read)?.path());
    }
    paths.sort();
    Ok(paths)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing,
/// writing, cleaning the output directory, copying static assets, and
/// writing the feed.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors parsing stories or series.
    Parse(story::Error),

    /// Returned for errors loading templates or writing pages.
    Write(write::Error),

    /// Returned for I/O problems while listing the source directory.
    ReadSource { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while copying static assets.
    CopyStatic { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),

    /// Returned for errors writing the feed.
    Feed(feed::Error),

    /// Returned for other I/O errors.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::ReadSource { path, err } => {
                write!(f, "Reading source directory '{}': {}", path.display(), err)
            }
            Error::Clean { path, err } => {
                write!(f, "Cleaning '{}': {}", path.display(), err)
            }
            Error::CopyStatic { path, err } => {
                write!(f, "Copying static file to '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
            Error::Feed(err) => write!(f, "Writing feed: {}", err),
            Error::Io { path, err } => write!(f, "'{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::ReadSource { path: _, err } => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::CopyStatic { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Feed(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

impl From<story::Error> for Error {
    /// Converts [`story::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: story::Error) -> Error {
        Error::Parse(err)
    }
}

impl From<write::Error> for Error {
    /// Converts [`write::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: write::Error) -> Error {
        Error::Write(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<feed::Error> for Error {
    /// Converts [`feed::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: feed::Error) -> Error {
        Error::Feed(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prepare_output_keeps_git_directory() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let project = tempfile::tempdir()?;
        let output = project.path().join("docs");
        fs::create_dir_all(output.join(".git/objects"))?;
        fs::write(output.join(".git/HEAD"), "ref: refs/heads/main")?;
        fs::create_dir_all(output.join("old/nested"))?;
        fs::write(output.join("stale.html"), "stale")?;
        fs::write(output.join("old/nested/file.txt"), "stale")?;

        let static_source = project.path().join("static");
        fs::create_dir_all(static_source.join("fonts"))?;
        fs::write(static_source.join("style.css"), "body {}")?;
        fs::write(static_source.join("fonts/serif.woff"), "font")?;

        prepare_output(&output, &static_source)?;

        assert!(output.join(".git/HEAD").is_file());
        assert!(!output.join("stale.html").exists());
        assert!(!output.join("old").exists());
        assert_eq!("body {}", fs::read_to_string(output.join("static/style.css"))?);
        assert!(output.join("static/fonts/serif.woff").is_file());
        Ok(())
    }

    #[test]
    fn test_prepare_output_creates_missing_directory() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let project = tempfile::tempdir()?;
        let output = project.path().join("deep/docs");
        prepare_output(&output, &project.path().join("no-static"))?;
        assert!(output.is_dir());
        assert!(!output.join(STATIC_OUTPUT).exists());
        Ok(())
    }

    #[test]
    fn test_prepare_output_is_idempotent() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let project = tempfile::tempdir()?;
        let output = project.path().join("docs");
        let static_source = project.path().join("static");
        fs::create_dir_all(&static_source)?;
        fs::write(static_source.join("script.js"), "// v1")?;
        prepare_output(&output, &static_source)?;
        prepare_output(&output, &static_source)?;
        assert_eq!("// v1", fs::read_to_string(output.join("static/script.js"))?);
        Ok(())
    }
}
