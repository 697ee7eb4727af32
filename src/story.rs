//! Defines the [`Story`], [`Processor`], and [`Error`] types: the logic for
//! turning a single Markdown source file into normalized story metadata and
//! rendered HTML.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local, NaiveDateTime};
use serde_yaml::Value;
use tracing::trace;

use crate::{config::Config, frontmatter, markdown, tag};

/// The file extension for story source files.
pub const MARKDOWN_EXTENSION: &str = "md";

/// A single parsed story (or series chapter).
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    /// The story's title. Defaults to the source file's stem.
    pub title: String,

    /// The story's author. Defaults to the configured default author, or to
    /// the series author for chapters.
    pub author: String,

    /// The story's date, normally `YYYY-MM-DD`.
    pub date: String,

    /// The story's tags in declaration order.
    pub tags: Vec<String>,

    /// Estimated reading time in whole minutes; never less than one.
    pub reading_time: u64,

    /// The story body rendered as HTML.
    pub html: String,

    /// The name of the series this story belongs to, if any.
    pub story_name: Option<String>,
}

impl Story {
    /// The one-line summary shown under a story's title, e.g.
    /// `Ghost • 2024-03-01 • 4 min read`.
    pub fn description(&self) -> String {
        description(&self.author, &self.date, self.reading_time)
    }

    /// The URL-safe token derived from the title.
    pub fn slug(&self) -> String {
        slug::slugify(&self.title)
    }

    /// The output file name for a standalone (non-series) story.
    pub fn file_name(&self) -> String {
        format!("{}.html", self.slug())
    }
}

/// Formats the `{author} • {date} • {minutes} min read` line shared by
/// stories and series.
pub fn description(author: &str, date: &str, reading_time: u64) -> String {
    format!("{} • {} • {} min read", author, date, reading_time)
}

/// Estimates reading time for a Markdown body: the whitespace-delimited word
/// count divided by `words_per_minute`, rounded half-to-even, and floored at
/// one minute.
pub fn reading_time(text: &str, words_per_minute: u64) -> u64 {
    let words = text.split_whitespace().count() as f64;
    let minutes = (words / words_per_minute.max(1) as f64).round_ties_even() as u64;
    minutes.max(1)
}

/// Parses [`Story`] objects from source files.
#[derive(Debug, Clone)]
pub struct Processor<'a> {
    /// The author for stories that don't declare one.
    default_author: &'a str,

    /// The series name for stories that don't declare one. Only set when
    /// parsing the chapters of a series.
    default_story_name: Option<&'a str>,

    /// The format for dates derived from file timestamps or date-time
    /// frontmatter values.
    date_format: &'a str,

    words_per_minute: u64,
}

impl<'a> Processor<'a> {
    /// Constructs a processor for standalone stories from the site
    /// configuration.
    pub fn new(config: &'a Config) -> Processor<'a> {
        Processor {
            default_author: &config.default_author,
            default_story_name: None,
            date_format: &config.date_format,
            words_per_minute: config.words_per_minute,
        }
    }

    /// Returns a processor whose chapters inherit `author` and `story_name`
    /// when they don't declare their own.
    pub fn with_series<'b>(&self, author: &'b str, story_name: &'b str) -> Processor<'b>
    where
        'a: 'b,
    {
        Processor {
            default_author: author,
            default_story_name: Some(story_name),
            date_format: self.date_format,
            words_per_minute: self.words_per_minute,
        }
    }

    /// Parses a single [`Story`] from the Markdown file at `path`. Errors are
    /// annotated with the path.
    pub fn parse(&self, path: &Path) -> Result<Story> {
        match self._parse(path) {
            Ok(story) => Ok(story),
            Err(e) => Err(Error::Annotated(path.to_owned(), Box::new(e))),
        }
    }

    fn _parse(&self, path: &Path) -> Result<Story> {
        trace!(path = %path.display(), "parsing story");
        let contents = fs::read_to_string(path)?;
        let (meta, body) = frontmatter::parse(&contents)?;

        let text = |value: &Option<Value>| value.as_ref().and_then(frontmatter::text);
        let title = text(&meta.title).unwrap_or_else(|| file_stem(path));
        let author = text(&meta.author).unwrap_or_else(|| self.default_author.to_owned());
        let story_name = text(&meta.story_name)
            .or_else(|| self.default_story_name.map(str::to_owned));
        let date = match text(&meta.date) {
            Some(date) => self.normalize_date(date),
            None => self.modified_date(path)?,
        };

        Ok(Story {
            title,
            author,
            date,
            tags: tag::normalize(meta.tags.as_ref()),
            reading_time: reading_time(body, self.words_per_minute),
            html: markdown::to_html(body),
            story_name,
        })
    }

    /// Reformats values that parse as a date-time; anything else (including
    /// plain `YYYY-MM-DD` dates) is kept verbatim.
    fn normalize_date(&self, date: String) -> String {
        match parse_datetime(&date) {
            Some(datetime) => datetime.format(self.date_format).to_string(),
            None => date,
        }
    }

    fn modified_date(&self, path: &Path) -> Result<String> {
        let modified = fs::metadata(path)?.modified()?;
        Ok(DateTime::<Local>::from(modified)
            .format(self.date_format)
            .to_string())
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Some(datetime.naive_local());
    }
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Returns true if `path` names a Markdown source file (by extension).
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext == MARKDOWN_EXTENSION)
}

/// Represents the result of a [`Story`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Story`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the frontmatter is malformed.
    Frontmatter(frontmatter::Error),

    /// Returned when a source file (or its folder) can't be found or read.
    Io(std::io::Error),

    /// An error annotated with the source path it concerns.
    Annotated(PathBuf, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Frontmatter(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(path, err) => {
                write!(f, "parsing story `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Frontmatter(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<frontmatter::Error> for Error {
    /// Converts a [`frontmatter::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator when splitting frontmatter.
    fn from(err: frontmatter::Error) -> Error {
        Error::Frontmatter(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
