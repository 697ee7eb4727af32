//! Support for creating an Atom feed from the index entries.

use crate::index::Summary;
use atom_syndication::{Category, Entry, Error as AtomError, Feed, Link, Person};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use std::fmt;
use std::io::Write;
use std::time::UNIX_EPOCH;
use url::{ParseError as UrlParseError, Url};

/// The file name of the feed within the output directory.
pub const FEED_FILE: &str = "feed.atom";

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub title: &'a str,

    /// The site's absolute base URL. It serves as the feed id, and entry
    /// links are resolved against it.
    pub base_url: &'a Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and the sorted
/// index entries and writes the result to a [`std::io::Write`].
pub fn write_feed<W: Write>(config: FeedConfig, summaries: &[Summary], w: W) -> Result<()> {
    feed(config, summaries)?.write_to(w)?;
    Ok(())
}

fn feed(config: FeedConfig, summaries: &[Summary]) -> Result<Feed> {
    let entries = feed_entries(config.base_url, summaries)?;

    // Never the wall clock: rebuilding unchanged input must yield an
    // identical feed.
    let updated = entries
        .iter()
        .map(|entry| *entry.updated())
        .max()
        .unwrap_or_else(epoch);

    let mut feed = Feed::default();
    feed.set_title(config.title.to_owned());
    feed.set_id(config.base_url.to_string());
    feed.set_updated(updated);
    feed.set_links(vec![link(config.base_url.to_string())]);
    feed.set_entries(entries);
    Ok(feed)
}

fn feed_entries(base_url: &Url, summaries: &[Summary]) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::with_capacity(summaries.len());

    for summary in summaries {
        let url = base_url.join(&summary.url)?;
        let date = parse_date(&summary.date).unwrap_or_else(epoch);

        let mut author = Person::default();
        author.set_name(summary.author.clone());

        let mut entry = Entry::default();
        entry.set_id(url.to_string());
        entry.set_title(summary.title.clone());
        entry.set_updated(date);
        entry.set_published(Some(date));
        entry.set_authors(vec![author]);
        entry.set_links(vec![link(url.to_string())]);
        entry.set_categories(
            summary
                .tags
                .iter()
                .map(|tag| {
                    let mut category = Category::default();
                    category.set_term(tag.clone());
                    category
                })
                .collect::<Vec<Category>>(),
        );
        entries.push(entry);
    }
    Ok(entries)
}

fn link(href: String) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel("alternate".to_owned());
    link
}

/// Parses a `YYYY-MM-DD` date as midnight UTC. Free-form dates yield `None`.
fn parse_date(date: &str) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive).into())
}

fn epoch() -> DateTime<FixedOffset> {
    DateTime::<Utc>::from(UNIX_EPOCH).into()
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants include I/O, Atom, and
/// URL issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),

    /// Returned when an entry URL can't be resolved against the base URL.
    UrlParse(UrlParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<UrlParseError> for Error {
    /// Converts [`UrlParseError`]s into [`Error`]. This allows us to use the
    /// `?` operator when joining entry URLs.
    fn from(err: UrlParseError) -> Error {
        Error::UrlParse(err)
    }
}
