use crate::index::Summary;
use crate::series::{Chapter, Series};
use crate::story::Story;
use crate::value::{object, part_or_nil, string, strings};
use gtmpl::{Context, Template, Value};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::trace;
use url::Url;

/// The relative URL of the copied static assets, as seen from any page.
pub const STATIC_URL: &str = "static/";

/// The file name of the index page.
pub const INDEX_FILE: &str = "index.html";

/// Site-wide values made available to every template.
pub struct Site<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub base_url: &'a Url,
}

/// Responsible for templating and writing HTML pages to disk.
pub struct Writer<'a> {
    /// The template for story and chapter pages.
    pub page_template: &'a Template,

    /// The template for the index page.
    pub index_template: &'a Template,

    /// The flat directory every page is written into.
    pub output_directory: &'a Path,

    pub site: Site<'a>,
}

impl Writer<'_> {
    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: Page) -> Result<()> {
        let mut value = page.context;
        if let Value::Object(obj) = &mut value {
            obj.insert("site_title".to_owned(), string(self.site.title));
            obj.insert("base_url".to_owned(), string(self.site.base_url.as_str()));
            obj.insert("static_url".to_owned(), string(STATIC_URL));
        }
        let context = Context::from(value).map_err(|e| Error::Template(e.to_string()))?;

        let mut rendered: Vec<u8> = Vec::new();
        page.template
            .execute(&mut rendered, &context)
            .map_err(|e| Error::Template(e.to_string()))?;

        let file_path = self.output_directory.join(&page.file_name);
        trace!(path = %file_path.display(), "writing page");
        fs::write(&file_path, rendered).map_err(|err| Error::Write {
            path: file_path,
            err,
        })
    }

    /// Writes a standalone story to `{output_directory}/{file_name}`.
    pub fn write_story(&self, story: &Story, file_name: &str) -> Result<()> {
        let mut context = Value::from(story);
        if let Value::Object(obj) = &mut context {
            obj.insert("url".to_owned(), string(file_name));
            obj.insert("next_part".to_owned(), Value::Nil);
        }
        self.write_page(Page {
            context,
            file_name: file_name.to_owned(),
            template: self.page_template,
        })
    }

    /// Writes one chapter of `series`. The page title becomes
    /// `{series} — {chapter}` and `next_part` links the following chapter.
    pub fn write_chapter(&self, series: &Series, chapter: &Chapter) -> Result<()> {
        let mut context = Value::from(&chapter.story);
        if let Value::Object(obj) = &mut context {
            obj.insert("title".to_owned(), Value::String(chapter.page_title(&series.title)));
            obj.insert("url".to_owned(), string(&chapter.file_name));
            obj.insert("next_part".to_owned(), part_or_nil(&chapter.next_part));
        }
        self.write_page(Page {
            context,
            file_name: chapter.file_name.clone(),
            template: self.page_template,
        })
    }

    /// Writes every chapter of `series`.
    pub fn write_series(&self, series: &Series) -> Result<()> {
        series
            .chapters
            .iter()
            .try_for_each(|chapter| self.write_chapter(series, chapter))
    }

    /// Writes the index page listing `summaries` (already sorted) and
    /// `tags`.
    pub fn write_index(&self, summaries: &[Summary], tags: &[String]) -> Result<()> {
        self.write_page(Page {
            context: object(vec![
                ("stories", Value::Array(summaries.iter().map(Value::from).collect())),
                ("all_tags", strings(tags)),
                ("title", string(self.site.title)),
                ("description", string(self.site.description)),
            ]),
            file_name: INDEX_FILE.to_owned(),
            template: self.index_template,
        })
    }
}

/// An output HTML file: the template context, the file name within the
/// output directory, and the template to render it with.
struct Page<'a> {
    context: Value,
    file_name: String,
    template: &'a Template,
}

/// Loads and parses the template at `path`.
pub fn load_template(path: &Path) -> Result<Template> {
    let mut contents = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut contents))
        .map_err(|err| Error::MissingTemplate {
            path: path.to_owned(),
            err,
        })?;

    let mut template = Template::default();
    template
        .parse(&contents)
        .map_err(|e| Error::ParseTemplate {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
    Ok(template)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template file can't be opened or read.
    MissingTemplate { path: PathBuf, err: io::Error },

    /// Returned when a template file isn't a valid template.
    ParseTemplate { path: PathBuf, message: String },

    /// An error during templating.
    Template(String),

    /// Returned when an output file can't be written.
    Write { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingTemplate { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate { path, message } => {
                write!(f, "Parsing template file '{}': {}", path.display(), message)
            }
            Error::Template(err) => err.fmt(f),
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingTemplate { path: _, err } => Some(err),
            Error::ParseTemplate { .. } => None,
            Error::Template(_) => None,
            Error::Write { path: _, err } => Some(err),
        }
    }
}
