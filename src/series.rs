//! Groups the Markdown files of one folder into an ordered, linked
//! [`Series`]. Chapters are ordered by file name; each chapter links forward
//! to the next one, and the series rolls up its chapters' tags and reading
//! times.

use std::fs::read_dir;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::index::Summary;
use crate::story::{self, is_markdown, Processor, Story};
use crate::tag;

/// A link to one part of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct PartLink {
    pub title: String,
    pub url: String,
}

/// One chapter of a series together with its output location and its
/// forward link.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub story: Story,

    /// The chapter's output file name: `{series_slug}-{chapter_slug}.html`.
    pub file_name: String,

    /// The following chapter, or `None` for the last one.
    pub next_part: Option<PartLink>,
}

impl Chapter {
    /// The title shown on the chapter's page: `{series} — {chapter}`.
    pub fn page_title(&self, series_title: &str) -> String {
        format!("{} — {}", series_title, self.story.title)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub title: String,
    pub slug: String,

    /// The first chapter's author.
    pub author: String,

    /// The first chapter's date.
    pub date: String,

    /// The sorted union of every chapter's tags.
    pub tags: Vec<String>,

    /// The sum of every chapter's reading time.
    pub reading_time: u64,

    /// Never empty.
    pub chapters: Vec<Chapter>,
}

impl Series {
    /// Parses the series in `folder`. Returns `Ok(None)` when the folder
    /// holds no Markdown files.
    ///
    /// The series title is the first chapter's `story_name`, falling back to
    /// the folder name. Later chapters that don't declare an author or a
    /// `story_name` inherit the series' values.
    pub fn parse(folder: &Path, processor: &Processor) -> story::Result<Option<Series>> {
        let files = chapter_files(folder)?;
        let (first, rest) = match files.split_first() {
            Some(split) => split,
            None => {
                debug!(folder = %folder.display(), "no chapters; skipping folder");
                return Ok(None);
            }
        };

        let mut head = processor.parse(first)?;
        let title = head
            .story_name
            .clone()
            .unwrap_or_else(|| folder_name(folder));
        head.story_name = Some(title.clone());

        let author = head.author.clone();
        let inherit = processor.with_series(&author, &title);
        let mut stories = Vec::with_capacity(files.len());
        stories.push(head);
        for file in rest {
            stories.push(inherit.parse(file)?);
        }

        Ok(Series::assemble(title, stories))
    }

    /// Links `stories` (in order) into a series titled `title`. Returns
    /// `None` if there are no stories.
    pub fn assemble(title: String, stories: Vec<Story>) -> Option<Series> {
        let first = stories.first()?;
        let slug = slug::slugify(&title);
        let author = first.author.clone();
        let date = first.date.clone();
        let tags = tag::union(stories.iter().map(|s| s.tags.as_slice()));
        let reading_time = stories.iter().map(|s| s.reading_time).sum();

        let file_names: Vec<String> = stories
            .iter()
            .map(|s| chapter_file_name(&slug, &s.title))
            .collect();
        let links: Vec<PartLink> = stories
            .iter()
            .zip(&file_names)
            .map(|(s, file_name)| PartLink {
                title: s.title.clone(),
                url: file_name.clone(),
            })
            .collect();

        let chapters = stories
            .into_iter()
            .zip(file_names)
            .enumerate()
            .map(|(i, (story, file_name))| Chapter {
                story,
                file_name,
                next_part: links.get(i + 1).cloned(),
            })
            .collect();

        Some(Series {
            title,
            slug,
            author,
            date,
            tags,
            reading_time,
            chapters,
        })
    }

    /// Links to every part, in chapter order.
    pub fn parts(&self) -> Vec<PartLink> {
        self.chapters
            .iter()
            .map(|c| PartLink {
                title: c.story.title.clone(),
                url: c.file_name.clone(),
            })
            .collect()
    }

    /// The series' index entry. It links to the first chapter.
    pub fn summary(&self) -> Summary {
        Summary {
            title: self.title.clone(),
            author: self.author.clone(),
            date: self.date.clone(),
            url: self.chapters[0].file_name.clone(),
            tags: self.tags.clone(),
            reading_time: self.reading_time,
            description: story::description(&self.author, &self.date, self.reading_time),
            is_series: true,
            parts: self.parts(),
        }
    }
}

/// The output file name for a chapter: `{series_slug}-{chapter_slug}.html`.
pub fn chapter_file_name(series_slug: &str, chapter_title: &str) -> String {
    format!("{}-{}.html", series_slug, slug::slugify(chapter_title))
}

/// Lists the Markdown files directly inside `folder`, sorted by name.
fn chapter_files(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for result in read_dir(folder)? {
        let entry = result?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_markdown(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
