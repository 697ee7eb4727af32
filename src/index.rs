//! Collects the index entries for every story and series, and the set of
//! every tag encountered along the way.

use std::collections::BTreeSet;

use crate::series::PartLink;
use crate::story::Story;

/// An entry on the index page: either a standalone story or a whole series.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub title: String,
    pub author: String,
    pub date: String,

    /// The page to link to. For a series, this is its first chapter.
    pub url: String,

    pub tags: Vec<String>,
    pub reading_time: u64,
    pub description: String,
    pub is_series: bool,

    /// Every part of a series in order; empty for standalone stories.
    pub parts: Vec<PartLink>,
}

impl Summary {
    /// The index entry for a standalone story written to `url`.
    pub fn story(story: &Story, url: String) -> Summary {
        Summary {
            title: story.title.clone(),
            author: story.author.clone(),
            date: story.date.clone(),
            url,
            tags: story.tags.clone(),
            reading_time: story.reading_time,
            description: story.description(),
            is_series: false,
            parts: Vec::new(),
        }
    }
}

/// Accumulates [`Summary`] entries in encounter order.
#[derive(Debug, Default)]
pub struct Index {
    summaries: Vec<Summary>,
    tags: BTreeSet<String>,
}

impl Index {
    pub fn push(&mut self, summary: Summary) {
        self.tags.extend(summary.tags.iter().cloned());
        self.summaries.push(summary);
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Returns the summaries sorted by date, newest first, and every
    /// distinct tag in lexicographic order. Entries sharing a date keep
    /// their encounter order.
    pub fn finish(self) -> (Vec<Summary>, Vec<String>) {
        let mut summaries = self.summaries;
        summaries.sort_by(|a, b| b.date.cmp(&a.date));
        (summaries, self.tags.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn summary(title: &str, date: &str, tags: &[&str]) -> Summary {
        Summary {
            title: title.to_owned(),
            author: String::from("Ghost"),
            date: date.to_owned(),
            url: format!("{}.html", title),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            reading_time: 1,
            description: String::new(),
            is_series: false,
            parts: Vec::new(),
        }
    }

    #[test]
    fn test_sorted_newest_first() {
        let mut index = Index::default();
        index.push(summary("january", "2024-01-01", &[]));
        index.push(summary("march", "2024-03-01", &[]));
        index.push(summary("february", "2024-02-01", &[]));
        let (summaries, _) = index.finish();
        let titles: Vec<&str> = summaries.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(vec!["march", "february", "january"], titles);
    }

    #[test]
    fn test_equal_dates_keep_encounter_order() {
        let mut index = Index::default();
        index.push(summary("b", "2024-01-01", &[]));
        index.push(summary("newer", "2024-05-01", &[]));
        index.push(summary("a", "2024-01-01", &[]));
        index.push(summary("c", "2024-01-01", &[]));
        let (summaries, _) = index.finish();
        let titles: Vec<&str> = summaries.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(vec!["newer", "b", "a", "c"], titles);
    }

    #[test]
    fn test_empty_index() {
        let mut index = Index::default();
        assert!(index.is_empty());
        index.push(summary("one", "2024-01-01", &[]));
        assert!(!index.is_empty());
        assert_eq!(1, index.len());
    }

    #[test]
    fn test_tags_are_sorted_and_distinct() {
        let mut index = Index::default();
        index.push(summary("one", "2024-01-01", &["sea", "fog"]));
        index.push(summary("two", "2024-01-02", &["night", "sea"]));
        assert_eq!(2, index.len());
        let (_, tags) = index.finish();
        assert_eq!(vec!["fog", "night", "sea"], tags);
    }

    #[test]
    fn test_story_summary() {
        let story = Story {
            title: String::from("Lighthouse"),
            author: String::from("Anna"),
            date: String::from("2024-03-01"),
            tags: vec![String::from("sea")],
            reading_time: 4,
            html: String::from("<p>x</p>"),
            story_name: None,
        };
        let summary = Summary::story(&story, story.file_name());
        assert_eq!("lighthouse.html", summary.url);
        assert_eq!("Anna • 2024-03-01 • 4 min read", summary.description);
        assert!(!summary.is_series);
        assert!(summary.parts.is_empty());
    }
}
