//! Conversions from the site's types into template [`Value`]s.

use crate::index::Summary;
use crate::series::PartLink;
use crate::story::Story;
use gtmpl::Value;
use std::collections::HashMap;

/// Builds a [`Value::Object`] from key/value pairs.
pub fn object<I>(pairs: I) -> Value
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    Value::Object(
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect::<HashMap<String, Value>>(),
    )
}

/// Converts a string into a [`Value::String`].
pub fn string(s: &str) -> Value {
    Value::String(s.to_owned())
}

/// Converts a list of strings into a [`Value::Array`].
pub fn strings(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| string(s)).collect())
}

/// Converts an optional part link into either an object or [`Value::Nil`].
pub fn part_or_nil(part: &Option<PartLink>) -> Value {
    match part {
        Some(part) => part.into(),
        None => Value::Nil,
    }
}

impl From<&PartLink> for Value {
    fn from(part: &PartLink) -> Value {
        object(vec![
            ("title", string(&part.title)),
            ("url", string(&part.url)),
        ])
    }
}

impl From<&Story> for Value {
    /// The page context for a story. The result is a [`Value::Object`] with
    /// the fields `title`, `author`, `date`, `tags`, `reading_time`, `html`,
    /// `story_name` and `description`.
    fn from(story: &Story) -> Value {
        object(vec![
            ("title", string(&story.title)),
            ("author", string(&story.author)),
            ("date", string(&story.date)),
            ("tags", strings(&story.tags)),
            ("reading_time", Value::from(story.reading_time)),
            ("html", string(&story.html)),
            (
                "story_name",
                match &story.story_name {
                    Some(name) => string(name),
                    None => Value::Nil,
                },
            ),
            ("description", Value::String(story.description())),
        ])
    }
}

impl From<&Summary> for Value {
    /// The index-list context for a story or series. Besides the
    /// [`Summary`] fields, `tags_joined` holds the tags as one
    /// comma-separated string for use in HTML attributes.
    fn from(summary: &Summary) -> Value {
        object(vec![
            ("title", string(&summary.title)),
            ("author", string(&summary.author)),
            ("date", string(&summary.date)),
            ("url", string(&summary.url)),
            ("tags", strings(&summary.tags)),
            ("tags_joined", Value::String(summary.tags.join(","))),
            ("reading_time", Value::from(summary.reading_time)),
            ("description", string(&summary.description)),
            ("is_series", Value::Bool(summary.is_series)),
            (
                "parts",
                Value::Array(summary.parts.iter().map(Value::from).collect()),
            ),
        ])
    }
}
