//! Splits a story source file into its YAML frontmatter and its Markdown
//! body. The frontmatter block is optional: a file that doesn't open with a
//! fence of three or more dashes (`---`) is all body.
//!
//! ```md
//! ---
//! title: The Lighthouse
//! author: Ghost
//! date: 2024-03-01
//! tags: sea, night
//! ---
//! It was a dark and stormy night.
//! ```

use serde::Deserialize;
use serde_yaml::Value;
use std::fmt;

const FENCE: &str = "---";

/// The metadata keys recognized in a story's frontmatter. Every key is
/// optional and kept as a raw YAML [`Value`] so that callers can apply their
/// own normalization (e.g., tags may be a list or a comma-delimited string).
/// Unknown keys are ignored.
#[derive(Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Frontmatter {
    pub title: Option<Value>,
    pub author: Option<Value>,
    pub date: Option<Value>,
    pub tags: Option<Value>,
    pub story_name: Option<Value>,
}

/// Parses `input` into its [`Frontmatter`] and the remaining Markdown body.
pub fn parse(input: &str) -> Result<(Frontmatter, &str)> {
    let (yaml, body) = split(input)?;
    let yaml = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => yaml,
        _ => return Ok((Frontmatter::default(), body)),
    };

    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Null => Ok((Frontmatter::default(), body)),
        mapping @ Value::Mapping(_) => Ok((serde_yaml::from_value(mapping)?, body)),
        _ => Err(Error::NotAMapping),
    }
}

/// Returns the raw YAML between the fences (if the input has a frontmatter
/// block) and the body that follows the closing fence.
pub fn split(input: &str) -> Result<(Option<&str>, &str)> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let (first, mut rest) = next_line(input);
    if !is_fence(first) {
        return Ok((None, input));
    }

    let yaml = rest;
    let mut yaml_len = 0;
    while !rest.is_empty() {
        let (line, after) = next_line(rest);
        if is_fence(line) {
            return Ok((Some(&yaml[..yaml_len]), after));
        }
        yaml_len += rest.len() - after.len();
        rest = after;
    }
    Err(Error::MissingEndFence)
}

/// Renders a frontmatter value as display text. `null` and blank strings
/// count as absent.
pub fn text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        compound => serde_yaml::to_string(compound)
            .ok()?
            .trim_start_matches(FENCE)
            .trim()
            .to_owned(),
    };
    match text.is_empty() {
        true => None,
        false => Some(text),
    }
}

fn next_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => (s, ""),
    }
}

fn is_fence(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= FENCE.len() && line.bytes().all(|b| b == b'-')
}

/// The result of a frontmatter-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a malformed frontmatter block.
#[derive(Debug)]
pub enum Error {
    /// Returned when the opening `---` fence was found but the closing one
    /// was not.
    MissingEndFence,

    /// Returned when the frontmatter parses as YAML but isn't a mapping.
    NotAMapping,

    /// Returned when the frontmatter isn't valid YAML.
    DeserializeYaml(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingEndFence => write!(f, "Missing closing `---`"),
            Error::NotAMapping => write!(f, "Frontmatter must be a YAML mapping"),
            Error::DeserializeYaml(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingEndFence => None,
            Error::NotAMapping => None,
            Error::DeserializeYaml(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_full_frontmatter() -> Result<()> {
        let input = "---\ntitle: Lighthouse\nauthor: Anna\ndate: 2024-03-01\ntags: [sea, night]\nstory_name: Coast\n---\nBody text.\n";
        let (frontmatter, body) = parse(input)?;
        assert_eq!(Some("Lighthouse".to_owned()), frontmatter.title.as_ref().and_then(text));
        assert_eq!(Some("Anna".to_owned()), frontmatter.author.as_ref().and_then(text));
        assert_eq!(Some("2024-03-01".to_owned()), frontmatter.date.as_ref().and_then(text));
        assert_eq!(Some("Coast".to_owned()), frontmatter.story_name.as_ref().and_then(text));
        assert!(matches!(frontmatter.tags, Some(Value::Sequence(_))));
        assert_eq!("Body text.\n", body);
        Ok(())
    }

    #[test]
    fn test_no_frontmatter_is_all_body() -> Result<()> {
        let input = "Just a story.\n\n---\n\nWith a rule.";
        let (frontmatter, body) = parse(input)?;
        assert_eq!(Frontmatter::default(), frontmatter);
        assert_eq!(input, body);
        Ok(())
    }

    #[test]
    fn test_empty_frontmatter() -> Result<()> {
        let (frontmatter, body) = parse("---\n---\nHello")?;
        assert_eq!(Frontmatter::default(), frontmatter);
        assert_eq!("Hello", body);
        Ok(())
    }

    #[test]
    fn test_unknown_keys_are_ignored() -> Result<()> {
        let (frontmatter, _) = parse("---\nmood: gloomy\ntitle: X\n---\n")?;
        assert_eq!(Some("X".to_owned()), frontmatter.title.as_ref().and_then(text));
        Ok(())
    }

    #[test]
    fn test_crlf_fences() -> Result<()> {
        let (frontmatter, body) = parse("---\r\ntitle: Windows\r\n---\r\nBody")?;
        assert_eq!(Some("Windows".to_owned()), frontmatter.title.as_ref().and_then(text));
        assert_eq!("Body", body);
        Ok(())
    }

    #[test]
    fn test_long_fences() -> Result<()> {
        let (frontmatter, body) = parse("-----\ntitle: Dashes\n----\nBody")?;
        assert_eq!(Some("Dashes".to_owned()), frontmatter.title.as_ref().and_then(text));
        assert_eq!("Body", body);
        assert!(!is_fence("--"));
        assert!(!is_fence("--- x"));
        Ok(())
    }

    #[test]
    fn test_missing_end_fence() {
        assert!(matches!(
            parse("---\ntitle: Broken\nno end here\n"),
            Err(Error::MissingEndFence)
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            parse("---\ntitle: [unclosed\n---\nBody"),
            Err(Error::DeserializeYaml(_))
        ));
    }

    #[test]
    fn test_non_mapping_yaml() {
        assert!(matches!(
            parse("---\n- just\n- a list\n---\nBody"),
            Err(Error::NotAMapping)
        ));
    }

    #[test]
    fn test_text_treats_blank_as_absent() {
        assert_eq!(None, text(&Value::Null));
        assert_eq!(None, text(&Value::String("   ".to_owned())));
        assert_eq!(Some("42".to_owned()), text(&serde_yaml::from_str::<Value>("42").unwrap()));
        assert_eq!(Some("true".to_owned()), text(&Value::Bool(true)));
    }
}
