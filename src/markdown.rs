//! Converts a story's Markdown body to HTML.
//!
//! The dialect is CommonMark plus tables, footnotes, definition lists,
//! heading attributes (`# Title {#id .class}`), strikethrough, task lists and
//! smart punctuation. Single newlines inside a paragraph are kept as
//! `<br />` line breaks, which suits prose and verse better than
//! CommonMark's default of folding them into spaces.
//!
//! A paragraph opening with an upper-case keyword and a colon becomes a
//! callout:
//!
//! ```md
//! NOTE: The ferry leaves at dawn.
//! ```
//!
//! renders as
//!
//! ```html
//! <div class="admonition note">
//! <p class="admonition-title">Note</p>
//! <p>The ferry leaves at dawn.</p>
//! </div>
//! ```
//!
//! GitHub-style alert blockquotes (`> [!NOTE]`) are supported as well.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream};

/// The Markdown extensions enabled for every story.
pub fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_DEFINITION_LIST);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_GFM);
    options
}

/// Converts `markdown` to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    let events = TextMergeStream::new(Parser::new_ext(markdown, options())).map(convert);
    html::push_html(&mut out, Callouts::new(events));
    out
}

fn convert(ev: Event) -> Event {
    match ev {
        Event::SoftBreak => Event::HardBreak,
        _ => ev,
    }
}

/// Wraps `KEYWORD: text` paragraphs in an admonition block and strips the
/// keyword from the paragraph text.
struct Callouts<'a, I> {
    events: I,
    pending: Vec<Event<'a>>,
    in_callout: bool,
}

impl<'a, I: Iterator<Item = Event<'a>>> Callouts<'a, I> {
    fn new(events: I) -> Self {
        Callouts {
            events,
            pending: Vec::new(),
            in_callout: false,
        }
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for Callouts<'a, I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        if let Some(ev) = self.pending.pop() {
            return Some(ev);
        }

        match self.events.next()? {
            Event::Start(Tag::Paragraph) => {
                let first = match self.events.next() {
                    Some(first) => first,
                    None => return Some(Event::Start(Tag::Paragraph)),
                };
                let callout = match &first {
                    Event::Text(text) => callout(text)
                        .map(|(keyword, rest)| (keyword.to_owned(), rest.to_owned())),
                    _ => None,
                };
                match callout {
                    Some((keyword, rest)) => {
                        self.in_callout = true;
                        // Popped in reverse.
                        self.pending.push(Event::Text(CowStr::from(rest)));
                        self.pending.push(Event::Start(Tag::Paragraph));
                        Some(Event::Html(CowStr::from(admonition_open(&keyword))))
                    }
                    None => {
                        self.pending.push(first);
                        Some(Event::Start(Tag::Paragraph))
                    }
                }
            }
            Event::End(TagEnd::Paragraph) if self.in_callout => {
                self.in_callout = false;
                self.pending.push(Event::Html(CowStr::Borrowed("</div>\n")));
                Some(Event::End(TagEnd::Paragraph))
            }
            ev => Some(ev),
        }
    }
}

/// Splits `NOTE: text` into `("NOTE", "text")`. The keyword is two or more
/// ASCII upper-case letters and the text after the colon must be non-empty.
fn callout(text: &str) -> Option<(&str, &str)> {
    let (keyword, rest) = text.split_once(':')?;
    if keyword.len() < 2 || !keyword.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let rest = rest.strip_prefix(' ')?.trim_start();
    match rest.is_empty() {
        true => None,
        false => Some((keyword, rest)),
    }
}

fn admonition_open(keyword: &str) -> String {
    let class = keyword.to_ascii_lowercase();
    let mut title = String::with_capacity(keyword.len());
    title.push_str(&keyword[..1]);
    title.push_str(&class[1..]);
    format!(
        "<div class=\"admonition {}\">\n<p class=\"admonition-title\">{}</p>\n",
        class, title
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_newlines_become_line_breaks() {
        assert_eq!("<p>first line<br />\nsecond line</p>\n", to_html("first line\nsecond line"));
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!("<p>one</p>\n<p>two</p>\n", to_html("one\n\ntwo"));
    }

    #[test]
    fn test_smart_punctuation() {
        let html = to_html("\"Quoted\" -- and...");
        assert!(html.contains('“'), "{}", html);
        assert!(html.contains('–'), "{}", html);
        assert!(html.contains('…'), "{}", html);
    }

    #[test]
    fn test_tables() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"), "{}", html);
    }

    #[test]
    fn test_footnotes() {
        let html = to_html("Text[^1].\n\n[^1]: The note.\n");
        assert!(html.contains("footnote-definition"), "{}", html);
        assert!(html.contains("footnote-reference"), "{}", html);
    }

    #[test]
    fn test_definition_lists() {
        let html = to_html("Apple\n:   A fruit.\n");
        assert!(html.contains("<dl>"), "{}", html);
        assert!(html.contains("<dt>Apple</dt>"), "{}", html);
        assert!(html.contains("<dd>"), "{}", html);
    }

    #[test]
    fn test_heading_attributes() {
        let html = to_html("# Title {#custom}\n");
        assert!(html.contains("id=\"custom\""), "{}", html);
        assert!(!html.contains("{#custom}"), "{}", html);
    }

    #[test]
    fn test_keyword_callout() {
        assert_eq!(
            "<div class=\"admonition note\">\n<p class=\"admonition-title\">Note</p>\n<p>Mind the fog.</p>\n</div>\n",
            to_html("NOTE: Mind the fog.\n")
        );
    }

    #[test]
    fn test_keyword_callout_spans_lines() {
        let html = to_html("WARNING: The bridge is out.\nTurn back.\n\nAfter.\n");
        assert!(html.starts_with("<div class=\"admonition warning\">"), "{}", html);
        assert!(html.contains("<p>The bridge is out.<br />\nTurn back.</p>\n</div>\n"), "{}", html);
        assert!(html.ends_with("<p>After.</p>\n"), "{}", html);
    }

    #[test]
    fn test_ordinary_colons_are_not_callouts() {
        assert_eq!("<p>Time: dusk</p>\n", to_html("Time: dusk\n"));
        assert_eq!("<p>NOTE:nothing</p>\n", to_html("NOTE:nothing\n"));
        assert_eq!("<p>A: one</p>\n", to_html("A: one\n"));
    }

    #[test]
    fn test_alert_blockquotes() {
        let html = to_html("> [!NOTE]\n> Mind the fog.\n");
        assert!(html.contains("markdown-alert-note"), "{}", html);
    }
}
