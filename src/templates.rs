//! HTML page templates.
//!
//! Templates are compiled into the binary and registered with Tera under
//! their file names. Two filters are available to them: `human_date` and
//! `markdown`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use tera::{Context, Tera, Value};

lazy_static::lazy_static! {
    /// A level one Markdown heading; pages print the title themselves.
    static ref MARKDOWN_TITLE: Regex = Regex::new(r"(?m)^#([^#].*)$").unwrap();
}

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("posts.html", include_str!("../templates/posts.html")),
    ("read.html", include_str!("../templates/read.html")),
    ("about.html", include_str!("../templates/about.html")),
];

pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        tera.register_filter("human_date", human_date_filter);
        tera.register_filter("markdown", markdown_filter);

        tracing::debug!(count = TEMPLATES.len(), "loaded templates");
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, tera::Error> {
        self.tera.render(name, context)
    }
}

/// `2024-01-15 12:00` in UTC, or an empty string for unparseable input.
pub fn human_date(value: &str) -> String {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Render Markdown to sanitized HTML, dropping level one headings.
pub fn markdown_to_html(input: &str) -> String {
    let without_title = MARKDOWN_TITLE.replace_all(input, "");

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(&without_title, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);

    ammonia::clean(&out)
}

fn human_date_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("human_date", "value", String, value);
    Ok(Value::String(human_date(&s)))
}

fn markdown_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("markdown", "value", String, value);
    Ok(Value::String(markdown_to_html(&s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_load() {
        let templates = Templates::new().unwrap();
        let mut context = Context::new();
        context.insert("site_title", "textonly");
        context.insert("posts", &Vec::<serde_json::Value>::new());
        let html = templates.render("posts.html", &context).unwrap();
        assert!(html.contains("<title>"));
    }

    #[test]
    fn test_human_date() {
        assert_eq!(human_date("2024-01-15T12:00:00Z"), "2024-01-15 12:00");
        assert_eq!(human_date("2024-01-15T14:30:00+02:00"), "2024-01-15 12:30");
        assert_eq!(human_date("yesterday"), "");
    }

    #[test]
    fn test_markdown_drops_title() {
        let html = markdown_to_html("# Title\n\nBody text\n\n## Section");
        assert!(!html.contains("<h1>"));
        assert!(!html.contains("Title"));
        assert!(html.contains("<p>Body text</p>"));
        assert!(html.contains("<h2>Section</h2>"));
    }

    #[test]
    fn test_markdown_is_sanitized() {
        let html = markdown_to_html("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }
}
