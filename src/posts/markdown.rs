use super::{
    error::PostsError,
    types::{Author, PostMetadata},
};
use chrono::{Datelike, DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use pulldown_cmark::{
    CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream, html,
};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::error;

pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Words (or CJK characters) read per minute.
pub const READING_SPEED: usize = 250;

/// Site dates are shown in Taipei time, which has no daylight saving.
const DISPLAY_OFFSET_SECONDS: i32 = 8 * 3600;

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            error!("Invalid markdown pattern {}: {}", pattern, e);
            None
        }
    }
}

// `[![](url)](link)` is rewritten to a bare image before parsing; the URLs
// this site produces contain spaces and other characters CommonMark rejects.
static LINKED_IMAGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"\[!\[\]\((https?://[^)]+)\)\]\([^)]+\)"));

static BARE_URL: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"https?://[^\s<>"]*[^\s<>".,:;'")\]!?]"#));

// Applied in order. Fenced blocks go first so their backticks are not
// picked up as inline code.
static EXCERPT_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"```[\s\S]*?```", ""),
        (r"\[!\[.*?\]\([^)]+\)\]\([^)]+\)", ""),
        (r"(?m)^#+\s+", ""),
        (r"!\[.*?\]\([^)]+\)", ""),
        (r"\[([^\]]+)\]\([^)]+\)", "$1"),
        (r"\*\*([^*]+)\*\*", "$1"),
        (r"\*([^*]+)\*", "$1"),
        (r"`([^`]+)`", "$1"),
        (r">\s+", ""),
        (r"[-*+]\s+", ""),
        (r"\n{2,}", " "),
        (r"\s+", " "),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| compile(pattern).map(|regex| (regex, replacement)))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterFormat {
    Toml,
    Yaml,
}

impl FrontMatterFormat {
    fn delimiter(self) -> &'static str {
        match self {
            FrontMatterFormat::Toml => "+++",
            FrontMatterFormat::Yaml => "---",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorField {
    Name(String),
    Full(Author),
}

impl From<AuthorField> for Author {
    fn from(field: AuthorField) -> Self {
        match field {
            AuthorField::Name(name) => Author {
                name,
                email: None,
                avatar: None,
            },
            AuthorField::Full(author) => author,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FrontMatter {
    title: String,
    date: String,
    #[serde(default)]
    modified: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    author: Option<AuthorField>,
    #[serde(default, alias = "coverImage")]
    cover_image: Option<String>,
}

/// Split a post into its front matter block and markdown body.
///
/// The first line must be `+++` (TOML) or `---` (YAML) and the block ends at
/// the next line consisting of the same delimiter.
pub fn split_front_matter(content: &str) -> Result<(FrontMatterFormat, &str, &str), PostsError> {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    let mut lines = content.split_inclusive('\n');
    let format = match lines.next().map(str::trim_end) {
        Some("+++") => FrontMatterFormat::Toml,
        Some("---") => FrontMatterFormat::Yaml,
        _ => {
            return Err(PostsError::InvalidFormat(
                "Post must start with a +++ or --- front matter delimiter".to_string(),
            ));
        }
    };

    let header_start = content.find('\n').map(|i| i + 1).unwrap_or(content.len());
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == format.delimiter() {
            let header = &content[header_start..offset];
            let body = content[offset + line.len()..].trim();
            return Ok((format, header, body));
        }
        offset += line.len();
    }

    Err(PostsError::InvalidFormat(format!(
        "Front matter is missing its closing {} delimiter",
        format.delimiter()
    )))
}

pub fn parse_front_matter(content: &str) -> Result<(PostMetadata, String), PostsError> {
    let (format, header, body) = split_front_matter(content)?;

    let front_matter: FrontMatter = match format {
        FrontMatterFormat::Toml => toml_edit::de::from_str(header)?,
        FrontMatterFormat::Yaml => serde_yaml::from_str(header)?,
    };

    let date = parse_date(&front_matter.date)?;
    let modified = front_matter
        .modified
        .as_deref()
        .map(parse_date)
        .transpose()?;

    let category = front_matter
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let metadata = PostMetadata {
        title: front_matter.title,
        summary: front_matter.summary.filter(|s| !s.trim().is_empty()),
        date,
        modified,
        category,
        tags: front_matter.tags,
        author: front_matter.author.map(Author::from),
        cover_image: front_matter.cover_image,
    };

    Ok((metadata, body.to_string()))
}

pub fn parse_date(date_str: &str) -> Result<DateTime<Utc>, PostsError> {
    let date_str = date_str.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(date.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S") {
        return Ok(date.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(PostsError::DateParseError(format!(
        "Unable to parse date: {}",
        date_str
    )))
}

/// Render post markdown to HTML with GitHub flavoured extensions. Raw HTML
/// in the source is passed through untouched.
pub fn render_html(markdown: &str) -> String {
    let markdown = match LINKED_IMAGE.as_ref() {
        Some(regex) => regex.replace_all(markdown, r#"<img src="$1" alt="" />"#),
        None => markdown.into(),
    };

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = TextMergeStream::new(Parser::new_ext(&markdown, options));
    let mut events = Vec::new();
    let mut link_depth = 0usize;
    let mut in_code_block = false;

    for event in parser {
        match event {
            Event::Start(Tag::Link { .. }) => {
                link_depth += 1;
                events.push(event);
            }
            Event::End(TagEnd::Link) => {
                link_depth = link_depth.saturating_sub(1);
                events.push(event);
            }
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                events.push(event);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                events.push(event);
            }
            Event::Text(text) if link_depth == 0 && !in_code_block => {
                autolink(text, &mut events);
            }
            _ => events.push(event),
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    html_output
}

// Bare URLs in prose become links, as GFM does.
fn autolink<'a>(text: CowStr<'a>, events: &mut Vec<Event<'a>>) {
    let Some(regex) = BARE_URL.as_ref() else {
        events.push(Event::Text(text));
        return;
    };
    if !regex.is_match(&text) {
        events.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for found in regex.find_iter(&text) {
        if found.start() > last {
            events.push(Event::Text(text[last..found.start()].to_string().into()));
        }
        let url = found.as_str().to_string();
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: url.clone().into(),
            title: "".into(),
            id: "".into(),
        }));
        events.push(Event::Text(url.into()));
        events.push(Event::End(TagEnd::Link));
        last = found.end();
    }
    if last < text.len() {
        events.push(Event::Text(text[last..].to_string().into()));
    }
}

/// Plain-text excerpt of at most `length` characters, followed by `...`
/// when truncated.
pub fn extract_excerpt(content: &str, length: usize) -> String {
    let mut text = content.to_string();
    for (regex, replacement) in EXCERPT_RULES.iter() {
        text = regex.replace_all(&text, *replacement).into_owned();
    }
    let text = text.trim();

    if text.chars().count() <= length {
        return text.to_string();
    }

    let truncated: String = text.chars().take(length).collect();
    format!("{}...", truncated.trim())
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Reading time in whole minutes. CJK characters count as one word each.
pub fn calculate_read_time(content: &str) -> usize {
    let cjk = content.chars().filter(|c| is_cjk(*c)).count();
    let remainder: String = content.chars().filter(|c| !is_cjk(*c)).collect();
    let words = remainder.split_whitespace().count();

    (cjk + words).div_ceil(READING_SPEED)
}

pub fn format_read_time(minutes: usize) -> String {
    format!("{} 分鐘", minutes)
}

/// URL slug for a title or category name. Keeps ASCII word characters,
/// CJK characters and dashes; whitespace runs become a single dash.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_space = false;

    for c in title.to_lowercase().chars() {
        if c.is_whitespace() {
            in_space = true;
            continue;
        }
        if !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || is_cjk(c)) {
            continue;
        }
        if in_space && !slug.ends_with('-') {
            slug.push('-');
        }
        in_space = false;
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    if in_space && !slug.ends_with('-') {
        slug.push('-');
    }

    slug
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    let local = match FixedOffset::east_opt(DISPLAY_OFFSET_SECONDS) {
        Some(offset) => date.with_timezone(&offset).date_naive(),
        None => date.date_naive(),
    };

    format!("{}年{}月{}日", local.year(), local.month(), local.day())
}
