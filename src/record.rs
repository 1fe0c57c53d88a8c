use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

/// Timestamp layout of `<published>` in the Atom feed.
const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const ABS_URL_PREFIX: &str = "https://arxiv.org/abs/";

/// Used when no new-style identifier can be found in the entry id.
pub const UNKNOWN_PAPER_ID: &str = "unknown";

static PAPER_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}\.\d{5}(?:v\d+)?").expect("paper id pattern is valid")
});

/// One paper, normalized from a feed entry and ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub title: String,
    pub summary: String,
    pub doi: Option<String>,
    pub paper_id: String,
    pub canonical_url: String,
    pub authors: Vec<String>,
    pub primary_category: Option<String>,
    pub dates: Option<PublicationDates>,
}

/// Renderings of the publication timestamp. Either the whole set exists or
/// none of it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationDates {
    pub year: String,
    /// `2023/10/19/`
    pub slash: String,
    /// `2023/10/01/`
    pub ris_month: String,
    /// `October 19, 2023`
    pub long: String,
}

impl PublicationDates {
    /// Parse a feed timestamp such as `2023-10-19T17:59:59Z`.
    pub fn parse(published: &str) -> Option<Self> {
        let dt = NaiveDateTime::parse_from_str(published.trim(), PUBLISHED_FORMAT).ok()?;
        Some(Self {
            year: dt.format("%Y").to_string(),
            slash: dt.format("%Y/%m/%d/").to_string(),
            ris_month: dt.format("%Y/%m/01/").to_string(),
            long: dt.format("%B %d, %Y").to_string(),
        })
    }
}

impl NormalizedRecord {
    pub fn year(&self) -> &str {
        self.dates.as_ref().map(|d| d.year.as_str()).unwrap_or("")
    }

    pub fn slash_date(&self) -> &str {
        self.dates.as_ref().map(|d| d.slash.as_str()).unwrap_or("")
    }

    pub fn ris_month_date(&self) -> &str {
        self.dates.as_ref().map(|d| d.ris_month.as_str()).unwrap_or("")
    }

    pub fn long_date(&self) -> &str {
        self.dates.as_ref().map(|d| d.long.as_str()).unwrap_or("")
    }

    pub fn doi(&self) -> &str {
        self.doi.as_deref().unwrap_or("")
    }

    pub fn primary_category(&self) -> &str {
        self.primary_category.as_deref().unwrap_or("")
    }
}

/// Pull the `NNNN.NNNNN[vK]` identifier out of an entry id URL.
pub fn extract_paper_id(id_url: &str) -> String {
    PAPER_ID_RE
        .find(id_url)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_PAPER_ID.to_string())
}

pub fn canonical_url(paper_id: &str) -> String {
    format!("{ABS_URL_PREFIX}{paper_id}")
}

/// Drop TeX markup characters and collapse whitespace runs to single spaces.
pub fn normalize_summary(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '\\' | '{' | '}' | '$'))
        .collect();
    collapse_whitespace(&stripped)
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
