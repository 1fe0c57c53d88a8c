use std::sync::LazyLock;

use regex::Regex;

use super::ARCHIVE_NAME;
use crate::record::NormalizedRecord;

pub const ENTRY_TYPE: &str = "@article";

const MAX_KEY_LEN: usize = 25;
const FALLBACK_KEY_WORD: &str = "arxiv";

static KEY_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z0-9]+\b").expect("key word pattern is valid"));

/// Citation key from the first two title words plus the year, e.g. `deeplearning2023`.
pub fn citation_key(title: &str, year: &str) -> String {
    let words: Vec<&str> = KEY_WORD_RE
        .find_iter(title)
        .take(2)
        .map(|m| m.as_str())
        .collect();
    let stem = if words.is_empty() {
        FALLBACK_KEY_WORD.to_string()
    } else {
        words.concat()
    };
    format!("{}{}", stem.to_lowercase(), year)
        .chars()
        .take(MAX_KEY_LEN)
        .collect()
}

/// `Last, First Middle and Last, First` with the final name token taken as the surname.
pub fn format_authors(authors: &[String]) -> String {
    authors
        .iter()
        .map(|name| {
            let parts: Vec<&str> = name.split_whitespace().collect();
            match parts.split_last() {
                Some((last, first)) if !first.is_empty() => {
                    format!("{}, {}", last, first.join(" "))
                }
                _ => name.clone(),
            }
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

fn escape_braces(s: &str) -> String {
    s.replace('{', "\\{").replace('}', "\\}")
}

pub fn render(record: &NormalizedRecord) -> String {
    let mut fields = vec![
        format!("title = {{{{{}}}}}", record.title),
        format!("author = {{{}}}", format_authors(&record.authors)),
        format!("journal = {{{ARCHIVE_NAME}}}"),
        format!("archivePrefix = {{{ARCHIVE_NAME}}}"),
        format!("eprint = {{{}}}", record.paper_id),
    ];
    if let Some(category) = record.primary_category.as_deref().filter(|c| !c.is_empty()) {
        fields.push(format!("primaryClass = {{{category}}}"));
    }
    if let Some(doi) = record.doi.as_deref().filter(|d| !d.is_empty()) {
        fields.push(format!("doi = {{{doi}}}"));
    }
    fields.push(format!("year = {{{}}}", record.year()));
    fields.push(format!("abstract = {{{{{}}}}}", escape_braces(&record.summary)));

    format!(
        "{ENTRY_TYPE}{{{},\n  {}\n}}",
        citation_key(&record.title, record.year()),
        fields.join(",\n  ")
    )
}
