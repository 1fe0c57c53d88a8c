//! Extraction of [`NormalizedRecord`]s from the catalog's Atom feed.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::apis::SourceError;
use crate::record::{
    canonical_url, collapse_whitespace, extract_paper_id, normalize_summary, NormalizedRecord,
    PublicationDates,
};

/// Entry fields read from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Title,
    Id,
    Summary,
    Published,
    Doi,
    PrimaryCategory,
    AuthorName,
}

impl EntryField {
    pub fn tag(self) -> &'static str {
        match self {
            EntryField::Title => "title",
            EntryField::Id => "id",
            EntryField::Summary => "summary",
            EntryField::Published => "published",
            EntryField::Doi => "doi",
            EntryField::PrimaryCategory => "primary_category",
            EntryField::AuthorName => "author/name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absent or blank reads as an empty string.
    Optional,
    /// Absent or blank fails the whole extraction.
    Required,
}

/// How each field is treated when an entry lacks it.
pub const FIELD_POLICY: &[(EntryField, Presence)] = &[
    (EntryField::Title, Presence::Optional),
    (EntryField::Id, Presence::Optional),
    (EntryField::Summary, Presence::Optional),
    (EntryField::Published, Presence::Optional),
    (EntryField::Doi, Presence::Optional),
    (EntryField::PrimaryCategory, Presence::Optional),
    (EntryField::AuthorName, Presence::Required),
];

pub fn presence(field: EntryField) -> Presence {
    FIELD_POLICY
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, p)| *p)
        .unwrap_or(Presence::Optional)
}

/// Trimmed field text, or an error if a required field is missing.
fn lookup(field: EntryField, value: Option<&str>) -> Result<String, SourceError> {
    let text = value.map(str::trim).unwrap_or_default();
    if text.is_empty() && presence(field) == Presence::Required {
        return Err(SourceError::MissingField(field.tag()));
    }
    Ok(text.to_string())
}

#[derive(Debug, Default)]
struct RawAuthor {
    name: Option<String>,
}

#[derive(Debug, Default)]
struct RawEntry {
    title: Option<String>,
    id: Option<String>,
    summary: Option<String>,
    published: Option<String>,
    doi: Option<String>,
    primary_category: Option<String>,
    authors: Vec<RawAuthor>,
}

impl RawEntry {
    fn slot(&mut self, field: EntryField) -> Option<&mut Option<String>> {
        match field {
            EntryField::Title => Some(&mut self.title),
            EntryField::Id => Some(&mut self.id),
            EntryField::Summary => Some(&mut self.summary),
            EntryField::Published => Some(&mut self.published),
            EntryField::Doi => Some(&mut self.doi),
            EntryField::PrimaryCategory => Some(&mut self.primary_category),
            EntryField::AuthorName => self.authors.last_mut().map(|a| &mut a.name),
        }
    }

    fn into_record(self) -> Result<NormalizedRecord, SourceError> {
        let title = collapse_whitespace(&lookup(EntryField::Title, self.title.as_deref())?);
        let summary = normalize_summary(&lookup(EntryField::Summary, self.summary.as_deref())?);
        let id_url = lookup(EntryField::Id, self.id.as_deref())?;
        let published = lookup(EntryField::Published, self.published.as_deref())?;
        let doi = lookup(EntryField::Doi, self.doi.as_deref())?;
        let primary_category =
            lookup(EntryField::PrimaryCategory, self.primary_category.as_deref())?;

        let authors = self
            .authors
            .iter()
            .map(|a| lookup(EntryField::AuthorName, a.name.as_deref()))
            .collect::<Result<Vec<_>, _>>()?;

        let paper_id = extract_paper_id(&id_url);
        Ok(NormalizedRecord {
            title,
            summary,
            doi: non_empty(doi),
            canonical_url: canonical_url(&paper_id),
            paper_id,
            authors,
            primary_category: non_empty(primary_category),
            dates: PublicationDates::parse(&published),
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[derive(Debug, Default)]
struct RawFeed {
    total_results: Option<String>,
    entries: Vec<RawEntry>,
}

/// Where the text of the element currently open should go.
#[derive(Debug, Clone, Copy)]
enum TextTarget {
    Field(EntryField),
    TotalResults,
}

fn entry_field_for(tag: &[u8], in_author: bool) -> Option<EntryField> {
    match (tag, in_author) {
        (b"name", true) => Some(EntryField::AuthorName),
        (_, true) => None,
        (b"title", false) => Some(EntryField::Title),
        (b"id", false) => Some(EntryField::Id),
        (b"summary", false) => Some(EntryField::Summary),
        (b"published", false) => Some(EntryField::Published),
        (b"doi", false) => Some(EntryField::Doi),
        _ => None,
    }
}

fn term_attribute(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"term")
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn parse_error(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> SourceError {
    SourceError::Parse(format!(
        "XML parse error at byte {}: {}",
        reader.buffer_position(),
        err
    ))
}

fn append_text(feed: &mut RawFeed, entry: Option<&mut RawEntry>, target: TextTarget, text: &str) {
    match target {
        TextTarget::TotalResults => feed
            .total_results
            .get_or_insert_with(String::new)
            .push_str(text),
        TextTarget::Field(field) => {
            if let Some(Some(slot)) = entry.map(|entry| entry.slot(field)) {
                slot.get_or_insert_with(String::new).push_str(text);
            }
        }
    }
}

fn parse_feed(xml: &str) -> Result<RawFeed, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut feed = RawFeed::default();
    let mut current: Option<RawEntry> = None;
    let mut in_author = false;
    let mut target: Option<TextTarget> = None;
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                saw_root = true;
                target = None;
                let tag = e.local_name();
                match (tag.as_ref(), current.as_mut()) {
                    (b"entry", None) => current = Some(RawEntry::default()),
                    (b"totalResults", None) => target = Some(TextTarget::TotalResults),
                    (b"author", Some(entry)) if !in_author => {
                        in_author = true;
                        entry.authors.push(RawAuthor::default());
                    }
                    (b"primary_category", Some(entry)) => {
                        entry.primary_category.get_or_insert_with(|| term_attribute(&e).unwrap_or_default());
                    }
                    (tag, Some(entry)) => {
                        if let Some(field) = entry_field_for(tag, in_author) {
                            if let Some(slot) = entry.slot(field) {
                                // First occurrence wins.
                                if slot.is_none() {
                                    *slot = Some(String::new());
                                    target = Some(TextTarget::Field(field));
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                saw_root = true;
                if let Some(entry) = current.as_mut() {
                    let tag = e.local_name();
                    if tag.as_ref() == b"primary_category" {
                        entry.primary_category.get_or_insert_with(|| term_attribute(&e).unwrap_or_default());
                    } else if tag.as_ref() == b"author" && !in_author {
                        entry.authors.push(RawAuthor::default());
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(target) = target {
                    let text = e.unescape().map_err(|err| parse_error(&reader, err))?;
                    append_text(&mut feed, current.as_mut(), target, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(target) = target {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    append_text(&mut feed, current.as_mut(), target, &text);
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                target = None;
                match e.local_name().as_ref() {
                    b"entry" => {
                        if let Some(entry) = current.take() {
                            feed.entries.push(entry);
                        }
                        in_author = false;
                    }
                    b"author" => in_author = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(parse_error(&reader, err)),
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(SourceError::Parse("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(SourceError::Parse(format!(
            "document ended with {depth} unclosed element(s)"
        )));
    }
    Ok(feed)
}

/// Fail with the upstream message when the first entry is an error report.
fn check_upstream_error(feed: &RawFeed) -> Result<(), SourceError> {
    if let Some(title) = feed.entries.first().and_then(|e| e.title.as_deref()) {
        if title.contains("Error") {
            return Err(SourceError::Api(title.trim().to_string()));
        }
    }
    Ok(())
}

/// Extract one record per `<entry>`, in document order.
pub fn extract_records(xml: &str, expected: u32) -> Result<Vec<NormalizedRecord>, SourceError> {
    let feed = parse_feed(xml)?;
    check_upstream_error(&feed)?;

    let mut records = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        records.push(entry.into_record()?);
    }

    if records.len() < expected as usize {
        tracing::debug!(
            "feed returned {} of {} requested entries",
            records.len(),
            expected
        );
    }
    Ok(records)
}

/// Total hit count reported by a feed. Falls back to 1 when the count element
/// is missing but at least one entry came back.
pub fn total_results(xml: &str) -> Result<u32, SourceError> {
    let feed = parse_feed(xml)?;
    if let Some(raw) = feed.total_results.as_deref() {
        return raw
            .trim()
            .parse::<u32>()
            .map_err(|e| SourceError::Parse(format!("invalid totalResults '{}': {}", raw.trim(), e)));
    }
    Ok(if feed.entries.is_empty() { 0 } else { 1 })
}
