//! Citation formats and the document they are joined into.

pub mod bibtex;
pub mod endnote;
pub mod ris;

use crate::record::NormalizedRecord;

/// Blank line between consecutive records in an export file.
pub const RECORD_SEPARATOR: &str = "\n\n";

/// Literal used for both the journal and the publisher of every record.
pub(crate) const ARCHIVE_NAME: &str = "arXiv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// RIS (.ris), imports cleanly into EndNote and Zotero
    Ris,
    /// BibTeX (.bib)
    #[value(alias = "bib")]
    Bibtex,
    /// EndNote tagged (.enw)
    #[value(alias = "enw")]
    Endnote,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Ris, Format::Bibtex, Format::Endnote];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ris => "ris",
            Format::Bibtex => "bib",
            Format::Endnote => "enw",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Format::Ris => "RIS",
            Format::Bibtex => "BibTeX",
            Format::Endnote => "EndNote Tagged (ENW)",
        }
    }

    /// Text every rendered record starts with.
    pub fn record_marker(self) -> &'static str {
        match self {
            Format::Ris => ris::TYPE_LINE,
            Format::Bibtex => bibtex::ENTRY_TYPE,
            Format::Endnote => endnote::TYPE_LINE,
        }
    }

    pub fn render(self, record: &NormalizedRecord) -> String {
        match self {
            Format::Ris => ris::render(record),
            Format::Bibtex => bibtex::render(record),
            Format::Endnote => endnote::render(record),
        }
    }
}

/// Render every record and join the blocks with [`RECORD_SEPARATOR`].
pub fn render_document(format: Format, records: &[NormalizedRecord]) -> String {
    records
        .iter()
        .map(|r| format.render(r))
        .collect::<Vec<_>>()
        .join(RECORD_SEPARATOR)
}

/// Line-per-field writer shared by the tagged formats.
pub(crate) struct TaggedLines {
    delimiter: &'static str,
    lines: Vec<String>,
}

impl TaggedLines {
    pub(crate) fn new(delimiter: &'static str) -> Self {
        Self {
            delimiter,
            lines: Vec::new(),
        }
    }

    pub(crate) fn line(&mut self, tag: &str, value: &str) -> &mut Self {
        self.lines.push(format!("{tag}{}{value}", self.delimiter));
        self
    }

    /// Emit the line only when `value` is non-empty.
    pub(crate) fn optional(&mut self, tag: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.line(tag, value);
        }
        self
    }

    /// One line per value, in order.
    pub(crate) fn each(&mut self, tag: &str, values: &[String]) -> &mut Self {
        for value in values {
            self.line(tag, value);
        }
        self
    }

    pub(crate) fn finish(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::{canonical_url, PublicationDates};

    pub(crate) fn sample_record() -> NormalizedRecord {
        NormalizedRecord {
            title: "Deep Learning Methods".into(),
            summary: "We propose a method.".into(),
            doi: None,
            paper_id: "2310.12345v2".into(),
            canonical_url: canonical_url("2310.12345v2"),
            authors: vec!["Jane A Doe".into()],
            primary_category: None,
            dates: PublicationDates::parse("2023-10-19T17:59:59Z"),
        }
    }

    pub(crate) fn full_record() -> NormalizedRecord {
        NormalizedRecord {
            doi: Some("10.1000/xyz123".into()),
            primary_category: Some("cs.LG".into()),
            authors: vec!["Jane A Doe".into(), "Richard Roe".into(), "Plato".into()],
            ..sample_record()
        }
    }

    #[test]
    fn test_every_format_starts_with_its_marker() {
        for format in Format::ALL {
            for record in [sample_record(), full_record()] {
                assert!(format.render(&record).starts_with(format.record_marker()));
            }
        }
    }

    #[test]
    fn test_empty_doi_is_omitted_everywhere() {
        let mut record = sample_record();
        record.doi = None;
        assert!(!Format::Ris.render(&record).contains("DO  -"));
        assert!(!Format::Bibtex.render(&record).contains("doi ="));
        assert!(!Format::Endnote.render(&record).contains("%R"));
    }

    #[test]
    fn test_render_document_separators() {
        let records = vec![sample_record(), full_record(), sample_record()];
        for format in Format::ALL {
            let doc = render_document(format, &records);
            assert_eq!(doc.matches(RECORD_SEPARATOR).count(), records.len() - 1);
            assert_eq!(doc.matches(format.record_marker()).count(), records.len());
        }
    }

    #[test]
    fn test_render_document_single_and_empty() {
        let one = render_document(Format::Ris, &[sample_record()]);
        assert!(!one.contains(RECORD_SEPARATOR));
        assert_eq!(render_document(Format::Ris, &[]), "");
    }

    #[test]
    fn test_extensions() {
        assert_eq!(Format::Ris.extension(), "ris");
        assert_eq!(Format::Bibtex.extension(), "bib");
        assert_eq!(Format::Endnote.extension(), "enw");
    }

    #[test]
    fn test_tagged_lines() {
        let mut lines = TaggedLines::new(": ");
        lines
            .line("A", "1")
            .optional("B", "")
            .optional("C", "3")
            .each("D", &["x".to_string(), "y".to_string()]);
        assert_eq!(lines.finish(), "A: 1\nC: 3\nD: x\nD: y");
    }
}
