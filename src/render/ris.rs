use super::{TaggedLines, ARCHIVE_NAME};
use crate::record::NormalizedRecord;

pub const TYPE_LINE: &str = "TY  - JOUR";
pub const END_OF_RECORD: &str = "ER  - ";

/// RIS tags are followed by two spaces, a dash and a space.
const DELIMITER: &str = "  - ";

pub fn render(record: &NormalizedRecord) -> String {
    let mut out = TaggedLines::new(DELIMITER);
    out.line("TY", "JOUR")
        .line("T1", &record.title)
        .each("AU", &record.authors)
        .line("AB", &record.summary)
        .optional("PY", record.year())
        .optional("DA", record.slash_date())
        .optional("DO", record.doi())
        .line("UR", &record.canonical_url)
        .line("JO", ARCHIVE_NAME)
        .line("PB", ARCHIVE_NAME)
        .optional("KW", record.primary_category())
        // The identifier goes in the end-page field.
        .line("EP", &record.paper_id)
        .line("ER", "");
    out.finish()
}
