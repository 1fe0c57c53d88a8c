use super::{TaggedLines, ARCHIVE_NAME};
use crate::record::NormalizedRecord;

pub const TYPE_LINE: &str = "%0 Journal Article";

pub fn render(record: &NormalizedRecord) -> String {
    let keywords = format!("{ARCHIVE_NAME}; {}", record.primary_category());
    let notes = format!("{ARCHIVE_NAME}:{}", record.paper_id);

    let mut out = TaggedLines::new(" ");
    out.line("%0", "Journal Article")
        .line("%T", &record.title)
        .each("%A", &record.authors)
        .optional("%Y", record.year())
        .optional("%8", record.long_date())
        .line("%J", ARCHIVE_NAME)
        .line("%K", &keywords)
        .optional("%R", record.doi())
        .line("%Z", &notes)
        .line("%U", &record.canonical_url)
        .line("%X", &record.summary);
    out.finish()
}
