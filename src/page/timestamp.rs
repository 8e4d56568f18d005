//! `.timestamp` elements: show the date, keep the full instant in `title`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

use crate::dom::selector::Selector;
use crate::dom::Document;
use crate::error::DocViewError;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse the text of a timestamp element as a wall-clock time.
///
/// Explicit offsets are honoured; naive values are taken as UTC.
/// Sub-second precision is dropped.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    parsed.with_nanosecond(0)
}

/// `YYYY-MM-DDTHH:MM:SS.000Z`
pub fn iso_utc(time: &NaiveDateTime) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Rewrite every parseable `.timestamp`. Returns how many were changed.
pub fn format_timestamps(doc: &mut Document) -> Result<usize, DocViewError> {
    let mut changed = 0;
    for el in doc.select(&Selector::parse(".timestamp")?) {
        let text = doc.text_content(el);
        let Some(time) = parse_timestamp(&text) else {
            log::trace!("leaving unparseable timestamp {:?}", text);
            continue;
        };
        doc.set_text(el, &time.format("%Y-%m-%d").to_string());
        doc.set_attr(el, "title", &iso_utc(&time));
        changed += 1;
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse_html;

    #[test]
    fn accepts_common_layouts() {
        for text in [
            "2014-05-21 13:05:09",
            "2014-05-21T13:05:09",
            "2014-05-21T13:05:09.250",
            " 2014-05-21T13:05:09Z ",
            "2014-05-21T15:05:09+02:00",
        ] {
            let time = parse_timestamp(text).unwrap();
            assert_eq!(iso_utc(&time), "2014-05-21T13:05:09.000Z", "{}", text);
        }
        assert_eq!(
            iso_utc(&parse_timestamp("2014-05-21").unwrap()),
            "2014-05-21T00:00:00.000Z"
        );
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn rewrites_text_and_title() {
        let mut doc = parse_html(
            r#"<html><body>
                <span class="timestamp" id="ok">2019-11-02 08:30:00</span>
                <span class="timestamp" id="bad">not a date</span>
            </body></html>"#,
            "https://index.example/",
        );
        assert_eq!(format_timestamps(&mut doc).unwrap(), 1);
        let ok = doc.element_by_id("ok").unwrap();
        assert_eq!(doc.text_content(ok), "2019-11-02");
        assert_eq!(doc.attr(ok, "title"), Some("2019-11-02T08:30:00.000Z"));
        let bad = doc.element_by_id("bad").unwrap();
        assert_eq!(doc.text_content(bad), "not a date");
        assert_eq!(doc.attr(bad, "title"), None);
    }
}
