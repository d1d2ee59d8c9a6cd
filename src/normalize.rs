//! Mapping raw query records to normalized events.
//!
//! This is a pure transformation: one `WikiPage` in, zero or one `Event`
//! out. Keeping it free of IO makes the field heuristics (date-prefix
//! stripping, the midnight clamp, status synonyms) unit-testable without a
//! wiki on the other end.

use crate::event::{Event, EventStatus};
use crate::wiki::{WikiPage, WikiResponse};
use chrono::{DateTime, Days, Duration, NaiveDateTime, Timelike};
use md5::{Digest, Md5};

/// Events without an explicit end get this duration.
const DEFAULT_DURATION_HOURS: i64 = 4;

/// Domain suffix for event UIDs.
const UID_DOMAIN: &str = "bitlair.nl";

/// Map every query record to a normalized event, dropping records that
/// cannot be mapped, and sort the result ascending by start time.
///
/// The query itself sorts by Start, but JSON object iteration order is not
/// something to rely on, so the sort is explicit.
pub fn normalize_events(response: &WikiResponse, utc_offset_secs: i64) -> Vec<Event> {
    let mut events: Vec<Event> = response
        .results
        .iter()
        .filter_map(|(page_path, page)| normalize_page(page_path, page, utc_offset_secs))
        .collect();

    events.sort_by_key(|event| event.start);
    events
}

/// Map one record. Returns `None` for records without a start time (silent)
/// or without a location (warned), matching the export policy.
fn normalize_page(page_path: &str, page: &WikiPage, utc_offset_secs: i64) -> Option<Event> {
    let start = page
        .printouts
        .start
        .first()
        .and_then(|t| local_datetime(t.timestamp, utc_offset_secs))?;

    let location = match page.printouts.location.first() {
        Some(text) if !text.fulltext.is_empty() => text.fulltext.clone(),
        _ => {
            eprintln!("Skipping {}: no event location", page_path);
            return None;
        }
    };

    let end = page
        .printouts
        .end
        .first()
        .and_then(|t| local_datetime(t.timestamp, utc_offset_secs))
        .unwrap_or(start + Duration::hours(DEFAULT_DURATION_HOURS));

    let status = page
        .printouts
        .status
        .first()
        .and_then(|text| EventStatus::from_wiki_text(&text.fulltext));

    Some(Event {
        summary: event_name(page_path).to_string(),
        description: format!("{}\n {}", page_path, page.fullurl),
        url: page.fullurl.clone(),
        location,
        start,
        end: clamp_overnight_end(end),
        status,
        uid: event_uid(&page.fullurl),
    })
}

/// Wiki timestamps are seconds since epoch in the wiki's local time, not
/// UTC, so subtract the configured offset before interpreting them.
fn local_datetime(timestamp: i64, utc_offset_secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(timestamp - utc_offset_secs, 0).map(|dt| dt.naive_utc())
}

/// Strip a leading `Events/YYYY-MM-DD ` from the page path to get the actual
/// event name. Paths without the prefix are used verbatim.
fn event_name(page_path: &str) -> &str {
    if let Some(rest) = page_path.strip_prefix("Events/") {
        let bytes = rest.as_bytes();
        if bytes.len() > 11 && is_date(&bytes[..10]) && bytes[10] == b' ' {
            return &rest[11..];
        }
    }
    page_path
}

fn is_date(bytes: &[u8]) -> bool {
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// If an event ends when humans are usually asleep, truncate the time range
/// to just before midnight of the previous day. This keeps items that cross
/// midnight from cluttering the next day in calendar views; it does not
/// claim to correct the true duration.
fn clamp_overnight_end(end: NaiveDateTime) -> NaiveDateTime {
    if end.hour() < 6 {
        (end.date() - Days::new(1)).and_hms_opt(23, 59, 0).unwrap()
    } else {
        end
    }
}

/// First 10 hex characters of the MD5 of the page URL, plus the domain.
/// Deterministic, so repeated exports update events in subscribing clients
/// instead of duplicating them.
fn event_uid(fullurl: &str) -> String {
    let digest = Md5::digest(fullurl.as_bytes());
    let hex = format!("{:x}", digest);
    format!("{}@{}", &hex[..10], UID_DOMAIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::{Printouts, WikiText, WikiTimestamp};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn make_page(start: Option<i64>, end: Option<i64>, location: Option<&str>) -> WikiPage {
        WikiPage {
            fullurl: "https://bitlair.nl/Events/2024-08-19_Soldering_Night".to_string(),
            printouts: Printouts {
                start: start.map(|t| WikiTimestamp { timestamp: t }).into_iter().collect(),
                end: end.map(|t| WikiTimestamp { timestamp: t }).into_iter().collect(),
                status: vec![],
                location: location
                    .map(|l| WikiText {
                        fulltext: l.to_string(),
                    })
                    .into_iter()
                    .collect(),
            },
        }
    }

    fn make_response(pages: Vec<(&str, WikiPage)>) -> WikiResponse {
        WikiResponse {
            results: pages
                .into_iter()
                .map(|(path, page)| (path.to_string(), page))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_record_without_start_is_skipped() {
        let response = make_response(vec![(
            "Events/2024-08-19 Soldering Night",
            make_page(None, None, Some("Bitlair")),
        )]);
        assert!(normalize_events(&response, 3600).is_empty());
    }

    #[test]
    fn test_record_without_location_is_skipped() {
        let response = make_response(vec![(
            "Events/2024-08-19 Soldering Night",
            make_page(Some(1724078700), None, None),
        )]);
        assert!(normalize_events(&response, 3600).is_empty());

        // An empty location string counts as missing too
        let response = make_response(vec![(
            "Events/2024-08-19 Soldering Night",
            make_page(Some(1724078700), None, Some("")),
        )]);
        assert!(normalize_events(&response, 3600).is_empty());
    }

    #[test]
    fn test_missing_end_defaults_to_four_hours() {
        // 12:00 local, so the default end stays clear of the overnight clamp
        let response = make_response(vec![(
            "Events/2024-08-19 Soldering Night",
            make_page(Some(1724061600 + 3600), None, Some("Bitlair")),
        )]);
        let events = normalize_events(&response, 3600);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].end - events[0].start, Duration::hours(4));
    }

    #[test]
    fn test_local_offset_correction() {
        // 1700000000s epoch is 2023-11-14 22:13:20 UTC; the wiki stored it
        // as local time, so with a +1h offset the wall-clock is 21:13:20.
        let start = local_datetime(1700000000, 3600).unwrap();
        assert_eq!(
            start,
            NaiveDate::from_ymd_opt(2023, 11, 14)
                .unwrap()
                .and_hms_opt(21, 13, 20)
                .unwrap()
        );
    }

    #[test]
    fn test_overnight_end_clamps_to_previous_day() {
        // Default end would be 2023-11-15 01:13:20, which falls before 6am
        let response = make_response(vec![(
            "Events/2023-11-14 Late Night",
            make_page(Some(1700000000), None, Some("Bitlair")),
        )]);
        let events = normalize_events(&response, 3600);
        assert_eq!(
            events[0].end,
            NaiveDate::from_ymd_opt(2023, 11, 14)
                .unwrap()
                .and_hms_opt(23, 59, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_end_after_six_is_left_alone() {
        let morning = NaiveDate::from_ymd_opt(2024, 8, 20)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        assert_eq!(clamp_overnight_end(morning), morning);
    }

    #[test]
    fn test_event_name_strips_date_prefix() {
        assert_eq!(
            event_name("Events/2024-08-19 Soldering Night"),
            "Soldering Night"
        );
        assert_eq!(event_name("Community Meetup"), "Community Meetup");
        // Prefix without a trailing name is not a match
        assert_eq!(event_name("Events/2024-08-19"), "Events/2024-08-19");
        // Malformed dates keep the full path
        assert_eq!(
            event_name("Events/2024-8-19 Soldering"),
            "Events/2024-8-19 Soldering"
        );
    }

    #[test]
    fn test_uid_is_deterministic() {
        assert_eq!(event_uid("https://bitlair.nl/X"), "6010dde872@bitlair.nl");
        assert_eq!(
            event_uid("https://bitlair.nl/X"),
            event_uid("https://bitlair.nl/X")
        );
    }

    #[test]
    fn test_events_sorted_by_start_not_by_page_path() {
        // Page paths sort "A" before "B", but B starts earlier
        let mut early = make_page(Some(1700000000 - 86400), Some(1700000000 - 80000), Some("Bitlair"));
        early.fullurl = "https://bitlair.nl/B".to_string();
        let late = make_page(Some(1700000000), Some(1700010000), Some("Bitlair"));

        let response = make_response(vec![("A", late), ("B", early)]);
        let events = normalize_events(&response, 3600);
        assert_eq!(events.len(), 2);
        assert!(events[0].start < events[1].start);
        assert_eq!(events[0].summary, "B");
    }

    #[test]
    fn test_description_contains_path_and_url() {
        let response = make_response(vec![(
            "Events/2024-08-19 Soldering Night",
            make_page(Some(1724061600), Some(1724075100), Some("Bitlair")),
        )]);
        let events = normalize_events(&response, 3600);
        assert_eq!(
            events[0].description,
            "Events/2024-08-19 Soldering Night\n https://bitlair.nl/Events/2024-08-19_Soldering_Night"
        );
    }
}
