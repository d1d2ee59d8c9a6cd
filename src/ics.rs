//! Calendar serialization.
//!
//! Wraps normalized events into a VCALENDAR and renders it to the RFC 5545
//! text format.

use crate::event::Event;
use chrono::Utc;
use icalendar::{Calendar, Component, EventLike};

/// Product identifier emitted at the calendar level.
pub const PRODID: &str = "-//Bitlair event calendar//bitlair.nl//";

/// Serialize events into a complete iCalendar document.
pub fn generate_calendar(events: &[Event]) -> String {
    let mut cal = Calendar::new();

    for event in events {
        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&event.uid);
        ics_event.summary(&event.summary);
        ics_event.description(&event.description);

        // DTSTAMP - required by RFC 5545, the moment of serialization
        let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        ics_event.add_property("DTSTAMP", &dtstamp);

        // Start and end are floating local times (no Z, no TZID)
        ics_event.add_property("DTSTART", event.start.format("%Y%m%dT%H%M%S").to_string());
        ics_event.add_property("DTEND", event.end.format("%Y%m%dT%H%M%S").to_string());

        ics_event.add_property("URL", &event.url);
        ics_event.location(&event.location);

        if let Some(status) = event.status {
            ics_event.add_property("STATUS", status.as_ics_str());
        }

        cal.push(ics_event.done());
    }

    let cal = cal.done();
    set_calendar_metadata(&cal.to_string())
}

/// The icalendar crate hardcodes its own PRODID and adds CALSCALE. Rewrite
/// the former to ours and drop the latter (GREGORIAN is the default anyway).
fn set_calendar_metadata(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
