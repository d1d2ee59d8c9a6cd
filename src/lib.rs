//! Export events from a semantic wiki to an iCalendar file.
//!
//! The pipeline is a single pass: fetch the wiki's event query as JSON
//! (`wiki`), map each record to a normalized event (`normalize`), then
//! serialize the lot into one VCALENDAR (`ics`).

pub mod error;
pub mod event;
pub mod ics;
pub mod normalize;
pub mod wiki;

pub use error::{ExportError, ExportResult};
pub use event::{Event, EventStatus};
