//! Normalized event types.
//!
//! These are the wiki-agnostic values the serializer works with. The mapper
//! in `normalize` converts raw query records into these.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A calendar event derived from one wiki page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event title (page path with any date prefix stripped)
    pub summary: String,
    /// Page path plus source URL
    pub description: String,
    /// Canonical URL of the event's wiki page
    pub url: String,
    pub location: String,
    /// Floating wall-clock times in the wiki's local time
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Only set when the wiki text maps to a known RFC 5545 status
    pub status: Option<EventStatus>,
    /// Stable across runs for the same page URL
    pub uid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Cancelled,
    Tentative,
    Confirmed,
}

impl EventStatus {
    /// Map free-text wiki status to an RFC 5545 status via a synonym table
    /// (English and Dutch). Unrecognized text yields `None` so that no
    /// invalid STATUS value ends up in the output.
    pub fn from_wiki_text(text: &str) -> Option<Self> {
        match text.to_uppercase().as_str() {
            "CANCELED" | "CANCELLED" => Some(Self::Cancelled),
            "TENTATIVE" | "TBD" | "MAYBE" | "NNB" | "NTB" | "NOG NIET BEKEND" => {
                Some(Self::Tentative)
            }
            "CONFIRMED" | "DEFINITIVE" | "DEFINITIEF" | "BEVESTIGD" => Some(Self::Confirmed),
            _ => None,
        }
    }

    pub fn as_ics_str(&self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::Tentative => "TENTATIVE",
            Self::Confirmed => "CONFIRMED",
        }
    }
}
