//! Slot extraction and ranking from a listing snapshot.
//!
//! Each listing entry is free-form text. An entry becomes a [`SlotRecord`] when
//! it names the configured resource, carries a 12-hour clock token inside the
//! time window and exposes a claim affordance. Everything else is filtered out
//! silently.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::surface::{ElementRef, ListingSnapshot};
use super::window::{format_minute, TimeWindow};

/// A claimable slot found in the current listing.
///
/// Records live for a single pass and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    /// Minutes since midnight.
    pub minute_of_day: u16,
    /// Resource label the entry matched.
    pub resource_label: String,
    /// Full listing text of the entry.
    pub raw_text: String,
    /// Claim affordance as seen when the listing was captured.
    pub claim_handle: ElementRef,
    /// Position of the entry in the listing.
    pub listing_index: usize,
}

impl SlotRecord {
    /// Slot time as `HH:MM`.
    pub fn time_label(&self) -> String {
        format_minute(self.minute_of_day)
    }

    /// Find this slot again in a fresh snapshot and return its current claim
    /// affordance. Matches on the entry text, preferring the original position.
    pub fn relocate(&self, snapshot: &ListingSnapshot) -> Option<ElementRef> {
        if let Some(entry) = snapshot.entries.get(self.listing_index) {
            if entry.text == self.raw_text {
                if let Some(handle) = &entry.affordance {
                    return Some(handle.clone());
                }
            }
        }
        snapshot
            .entries
            .iter()
            .filter(|entry| entry.text == self.raw_text)
            .find_map(|entry| entry.affordance.clone())
    }
}

fn clock_regex() -> &'static Regex {
    static CLOCK: OnceLock<Regex> = OnceLock::new();
    CLOCK.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2}):(\d{2})\s*([ap]m)\b").expect("clock regex is valid")
    })
}

/// Convert a 12-hour clock reading to a minute of day.
///
/// `hour` must be 1-12 and `minute` 0-59.
pub const fn to_minute_of_day(hour: u16, minute: u16, pm: bool) -> Option<u16> {
    if hour < 1 || hour > 12 || minute > 59 {
        return None;
    }
    let hour24 = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    Some(hour24 * 60 + minute)
}

/// First well-formed `H:MM am|pm` token in `text`, as a minute of day.
pub fn parse_clock_token(text: &str) -> Option<u16> {
    clock_regex().captures_iter(text).find_map(|caps| {
        let hour: u16 = caps[1].parse().ok()?;
        let minute: u16 = caps[2].parse().ok()?;
        let pm = caps[3].eq_ignore_ascii_case("pm");
        to_minute_of_day(hour, minute, pm)
    })
}

/// Qualifying slots of `snapshot`, earliest first.
///
/// Ties keep listing order. The result depends only on the inputs.
pub fn extract(
    snapshot: &ListingSnapshot,
    resource_label: &str,
    window: &TimeWindow,
) -> Vec<SlotRecord> {
    let mut slots: Vec<SlotRecord> = snapshot
        .entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            if !entry.text.contains(resource_label) {
                return None;
            }
            let Some(minute) = parse_clock_token(&entry.text) else {
                tracing::debug!("entry {} has no clock token", index);
                return None;
            };
            if !window.contains(minute) {
                tracing::debug!(
                    "entry {} at {} outside window {}",
                    index,
                    format_minute(minute),
                    window
                );
                return None;
            }
            let Some(handle) = entry.affordance.clone() else {
                tracing::debug!("entry {} has no claim affordance", index);
                return None;
            };
            Some(SlotRecord {
                minute_of_day: minute,
                resource_label: resource_label.to_string(),
                raw_text: entry.text.clone(),
                claim_handle: handle,
                listing_index: index,
            })
        })
        .collect();

    slots.sort_by_key(|slot| slot.minute_of_day);
    slots
}
