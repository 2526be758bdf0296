use chrono::{Duration, NaiveDateTime};

use super::error::ScheduleError;
use super::types::{CandidateSlot, TimeRange};

/// Formats a slot boundary for display (HH:MM)
pub fn slot_to_time(time: NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}

/// Formats a slot as "HH:MM-HH:MM"
pub fn format_slot_range(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!("{}-{}", slot_to_time(start), slot_to_time(end))
}

/// Calculates every candidate slot of the event.
///
/// Ranges are walked in chronological order. Inside a range a slot starts at the
/// range start, lasts `game_duration_ms`, and the next one starts
/// `game_duration_ms + transition_time_ms` later. A slot never crosses the end of
/// its range. Indices are assigned chronologically starting at 0.
pub fn calculate_time_slots(
    time_ranges: &[TimeRange],
    game_duration_ms: i64,
    transition_time_ms: i64,
) -> Result<Vec<CandidateSlot>, ScheduleError> {
    if game_duration_ms <= 0 || transition_time_ms < 0 {
        return Err(ScheduleError::InvalidDuration);
    }
    let duration = Duration::milliseconds(game_duration_ms);
    let interval = Duration::milliseconds(game_duration_ms + transition_time_ms);

    let mut ranges = time_ranges.to_vec();
    ranges.sort_by_key(|r| r.start_time);

    let mut slots = Vec::new();
    for range in &ranges {
        let mut slot_start = range.start_time;
        while slot_start + duration <= range.end_time {
            slots.push(CandidateSlot {
                slot_index: slots.len(),
                start_time: slot_start,
                end_time: slot_start + duration,
            });
            slot_start += interval;
        }
    }

    if slots.is_empty() {
        return Err(ScheduleError::NoAvailableSlots);
    }
    Ok(slots)
}

/// Slot outside the enumerated candidates, starting one slot interval after `previous`
pub fn slot_after(
    previous: &CandidateSlot,
    slot_index: usize,
    game_duration_ms: i64,
    transition_time_ms: i64,
) -> CandidateSlot {
    let start_time = previous.start_time + Duration::milliseconds(game_duration_ms + transition_time_ms);
    CandidateSlot {
        slot_index,
        start_time,
        end_time: start_time + Duration::milliseconds(game_duration_ms),
    }
}
