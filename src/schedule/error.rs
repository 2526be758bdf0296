use chrono::NaiveDateTime;
use thiserror::Error;

use super::types::GameId;

/// Outstanding obligations of one group when generation gives up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainingNeeds {
    pub group_name: String,
    /// "game name (round n)" for every unmet need
    pub needs: Vec<String>,
}

fn format_remaining(remaining: &[RemainingNeeds]) -> String {
    remaining
        .iter()
        .map(|r| format!("{}: {} remaining ({})", r.group_name, r.needs.len(), r.needs.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reasons a schedule could not be generated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("At least one group and one game are required to generate a schedule")]
    InsufficientInput,

    #[error(
        "Not enough groups: {} need up to {max_required} groups but only {available} are registered",
        .games.join(", ")
    )]
    InfeasibleGameRequirement {
        games: Vec<String>,
        max_required: usize,
        available: usize,
    },

    #[error("Game \"{name}\" must be played by 1 to 3 groups over 1 or 2 rounds")]
    InvalidGame { name: String },

    #[error("Duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("Time range {start} - {end} ends before it starts")]
    InvalidTimeRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Game duration must be positive and transition time must not be negative")]
    InvalidDuration,

    #[error("No time slot fits in the given time ranges with the configured game duration")]
    NoAvailableSlots,

    #[error("Schedule did not converge after {attempted} slots. Remaining needs: {}", format_remaining(.remaining))]
    ScheduleOverflow {
        attempted: usize,
        remaining: Vec<RemainingNeeds>,
    },

    #[error("Not enough time slots to schedule every game. Remaining needs: {}", format_remaining(.remaining))]
    SlotsExhausted { remaining: Vec<RemainingNeeds> },

    #[error("Internal error: game {game_id} is not in the catalog")]
    UnknownGame { game_id: GameId },
}
