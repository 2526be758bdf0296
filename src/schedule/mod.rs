pub mod types;
pub mod error;
pub mod validate;
pub mod slot_utils;
pub mod needs;
pub mod filler;
pub mod backfill;
pub mod generator;
pub mod metrics;

pub use types::{Game, GameId, Group, GroupId, NeedKey, Round, Schedule, ScheduleEntry, SlotOrder, TimeRange, TimeSlot};
pub use error::{RemainingNeeds, ScheduleError};
pub use slot_utils::{calculate_time_slots, format_slot_range, slot_to_time};
pub use generator::{generate_schedule, generate_with_settings};
pub use metrics::{compute_metrics, find_violations, theoretical_minimum_slots, ScheduleMetrics};
