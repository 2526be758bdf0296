use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};

use super::error::ScheduleError;
use super::needs::{GameCatalog, NeedTracker};
use super::types::{Game, Group, TimeRange};

/// Default event day when no time range is given: 09:00 - 17:00
pub const DEFAULT_DAY_START: (u32, u32) = (9, 0);
pub const DEFAULT_DAY_END: (u32, u32) = (17, 0);

/// Input that passed validation, ready for slot enumeration
#[derive(Debug, Clone)]
pub struct ValidatedState {
    pub time_ranges: Vec<TimeRange>,
    pub catalog: GameCatalog,
    pub needs: NeedTracker,
}

/// 09:00 - 17:00 on the given day
pub fn default_time_range(reference_date: NaiveDate) -> TimeRange {
    let at = |(h, m): (u32, u32)| reference_date.and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN));
    TimeRange {
        start_time: at(DEFAULT_DAY_START),
        end_time: at(DEFAULT_DAY_END),
    }
}

/// Checks the input and builds the initial need map.
///
/// Time ranges are returned sorted by start time; an empty list is replaced
/// by the default day on `reference_date`.
pub fn validate(
    groups: &[Group],
    games: &[Game],
    time_ranges: &[TimeRange],
    reference_date: NaiveDate,
) -> Result<ValidatedState, ScheduleError> {
    if groups.is_empty() || games.is_empty() {
        return Err(ScheduleError::InsufficientInput);
    }

    let mut seen = HashSet::new();
    for group in groups {
        if !seen.insert(group.id) {
            return Err(ScheduleError::DuplicateId { kind: "group", id: group.id });
        }
    }
    seen.clear();
    for game in games {
        if !seen.insert(game.id) {
            return Err(ScheduleError::DuplicateId { kind: "game", id: game.id });
        }
        if !(1..=3).contains(&game.number_of_groups) || !(1..=2).contains(&game.rounds) {
            return Err(ScheduleError::InvalidGame { name: game.name.clone() });
        }
    }

    let too_big: Vec<&Game> = games
        .iter()
        .filter(|g| usize::from(g.number_of_groups) > groups.len())
        .collect();
    if !too_big.is_empty() {
        return Err(ScheduleError::InfeasibleGameRequirement {
            games: too_big.iter().map(|g| g.name.clone()).collect(),
            max_required: too_big
                .iter()
                .map(|g| usize::from(g.number_of_groups))
                .max()
                .unwrap_or_default(),
            available: groups.len(),
        });
    }

    for range in time_ranges {
        if range.end_time <= range.start_time {
            return Err(ScheduleError::InvalidTimeRange {
                start: range.start_time,
                end: range.end_time,
            });
        }
    }

    let mut time_ranges = if time_ranges.is_empty() {
        vec![default_time_range(reference_date)]
    } else {
        time_ranges.to_vec()
    };
    time_ranges.sort_by_key(|r| r.start_time);

    Ok(ValidatedState {
        time_ranges,
        catalog: GameCatalog::new(games),
        needs: NeedTracker::new(groups, games),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::NeedKey;

    fn group(id: u32, name: &str) -> Group {
        Group { id, name: name.to_string() }
    }

    fn game(id: u32, name: &str, number_of_groups: u8, rounds: u8) -> Game {
        Game { id, name: name.to_string(), number_of_groups, rounds, description: None }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 6).unwrap()
    }

    #[test]
    fn empty_groups_or_games_rejected() {
        let games = vec![game(1, "Relay", 2, 1)];
        let groups = vec![group(1, "Otters")];
        assert_eq!(
            validate(&[], &games, &[], day()).unwrap_err(),
            ScheduleError::InsufficientInput
        );
        assert_eq!(
            validate(&groups, &[], &[], day()).unwrap_err(),
            ScheduleError::InsufficientInput
        );
    }

    #[test]
    fn game_needing_more_groups_than_exist_is_named() {
        let groups = vec![group(1, "Otters"), group(2, "Foxes")];
        let games = vec![game(1, "Relay", 2, 1), game(2, "Tug of war", 3, 1)];
        let err = validate(&groups, &games, &[], day()).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::InfeasibleGameRequirement {
                games: vec!["Tug of war".to_string()],
                max_required: 3,
                available: 2,
            }
        );
        assert!(err.to_string().contains("Tug of war"));
    }

    #[test]
    fn default_range_is_nine_to_five() {
        let groups = vec![group(1, "Otters")];
        let games = vec![game(1, "Archery", 1, 2)];
        let state = validate(&groups, &games, &[], day()).unwrap();
        assert_eq!(state.time_ranges.len(), 1);
        assert_eq!(state.time_ranges[0].start_time, day().and_hms_opt(9, 0, 0).unwrap());
        assert_eq!(state.time_ranges[0].end_time, day().and_hms_opt(17, 0, 0).unwrap());
        assert_eq!(state.needs.needs_of(1), vec![NeedKey::new(1, 1), NeedKey::new(1, 2)]);
    }

    #[test]
    fn ranges_are_sorted_and_checked() {
        let groups = vec![group(1, "Otters")];
        let games = vec![game(1, "Archery", 1, 1)];
        let afternoon = TimeRange {
            start_time: day().and_hms_opt(14, 0, 0).unwrap(),
            end_time: day().and_hms_opt(16, 0, 0).unwrap(),
        };
        let morning = TimeRange {
            start_time: day().and_hms_opt(9, 0, 0).unwrap(),
            end_time: day().and_hms_opt(11, 0, 0).unwrap(),
        };
        let state = validate(&groups, &games, &[afternoon, morning], day()).unwrap();
        assert_eq!(state.time_ranges, vec![morning, afternoon]);

        let backwards = TimeRange { start_time: afternoon.end_time, end_time: afternoon.start_time };
        assert!(matches!(
            validate(&groups, &games, &[backwards], day()),
            Err(ScheduleError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn malformed_games_and_duplicates_rejected() {
        let groups = vec![group(1, "Otters"), group(2, "Foxes")];
        assert_eq!(
            validate(&groups, &[game(1, "Relay", 2, 3)], &[], day()).unwrap_err(),
            ScheduleError::InvalidGame { name: "Relay".to_string() }
        );
        assert_eq!(
            validate(&groups, &[game(1, "Relay", 2, 1), game(1, "Archery", 1, 1)], &[], day()).unwrap_err(),
            ScheduleError::DuplicateId { kind: "game", id: 1 }
        );
        let twins = vec![group(1, "Otters"), group(1, "Foxes")];
        assert_eq!(
            validate(&twins, &[game(1, "Relay", 2, 1)], &[], day()).unwrap_err(),
            ScheduleError::DuplicateId { kind: "group", id: 1 }
        );
    }
}
