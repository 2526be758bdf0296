use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use super::types::{Game, GameId, Group, NeedKey, Schedule};

/// How close a schedule is to the best possible packing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleMetrics {
    pub theoretical_minimum_slots: usize,
    /// Distinct (slot, game, round) parties
    pub actual_slots_used: usize,
    pub second_chance_parties: usize,
    pub second_chance_entries: usize,
    /// Time slots with at least one party
    pub time_slots_used: usize,
    pub is_optimal: bool,
}

/// Sum over games of ceil(groups * rounds / groups per party)
pub fn theoretical_minimum_slots(group_count: usize, games: &[Game]) -> usize {
    games
        .iter()
        .map(|g| (group_count * usize::from(g.rounds)).div_ceil(usize::from(g.number_of_groups.max(1))))
        .sum()
}

/// Computes the metrics from a generated schedule alone
pub fn compute_metrics(schedule: &Schedule, group_count: usize, games: &[Game]) -> ScheduleMetrics {
    let mut parties: BTreeSet<(usize, NeedKey)> = BTreeSet::new();
    let mut bonus_parties: BTreeSet<(usize, NeedKey)> = BTreeSet::new();
    let mut second_chance_entries = 0;

    for (slot, entry) in schedule.entries() {
        let party = (slot.slot_index, entry.need_key());
        parties.insert(party);
        if entry.is_second_chance {
            bonus_parties.insert(party);
            second_chance_entries += 1;
        }
    }

    let theoretical_minimum_slots = theoretical_minimum_slots(group_count, games);
    ScheduleMetrics {
        theoretical_minimum_slots,
        actual_slots_used: parties.len(),
        second_chance_parties: bonus_parties.len(),
        second_chance_entries,
        time_slots_used: schedule.slots.iter().filter(|s| !s.entries.is_empty()).count(),
        is_optimal: parties.len() == theoretical_minimum_slots,
    }
}

/// Lists every broken rule of a schedule: double bookings, wrong party sizes,
/// unknown games and obligations that are missing or played twice.
pub fn find_violations(schedule: &Schedule, groups: &[Group], games: &[Game]) -> Vec<String> {
    let catalog: HashMap<GameId, &Game> = games.iter().map(|g| (g.id, g)).collect();
    let mut violations = Vec::new();
    let mut played: HashMap<(u32, NeedKey), usize> = HashMap::new();

    for slot in &schedule.slots {
        let mut seen_groups = HashSet::new();
        for entry in &slot.entries {
            if !seen_groups.insert(entry.group_id) {
                violations.push(format!("group {} is booked twice in slot {}", entry.group_id, slot.slot_index));
            }
            if !entry.is_second_chance {
                *played.entry((entry.group_id, entry.need_key())).or_insert(0) += 1;
            }
        }

        let mut seen_games = HashSet::new();
        for (key, members) in slot.parties() {
            if !seen_games.insert(key.game_id) {
                violations.push(format!("game {} has two parties in slot {}", key.game_id, slot.slot_index));
            }
            match catalog.get(&key.game_id) {
                Some(game) if usize::from(game.number_of_groups) != members.len() => violations.push(format!(
                    "{} in slot {} has {} groups instead of {}",
                    game.name,
                    slot.slot_index,
                    members.len(),
                    game.number_of_groups
                )),
                Some(_) => {}
                None => violations.push(format!("unknown game {} in slot {}", key.game_id, slot.slot_index)),
            }
        }
    }

    for group in groups {
        for game in games {
            for round in 1..=game.rounds {
                match played.get(&(group.id, NeedKey::new(game.id, round))).copied().unwrap_or(0) {
                    1 => {}
                    0 => violations.push(format!("{} never plays {} (round {})", group.name, game.name, round)),
                    n => violations.push(format!("{} plays {} (round {}) {} times", group.name, game.name, round, n)),
                }
            }
        }
    }

    violations
}
