use tracing::warn;

use super::error::ScheduleError;
use super::filler::SlotState;
use super::needs::{GameCatalog, NeedTracker};
use super::types::{GroupId, NeedKey, ScheduleEntry};

/// Second pass over a slot for groups the greedy filler could not place.
///
/// Only needs that can never be completed by obligated groups alone (fewer
/// groups still need the pair than the game requires) are considered, easiest
/// game first. Missing participants are taken from the free groups of the
/// slot that share the need, then from groups that are done with every game.
/// The latter are placed as bonus (second chance) entries. A group that still
/// owes games is never used as a bonus partner; if too few partners are free
/// the party waits for a later slot.
///
/// Returns the number of entries added.
pub fn backfill(
    order: &[GroupId],
    needs: &mut NeedTracker,
    catalog: &GameCatalog,
    state: &mut SlotState,
) -> Result<usize, ScheduleError> {
    let before = state.entries.len();

    for &group_id in order {
        if !state.is_group_free(group_id) || needs.is_finished(group_id) {
            continue;
        }

        let mut candidates: Vec<(NeedKey, usize, usize)> = Vec::new();
        for key in needs.needs_of(group_id) {
            if !state.is_game_free(key.game_id) {
                continue;
            }
            let size = usize::from(catalog.get(key.game_id)?.number_of_groups);
            if needs.needers(key) < size {
                candidates.push((key, size, catalog.position(key.game_id)?));
            }
        }
        candidates.sort_by_key(|&(key, size, position)| (size, key.round, position));

        for (key, size, _) in candidates {
            let mut pool: Vec<GroupId> = order
                .iter()
                .copied()
                .filter(|&other| {
                    other != group_id
                        && state.is_group_free(other)
                        && (needs.contains(other, key) || needs.is_finished(other))
                })
                .collect();
            if pool.len() < size - 1 {
                continue;
            }
            pool.sort_by_key(|&p| (!needs.contains(p, key), needs.count(p)));
            pool.truncate(size - 1);

            let mut entries = vec![ScheduleEntry::obligated(group_id, key)];
            for partner in pool {
                if needs.contains(partner, key) {
                    entries.push(ScheduleEntry::obligated(partner, key));
                } else {
                    warn!(
                        group = partner,
                        game = key.game_id,
                        round = key.round,
                        "bonus entry placed to complete a party"
                    );
                    entries.push(ScheduleEntry::bonus(partner, key));
                }
            }
            state.commit_party(needs, entries);
            break;
        }
    }

    Ok(state.entries.len() - before)
}

/// Two leftover groups, each missing a different two-group game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlockPairing {
    pub first: (GroupId, NeedKey, GroupId),
    pub second: (GroupId, NeedKey, GroupId),
}

/// Detects the end-of-schedule deadlock: exactly two groups have exactly one need
/// each, for two different two-group games, and at least two groups are done.
///
/// The partners are the first two finished groups in `order`.
pub fn detect_deadlock(
    order: &[GroupId],
    needs: &NeedTracker,
    catalog: &GameCatalog,
) -> Result<Option<DeadlockPairing>, ScheduleError> {
    let (unfinished, finished): (Vec<GroupId>, Vec<GroupId>) =
        order.iter().copied().partition(|&id| !needs.is_finished(id));

    let ([a, b], [helper_a, helper_b, ..]) = (unfinished.as_slice(), finished.as_slice()) else {
        return Ok(None);
    };
    let (need_a, need_b) = match (needs.needs_of(*a).as_slice(), needs.needs_of(*b).as_slice()) {
        ([need_a], [need_b]) => (*need_a, *need_b),
        _ => return Ok(None),
    };
    if need_a.game_id == need_b.game_id {
        return Ok(None);
    }
    if catalog.get(need_a.game_id)?.number_of_groups != 2 || catalog.get(need_b.game_id)?.number_of_groups != 2 {
        return Ok(None);
    }

    Ok(Some(DeadlockPairing {
        first: (*a, need_a, *helper_a),
        second: (*b, need_b, *helper_b),
    }))
}

/// Places both leftover groups with a finished helper each
pub fn resolve_deadlock(pairing: &DeadlockPairing, needs: &mut NeedTracker, state: &mut SlotState) {
    for &(group_id, key, helper) in [&pairing.first, &pairing.second] {
        warn!(group = group_id, helper, game = key.game_id, round = key.round, "resolving two-group deadlock");
        state.commit_party(
            needs,
            vec![ScheduleEntry::obligated(group_id, key), ScheduleEntry::bonus(helper, key)],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::filler::fill_slot;
    use crate::schedule::types::{Game, Group};

    fn groups(n: u32) -> Vec<Group> {
        (1..=n).map(|id| Group { id, name: format!("Group {}", id) }).collect()
    }

    fn game(id: u32, number_of_groups: u8, rounds: u8) -> Game {
        Game { id, name: format!("Game {}", id), number_of_groups, rounds, description: None }
    }

    #[test]
    fn leftover_group_gets_a_finished_partner() {
        let groups = groups(3);
        let games = vec![game(1, 2, 1)];
        let catalog = GameCatalog::new(&games);
        let mut needs = NeedTracker::new(&groups, &games);
        needs.discharge(1, NeedKey::new(1, 1));
        needs.discharge(2, NeedKey::new(1, 1));

        let mut state = SlotState::default();
        assert!(!fill_slot(&[3, 1, 2], &mut needs, &catalog, &mut state).unwrap());
        assert_eq!(backfill(&[3, 1, 2], &mut needs, &catalog, &mut state).unwrap(), 2);

        assert_eq!(
            state.entries,
            vec![
                ScheduleEntry::obligated(3, NeedKey::new(1, 1)),
                ScheduleEntry::bonus(1, NeedKey::new(1, 1)),
            ]
        );
        assert!(needs.all_satisfied());
    }

    #[test]
    fn needs_that_can_still_pair_up_are_left_alone() {
        let groups = groups(4);
        let games = vec![game(1, 2, 1)];
        let catalog = GameCatalog::new(&games);
        let mut needs = NeedTracker::new(&groups, &games);
        needs.discharge(1, NeedKey::new(1, 1));
        needs.discharge(2, NeedKey::new(1, 1));

        // groups 3 and 4 can still play together in a later slot
        let mut state = SlotState::default();
        state.scheduled_groups.insert(4);
        assert_eq!(backfill(&[3, 1, 2, 4], &mut needs, &catalog, &mut state).unwrap(), 0);
        assert_eq!(needs.total_remaining(), 2);
    }

    #[test]
    fn groups_sharing_the_need_are_used_before_bonus_partners() {
        let groups = groups(4);
        let games = vec![game(1, 3, 1)];
        let catalog = GameCatalog::new(&games);
        let mut needs = NeedTracker::new(&groups, &games);
        needs.discharge(1, NeedKey::new(1, 1));
        needs.discharge(2, NeedKey::new(1, 1));

        let mut state = SlotState::default();
        backfill(&[3, 1, 2, 4], &mut needs, &catalog, &mut state).unwrap();
        let bonus: Vec<GroupId> = state.entries.iter().filter(|e| e.is_second_chance).map(|e| e.group_id).collect();
        let obligated: Vec<GroupId> = state.entries.iter().filter(|e| !e.is_second_chance).map(|e| e.group_id).collect();
        assert_eq!(obligated, vec![3, 4]);
        assert_eq!(bonus, vec![1]);
        assert!(needs.all_satisfied());
    }

    #[test]
    fn groups_with_open_needs_are_never_bonus_partners() {
        let groups = groups(3);
        let games = vec![game(1, 2, 1), game(2, 1, 1)];
        let catalog = GameCatalog::new(&games);
        let mut needs = NeedTracker::new(&groups, &games);
        needs.discharge(1, NeedKey::new(1, 1));
        needs.discharge(2, NeedKey::new(1, 1));
        needs.discharge(3, NeedKey::new(2, 1));

        // groups 1 and 2 still owe the solo game, so group 3 has to wait
        let mut state = SlotState::default();
        assert_eq!(backfill(&[3, 1, 2], &mut needs, &catalog, &mut state).unwrap(), 0);
        assert!(needs.contains(3, NeedKey::new(1, 1)));

        needs.discharge(2, NeedKey::new(2, 1));
        assert_eq!(backfill(&[3, 1, 2], &mut needs, &catalog, &mut state).unwrap(), 2);
        assert_eq!(state.entries[1], ScheduleEntry::bonus(2, NeedKey::new(1, 1)));
    }

    #[test]
    fn busy_game_is_not_backfilled() {
        let groups = groups(3);
        let games = vec![game(1, 2, 1)];
        let catalog = GameCatalog::new(&games);
        let mut needs = NeedTracker::new(&groups, &games);
        needs.discharge(1, NeedKey::new(1, 1));
        needs.discharge(2, NeedKey::new(1, 1));
        let mut state = SlotState::default();
        state.scheduled_games.insert(1);
        assert_eq!(backfill(&[3, 1, 2], &mut needs, &catalog, &mut state).unwrap(), 0);
    }

    #[test]
    fn deadlock_detected_and_resolved() {
        let groups = groups(4);
        let games = vec![game(1, 2, 1), game(2, 2, 1)];
        let catalog = GameCatalog::new(&games);
        let mut needs = NeedTracker::new(&groups, &games);
        for id in [1, 2] {
            needs.discharge(id, NeedKey::new(1, 1));
            needs.discharge(id, NeedKey::new(2, 1));
        }
        needs.discharge(3, NeedKey::new(2, 1));
        needs.discharge(4, NeedKey::new(1, 1));

        let order = [2, 3, 1, 4];
        let pairing = detect_deadlock(&order, &needs, &catalog).unwrap().unwrap();
        assert_eq!(pairing.first, (3, NeedKey::new(1, 1), 2));
        assert_eq!(pairing.second, (4, NeedKey::new(2, 1), 1));

        let mut state = SlotState::default();
        resolve_deadlock(&pairing, &mut needs, &mut state);
        assert!(needs.all_satisfied());
        assert_eq!(state.entries.len(), 4);
        let bonus: Vec<GroupId> = state.entries.iter().filter(|e| e.is_second_chance).map(|e| e.group_id).collect();
        assert_eq!(bonus, vec![2, 1]);
    }

    #[test]
    fn deadlock_requires_two_finished_helpers_and_distinct_games() {
        let groups = groups(3);
        let games = vec![game(1, 2, 1), game(2, 2, 1)];
        let catalog = GameCatalog::new(&games);
        let mut needs = NeedTracker::new(&groups, &games);
        needs.discharge(1, NeedKey::new(1, 1));
        needs.discharge(1, NeedKey::new(2, 1));
        needs.discharge(2, NeedKey::new(2, 1));
        needs.discharge(3, NeedKey::new(1, 1));
        assert_eq!(detect_deadlock(&[1, 2, 3], &needs, &catalog).unwrap(), None);

        let groups = (1..=4).map(|id| Group { id, name: String::new() }).collect::<Vec<_>>();
        let mut needs = NeedTracker::new(&groups, &games);
        for id in [1, 2] {
            needs.discharge(id, NeedKey::new(1, 1));
            needs.discharge(id, NeedKey::new(2, 1));
        }
        needs.discharge(3, NeedKey::new(2, 1));
        needs.discharge(4, NeedKey::new(2, 1));
        assert_eq!(detect_deadlock(&[1, 2, 3, 4], &needs, &catalog).unwrap(), None);
    }
}
