use std::cmp::Reverse;
use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::error::ScheduleError;
use super::needs::{GameCatalog, NeedTracker};
use super::types::{GameId, Group, GroupId, NeedKey, ScheduleEntry};

/// What has been placed into the slot being filled
#[derive(Debug, Clone, Default)]
pub struct SlotState {
    pub scheduled_groups: HashSet<GroupId>,
    pub scheduled_games: HashSet<GameId>,
    pub entries: Vec<ScheduleEntry>,
}

impl SlotState {
    pub fn is_group_free(&self, group_id: GroupId) -> bool {
        !self.scheduled_groups.contains(&group_id)
    }

    pub fn is_game_free(&self, game_id: GameId) -> bool {
        !self.scheduled_games.contains(&game_id)
    }

    /// Records one party. Obligated participants have their need discharged.
    pub fn commit_party(&mut self, needs: &mut NeedTracker, entries: Vec<ScheduleEntry>) {
        for entry in entries {
            if !entry.is_second_chance {
                needs.discharge(entry.group_id, entry.need_key());
            }
            self.scheduled_groups.insert(entry.group_id);
            self.scheduled_games.insert(entry.game_id);
            self.entries.push(entry);
        }
    }
}

/// Order in which groups get to pick a game in the next slot.
///
/// Groups are shuffled first, then stable-sorted by outstanding need count
/// (most first), so the random order only breaks ties.
pub fn order_groups<R: Rng + ?Sized>(groups: &[Group], needs: &NeedTracker, rng: &mut R) -> Vec<GroupId> {
    let mut order: Vec<GroupId> = groups.iter().map(|g| g.id).collect();
    order.shuffle(rng);
    order.sort_by_key(|&id| Reverse(needs.count(id)));
    order
}

/// Needs of a group playable in this slot, hardest to fill first
fn playable_needs(
    group_id: GroupId,
    needs: &NeedTracker,
    catalog: &GameCatalog,
    state: &SlotState,
) -> Result<Vec<(NeedKey, usize)>, ScheduleError> {
    let mut playable = Vec::new();
    for key in needs.needs_of(group_id) {
        if !state.is_game_free(key.game_id) {
            continue;
        }
        let game = catalog.get(key.game_id)?;
        playable.push((key, usize::from(game.number_of_groups), catalog.position(key.game_id)?));
    }
    playable.sort_by_key(|&(key, size, position)| (Reverse(size), key.round, position));
    Ok(playable.into_iter().map(|(key, size, _)| (key, size)).collect())
}

/// Greedily pairs up groups that share an outstanding need.
///
/// Every group, in `order`, gets at most one party: the first of its playable
/// needs for which enough free groups have the exact same (game, round)
/// outstanding. Returns true if anything was scheduled.
pub fn fill_slot(
    order: &[GroupId],
    needs: &mut NeedTracker,
    catalog: &GameCatalog,
    state: &mut SlotState,
) -> Result<bool, ScheduleError> {
    let before = state.entries.len();

    for &group_id in order {
        if !state.is_group_free(group_id) || needs.is_finished(group_id) {
            continue;
        }

        for (key, size) in playable_needs(group_id, needs, catalog, state)? {
            // another group of this slot may have taken the game meanwhile
            if !state.is_game_free(key.game_id) {
                continue;
            }

            let mut participants = vec![group_id];
            if size > 1 {
                let mut partners: Vec<GroupId> = order
                    .iter()
                    .copied()
                    .filter(|&other| other != group_id && state.is_group_free(other) && needs.contains(other, key))
                    .collect();
                if partners.len() < size - 1 {
                    continue;
                }
                // groups with fewer needs left are harder to place later
                partners.sort_by_key(|&p| needs.count(p));
                partners.truncate(size - 1);
                participants.extend(partners);
            }

            debug!(game = key.game_id, round = key.round, groups = ?participants, "party scheduled");
            let entries = participants
                .into_iter()
                .map(|id| ScheduleEntry::obligated(id, key))
                .collect();
            state.commit_party(needs, entries);
            break;
        }
    }

    Ok(state.entries.len() > before)
}
