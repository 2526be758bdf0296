use std::collections::{BTreeSet, HashMap};

use super::error::{RemainingNeeds, ScheduleError};
use super::types::{Game, GameId, Group, GroupId, NeedKey};

/// Lookup of games by id
#[derive(Debug, Clone)]
pub struct GameCatalog {
    games: Vec<Game>,
    index: HashMap<GameId, usize>,
}

impl GameCatalog {
    pub fn new(games: &[Game]) -> Self {
        let index = games.iter().enumerate().map(|(i, g)| (g.id, i)).collect();
        Self {
            games: games.to_vec(),
            index,
        }
    }

    /// A miss means a need refers to a game that was never registered,
    /// which only happens on a programming error.
    pub fn get(&self, game_id: GameId) -> Result<&Game, ScheduleError> {
        self.index
            .get(&game_id)
            .map(|&i| &self.games[i])
            .ok_or(ScheduleError::UnknownGame { game_id })
    }

    /// Position of the game in the order it was registered. Fails like `get`.
    pub fn position(&self, game_id: GameId) -> Result<usize, ScheduleError> {
        self.index
            .get(&game_id)
            .copied()
            .ok_or(ScheduleError::UnknownGame { game_id })
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn describe(&self, key: NeedKey) -> String {
        match self.get(key.game_id) {
            Ok(game) => format!("{} (round {})", game.name, key.round),
            Err(_) => format!("game #{} (round {})", key.game_id, key.round),
        }
    }
}

/// Per group, the (game, round) pairs it still has to play
#[derive(Debug, Clone, Default)]
pub struct NeedTracker {
    needs: HashMap<GroupId, BTreeSet<NeedKey>>,
}

impl NeedTracker {
    /// Every group needs every round of every game
    pub fn new(groups: &[Group], games: &[Game]) -> Self {
        let needs = groups
            .iter()
            .map(|group| {
                let set = games
                    .iter()
                    .flat_map(|game| (1..=game.rounds).map(move |round| NeedKey::new(game.id, round)))
                    .collect();
                (group.id, set)
            })
            .collect();
        Self { needs }
    }

    pub fn count(&self, group_id: GroupId) -> usize {
        self.needs.get(&group_id).map_or(0, BTreeSet::len)
    }

    pub fn contains(&self, group_id: GroupId, key: NeedKey) -> bool {
        self.needs
            .get(&group_id)
            .is_some_and(|set| set.contains(&key))
    }

    pub fn is_finished(&self, group_id: GroupId) -> bool {
        self.count(group_id) == 0
    }

    /// Outstanding needs of a group, ordered by game id then round
    pub fn needs_of(&self, group_id: GroupId) -> Vec<NeedKey> {
        self.needs
            .get(&group_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Removes a need once it is satisfied. Returns false if the group did not have it.
    pub fn discharge(&mut self, group_id: GroupId, key: NeedKey) -> bool {
        self.needs
            .get_mut(&group_id)
            .is_some_and(|set| set.remove(&key))
    }

    /// Number of groups that still have `key` outstanding
    pub fn needers(&self, key: NeedKey) -> usize {
        self.needs.values().filter(|set| set.contains(&key)).count()
    }

    pub fn total_remaining(&self) -> usize {
        self.needs.values().map(BTreeSet::len).sum()
    }

    pub fn all_satisfied(&self) -> bool {
        self.needs.values().all(BTreeSet::is_empty)
    }

    /// Remaining needs of every unfinished group, in group order
    pub fn remaining_report(&self, groups: &[Group], catalog: &GameCatalog) -> Vec<RemainingNeeds> {
        groups
            .iter()
            .filter(|g| !self.is_finished(g.id))
            .map(|g| RemainingNeeds {
                group_name: g.name.clone(),
                needs: self
                    .needs_of(g.id)
                    .into_iter()
                    .map(|key| catalog.describe(key))
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<Group> {
        vec![
            Group { id: 1, name: "Otters".to_string() },
            Group { id: 2, name: "Foxes".to_string() },
        ]
    }

    fn games() -> Vec<Game> {
        vec![
            Game { id: 10, name: "Relay".to_string(), number_of_groups: 2, rounds: 2, description: None },
            Game { id: 20, name: "Archery".to_string(), number_of_groups: 1, rounds: 1, description: None },
        ]
    }

    #[test]
    fn initial_needs_cover_every_round() {
        let tracker = NeedTracker::new(&groups(), &games());
        assert_eq!(tracker.count(1), 3);
        assert_eq!(tracker.total_remaining(), 6);
        assert!(tracker.contains(2, NeedKey::new(10, 2)));
        assert!(!tracker.contains(2, NeedKey::new(20, 2)));
        assert_eq!(tracker.needers(NeedKey::new(10, 1)), 2);
    }

    #[test]
    fn discharge_removes_exactly_once() {
        let mut tracker = NeedTracker::new(&groups(), &games());
        let key = NeedKey::new(20, 1);
        assert!(tracker.discharge(1, key));
        assert!(!tracker.discharge(1, key));
        assert_eq!(tracker.needers(key), 1);
        assert!(!tracker.all_satisfied());
    }

    #[test]
    fn report_lists_unfinished_groups_only() {
        let mut tracker = NeedTracker::new(&groups(), &games());
        for key in tracker.needs_of(1) {
            tracker.discharge(1, key);
        }
        tracker.discharge(2, NeedKey::new(10, 1));
        let catalog = GameCatalog::new(&games());
        let report = tracker.remaining_report(&groups(), &catalog);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].group_name, "Foxes");
        assert_eq!(report[0].needs, vec!["Relay (round 2)", "Archery (round 1)"]);
    }

    #[test]
    fn catalog_rejects_unknown_game() {
        let catalog = GameCatalog::new(&games());
        assert_eq!(catalog.get(99), Err(ScheduleError::UnknownGame { game_id: 99 }));
        assert_eq!(catalog.get(20).map(|g| g.name.as_str()), Ok("Archery"));
        assert_eq!(catalog.position(20), Ok(1));
        assert_eq!(catalog.position(99), Err(ScheduleError::UnknownGame { game_id: 99 }));
    }
}
