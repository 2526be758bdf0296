use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type GroupId = u32;
pub type GameId = u32;
pub type Round = u8;

/// A participating group (team) of the event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// A game station. Every group plays it `rounds` times, `number_of_groups` groups at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub number_of_groups: u8,
    pub rounds: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A window of the event during which games can take place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// One outstanding obligation: play `game_id` for the `round`-th time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NeedKey {
    pub game_id: GameId,
    pub round: Round,
}

impl NeedKey {
    pub fn new(game_id: GameId, round: Round) -> Self {
        Self { game_id, round }
    }
}

/// Candidate slot produced by the enumerator, before anything is assigned to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSlot {
    pub slot_index: usize,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// A committed assignment of a group to a game round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub group_id: GroupId,
    pub game_id: GameId,
    pub round: Round,
    #[serde(default)]
    pub is_second_chance: bool,
}

impl ScheduleEntry {
    pub fn obligated(group_id: GroupId, key: NeedKey) -> Self {
        Self {
            group_id,
            game_id: key.game_id,
            round: key.round,
            is_second_chance: false,
        }
    }

    pub fn bonus(group_id: GroupId, key: NeedKey) -> Self {
        Self {
            is_second_chance: true,
            ..Self::obligated(group_id, key)
        }
    }

    pub fn need_key(&self) -> NeedKey {
        NeedKey::new(self.game_id, self.round)
    }
}

/// A used time slot with everything that happens in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub slot_index: usize,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub entries: Vec<ScheduleEntry>,
}

impl TimeSlot {
    pub fn from_candidate(candidate: &CandidateSlot, entries: Vec<ScheduleEntry>) -> Self {
        Self {
            slot_index: candidate.slot_index,
            start_time: candidate.start_time,
            end_time: candidate.end_time,
            entries,
        }
    }

    /// Groups the entries into parties, keyed by game and round, in order of first appearance
    pub fn parties(&self) -> Vec<(NeedKey, Vec<&ScheduleEntry>)> {
        let mut parties: Vec<(NeedKey, Vec<&ScheduleEntry>)> = Vec::new();
        for entry in &self.entries {
            let key = entry.need_key();
            match parties.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(entry),
                None => parties.push((key, vec![entry])),
            }
        }
        parties
    }
}

/// Generated timetable, sorted by slot start time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub slots: Vec<TimeSlot>,
}

impl Schedule {
    pub fn entries(&self) -> impl Iterator<Item = (&TimeSlot, &ScheduleEntry)> {
        self.slots
            .iter()
            .flat_map(|slot| slot.entries.iter().map(move |entry| (slot, entry)))
    }

    pub fn second_chance_count(&self) -> usize {
        self.entries().filter(|(_, e)| e.is_second_chance).count()
    }
}

/// Order in which candidate slots are visited by the generator.
///
/// The output is sorted by start time either way; the order only changes
/// which slots end up carrying the bonus entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotOrder {
    /// Latest slot first
    #[default]
    Reverse,
    Forward,
}
