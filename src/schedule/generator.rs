use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::ScheduleSettings;

use super::backfill::{backfill, detect_deadlock, resolve_deadlock};
use super::error::ScheduleError;
use super::filler::{fill_slot, order_groups, SlotState};
use super::slot_utils::{calculate_time_slots, slot_after};
use super::types::{CandidateSlot, Game, Group, Schedule, SlotOrder, TimeSlot};
use super::validate::validate;

/// How a processed slot was filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Candidate slot, greedy filling followed by backfill
    Scheduling,
    /// Extra slot created to resolve the two-group deadlock
    Deadlocked,
}

/// Upper bound on the number of candidate slots tried before giving up
pub fn safety_bound(groups: &[Group], games: &[Game]) -> usize {
    let round_units: usize = games.iter().map(|g| usize::from(g.rounds)).sum();
    groups.len() * round_units + groups.len()
}

/// Generates a schedule with the seed from `settings`, or a fresh one if none is set.
///
/// Without a seed two runs over the same input may produce different, equally
/// valid schedules.
pub fn generate_with_settings(
    groups: &[Group],
    games: &[Game],
    settings: &ScheduleSettings,
) -> Result<Schedule, ScheduleError> {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_schedule(groups, games, settings, &mut rng)
}

/// Assigns every (group, game, round) obligation to a time slot.
///
/// Candidate slots are visited in `settings.slot_order`; each slot is filled
/// greedily, then backfilled. Before the next candidate is taken the two-group
/// deadlock is checked: when it applies, one extra slot with the next free
/// index is created one slot interval after the latest slot processed so far,
/// and scheduling resumes. Slots that end up empty are dropped. The result is
/// sorted by start time and keeps the slot indices.
pub fn generate_schedule<R: Rng + ?Sized>(
    groups: &[Group],
    games: &[Game],
    settings: &ScheduleSettings,
    rng: &mut R,
) -> Result<Schedule, ScheduleError> {
    let state = validate(groups, games, &settings.time_ranges, settings.reference_date)?;
    let candidates = calculate_time_slots(
        &state.time_ranges,
        settings.game_duration_ms,
        settings.transition_time_ms,
    )?;
    let catalog = state.catalog;
    let mut needs = state.needs;

    info!(
        groups = groups.len(),
        games = games.len(),
        candidate_slots = candidates.len(),
        obligations = needs.total_remaining(),
        "generating schedule"
    );

    let visit: Vec<&CandidateSlot> = match settings.slot_order {
        SlotOrder::Forward => candidates.iter().collect(),
        SlotOrder::Reverse => candidates.iter().rev().collect(),
    };
    let mut visit = visit.into_iter();
    let bound = safety_bound(groups, games);
    let mut attempted = 0;
    let mut extra_slots = 0;
    let mut latest: Option<CandidateSlot> = None;
    let mut used: Vec<TimeSlot> = Vec::new();

    while !needs.all_satisfied() {
        if attempted >= bound {
            return Err(ScheduleError::ScheduleOverflow {
                attempted,
                remaining: needs.remaining_report(groups, &catalog),
            });
        }

        let order = order_groups(groups, &needs, rng);
        let mut slot = SlotState::default();
        let deadlock = match latest {
            Some(previous) => detect_deadlock(&order, &needs, &catalog)?.map(|pairing| (pairing, previous)),
            None => None,
        };

        let (candidate, phase) = match deadlock {
            Some((pairing, previous)) => {
                let extra = slot_after(
                    &previous,
                    candidates.len() + extra_slots,
                    settings.game_duration_ms,
                    settings.transition_time_ms,
                );
                extra_slots += 1;
                resolve_deadlock(&pairing, &mut needs, &mut slot);
                (extra, Phase::Deadlocked)
            }
            None => {
                let Some(&candidate) = visit.next() else {
                    break;
                };
                let placed = fill_slot(&order, &mut needs, &catalog, &mut slot)?;
                let backfilled = backfill(&order, &mut needs, &catalog, &mut slot)?;
                debug!(slot = candidate.slot_index, placed, backfilled, "slot filled");
                (candidate, Phase::Scheduling)
            }
        };
        attempted += 1;
        if latest.map_or(true, |l| candidate.start_time > l.start_time) {
            latest = Some(candidate);
        }

        debug!(
            slot = candidate.slot_index,
            ?phase,
            entries = slot.entries.len(),
            remaining = needs.total_remaining(),
            "slot processed"
        );
        if slot.entries.is_empty() {
            continue;
        }
        used.push(TimeSlot::from_candidate(&candidate, slot.entries));
    }

    if !needs.all_satisfied() {
        return Err(ScheduleError::SlotsExhausted {
            remaining: needs.remaining_report(groups, &catalog),
        });
    }

    used.sort_by_key(|s| s.start_time);
    let schedule = Schedule { slots: used };
    info!(
        slots_used = schedule.slots.len(),
        second_chance = schedule.second_chance_count(),
        "schedule generated"
    );
    Ok(schedule)
}
