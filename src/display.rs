use std::collections::HashMap;
use std::fs::File;
use std::io::Write;

use crate::schedule::{format_slot_range, Game, GameId, Group, GroupId, Schedule, ScheduleMetrics, TimeSlot};

/// Name lookups for rendering a schedule
pub struct Names<'a> {
    groups: HashMap<GroupId, &'a str>,
    games: HashMap<GameId, &'a str>,
}

impl<'a> Names<'a> {
    pub fn new(groups: &'a [Group], games: &'a [Game]) -> Self {
        Self {
            groups: groups.iter().map(|g| (g.id, g.name.as_str())).collect(),
            games: games.iter().map(|g| (g.id, g.name.as_str())).collect(),
        }
    }

    pub fn group(&self, id: GroupId) -> String {
        self.groups.get(&id).map_or_else(|| format!("#{}", id), |n| n.to_string())
    }

    pub fn game(&self, id: GameId) -> String {
        self.games.get(&id).map_or_else(|| format!("#{}", id), |n| n.to_string())
    }
}

/// One line per party: "Game (round n): Group A, Group B [BONUS]"
pub fn format_slot_lines(slot: &TimeSlot, names: &Names) -> Vec<String> {
    slot.parties()
        .into_iter()
        .map(|(key, members)| {
            let players: Vec<String> = members
                .iter()
                .map(|e| {
                    if e.is_second_chance {
                        format!("{} [BONUS]", names.group(e.group_id))
                    } else {
                        names.group(e.group_id)
                    }
                })
                .collect();
            format!("{} (round {}): {}", names.game(key.game_id), key.round, players.join(", "))
        })
        .collect()
}

fn format_metrics(metrics: &ScheduleMetrics) -> Vec<String> {
    let mut lines = vec![
        format!("Parties: {} (theoretical minimum {})", metrics.actual_slots_used, metrics.theoretical_minimum_slots),
        format!("Time slots used: {}", metrics.time_slots_used),
    ];
    if metrics.second_chance_entries > 0 {
        lines.push(format!(
            "Bonus entries: {} in {} parties",
            metrics.second_chance_entries, metrics.second_chance_parties
        ));
    }
    lines
}

/// Writes a schedule to a file, one block per time slot
pub fn write_schedule_to_file(
    schedule: &Schedule,
    names: &Names,
    metrics: &ScheduleMetrics,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;

    let mut current_day = None;
    for slot in &schedule.slots {
        let day = slot.start_time.date();
        if current_day != Some(day) {
            writeln!(file, "** {} **", day.format("%A %d.%m.%Y"))?;
            current_day = Some(day);
        }
        writeln!(file, "{}", format_slot_range(slot.start_time, slot.end_time))?;
        for line in format_slot_lines(slot, names) {
            writeln!(file, "  {}", line)?;
        }
    }
    writeln!(file)?;
    for line in format_metrics(metrics) {
        writeln!(file, "{}", line)?;
    }

    Ok(())
}

/// Prints a schedule in a readable format
pub fn print_schedule(schedule: &Schedule, names: &Names, metrics: &ScheduleMetrics) {
    println!("\n=== Schedule ===");
    println!("Time slots used: {}", schedule.slots.len());

    for slot in &schedule.slots {
        println!(
            "\nSlot {} ({} {})",
            slot.slot_index,
            slot.start_time.format("%d.%m."),
            format_slot_range(slot.start_time, slot.end_time)
        );
        for line in format_slot_lines(slot, names) {
            println!("  {}", line);
        }
    }

    println!();
    for line in format_metrics(metrics) {
        println!("{}", line);
    }
    if !metrics.is_optimal {
        println!("⚠️  Schedule uses more parties than the theoretical minimum");
    }
}
