use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::schedule::Schedule;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Writes the schedule as one row per entry, keyed by slot, group id, game id and round
pub fn write_schedule_csv<W: Write>(schedule: &Schedule, writer: W) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record([
        "slot_index",
        "start_time",
        "end_time",
        "group_id",
        "game_id",
        "round",
        "is_second_chance",
    ])?;

    for (slot, entry) in schedule.entries() {
        wtr.write_record(&[
            slot.slot_index.to_string(),
            slot.start_time.format(TIME_FORMAT).to_string(),
            slot.end_time.format(TIME_FORMAT).to_string(),
            entry.group_id.to_string(),
            entry.game_id.to_string(),
            entry.round.to_string(),
            entry.is_second_chance.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the schedule to a CSV file, replacing any existing file
pub fn export_schedule_to_csv(schedule: &Schedule, csv_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(csv_path)?;
    write_schedule_csv(schedule, file)
}
