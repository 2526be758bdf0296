use csv::Reader;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::schedule::{Game, Group};

/// Finds a column by (case-insensitive) header name
fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn parse_field<T: std::str::FromStr>(value: &str, what: &str, line: u64) -> Result<T, Box<dyn std::error::Error>> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid {} \"{}\" on line {}", what, value.trim(), line).into())
}

/// Reads groups from CSV with the columns `id,name`.
/// Rows with an empty id or name are skipped; a later row with the same id replaces an earlier one.
pub fn read_groups<R: Read>(reader: R) -> Result<Vec<Group>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let id_col = column(&headers, "id").unwrap_or(0);
    let name_col = column(&headers, "name").unwrap_or(1);

    let mut groups: Vec<Group> = Vec::new();
    let mut positions: HashMap<u32, usize> = HashMap::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let id = record.get(id_col).unwrap_or("").trim();
        let name = record.get(name_col).unwrap_or("").trim().to_string();
        if id.is_empty() || name.is_empty() {
            continue;
        }
        let group = Group { id: parse_field(id, "group id", line)?, name };
        match positions.get(&group.id) {
            Some(&i) => groups[i] = group,
            None => {
                positions.insert(group.id, groups.len());
                groups.push(group);
            }
        }
    }

    Ok(groups)
}

/// Reads games from CSV with the columns `id,name,number_of_groups,rounds` and an optional `description`.
/// Empty `number_of_groups` or `rounds` default to 1.
pub fn read_games<R: Read>(reader: R) -> Result<Vec<Game>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let id_col = column(&headers, "id").unwrap_or(0);
    let name_col = column(&headers, "name").unwrap_or(1);
    let groups_col = column(&headers, "number_of_groups").unwrap_or(2);
    let rounds_col = column(&headers, "rounds").unwrap_or(3);
    let description_col = column(&headers, "description");

    let mut games = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let id = record.get(id_col).unwrap_or("").trim();
        let name = record.get(name_col).unwrap_or("").trim().to_string();
        if id.is_empty() || name.is_empty() {
            continue;
        }

        let number = |col: usize, what: &str| -> Result<u8, Box<dyn std::error::Error>> {
            match record.get(col).map(str::trim) {
                None | Some("") => Ok(1),
                Some(v) => parse_field(v, what, line),
            }
        };
        let description = description_col
            .and_then(|c| record.get(c))
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        games.push(Game {
            id: parse_field(id, "game id", line)?,
            name,
            number_of_groups: number(groups_col, "number of groups")?,
            rounds: number(rounds_col, "rounds")?,
            description,
        });
    }

    Ok(games)
}

/// Loads groups from a CSV file
pub fn load_groups<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Group>, Box<dyn std::error::Error>> {
    read_groups(std::fs::File::open(csv_path)?)
}

/// Loads games from a CSV file
pub fn load_games<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Game>, Box<dyn std::error::Error>> {
    read_games(std::fs::File::open(csv_path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_skip_blank_rows_and_merge_duplicates() {
        let csv = "id,name\n1,Otters\n2, Foxes \n,Nameless\n3,\n1,Sea Otters\n";
        let groups = read_groups(csv.as_bytes()).unwrap();
        assert_eq!(
            groups,
            vec![
                Group { id: 1, name: "Sea Otters".to_string() },
                Group { id: 2, name: "Foxes".to_string() },
            ]
        );
    }

    #[test]
    fn columns_are_found_by_name() {
        let csv = "name,rounds,id,number_of_groups,description\nRelay,2,7,2,Run!\nArchery,,8,,\n";
        let games = read_games(csv.as_bytes()).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].id, 7);
        assert_eq!(games[0].number_of_groups, 2);
        assert_eq!(games[0].rounds, 2);
        assert_eq!(games[0].description.as_deref(), Some("Run!"));
        assert_eq!(games[1].number_of_groups, 1);
        assert_eq!(games[1].rounds, 1);
        assert_eq!(games[1].description, None);
    }

    #[test]
    fn bad_numbers_are_errors() {
        let csv = "id,name,number_of_groups,rounds\n1,Relay,two,1\n";
        let err = read_games(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("number of groups"));
        assert!(read_groups("id,name\nx,Otters\n".as_bytes()).is_err());
    }
}
