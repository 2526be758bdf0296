use std::path::Path;

use tracing_subscriber::EnvFilter;

use outdoor_games_scheduler::config::{admin_password, load_settings};
use outdoor_games_scheduler::display::{print_schedule, write_schedule_to_file, Names};
use outdoor_games_scheduler::export::export_schedule_to_csv;
use outdoor_games_scheduler::parser::{load_games, load_groups};
use outdoor_games_scheduler::schedule::{compute_metrics, generate_with_settings};
use outdoor_games_scheduler::web;

const USAGE: &str = "Usage:
  outdoor-games-scheduler generate <groups.csv> <games.csv> [settings.json]
  outdoor-games-scheduler web [port]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("web") => {
            let port = args.get(2)
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080);

            println!("Starting web server on port {}...", port);
            println!("Access the API at http://localhost:{}/api", port);

            web::start_server(port, admin_password()).await?;
        }
        Some("generate") if args.len() >= 4 => {
            let settings_path = args.get(4).map_or("data/settings.json", String::as_str);
            run_generate(&args[2], &args[3], settings_path)?;
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}

fn run_generate(groups_path: &str, games_path: &str, settings_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading groups and games from CSV...");
    let groups = load_groups(groups_path)?;
    let games = load_games(games_path)?;
    let settings = load_settings(settings_path)?;
    println!("Loaded {} groups and {} games", groups.len(), games.len());

    println!("\n=== Running Schedule Generator ===");
    let schedule = generate_with_settings(&groups, &games, &settings)?;
    let metrics = compute_metrics(&schedule, groups.len(), &games);
    let names = Names::new(&groups, &games);

    print_schedule(&schedule, &names, &metrics);

    println!("\n=== Writing Schedule to Files ===");
    write_schedule_to_file(&schedule, &names, &metrics, "schedule.txt")?;
    export_schedule_to_csv(&schedule, Path::new("schedule_entries.csv"))?;
    println!("Schedule saved to:");
    println!("  - schedule.txt");
    println!("  - schedule_entries.csv");

    Ok(())
}
