use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use habit_tracker_rs::{
    AppState, CategoryTitle, NewTracker, Schedule, TrackerColor, TrackerEmoji, TrackerName,
    Weekday,
};

/// A utility for creating a test database for the habit_tracker_rs server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// (name, emoji, color, category, days)
const SAMPLE_TRACKERS: [(&str, &str, &str, &str, &[Weekday]); 4] = [
    (
        "Yoga",
        "🧘",
        "#FD4C49",
        "Health",
        &[Weekday::Monday, Weekday::Wednesday, Weekday::Friday],
    ),
    ("Drink water", "💧", "#4285F4", "Health", &Weekday::ALL),
    (
        "Read",
        "📚",
        "#34A853",
        "Study",
        &[Weekday::Tuesday, Weekday::Thursday],
    ),
    (
        "Football",
        "⚽",
        "#FBBC05",
        "Sport",
        &[Weekday::Saturday, Weekday::Sunday],
    ),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let state = AppState::new(Connection::open(output_path)?, "Etc/UTC")?;

    println!("Creating sample trackers...");

    let today = OffsetDateTime::now_utc().date();

    for (name, emoji, color, category, days) in SAMPLE_TRACKERS {
        let tracker = state.store.create_tracker(&NewTracker {
            name: TrackerName::new(name)?,
            color: TrackerColor::new(color)?,
            emoji: TrackerEmoji::new(emoji)?,
            schedule: days.iter().copied().collect::<Schedule>(),
            category: CategoryTitle::new(category)?,
        })?;

        // Complete each tracker on its scheduled days of the last two weeks.
        for days_ago in 0..14 {
            let date = today - Duration::days(days_ago);

            if tracker.schedule.contains(Weekday::from(date.weekday())) {
                state.store.toggle_completion(tracker.id, date, today)?;
            }
        }
    }

    println!("Success!");

    Ok(())
}
