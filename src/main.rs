use std::time::Duration;

use clap::Parser;
use seat_planner::interleave::sort_for_seating;
use seat_planner::planner::plan;
use seat_planner::render;
use seat_planner::types::{AdjacencyMode, Classroom, Person, SeatingOptions};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "seat_planner",
    about = "Seat people in classrooms so that neighbors never share a category"
)]
struct Cli {
    /// JSON file with an array of people ({"id", "name", "category"})
    #[arg(long)]
    people: String,

    /// Classrooms as NAME:RxC (e.g. A101:5x6 B204:4x8)
    #[arg(long = "room", num_args = 1.., required = true)]
    rooms: Vec<String>,

    /// Adjacency: 4 (orthogonal) or 8 (orthogonal and diagonal)
    #[arg(long, default_value = "8", value_parser = parse_adjacency)]
    adjacency: AdjacencyMode,

    /// Search deadline per classroom in milliseconds
    #[arg(long, default_value_t = 3000)]
    deadline_ms: u64,

    /// Keep the input order instead of sorting by category, then id
    #[arg(long)]
    keep_order: bool,

    /// Show an ASCII chart of each classroom
    #[arg(long)]
    layout: bool,

    /// Print the full plan as JSON
    #[arg(long)]
    json: bool,

    /// Log search details to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn parse_adjacency(s: &str) -> Result<AdjacencyMode, String> {
    s.parse()
}

fn parse_room(s: &str) -> Result<Classroom, String> {
    let (name, dims) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("invalid room '{}', expected NAME:RxC", s))?;
    if name.is_empty() {
        return Err(format!("room name missing in '{}'", s));
    }
    let (rows, columns) = dims
        .split_once('x')
        .ok_or_else(|| format!("invalid dimensions in '{}', expected RxC", s))?;
    let rows = rows
        .parse::<usize>()
        .map_err(|_| format!("invalid row count in '{}'", s))?;
    let columns = columns
        .parse::<usize>()
        .map_err(|_| format!("invalid column count in '{}'", s))?;
    if rows == 0 || columns == 0 {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok(Classroom::new(name, rows, columns))
}

fn read_people(path: &str) -> Result<Vec<Person>, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))?;
    serde_json::from_str(&raw).map_err(|e| format!("invalid people file {}: {}", path, e))
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let classrooms: Vec<Classroom> = cli
        .rooms
        .iter()
        .map(|r| parse_room(r))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let mut people = read_people(&cli.people).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    if !cli.keep_order {
        sort_for_seating(&mut people);
    }

    let options = SeatingOptions {
        adjacency: cli.adjacency,
        deadline: Duration::from_millis(cli.deadline_ms),
    };
    let plan = plan(&people, &classrooms, options);

    if cli.json {
        match serde_json::to_string_pretty(&plan) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    for arrangement in &plan.arrangements {
        let room = &arrangement.classroom;
        println!("{} ({}x{}):", room.name, room.rows, room.columns);
        match (&arrangement.chart, &arrangement.error) {
            (Some(chart), _) => {
                println!(
                    "  {} seated, {}, {} violation{}",
                    chart.seated,
                    chart.outcome,
                    chart.violations,
                    if chart.violations == 1 { "" } else { "s" },
                );
                if cli.layout {
                    print!("{}", render::render_chart(chart));
                }
            }
            (None, Some(e)) => println!("  error: {}", e),
            (None, None) => {}
        }
        println!();
    }

    println!(
        "Summary: {} of {} seated across {} classroom{}",
        plan.seated(),
        people.len(),
        plan.arrangements.len(),
        if plan.arrangements.len() == 1 { "" } else { "s" },
    );
    if !plan.unseated.is_empty() {
        println!("Unseated: {}", plan.unseated.len());
    }
}
