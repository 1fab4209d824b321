//! Cinema seating command-line client.
//!
//! Sends one request to `cinema-server` per invocation and prints the result,
//! either as text or (with `--json`) as JSON on stdout.
//!
//! # Usage
//!
//! ```text
//! cinema-client [--server HOST:PORT] [--json] <COMMAND>
//!
//! Commands:
//!   create    <ROWS> <COLUMNS> <MIN_DISTANCE>   Replace the cinema
//!   get       [--map]                           Show the cinema
//!   configure <ROWS> <COLUMNS>                  Resize the grid
//!   distance  <MIN_DISTANCE>                    Change the minimum distance
//!   find      <COUNT>                           Find adjacent free seats
//!   reserve   <ROW:COL[,ROW:COL...]>...         Reserve seats
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable        | Default          | Description          |
//! |-----------------|------------------|----------------------|
//! | `CINEMA_SERVER` | `127.0.0.1:1355` | Server address       |
//! | `RUST_LOG`      | `warn`           | Log filter (stderr)  |

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cinema_client::application::seat_map::{format_seat_list, parse_seat_list, render_seat_map};
use cinema_client::CinemaClient;
use cinema_core::{CinemaSnapshot, Seat};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Cinema seating client.
#[derive(Debug, Parser)]
#[command(name = "cinema-client", about = "Query and reserve seats on a cinema seating server", version)]
struct Cli {
    /// Server address as `host:port`.
    #[arg(long, default_value = "127.0.0.1:1355", env = "CINEMA_SERVER")]
    server: String,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
enum Command {
    /// Replace the cinema with an empty grid.
    Create {
        rows: u32,
        columns: u32,
        minimum_distance: u32,
    },
    /// Show the cinema configuration and reservations.
    Get {
        /// Also draw the seat map (`#` reserved, `x` blocked, `.` free).
        #[arg(long)]
        map: bool,
    },
    /// Resize the grid.  Shrinking releases all reservations.
    Configure { rows: u32, columns: u32 },
    /// Change the minimum distance.  Releases all reservations.
    Distance { minimum_distance: u32 },
    /// Find COUNT adjacent free seats in one row.
    Find { count: u32 },
    /// Reserve seats given as `row:column` pairs, all or none.
    Reserve {
        #[arg(required = true, value_name = "ROW:COL[,ROW:COL...]")]
        seats: Vec<String>,
    },
}

impl Command {
    /// Parses the `reserve` arguments; every argument may hold several pairs.
    fn reserve_seats(args: &[String]) -> anyhow::Result<Vec<Seat>> {
        let mut seats = Vec::new();
        for arg in args {
            seats.extend(parse_seat_list(arg).with_context(|| format!("invalid seat list '{arg}'"))?);
        }
        Ok(seats)
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SeatsOutput<'a> {
    seats: &'a [Seat],
}

#[derive(Serialize)]
struct CinemaOutput<'a> {
    #[serde(flatten)]
    cinema: &'a CinemaSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    map: Option<Vec<String>>,
}

fn describe_cinema(cinema: &CinemaSnapshot) -> String {
    let mut out = format!(
        "cinema {}x{}, minimum distance {}, {} reserved",
        cinema.rows,
        cinema.columns,
        cinema.minimum_distance,
        cinema.reserved_seats.len()
    );
    if !cinema.reserved_seats.is_empty() {
        out.push_str(&format!(": {}", format_seat_list(&cinema.reserved_seats)));
    }
    out
}

fn print_cinema(cinema: &CinemaSnapshot, json: bool, map: Option<String>) -> anyhow::Result<()> {
    if json {
        let output = CinemaOutput {
            cinema,
            map: map.map(|m| m.lines().map(str::to_string).collect()),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", describe_cinema(cinema));
        if let Some(map) = map {
            print!("{map}");
        }
    }
    Ok(())
}

fn print_seats(seats: &[Seat], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&SeatsOutput { seats })?);
    } else if seats.is_empty() {
        println!("no run of adjacent free seats is long enough");
    } else {
        println!("{}", format_seat_list(seats));
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Validate input before touching the network.
    let reserve = match &cli.command {
        Command::Reserve { seats } => Some(Command::reserve_seats(seats)?),
        _ => None,
    };

    let mut client = CinemaClient::connect(&cli.server).await?;

    match cli.command {
        Command::Create {
            rows,
            columns,
            minimum_distance,
        } => {
            let cinema = client.create_cinema(rows, columns, minimum_distance).await?;
            print_cinema(&cinema, cli.json, None)?;
        }
        Command::Get { map } => {
            let cinema = client.get_cinema().await?;
            let rendered = if map {
                Some(render_seat_map(&cinema).context("server returned an inconsistent cinema")?)
            } else {
                None
            };
            print_cinema(&cinema, cli.json, rendered)?;
        }
        Command::Configure { rows, columns } => {
            let cinema = client.configure_cinema_size(rows, columns).await?;
            print_cinema(&cinema, cli.json, None)?;
        }
        Command::Distance { minimum_distance } => {
            let cinema = client.change_minimum_distance(minimum_distance).await?;
            print_cinema(&cinema, cli.json, None)?;
        }
        Command::Find { count } => {
            let seats = client.find_available_seats(count).await?;
            print_seats(&seats, cli.json)?;
        }
        Command::Reserve { .. } => {
            let seats = reserve.unwrap_or_default();
            let cinema = client.reserve_seats(&seats).await?;
            print_cinema(&cinema, cli.json, None)?;
        }
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_server_is_local_port_1355() {
        let cli = Cli::parse_from(["cinema-client", "get"]);
        assert_eq!(cli.server, "127.0.0.1:1355");
        assert!(!cli.json);
        assert_eq!(cli.command, Command::Get { map: false });
    }

    #[test]
    fn test_cli_parses_create_arguments_in_order() {
        let cli = Cli::parse_from(["cinema-client", "create", "10", "12", "2"]);
        assert_eq!(
            cli.command,
            Command::Create { rows: 10, columns: 12, minimum_distance: 2 }
        );
    }

    #[test]
    fn test_cli_json_flag_is_accepted_after_subcommand() {
        let cli = Cli::parse_from(["cinema-client", "find", "3", "--json"]);
        assert!(cli.json);
        assert_eq!(cli.command, Command::Find { count: 3 });
    }

    #[test]
    fn test_cli_rejects_negative_count() {
        assert!(Cli::try_parse_from(["cinema-client", "find", "-1"]).is_err());
    }

    #[test]
    fn test_cli_reserve_requires_seats() {
        assert!(Cli::try_parse_from(["cinema-client", "reserve"]).is_err());
    }

    #[test]
    fn test_reserve_seats_accepts_several_arguments_and_commas() {
        let seats = Command::reserve_seats(&["1:1,0:0".to_string(), "5:5".to_string()]).unwrap();
        assert_eq!(seats, vec![Seat::new(1, 1), Seat::new(0, 0), Seat::new(5, 5)]);
    }

    #[test]
    fn test_reserve_seats_reports_bad_pair() {
        assert!(Command::reserve_seats(&["1-1".to_string()]).is_err());
    }

    #[test]
    fn test_describe_cinema_lists_reserved_seats() {
        let cinema = CinemaSnapshot {
            rows: 10,
            columns: 10,
            minimum_distance: 2,
            reserved_seats: vec![Seat::new(1, 1), Seat::new(0, 0)],
        };
        assert_eq!(
            describe_cinema(&cinema),
            "cinema 10x10, minimum distance 2, 2 reserved: 1:1,0:0"
        );
    }

    #[test]
    fn test_cinema_output_json_flattens_snapshot() {
        let cinema = CinemaSnapshot {
            rows: 1,
            columns: 2,
            minimum_distance: 0,
            reserved_seats: vec![Seat::new(0, 1)],
        };
        let output = CinemaOutput { cinema: &cinema, map: None };

        let value: serde_json::Value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["rows"], 1);
        assert_eq!(value["reserved_seats"][0]["column"], 1);
        assert!(value.get("map").is_none());
    }
}
