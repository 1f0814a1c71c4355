use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "desk", version, about = "Freight back-office in the terminal")]
pub struct Cli {
    /// Configuration directory (overrides DESK_CONFIG)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Data directory holding fixtures and exports (overrides DESK_DATA)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Run the interactive TUI (default)
    Run {
        /// Page to open first, by route key
        #[arg(long)]
        page: Option<String>,
        /// Ticks per second
        #[arg(long, value_name = "FLOAT")]
        tick_rate: Option<f64>,
        /// Frames per second
        #[arg(long, value_name = "FLOAT")]
        frame_rate: Option<f64>,
    },
    /// List the pages in the catalog
    Pages,
    /// Print the effective route table
    Routes,
    /// Load a fixture headlessly and print a JSON summary
    Check {
        /// Fixture path relative to the fixtures directory, without extension
        fixture: String,
    },
}

impl Cli {
    pub fn command(&self) -> Cmd {
        self.cmd.clone().unwrap_or(Cmd::Run {
            page: None,
            tick_rate: None,
            frame_rate: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_to_run() {
        let cli = Cli::parse_from(["desk"]);
        assert_eq!(
            cli.command(),
            Cmd::Run {
                page: None,
                tick_rate: None,
                frame_rate: None
            }
        );
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::parse_from(["desk", "run", "--page", "billing"]);
        assert!(matches!(cli.command(), Cmd::Run { page: Some(p), .. } if p == "billing"));
        let cli = Cli::parse_from(["desk", "--data-dir", "/tmp/d", "check", "bookings"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/d")));
        assert_eq!(
            cli.command(),
            Cmd::Check {
                fixture: "bookings".into()
            }
        );
    }
}
