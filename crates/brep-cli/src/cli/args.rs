//! CLI argument definitions using clap
//!
//! Commands:
//! - brep manipulate <request.json>
//! - brep validate <solid>
//! - brep topology <solid>
//! - brep info
//! - brep box --min x y z --max x y z
//!
//! A path of `-` reads from stdin.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// brep - apply editing operations to serialized BREP solids
#[derive(Parser, Debug)]
#[command(name = "brep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Service configuration file (RON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply an operation described by a JSON request
    Manipulate {
        /// Request file
        request: PathBuf,
    },

    /// Check that a solid decodes and print its topology counts
    Validate {
        /// Solid file
        solid: PathBuf,
    },

    /// Print per-face and per-edge measurements of a solid
    Topology {
        /// Solid file
        solid: PathBuf,
    },

    /// Print service and kernel identification
    Info,

    /// Write an axis-aligned box solid
    #[command(name = "box")]
    MakeBox {
        /// Minimum corner
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        #[arg(default_values_t = [0.0, 0.0, 0.0])]
        min: Vec<f64>,

        /// Maximum corner
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        #[arg(default_values_t = [1.0, 1.0, 1.0])]
        max: Vec<f64>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manipulate_with_config() {
        let args = ["brep", "manipulate", "req.json", "--config", "svc.ron"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("svc.ron")));
        assert!(matches!(
            cli.command,
            Command::Manipulate { request } if request == PathBuf::from("req.json")
        ));
    }

    #[test]
    fn test_parse_box() {
        let args = ["brep", "box", "--min", "-1", "0", "0", "--max", "2", "3", "4"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::MakeBox { min, max } => {
                assert_eq!(min, vec![-1.0, 0.0, 0.0]);
                assert_eq!(max, vec![2.0, 3.0, 4.0]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_box_defaults() {
        let cli = Cli::try_parse_from(["brep", "box"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::MakeBox { ref min, .. } if min == &vec![0.0, 0.0, 0.0]
        ));
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(Cli::try_parse_from(["brep", "twist"]).is_err());
    }
}
