//! brep command-line entry point
//!
//! Logs go to stderr so stdout carries only the JSON response.

mod cli;

use std::io;

fn main() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brep_core=info,brep_kernel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = cli::Cli::parse_args();
    match cli::run_command(args) {
        Ok(output) => {
            if let Err(e) = cli::io::write_json(&mut io::stdout(), &output.value) {
                eprintln!("{e}");
                std::process::exit(1);
            }
            if !output.success {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
