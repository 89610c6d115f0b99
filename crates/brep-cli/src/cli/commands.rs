//! Command implementations
//!
//! Every command produces a JSON value for stdout plus a success flag;
//! `main` prints the value and turns the flag into the exit status.

use std::path::Path;

use brep_core::{ManipulationResponse, ManipulationService, OperationRequest, ServiceConfig};
use brep_kernel::{GeometricKernel, PolyKernel};
use glam::DVec3;
use serde_json::Value;

use super::args::{Cli, Command};
use super::error::{CliError, CliResult};
use super::io::read_input;

/// What a command printed and whether it succeeded
#[derive(Debug)]
pub struct CommandOutput {
    pub value: Value,
    pub success: bool,
}

impl CommandOutput {
    fn new(value: Value, success: bool) -> Self {
        Self { value, success }
    }
}

/// Build the service from the optional configuration file
pub fn build_service(config: Option<&Path>) -> CliResult<ManipulationService<PolyKernel>> {
    let config = match config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };
    tracing::debug!(?config, "Service configuration");
    Ok(ManipulationService::from_config(config))
}

/// Run the command selected on the command line
pub fn run_command(cli: Cli) -> CliResult<CommandOutput> {
    let service = build_service(cli.config.as_deref())?;
    match cli.command {
        Command::Manipulate { request } => manipulate(&service, &read_input(&request)?),
        Command::Validate { solid } => validate(&service, &read_input(&solid)?),
        Command::Topology { solid } => topology(&service, &read_input(&solid)?),
        Command::Info => Ok(CommandOutput::new(
            serde_json::to_value(service.info())?,
            true,
        )),
        Command::MakeBox { min, max } => make_box(service.kernel(), &min, &max),
    }
}

/// Apply a JSON-encoded operation request
pub fn manipulate(
    service: &ManipulationService<PolyKernel>,
    request_json: &str,
) -> CliResult<CommandOutput> {
    let request: OperationRequest = serde_json::from_str(request_json)?;
    let response = ManipulationResponse::from(service.manipulate(request));
    let success = response.success;
    Ok(CommandOutput::new(serde_json::to_value(response)?, success))
}

pub fn validate(
    service: &ManipulationService<PolyKernel>,
    solid: &str,
) -> CliResult<CommandOutput> {
    let report = service.validate(solid);
    let success = report.valid;
    Ok(CommandOutput::new(serde_json::to_value(report)?, success))
}

pub fn topology(
    service: &ManipulationService<PolyKernel>,
    solid: &str,
) -> CliResult<CommandOutput> {
    match service.topology_info(solid) {
        Ok(info) => Ok(CommandOutput::new(
            serde_json::json!({ "success": true, "topology_info": info }),
            true,
        )),
        Err(err) => Ok(CommandOutput::new(
            serde_json::json!({
                "success": false,
                "error": err.public_message(),
                "error_code": err.code(),
                "stage": err.stage,
            }),
            false,
        )),
    }
}

/// Encode an axis-aligned box; the printed value is the solid document itself
pub fn make_box(kernel: &PolyKernel, min: &[f64], max: &[f64]) -> CliResult<CommandOutput> {
    let corner = |v: &[f64]| match v {
        [x, y, z] => Ok(DVec3::new(*x, *y, *z)),
        _ => Err(CliError::InvalidBox(format!("expected 3 coordinates, got {}", v.len()))),
    };
    let shape = kernel
        .make_box(corner(min)?, corner(max)?)
        .map_err(|e| CliError::InvalidBox(e.to_string()))?;
    let text = kernel
        .encode(&shape)
        .map_err(|e| CliError::InvalidBox(e.to_string()))?;
    Ok(CommandOutput::new(serde_json::from_str(&text)?, true))
}
