//! File and stdin/stdout handling

use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;

use super::error::CliResult;

/// Read a whole input; `-` means stdin
pub fn read_input(path: &Path) -> CliResult<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin().lock().read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Write a value as pretty JSON followed by a newline
pub fn write_json(out: &mut impl Write, value: &impl Serialize) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
