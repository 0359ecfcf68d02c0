//! Reading command inputs and writing command output.
//!
//! Stdout carries exactly one result per command; everything else is logged
//! to stderr.

use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{CliError, CliResult};

/// Read a whole input; `-` means stdin.
pub fn read_input(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// First line of an input with the trailing newline removed.
pub fn read_input_line(path: &Path) -> CliResult<String> {
    let text = read_input(path)?;
    Ok(text.lines().next().unwrap_or_default().trim().to_string())
}

/// Parse a JSON document read with [`read_input`].
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> CliResult<T> {
    Ok(serde_json::from_str(&read_input(path)?)?)
}

/// Write `value` as a single JSON line.
pub fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Write `value` as pretty-printed JSON.
pub fn write_json_pretty<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    write_json(&mut io::stdout().lock(), value)
}

pub fn print_json_pretty<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    write_json_pretty(&mut io::stdout().lock(), value)
}

/// Decode a hex string with or without `0x`.
pub fn decode_hex(text: &str) -> CliResult<Vec<u8>> {
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(text).map_err(|e| CliError::invalid(format!("invalid hex: {e}")))
}
