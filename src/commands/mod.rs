//! # CLI Subcommands
//! 
//! Contains modules that run the subcommands.

pub mod put_sys;
pub mod get_raw;
pub mod stat;
pub mod patch_bios;
pub mod completions;

use std::path::Path;
use log::error;
use crate::bios::groups::{GroupLayout,SORD_M23};
use crate::DYNERR;

const RCH: &str = "unreachable was reached";

#[derive(thiserror::Error,Debug)]
pub enum CommandError {
    #[error("Command could not be interpreted")]
    InvalidCommand,
    #[error("One of the parameters was out of range")]
    OutOfRange,
    #[error("File not found")]
    FileNotFound
}

/// Read a whole input file, logging which one was missing
fn read_input(path: &str,what: &str) -> Result<Vec<u8>,DYNERR> {
    if !Path::new(path).exists() {
        error!("{} `{}` was not found",what,path);
        return Err(Box::new(CommandError::FileNotFound));
    }
    Ok(std::fs::read(path)?)
}

/// Parse a hex number, allowing `0x`, `$`, or `h` decorations
fn parse_hex(s: &str) -> Result<usize,CommandError> {
    let trimmed = s.trim();
    let digits = trimmed.trim_start_matches("0x").trim_start_matches("0X").trim_start_matches('$')
        .trim_end_matches('h').trim_end_matches('H');
    match usize::from_str_radix(digits,16) {
        Ok(n) => Ok(n),
        Err(_) => {
            error!("`{}` is not a hex number",s);
            Err(CommandError::InvalidCommand)
        }
    }
}

/// Start from the Sord M23 layout and apply the geometry arguments
fn get_layout(cmd: &clap::ArgMatches) -> GroupLayout {
    let mut ans = SORD_M23;
    if let Some(sz) = cmd.get_one::<u16>("sector-size") {
        ans.sector_size = *sz as usize;
    }
    if let Some(n) = cmd.get_one::<u8>("sectors") {
        ans.sectors_per_track = *n as usize;
    }
    if let Some(n) = cmd.get_one::<u8>("reserved") {
        ans.reserved_tracks = *n as usize;
    }
    if let Some(n) = cmd.get_one::<u8>("group-sectors") {
        ans.sectors_per_group = *n as usize;
    }
    ans
}

#[test]
fn hex_args() {
    assert_eq!(parse_hex("29").unwrap(),0x29);
    assert_eq!(parse_hex("0x2A").unwrap(),0x2a);
    assert_eq!(parse_hex("$2b").unwrap(),0x2b);
    assert_eq!(parse_hex("2Ch").unwrap(),0x2c);
    assert_eq!(parse_hex(" 1600 ").unwrap(),0x1600);
    assert!(parse_hex("xyz").is_err());
    assert!(parse_hex("").is_err());
}
