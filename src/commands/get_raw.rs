//! ## get flat image
//! 
//! Writes the flat logical image of a D88 image to a file or stdout.

use clap;
use std::io::Write;
use log::error;
use super::{RCH,CommandError};
use crate::img::d88::D88;
use crate::STDRESULT;

pub fn get_raw(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    let layout = super::get_layout(cmd);
    if !layout.verify() {
        return Err(Box::new(CommandError::OutOfRange));
    }
    let disk = D88::from_bytes(&super::read_input(img_path,"D88 image")?)?;
    let flat = disk.extract(&layout);
    match cmd.get_one::<String>("output") {
        Some(out_path) => {
            std::fs::write(out_path,&flat)?;
            eprintln!("wrote {} tracks, {} bytes, to {}",disk.track_count(),flat.len(),out_path);
        },
        None => {
            if atty::is(atty::Stream::Stdout) && !cmd.get_flag("console") {
                error!("refusing to write binary to the console, redirect or use `--console`");
                return Err(Box::new(CommandError::InvalidCommand));
            }
            std::io::stdout().write_all(&flat)?;
            std::io::stdout().flush()?;
        }
    }
    Ok(())
}
