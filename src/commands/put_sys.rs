//! ## put system file
//! 
//! Replaces CPM.SYS (or any run of allocation groups) inside a D88 image.
//! All checks are made before the output is written, so a failure leaves the source intact.

use clap;
use std::path::Path;
use log::{debug,info,error};
use super::{RCH,CommandError};
use crate::img::Error;
use crate::img::d88::D88;
use crate::STDRESULT;

pub fn put_sys(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    let sys_path = cmd.get_one::<String>("file").expect(RCH);
    let out_path = cmd.get_one::<String>("output").unwrap_or(img_path);
    let layout = super::get_layout(cmd);
    let mut groups = Vec::new();
    for g in cmd.get_many::<String>("groups").expect(RCH) {
        groups.push(super::parse_hex(g)?);
    }
    if groups.len()==0 {
        error!("at least one group is needed");
        return Err(Box::new(CommandError::InvalidCommand));
    }
    if !layout.verify() {
        return Err(Box::new(CommandError::OutOfRange));
    }
    debug!("groups {:?} with layout {}",groups,layout);

    let img_data = super::read_input(img_path,"D88 image")?;
    let payload = super::read_input(sys_path,"system file")?;
    let capacity = groups.len() * layout.group_size();
    if payload.len() > capacity {
        eprintln!("system file is too large ({} > {})",payload.len(),capacity);
        return Err(Box::new(Error::PayloadTooLarge { size: payload.len(), capacity }));
    }
    eprintln!("new system file: {} bytes, padded to {}",payload.len(),capacity);

    let mut disk = D88::from_bytes(&img_data)?;
    eprintln!("D88 image `{}`: label `{}`, {} bytes",img_path,disk.label(),disk.disk_size());
    for report in crate::replace_system(&mut disk,&payload,&groups,&layout)? {
        eprintln!("  {}",report);
    }
    disk.save(Path::new(out_path))?;
    info!("system file replaced");
    eprintln!("saved {}",out_path);
    Ok(())
}
