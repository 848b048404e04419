//! ## patch BIOS
//! 
//! Works on a CPM.SYS that is already off the disk; see `img::flat`.

use clap;
use super::RCH;
use crate::img::flat;
use crate::STDRESULT;

pub fn patch_bios(cmd: &clap::ArgMatches) -> STDRESULT {
    let sys_path = cmd.get_one::<String>("sys").expect(RCH);
    let bios_path = cmd.get_one::<String>("bios").expect(RCH);
    let out_path = cmd.get_one::<String>("output").expect(RCH);
    let offset = super::parse_hex(cmd.get_one::<String>("offset").expect(RCH))?;
    let sys = super::read_input(sys_path,"CPM.SYS")?;
    let bios = super::read_input(bios_path,"BIOS")?;
    let patched = flat::splice(&sys,&bios,offset)?;
    std::fs::write(out_path,&patched)?;
    eprintln!("input  CPM.SYS : {} ({} bytes)",sys_path,sys.len());
    eprintln!("input  BIOS    : {} ({} bytes)",bios_path,bios.len());
    eprintln!("output SYS     : {} ({} bytes)",out_path,patched.len());
    eprintln!("replaced {:#06X} to end with custom BIOS",offset);
    Ok(())
}
