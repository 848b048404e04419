use clap;
use super::RCH;
use crate::img::d88::D88;
use crate::STDRESULT;

pub fn stat(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    let disk = D88::from_bytes(&super::read_input(img_path,"D88 image")?)?;
    println!("{}",disk.get_metadata(cmd.get_one::<u16>("indent").copied())?);
    for fault in disk.survey() {
        eprintln!("warning: {}",fault);
    }
    return Ok(());
}
