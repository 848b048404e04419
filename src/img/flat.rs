//! ## Flat system files
//!
//! Once CPM.SYS is off the disk it is just a byte stream.  The BIOS sits at a fixed
//! offset, so a custom BIOS is patched in by keeping everything before the offset,
//! appending the new BIOS, and padding the result out to a whole CP/M record.

use log::{info,error};
use crate::img::Error;

/// offset of the BIOS within the Sord M23 CPM.SYS
pub const BIOS_OFFSET: usize = 0x1600;
/// CP/M record size, the result is padded to a multiple of this
pub const RECORD_SIZE: usize = 128;

/// Pad with zeros up to the next multiple of `RECORD_SIZE`
pub fn pad_to_record(mut buf: Vec<u8>) -> Vec<u8> {
    let rem = buf.len() % RECORD_SIZE;
    if rem > 0 {
        buf.resize(buf.len() + RECORD_SIZE - rem,0);
    }
    buf
}

/// Replace everything in `sys` from `offset` onward with `replacement`.
/// The original tail is discarded, not merged.
pub fn splice(sys: &[u8],replacement: &[u8],offset: usize) -> Result<Vec<u8>,Error> {
    if sys.len() < offset {
        error!("system file has {} bytes, need at least {:#06X}",sys.len(),offset);
        return Err(Error::ImageSizeMismatch);
    }
    let ans = pad_to_record([&sys[0..offset],replacement].concat());
    info!("spliced {} bytes at {:#06X}, result has {} bytes",replacement.len(),offset,ans.len());
    Ok(ans)
}

#[test]
fn padding() {
    assert_eq!(pad_to_record(vec![]).len(),0);
    assert_eq!(pad_to_record(vec![1;128]).len(),128);
    let padded = pad_to_record(vec![1;129]);
    assert_eq!(padded.len(),256);
    assert_eq!(padded[128],1);
    assert!(padded[129..].iter().all(|b| *b==0));
}

#[test]
fn splice_bios() {
    let sys: Vec<u8> = (0..0x1700).map(|i| (i % 251) as u8).collect();
    let bios = vec![0xc3;200];
    let ans = splice(&sys,&bios,BIOS_OFFSET).expect("splice failed");
    assert_eq!(ans.len(),0x1600 + 256);
    assert_eq!(ans[0..BIOS_OFFSET],sys[0..BIOS_OFFSET]);
    assert_eq!(ans[BIOS_OFFSET..BIOS_OFFSET+200],bios[..]);
    assert!(ans[BIOS_OFFSET+200..].iter().all(|b| *b==0));
}

#[test]
fn splice_short_sys() {
    assert_eq!(splice(&vec![0;0x15ff],&[1,2,3],BIOS_OFFSET),Err(Error::ImageSizeMismatch));
    // exactly at the offset is fine
    assert_eq!(splice(&vec![0;0x1600],&[],BIOS_OFFSET).unwrap().len(),0x1600);
}
