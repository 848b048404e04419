//! # Disk Image Module
//! 
//! The D88 container is handled in `d88`.  It is treated as a codec between the
//! container's own sector records and a flat logical image, where every track
//! holds the same number of equally sized sectors in ascending order.
//! The flat image is what the allocation group arithmetic in `bios::groups` addresses.
//! 
//! ## Flat SYS files
//! 
//! A system file that has already been taken off the disk has no sector structure.
//! Patching such a file is a simple splice, handled in `flat`.

pub mod d88;
pub mod flat;

use std::fmt;
use num_derive::FromPrimitive;

/// Enumerates disk image errors.  The `Display` trait will print equivalent long message.
#[derive(thiserror::Error,Debug,PartialEq)]
pub enum Error {
    #[error("image is too small to hold the header and track table")]
    Format,
    #[error("payload has {size} bytes but the region only holds {capacity}")]
    PayloadTooLarge { size: usize, capacity: usize },
    #[error("sector record at {offset:#X} on track {track} runs past the end of the image")]
    TruncatedRecord { track: usize, offset: usize },
    #[error("sector record at {offset:#X} on track {track} has unsupported size code {code}")]
    SizeCode { track: usize, offset: usize, code: u8 },
    #[error("geometric coordinate out of range")]
    GeometryMismatch,
    #[error("image size did not match the request")]
    ImageSizeMismatch
}

/// Media codes found in the D88 header
#[derive(FromPrimitive,PartialEq,Eq,Clone,Copy,Debug)]
pub enum MediaType {
    D2 = 0x00,
    D2D = 0x10,
    D2HD = 0x20,
    D1 = 0x30,
    D1DD = 0x40
}

impl fmt::Display for MediaType {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::D2 => write!(f,"2D"),
            Self::D2D => write!(f,"2DD"),
            Self::D2HD => write!(f,"2HD"),
            Self::D1 => write!(f,"1D"),
            Self::D1DD => write!(f,"1DD")
        }
    }
}

/// If a data source is smaller than `quantum` bytes, pad it with zeros.
/// If it is larger, do not include the extra bytes.
pub fn quantize_block(src: &[u8],quantum: usize) -> Vec<u8> {
    let mut padded = src[0..usize::min(src.len(),quantum)].to_vec();
    padded.resize(quantum,0);
    return padded;
}

#[test]
fn quantize() {
    assert_eq!(quantize_block(&[1,2,3],5),vec![1,2,3,0,0]);
    assert_eq!(quantize_block(&[1,2,3],3),vec![1,2,3]);
    assert_eq!(quantize_block(&[1,2,3],2),vec![1,2]);
    assert_eq!(quantize_block(&[],2),vec![0,0]);
}
