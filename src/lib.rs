//! # `d88kit` main library
//! 
//! This library manipulates D88 disk images, with emphasis on replacing the CP/M
//! system file (CPM.SYS) of a Sord M23 system disk while leaving the rest of the disk alone.
//! 
//! ## Architecture
//! 
//! There are two layers:
//! * `bios::groups` maps CP/M allocation groups to tracks, sectors, and flat image offsets
//! * `img::d88` decodes the container into a flat logical image and encodes it back
//! 
//! A replacement goes load → extract → splice → commit → save.  The splice happens
//! entirely on the flat image, the container is only touched by `commit`.
//! Any changes are not permanent until the image is saved.
//! 
//! ## Flat System Files
//! 
//! `img::flat` patches a BIOS into a CPM.SYS that has already been taken off the disk.

pub mod bios;
pub mod img;
pub mod commands;

use std::fmt;
use log::{info,error};
use bios::groups::GroupLayout;
use img::d88::D88;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Where one group of a payload landed
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub struct GroupReport {
    pub group: usize,
    pub track: usize,
    pub first_sector: usize,
    /// track of the last sector, differs from `track` if the group straddles tracks
    pub last_track: usize,
    pub last_sector: usize,
    pub offset: usize,
    pub bytes: usize
}

impl fmt::Display for GroupReport {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.track==self.last_track {
            true => write!(f,"group {:02X}h: track {}, sectors {}-{} (offset {:#07X}), wrote {} bytes",
                self.group,self.track,self.first_sector,self.last_sector,self.offset,self.bytes),
            false => write!(f,"group {:02X}h: track {} sector {} to track {} sector {} (offset {:#07X}), wrote {} bytes",
                self.group,self.track,self.first_sector,self.last_track,self.last_sector,self.offset,self.bytes)
        }
    }
}

/// Splice `payload` into the groups of a flat image.  The payload is zero padded up to
/// the capacity of the groups, and refused if it is larger.  Every group is checked
/// against the image before any byte is written.
pub fn replace_groups(flat: &mut [u8],payload: &[u8],groups: &[usize],layout: &GroupLayout) -> Result<Vec<GroupReport>,img::Error> {
    let group_size = layout.group_size();
    let capacity = groups.len() * group_size;
    if payload.len() > capacity {
        error!("payload has {} bytes, groups hold {}",payload.len(),capacity);
        return Err(img::Error::PayloadTooLarge { size: payload.len(), capacity });
    }
    let mut ranges = Vec::new();
    for g in groups {
        ranges.push(layout.flat_range(*g,flat.len())?);
    }
    let padded = img::quantize_block(payload,capacity);
    let mut ans = Vec::new();
    for (i,(g,rng)) in groups.iter().zip(ranges).enumerate() {
        let [track,sector] = layout.group_to_track_sector(*g);
        let [last_track,last_sector] = layout.group_end_track_sector(*g);
        flat[rng.clone()].copy_from_slice(&padded[i*group_size..(i+1)*group_size]);
        ans.push(GroupReport {
            group: *g,
            track,
            first_sector: sector,
            last_track,
            last_sector,
            offset: rng.start,
            bytes: group_size
        });
    }
    Ok(ans)
}

/// Replace the system region of a D88 image, e.g., CPM.SYS.
/// Nothing in the image changes unless the whole replacement succeeds.
pub fn replace_system(disk: &mut D88,payload: &[u8],groups: &[usize],layout: &GroupLayout) -> Result<Vec<GroupReport>,img::Error> {
    let mut flat = disk.extract(layout);
    info!("flat image has {} bytes",flat.len());
    let ans = replace_groups(&mut flat,payload,groups,layout)?;
    disk.commit(&flat,layout);
    Ok(ans)
}

/// Read a D88 image from a file.
/// The pathname must already be in the right format for the file system.
pub fn create_d88_from_file(img_path: &str) -> Result<D88,DYNERR> {
    match std::fs::read(img_path) {
        Ok(disk_img_data) => Ok(D88::from_bytes(&disk_img_data)?),
        Err(e) => Err(Box::new(e))
    }
}

#[test]
fn replace_in_flat() {
    let layout = bios::groups::SORD_M23;
    let mut flat = vec![0xe5;40*layout.track_size()];
    let payload = vec![0x11;3000];
    let rep = replace_groups(&mut flat,&payload,&[0x29,0x2a],&layout).expect("replace failed");
    assert_eq!(rep.len(),2);
    assert_eq!(rep[0].track,22);
    assert_eq!(rep[0].first_sector,9);
    assert_eq!(rep[0].last_sector,16);
    assert_eq!(rep[1].track,23);
    assert_eq!(rep[1].first_sector,1);
    assert_eq!(rep[1].last_sector,8);
    assert_eq!(rep[1].to_string(),"group 2Ah: track 23, sectors 1-8 (offset 0x17000), wrote 2048 bytes");
    let beg = 22*4096 + 2048;
    assert!(flat[beg..beg+3000].iter().all(|b| *b==0x11));
    assert!(flat[beg+3000..beg+4096].iter().all(|b| *b==0));
    assert!(flat[0..beg].iter().all(|b| *b==0xe5));
    assert!(flat[beg+4096..].iter().all(|b| *b==0xe5));
}

#[test]
fn replace_refused() {
    let layout = bios::groups::SORD_M23;
    let mut flat = vec![0xe5;40*layout.track_size()];
    let payload = vec![0x11;2049];
    assert_eq!(replace_groups(&mut flat,&payload,&[0x29],&layout),
        Err(img::Error::PayloadTooLarge { size: 2049, capacity: 2048 }));
    // second group does not fit, first must not be written either
    assert_eq!(replace_groups(&mut flat,&[1],&[0x29,1000],&layout),Err(img::Error::GeometryMismatch));
    assert!(flat.iter().all(|b| *b==0xe5));
}

#[test]
fn straddling_group() {
    let layout = GroupLayout {
        sector_size: 128,
        sectors_per_track: 26,
        reserved_tracks: 2,
        sectors_per_group: 8
    };
    let mut flat = vec![0;10*layout.track_size()];
    let rep = replace_groups(&mut flat,&[1;1024],&[3],&layout).expect("replace failed");
    assert_eq!([rep[0].track,rep[0].first_sector],[2,25]);
    assert_eq!([rep[0].last_track,rep[0].last_sector],[3,6]);
    assert_eq!(rep[0].to_string(),"group 03h: track 2 sector 25 to track 3 sector 6 (offset 0x02600), wrote 1024 bytes");
}
