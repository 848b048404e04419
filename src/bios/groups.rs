//! ## Allocation Group Module
//! 
//! CP/M allocates disk space in groups (blocks) of consecutive logical sectors.
//! Group 0 begins at the first sector of the first track following the reserved
//! (system) tracks.  The functions here map a group to the track and sector it
//! starts on, and to the byte offset it occupies in a flat logical image.
//! 
//! Track numbers are counted from 0, sector numbers from 1.  The reserved tracks
//! are counted in the flat image, so the offset of group 0 is not 0.

use std::fmt;
use std::ops::Range;
use log::{debug,error};
use crate::img;

/// Geometry needed to locate allocation groups.
/// Fields are public so that callers can override the defaults from the command line.
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub struct GroupLayout {
    /// bytes in a logical sector
    pub sector_size: usize,
    /// logical sectors on every track of the flat image
    pub sectors_per_track: usize,
    /// number of tracks preceding group 0
    pub reserved_tracks: usize,
    /// logical sectors in one group
    pub sectors_per_group: usize
}

/// Sord M23 CP/M 80: 16 sectors of 256 bytes, 2 system tracks, 2K groups
pub const SORD_M23: GroupLayout = GroupLayout {
    sector_size: 256,
    sectors_per_track: 16,
    reserved_tracks: 2,
    sectors_per_group: 8
};

/// Groups holding CPM.SYS on a Sord M23 system disk
pub const SORD_M23_CPM_SYS: [usize;4] = [0x29,0x2a,0x2b,0x2c];

impl GroupLayout {
    /// bytes on one track of the flat image
    pub fn track_size(&self) -> usize {
        self.sectors_per_track * self.sector_size
    }
    /// bytes in one group
    pub fn group_size(&self) -> usize {
        self.sectors_per_group * self.sector_size
    }
    /// Check that the layout can be used for arithmetic at all.
    pub fn verify(&self) -> bool {
        if self.sector_size==0 || self.sectors_per_track==0 || self.sectors_per_group==0 {
            debug!("layout has a zero dimension");
            return false;
        }
        true
    }
    fn relative_to_track_sector(&self,relative_sectors: usize) -> [usize;2] {
        let track = self.reserved_tracks + relative_sectors / self.sectors_per_track;
        let sector = relative_sectors % self.sectors_per_track + 1;
        [track,sector]
    }
    /// Get `[track,sector]` where group `g` begins.
    pub fn group_to_track_sector(&self,g: usize) -> [usize;2] {
        self.relative_to_track_sector(g * self.sectors_per_group)
    }
    /// Get `[track,sector]` of the last sector in group `g`, which is on a later
    /// track if the group straddles a track boundary.
    pub fn group_end_track_sector(&self,g: usize) -> [usize;2] {
        self.relative_to_track_sector(g * self.sectors_per_group + self.sectors_per_group - 1)
    }
    /// Get the offset of group `g` within the flat image.
    pub fn group_to_flat_offset(&self,g: usize) -> usize {
        let [track,sector] = self.group_to_track_sector(g);
        track * self.track_size() + (sector - 1) * self.sector_size
    }
    /// Get the byte range of group `g` in a flat image of `image_len` bytes.
    /// Unlike the unchecked functions, this refuses any group that does not fit.
    pub fn flat_range(&self,g: usize,image_len: usize) -> Result<Range<usize>,img::Error> {
        if !self.verify() {
            return Err(img::Error::GeometryMismatch);
        }
        // byte offset of the end of the group, every step checked
        let maybe_end = g.checked_mul(self.sectors_per_group)
            .and_then(|rel| rel.checked_add(self.sectors_per_group))
            .and_then(|rel| rel.checked_add(self.reserved_tracks.checked_mul(self.sectors_per_track)?))
            .and_then(|abs| abs.checked_mul(self.sector_size));
        let end = match maybe_end {
            Some(end) => end,
            None => {
                error!("group {:02X}h overflows the address space",g);
                return Err(img::Error::GeometryMismatch);
            }
        };
        let beg = self.group_to_flat_offset(g);
        if end > image_len {
            error!("group {:02X}h spans {}..{} but the image has {} bytes",g,beg,end,image_len);
            return Err(img::Error::GeometryMismatch);
        }
        Ok(beg..end)
    }
}

impl fmt::Display for GroupLayout {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,"{}x{}/{} reserved/{} per group",self.sectors_per_track,self.sector_size,self.reserved_tracks,self.sectors_per_group)
    }
}

#[test]
fn first_group() {
    assert_eq!(SORD_M23.group_to_track_sector(0),[2,1]);
    assert_eq!(SORD_M23.group_to_flat_offset(0),2*4096);
}

#[test]
fn cpm_sys_groups() {
    // 0x29*8 = 328 sectors past the reserved tracks, i.e. 20 tracks and 8 sectors
    assert_eq!(SORD_M23.group_to_track_sector(0x29),[22,9]);
    assert_eq!(SORD_M23.group_to_track_sector(0x2a),[23,1]);
    assert_eq!(SORD_M23.group_to_track_sector(0x2b),[23,9]);
    assert_eq!(SORD_M23.group_to_track_sector(0x2c),[24,1]);
    assert_eq!(SORD_M23.group_end_track_sector(0x29),[22,16]);
    assert_eq!(SORD_M23.group_to_flat_offset(0x29),22*4096 + 8*256);
    assert_eq!(SORD_M23.group_to_flat_offset(0x2a),23*4096);
}

#[test]
fn other_layout() {
    let lay = GroupLayout {
        sector_size: 128,
        sectors_per_track: 26,
        reserved_tracks: 2,
        sectors_per_group: 8
    };
    // 3*8 = 24 sectors, still on the first data track
    assert_eq!(lay.group_to_track_sector(3),[2,25]);
    assert_eq!(lay.group_end_track_sector(3),[3,6]);
    // 4*8 = 32 sectors, track 3 sector 7
    assert_eq!(lay.group_to_track_sector(4),[3,7]);
    assert_eq!(lay.group_to_flat_offset(4),3*26*128 + 6*128);
}

#[test]
fn range_checks() {
    let image_len = 40 * SORD_M23.track_size();
    assert_eq!(SORD_M23.flat_range(0x29,image_len).unwrap(),22*4096+2048..23*4096);
    // last group on a 40 track disk is (38*16/8)-1
    assert!(SORD_M23.flat_range(75,image_len).is_ok());
    assert!(SORD_M23.flat_range(76,image_len).is_err());
    assert!(SORD_M23.flat_range(usize::MAX,image_len).is_err());
    let mut bad = SORD_M23;
    bad.sectors_per_track = 0;
    assert!(bad.flat_range(0,image_len).is_err());
}
