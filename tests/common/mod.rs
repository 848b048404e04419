// Builds D88 images in memory so the tests do not need binary fixtures.
#![allow(dead_code)]

pub const HEADER_SIZE: usize = 0x2b0;

/// Distinct byte for every (track,sector,index) so misplaced data shows up
pub fn pattern(track: usize,sector: usize,i: usize) -> u8 {
    ((track * 31 + sector * 7 + i) % 251) as u8
}

/// One sector record, header plus data.  The housekeeping fields get
/// non-zero values so that we notice if they are ever overwritten.
pub fn sector_record(c: u8,h: u8,r: u8,n: u8,data: &[u8]) -> Vec<u8> {
    assert_eq!(data.len(),128 << n);
    let mut ans = vec![c,h,r,n];
    ans.extend_from_slice(&16u16.to_le_bytes());
    ans.extend_from_slice(&[0x00,0x00,0x00]);
    ans.extend_from_slice(&[0xa5,0x5a,0xa5,0x5a,0xa5]);
    ans.extend_from_slice(&(data.len() as u16).to_le_bytes());
    ans.extend_from_slice(data);
    ans
}

/// A full track of 16 sectors of 256 bytes in ascending order
pub fn standard_track(track: usize) -> Vec<u8> {
    let mut ans = Vec::new();
    for sec in 1..17 {
        let data: Vec<u8> = (0..256).map(|i| pattern(track,sec,i)).collect();
        ans.append(&mut sector_record(track as u8,0,sec as u8,1,&data));
    }
    ans
}

/// Lay out the header, track table, and tracks.  `tail` bytes are appended after the
/// last track and counted in the declared disk size.
pub fn build_d88(label: &str,tracks: &[Vec<u8>],tail: usize) -> Vec<u8> {
    let mut ans = vec![0;HEADER_SIZE];
    ans[0..label.len()].copy_from_slice(label.as_bytes());
    ans[0x1b] = 0x00;
    let mut ptr = HEADER_SIZE;
    for (i,trk) in tracks.iter().enumerate() {
        ans[0x20+i*4..0x24+i*4].copy_from_slice(&(ptr as u32).to_le_bytes());
        ptr += trk.len();
    }
    for trk in tracks {
        ans.extend_from_slice(trk);
    }
    ans.resize(ans.len() + tail,0xee);
    let size = ans.len() as u32;
    ans[0x1c..0x20].copy_from_slice(&size.to_le_bytes());
    ans
}

/// 40 track single sided disk with every sector present
pub fn standard_disk() -> Vec<u8> {
    let tracks: Vec<Vec<u8>> = (0..40).map(|t| standard_track(t)).collect();
    build_d88("CPM80",&tracks,0)
}
