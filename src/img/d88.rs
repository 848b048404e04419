//! ## Support for D88 disk images
//!
//! D88 is the container used by most Japanese 8-bit emulators.  A fixed header carries
//! the disk label, write protect flag, media code, total size, and a table of 164 track
//! offsets.  Each track is a run of sector records, and each record has a 16 byte
//! header (C,H,R,N plus housekeeping) followed by `128 << N` bytes of data.
//!
//! Sector records are not necessarily in order, sizes may vary within a track,
//! and sectors may be missing altogether.  Rather than model all of this we expose
//! the disk as a flat logical image (`extract`), and write a flat image back into the
//! records we found (`commit`).  Both directions use the same track walk, so a flat
//! image that is not modified commits back to the identical container.
//!
//! The first zero in the track table ends the list of tracks, even if nonzero
//! entries follow.  A record that would run past the end of the buffer ends the
//! walk of its track; this is reported by `survey` but is not an error.  The same
//! goes for a record with a size code above 6, since the rest of the track cannot
//! be located once the record size is in doubt.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use binrw::BinRead;
use num_traits::FromPrimitive;
use log::{warn,info,trace,debug,error};
use crate::img;
use crate::img::{Error,MediaType};
use crate::bios::groups::GroupLayout;
use crate::DYNERR;

pub const HEADER_SIZE: usize = 0x2b0;
pub const TRACK_SLOTS: usize = 164;
pub const SECTOR_HEADER_SIZE: usize = 16;
pub const SECTOR_SIZE_BASE: usize = 128;
pub const LABEL_SIZE: usize = 17;
pub const PROTECT_FLAG: u8 = 0x10;
/// largest size code we will follow, 128 << 6 = 8192
const MAX_SIZE_CODE: u8 = 6;

#[derive(BinRead,Debug,Clone)]
#[br(little)]
pub struct Header {
    name: [u8;LABEL_SIZE],
    _reserve: [u8;9],
    protect: u8,
    media: u8,
    disk_size: u32,
    track_table: [u32;TRACK_SLOTS]
}

#[derive(BinRead,Debug,Clone,Copy)]
#[br(little)]
pub struct SectorHeader {
    cylinder: u8,
    head: u8,
    sector: u8,
    size_code: u8,
    sectors: u16, // sectors in this track
    density: u8, // 0x00 double, 0x40 single
    deleted: u8, // 0x10 for deleted data
    status: u8, // FDC status, 0 is normal
    _reserve: [u8;5],
    data_size: u16
}

/// A sector record as located in the image buffer
#[derive(Debug,Clone,Copy)]
struct SectorRecord {
    header: SectorHeader,
    /// start of the record header in the buffer
    offset: usize,
    /// bytes of sector data following the record header
    size: usize
}

/// Result of walking the records of one track
struct TrackWalk {
    records: Vec<SectorRecord>,
    fault: Option<Error>
}

impl SectorRecord {
    fn data_range(&self) -> std::ops::Range<usize> {
        self.offset + SECTOR_HEADER_SIZE..self.offset + SECTOR_HEADER_SIZE + self.size
    }
}

impl TrackWalk {
    /// Map logical sector number to record.  Later records replace earlier ones with the same number.
    fn sector_map(&self) -> HashMap<usize,SectorRecord> {
        let mut ans = HashMap::new();
        for rec in &self.records {
            if let Some(prev) = ans.insert(rec.header.sector as usize,*rec) {
                debug!("sector {} at {:#X} is shadowed by record at {:#X}",rec.header.sector,prev.offset,rec.offset);
            }
        }
        ans
    }
}

/// Decode the size code, refusing codes that would describe absurd sectors
pub fn sector_size(size_code: u8) -> Option<usize> {
    match size_code {
        n if n <= MAX_SIZE_CODE => Some(SECTOR_SIZE_BASE << n),
        _ => None
    }
}

/// The container buffer along with its parsed header.
/// The buffer is only ever modified in the data area of existing sector records.
pub struct D88 {
    header: Header,
    data: Vec<u8>
}

impl D88 {
    /// Parse the header and track table.  Anything long enough to hold them is accepted.
    pub fn from_bytes(data: &[u8]) -> Result<Self,Error> {
        if data.len() < HEADER_SIZE {
            error!("image has {} bytes, header needs {}",data.len(),HEADER_SIZE);
            return Err(Error::Format);
        }
        let header = match Header::read(&mut Cursor::new(&data[0..HEADER_SIZE])) {
            Ok(h) => h,
            Err(e) => {
                error!("could not parse D88 header: {}",e);
                return Err(Error::Format);
            }
        };
        let ans = Self {
            header,
            data: data.to_vec()
        };
        info!("D88 label `{}`, {} bytes declared, {} in buffer",ans.label(),ans.disk_size(),data.len());
        if ans.disk_size() != data.len() {
            debug!("declared size differs from buffer size");
        }
        Ok(ans)
    }
    /// disk label up to the first null, decoded lossily
    pub fn label(&self) -> String {
        let raw = self.header.name.split(|b| *b==0).next().unwrap_or(&[]);
        String::from_utf8_lossy(raw).to_string()
    }
    pub fn is_protected(&self) -> bool {
        self.header.protect & PROTECT_FLAG > 0
    }
    pub fn media_type(&self) -> Option<MediaType> {
        MediaType::from_u8(self.header.media)
    }
    /// total size as declared in the header
    pub fn disk_size(&self) -> usize {
        self.header.disk_size as usize
    }
    /// number of tracks before the first empty track table entry
    pub fn track_count(&self) -> usize {
        self.header.track_table.iter().position(|x| *x==0).unwrap_or(TRACK_SLOTS)
    }
    /// size of the flat image `extract` will produce
    pub fn flat_size(&self,layout: &GroupLayout) -> usize {
        self.track_count() * layout.track_size()
    }
    /// Get `[start,end)` for each track.  The end is the start of the next
    /// track, or the declared disk size for the last track.
    fn track_bounds(&self) -> Vec<[usize;2]> {
        let count = self.track_count();
        let mut ans = Vec::new();
        for track in 0..count {
            let start = self.header.track_table[track] as usize;
            let end = match track + 1 < count {
                true => self.header.track_table[track+1] as usize,
                false => self.disk_size()
            };
            if end <= start {
                warn!("track {} ends at {:#X} before it starts at {:#X}",track,end,start);
            }
            ans.push([start,end]);
        }
        ans
    }
    fn walk_track(&self,track: usize,start: usize,end: usize) -> TrackWalk {
        let mut ans = TrackWalk {
            records: Vec::new(),
            fault: None
        };
        let mut ptr = start;
        while ptr < end {
            if ptr >= self.data.len() {
                debug!("track {} reached end of buffer",track);
                break;
            }
            if ptr + SECTOR_HEADER_SIZE > self.data.len() {
                ans.fault = Some(Error::TruncatedRecord { track, offset: ptr });
                break;
            }
            let header = match SectorHeader::read(&mut Cursor::new(&self.data[ptr..ptr+SECTOR_HEADER_SIZE])) {
                Ok(h) => h,
                Err(_) => {
                    ans.fault = Some(Error::TruncatedRecord { track, offset: ptr });
                    break;
                }
            };
            let size = match sector_size(header.size_code) {
                Some(sz) => sz,
                None => {
                    ans.fault = Some(Error::SizeCode { track, offset: ptr, code: header.size_code });
                    break;
                }
            };
            if ptr + SECTOR_HEADER_SIZE + size > self.data.len() {
                ans.fault = Some(Error::TruncatedRecord { track, offset: ptr });
                break;
            }
            trace!("track {} C{} H{} R{} N{} at {:#X}",track,header.cylinder,header.head,header.sector,header.size_code,ptr);
            if header.data_size as usize != size {
                debug!("record at {:#X} claims {} bytes, size code gives {}",ptr,header.data_size,size);
            }
            ans.records.push(SectorRecord { header, offset: ptr, size });
            ptr += SECTOR_HEADER_SIZE + size;
        }
        if let Some(e) = &ans.fault {
            warn!("{}",e);
        }
        ans
    }
    /// Walk every present track.  `extract` and `commit` must both go through here.
    fn walk(&self) -> Vec<TrackWalk> {
        let mut ans = Vec::new();
        for (track,[start,end]) in self.track_bounds().into_iter().enumerate() {
            let walk = self.walk_track(track,start,end);
            debug!("track {}: {} records",track,walk.records.len());
            if let Some(first) = walk.records.first() {
                if first.header.sectors as usize != walk.records.len() {
                    debug!("track {} claims {} sectors",track,first.header.sectors);
                }
            }
            ans.push(walk);
        }
        ans
    }
    /// Build the flat logical image.  Each track contributes sectors 1 through
    /// `layout.sectors_per_track` in order; missing sectors are zero filled.
    pub fn extract(&self,layout: &GroupLayout) -> Vec<u8> {
        let mut ans: Vec<u8> = Vec::with_capacity(self.flat_size(layout));
        for (track,walk) in self.walk().iter().enumerate() {
            let map = walk.sector_map();
            for sec in 1..layout.sectors_per_track+1 {
                match map.get(&sec) {
                    Some(rec) => {
                        if rec.size != layout.sector_size {
                            debug!("track {} sector {} has {} bytes, flat sector has {}",track,sec,rec.size,layout.sector_size);
                        }
                        ans.append(&mut img::quantize_block(&self.data[rec.data_range()],layout.sector_size));
                    },
                    None => {
                        trace!("track {} sector {} missing, zero filled",track,sec);
                        ans.resize(ans.len() + layout.sector_size,0);
                    }
                }
            }
        }
        ans
    }
    /// Write a flat logical image back into the sector records.
    /// Only the record that `extract` would have used for a given sector number is written,
    /// and never more than the smaller of the record size and the flat sector size.
    /// Records that fall outside the flat image are left alone.
    pub fn commit(&mut self,flat: &[u8],layout: &GroupLayout) {
        let walks = self.walk();
        let track_size = layout.track_size();
        for (track,walk) in walks.iter().enumerate() {
            for (sec,rec) in walk.sector_map() {
                if sec == 0 || sec > layout.sectors_per_track {
                    trace!("track {} sector {} has no place in the flat image",track,sec);
                    continue;
                }
                let count = usize::min(rec.size,layout.sector_size);
                let flat_offset = track * track_size + (sec - 1) * layout.sector_size;
                if flat_offset + count > flat.len() {
                    trace!("track {} sector {} is beyond the flat image",track,sec);
                    continue;
                }
                let dst = rec.offset + SECTOR_HEADER_SIZE;
                self.data[dst..dst+count].copy_from_slice(&flat[flat_offset..flat_offset+count]);
            }
        }
    }
    /// List the tolerated problems found while walking the tracks
    pub fn survey(&self) -> Vec<Error> {
        self.walk().into_iter().filter_map(|w| w.fault).collect()
    }
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }
    /// Write the buffer, as is, to `path`
    pub fn save(&self,path: &Path) -> Result<(),std::io::Error> {
        std::fs::write(path,&self.data)?;
        info!("saved D88 image to {}",path.display());
        Ok(())
    }
    /// Get image metadata into JSON string.
    pub fn get_metadata(&self,indent: Option<u16>) -> Result<String,DYNERR> {
        let mut root = json::JsonValue::new_object();
        let d88 = "d88";
        root[d88] = json::JsonValue::new_object();
        root[d88]["label"]["_raw"] = json::JsonValue::String(hex::encode_upper(self.header.name));
        root[d88]["label"]["_pretty"] = json::JsonValue::String(self.label());
        root[d88]["protect"]["_raw"] = json::JsonValue::String(hex::encode_upper([self.header.protect]));
        root[d88]["protect"]["_pretty"] = json::JsonValue::Boolean(self.is_protected());
        root[d88]["media"]["_raw"] = json::JsonValue::String(hex::encode_upper([self.header.media]));
        root[d88]["media"]["_pretty"] = match self.media_type() {
            Some(m) => json::JsonValue::String(m.to_string()),
            None => json::JsonValue::Null
        };
        root[d88]["disk_size"]["_raw"] = json::JsonValue::String(hex::encode_upper(self.header.disk_size.to_le_bytes()));
        root[d88]["disk_size"]["_pretty"] = json::JsonValue::Number(self.disk_size().into());
        let mut trk_ary = json::JsonValue::new_array();
        for walk in self.walk() {
            let mut trk_obj = json::JsonValue::new_object();
            let mut addr_map = json::JsonValue::new_array();
            let mut size_map = json::JsonValue::new_array();
            let mut status_map = json::JsonValue::new_array();
            for rec in &walk.records {
                let h = &rec.header;
                addr_map.push(hex::encode_upper([h.cylinder,h.head,h.sector,h.size_code]))?;
                size_map.push(rec.size)?;
                status_map.push(hex::encode_upper([h.density,h.deleted,h.status]))?;
            }
            trk_obj["addr_map"] = addr_map;
            trk_obj["size_map"] = size_map;
            trk_obj["status_map"] = status_map;
            if let Some(e) = &walk.fault {
                trk_obj["fault"] = json::JsonValue::String(e.to_string());
            }
            trk_ary.push(trk_obj)?;
        }
        root[d88]["tracks"] = trk_ary;
        if let Some(spaces) = indent {
            Ok(json::stringify_pretty(root,spaces))
        } else {
            Ok(json::stringify(root))
        }
    }
}

#[test]
fn size_codes() {
    assert_eq!(sector_size(0),Some(128));
    assert_eq!(sector_size(1),Some(256));
    assert_eq!(sector_size(3),Some(1024));
    assert_eq!(sector_size(6),Some(8192));
    assert_eq!(sector_size(7),None);
    assert_eq!(sector_size(0xff),None);
}
