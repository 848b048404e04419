//! # BIOS module
//! 
//! This module is a place for any middleware we may require
//! between the CP/M view of a disk and the `img` module.  It is named in analogy
//! with the CP/M concept of a BIOS as being (in part) a layer between
//! the BDOS and the physical disk.
//! 
//! The allocation group arithmetic is kept in this module.

pub mod groups;
