//! Fixtures shared by the unit tests: minimal JPEG files carrying a single
//! `DateTimeOriginal` tag, and helpers for pinning filesystem timestamps.

use chrono::{Local, TimeZone};
use std::fs::{File, FileTimes};
use std::path::Path;
use std::time::SystemTime;

const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;

/// Builds `SOI, APP1(Exif), EOI` with a big-endian TIFF body holding
/// IFD0 -> Exif IFD -> DateTimeOriginal. The value must be longer than four
/// bytes so it lives out of line.
pub fn jpeg_with_capture_time(value: &str) -> Vec<u8> {
    assert!(value.len() > 3, "inline ASCII values are not supported");

    let ifd0_offset: u32 = 8;
    let exif_ifd_offset: u32 = ifd0_offset + 18;
    let data_offset: u32 = exif_ifd_offset + 18;

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM");
    tiff.extend_from_slice(&42u16.to_be_bytes());
    tiff.extend_from_slice(&ifd0_offset.to_be_bytes());

    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&TAG_EXIF_IFD_POINTER.to_be_bytes());
    tiff.extend_from_slice(&TYPE_LONG.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&exif_ifd_offset.to_be_bytes());
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let mut ascii = value.as_bytes().to_vec();
    ascii.push(0);
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&TAG_DATE_TIME_ORIGINAL.to_be_bytes());
    tiff.extend_from_slice(&TYPE_ASCII.to_be_bytes());
    tiff.extend_from_slice(&(ascii.len() as u32).to_be_bytes());
    tiff.extend_from_slice(&data_offset.to_be_bytes());
    tiff.extend_from_slice(&0u32.to_be_bytes());

    tiff.extend_from_slice(&ascii);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let segment_len = (2 + 6 + tiff.len()) as u16;
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// A JPEG with no APP1 segment at all.
pub fn jpeg_without_exif() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xD9]
}

pub fn local_time(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> SystemTime {
    Local
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .expect("unambiguous local time")
        .into()
}

pub fn set_modified(path: &Path, time: SystemTime) {
    let file = File::options()
        .write(true)
        .open(path)
        .expect("open for set_times");
    file.set_times(FileTimes::new().set_modified(time).set_accessed(time))
        .expect("set file times");
}
