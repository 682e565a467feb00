//! Synthetic JPEG/TIFF byte fixtures for tests.

use std::fs;
use std::path::{Path, PathBuf};

const TAG_DATETIME_ORIGINAL: u16 = 0x9003;
const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
const TAG_PIXEL_X_DIMENSION: u16 = 0xA002;
const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;

#[derive(Debug, Clone, Copy)]
pub(crate) enum ByteOrder {
    Little,
    Big,
}

struct TiffWriter {
    order: ByteOrder,
    out: Vec<u8>,
}

impl TiffWriter {
    fn new(order: ByteOrder) -> Self {
        let mut writer = Self {
            order,
            out: Vec::new(),
        };
        writer.out.extend_from_slice(match order {
            ByteOrder::Little => b"II",
            ByteOrder::Big => b"MM",
        });
        writer.u16(42);
        writer.u32(8);
        writer
    }

    fn u16(&mut self, value: u16) {
        match self.order {
            ByteOrder::Little => self.out.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => self.out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn u32(&mut self, value: u32) {
        match self.order {
            ByteOrder::Little => self.out.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => self.out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn long_entry(&mut self, tag: u16, value: u32) {
        self.u16(tag);
        self.u16(TYPE_LONG);
        self.u32(1);
        self.u32(value);
    }

    /// Writes an ASCII entry. Values longer than four bytes are stored at
    /// `data_offset`, which the caller must append afterwards.
    fn ascii_entry(&mut self, tag: u16, value: &[u8], data_offset: u32) {
        self.u16(tag);
        self.u16(TYPE_ASCII);
        self.u32(value.len() as u32);
        if value.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..value.len()].copy_from_slice(value);
            self.out.extend_from_slice(&inline);
        } else {
            self.u32(data_offset);
        }
    }
}

fn ascii(date: &str) -> Vec<u8> {
    let mut value = date.as_bytes().to_vec();
    value.push(0);
    value
}

/// IFD0 at 8 holds only the Exif IFD pointer; the Exif IFD at 26 holds
/// DateTimeOriginal (or an unrelated tag when `date` is `None`).
pub(crate) fn tiff_with_date(order: ByteOrder, date: Option<&str>) -> Vec<u8> {
    let mut w = TiffWriter::new(order);
    w.u16(1);
    w.long_entry(TAG_EXIF_IFD_POINTER, 26);
    w.u32(0);

    w.u16(1);
    match date {
        Some(date) => {
            let value = ascii(date);
            w.ascii_entry(TAG_DATETIME_ORIGINAL, &value, 44);
            w.u32(0);
            if value.len() > 4 {
                w.out.extend_from_slice(&value);
            }
        }
        None => {
            w.long_entry(TAG_PIXEL_X_DIMENSION, 640);
            w.u32(0);
        }
    }
    w.out
}

pub(crate) fn tiff_with_ifd0_date(date: &str) -> Vec<u8> {
    let mut w = TiffWriter::new(ByteOrder::Little);
    let value = ascii(date);
    w.u16(1);
    w.ascii_entry(TAG_DATETIME_ORIGINAL, &value, 26);
    w.u32(0);
    w.out.extend_from_slice(&value);
    w.out
}

pub(crate) fn jpeg_with_date(date: Option<&str>) -> Vec<u8> {
    let tiff = tiff_with_date(ByteOrder::Big, date);
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let len = (2 + 6 + tiff.len()) as u16;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

pub(crate) fn jpeg_without_exif() -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    out.extend_from_slice(b"JFIF\0");
    out.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

pub(crate) fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("write fixture");
    path
}

pub(crate) fn write_jpeg(dir: &Path, name: &str, date: &str) -> PathBuf {
    write_file(dir, name, &jpeg_with_date(Some(date)))
}
