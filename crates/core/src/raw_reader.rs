use crate::capture_time::CaptureTimeReader;
use crate::error::MetadataError;
use crate::exif_reader::parse_exif_datetime;
use crate::metadata::ContainerKind;
use chrono::NaiveDateTime;

const TAG_DATETIME_ORIGINAL: u16 = 0x9003;
const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;
const IFD_ENTRY_LEN: usize = 12;

/// Reads the capture time out of TIFF-based raw containers (NEF and friends)
/// by walking IFD0 and the Exif sub-IFD directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffRawReader;

impl CaptureTimeReader for TiffRawReader {
    fn container(&self) -> ContainerKind {
        ContainerKind::TiffRaw
    }

    fn read_capture_time(&self, bytes: &[u8]) -> Result<NaiveDateTime, MetadataError> {
        let tiff = Tiff::parse(bytes)?;
        let raw = tiff
            .find_date_time_original()?
            .ok_or(MetadataError::TagMissing)?;
        parse_exif_datetime(&String::from_utf8_lossy(raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy)]
struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    value_offset: usize,
}

struct Tiff<'a> {
    data: &'a [u8],
    order: ByteOrder,
    ifd0: usize,
}

impl<'a> Tiff<'a> {
    fn parse(data: &'a [u8]) -> Result<Self, MetadataError> {
        let order = match data.get(0..2) {
            Some(b"II") => ByteOrder::Little,
            Some(b"MM") => ByteOrder::Big,
            _ => return Err(corrupt("TIFFヘッダーのバイト順が不正です")),
        };
        let header = Self {
            data,
            order,
            ifd0: 0,
        };
        if header.read_u16(2) != Some(42) {
            return Err(corrupt("TIFFマジックナンバーが不正です"));
        }
        let ifd0 = header
            .read_u32(4)
            .map(|v| v as usize)
            .ok_or_else(|| corrupt("IFD0オフセットを読めません"))?;
        Ok(Self { ifd0, ..header })
    }

    fn find_date_time_original(&self) -> Result<Option<&'a [u8]>, MetadataError> {
        let ifd0 = self.entries(self.ifd0)?;

        if let Some(entry) = ifd0.iter().find(|e| e.tag == TAG_DATETIME_ORIGINAL) {
            return self.ascii_value(entry).map(Some);
        }

        let Some(pointer) = ifd0.iter().find(|e| e.tag == TAG_EXIF_IFD_POINTER) else {
            return Ok(None);
        };
        if pointer.field_type != TYPE_LONG || pointer.count != 1 {
            return Err(corrupt("Exif IFDポインタの型が不正です"));
        }
        let exif_ifd = self
            .read_u32(pointer.value_offset)
            .map(|v| v as usize)
            .ok_or_else(|| corrupt("Exif IFDポインタを読めません"))?;

        match self
            .entries(exif_ifd)?
            .iter()
            .find(|e| e.tag == TAG_DATETIME_ORIGINAL)
        {
            Some(entry) => self.ascii_value(entry).map(Some),
            None => Ok(None),
        }
    }

    fn entries(&self, offset: usize) -> Result<Vec<IfdEntry>, MetadataError> {
        let count = self
            .read_u16(offset)
            .ok_or_else(|| corrupt("IFDエントリ数を読めません"))? as usize;
        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            let entry = offset
                .checked_add(2)
                .and_then(|start| start.checked_add(index * IFD_ENTRY_LEN))
                .and_then(|base| self.read_entry(base))
                .ok_or_else(|| corrupt("IFDエントリが途中で切れています"))?;
            entries.push(entry);
        }
        Ok(entries)
    }

    fn read_entry(&self, base: usize) -> Option<IfdEntry> {
        Some(IfdEntry {
            tag: self.read_u16(base)?,
            field_type: self.read_u16(base.checked_add(2)?)?,
            count: self.read_u32(base.checked_add(4)?)?,
            value_offset: base.checked_add(8)?,
        })
    }

    fn ascii_value(&self, entry: &IfdEntry) -> Result<&'a [u8], MetadataError> {
        if entry.field_type != TYPE_ASCII {
            return Err(MetadataError::Malformed(format!(
                "DateTimeOriginalの型がASCIIではありません: {}",
                entry.field_type
            )));
        }
        let len = entry.count as usize;
        let start = if len <= 4 {
            entry.value_offset
        } else {
            self.read_u32(entry.value_offset)
                .map(|v| v as usize)
                .ok_or_else(|| corrupt("値オフセットを読めません"))?
        };
        start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| corrupt("DateTimeOriginalの値がファイル範囲外です"))
    }

    fn read_u16(&self, offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = self.data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
        Some(match self.order {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        })
    }

    fn read_u32(&self, offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(match self.order {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }
}

fn corrupt(message: &str) -> MetadataError {
    MetadataError::CorruptContainer(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::{Tiff, TiffRawReader};
    use crate::capture_time::CaptureTimeReader;
    use crate::error::MetadataError;
    use crate::fixtures::{tiff_with_date, tiff_with_ifd0_date, ByteOrder};

    #[test]
    fn reads_date_from_exif_sub_ifd_in_both_byte_orders() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let bytes = tiff_with_date(order, Some("2023:05:01 10:05:30"));
            let date = TiffRawReader
                .read_capture_time(&bytes)
                .expect("date should exist");
            assert_eq!(date.to_string(), "2023-05-01 10:05:30");
        }
    }

    #[test]
    fn reads_date_stored_directly_in_ifd0() {
        let bytes = tiff_with_ifd0_date("2019:07:04 08:09:10");
        let date = TiffRawReader
            .read_capture_time(&bytes)
            .expect("date should exist");
        assert_eq!(date.to_string(), "2019-07-04 08:09:10");
    }

    #[test]
    fn missing_tag_is_reported() {
        let bytes = tiff_with_date(ByteOrder::Big, None);
        let err = TiffRawReader
            .read_capture_time(&bytes)
            .expect_err("no date tag");
        assert!(matches!(err, MetadataError::TagMissing));
    }

    #[test]
    fn short_ascii_value_is_malformed_not_corrupt() {
        let bytes = tiff_with_date(ByteOrder::Little, Some("bad"));
        let err = TiffRawReader
            .read_capture_time(&bytes)
            .expect_err("not a date");
        assert!(matches!(err, MetadataError::Malformed(_)));
    }

    #[test]
    fn truncated_container_is_corrupt() {
        let mut bytes = tiff_with_date(ByteOrder::Little, Some("2023:05:01 10:05:30"));
        bytes.truncate(30);
        let err = TiffRawReader
            .read_capture_time(&bytes)
            .expect_err("truncated");
        assert!(matches!(err, MetadataError::CorruptContainer(_)));

        let err = TiffRawReader
            .read_capture_time(b"II\x2B\0")
            .expect_err("bad magic");
        assert!(matches!(err, MetadataError::CorruptContainer(_)));
    }

    #[test]
    fn offsets_at_the_end_of_the_address_space_are_corrupt() {
        let err = TiffRawReader
            .read_capture_time(b"II\x2A\0\xFF\xFF\xFF\xFF")
            .expect_err("ifd0 past end");
        assert!(matches!(err, MetadataError::CorruptContainer(_)));

        let bytes = tiff_with_date(ByteOrder::Little, Some("2023:05:01 10:05:30"));
        let tiff = Tiff::parse(&bytes).expect("valid header");
        for offset in [usize::MAX, usize::MAX - 1, usize::MAX - 13] {
            assert!(matches!(
                tiff.entries(offset),
                Err(MetadataError::CorruptContainer(_))
            ));
        }
    }
}
