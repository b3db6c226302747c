//! Base types for structure of TXB file.

use binrw::{BinRead, BinWrite};
use derive_more::derive::Constructor;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size in bytes of [`TxbHeader`] including the magic
pub const HEADER_SIZE: u64 = 16;

/// Size in bytes of [`EntryHeader`]
pub const ENTRY_HEADER_SIZE: usize = 8;

/// Size in bytes of [`RawBorder`]
pub const BORDER_SIZE: usize = 8;

/// Version stamped on containers built without a source container
pub const DEFAULT_VERSION: Version = Version([0x02, 0x00, 0x00, 0x00]);

/// TXB file header
///
/// Defines the header of the TXB file which always starts with "txbL".
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"txbL", little)]
pub struct TxbHeader {
    /// Opaque version bytes, passed through untouched
    pub version: [u8; 4],

    /// The size of the whole file in bytes
    pub total_size: u32,

    /// The number of entries, and the length of both the hash and offset tables
    pub entry_count: u32,
}

/// TXB entry header
///
/// The fixed fields in front of every entry's text
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct EntryHeader {
    /// Number of characters in the text
    pub char_count: i16,

    /// Number of UTF-8 bytes in the text
    pub byte_size: i16,

    /// Number of borders stored after the padding
    pub border_count: i16,

    /// Opaque flag bytes
    pub flags: [u8; 2],
}

/// TXB border record, exactly as stored
///
/// Positions are 1-based and inclusive.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[brw(little)]
pub struct RawBorder {
    pub start: u16,
    pub end: u16,
    pub color: u8,
    pub font: u8,
    pub reserved: [u8; 2],
}

/// Opaque container version
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Version(pub [u8; 4]);

impl Default for Version {
    fn default() -> Self {
        DEFAULT_VERSION
    }
}

/// Opaque per-entry flag bytes
///
/// Displayed the way the annotated text format spells them: `00 01`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Flags(pub [u8; 2]);

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x} {:02x}", self.0[0], self.0[1])
    }
}

/// A styled span of characters inside an entry's text
///
/// `start` and `end` are 0-based, inclusive character positions.
#[derive(Constructor, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Border {
    pub start: u16,
    pub end: u16,
    pub color: u8,
    pub font: u8,
    pub reserved: [u8; 2],
}

impl Border {
    /// The 1-based start position as stored on disk
    pub fn stored_start(&self) -> u32 {
        self.start as u32 + 1
    }

    /// The 1-based end position as stored on disk
    pub fn stored_end(&self) -> u32 {
        self.end as u32 + 1
    }

    /// Convert a stored border, rejecting positions that cannot be 1-based or are reversed.
    pub(crate) fn from_raw(raw: RawBorder) -> Option<Border> {
        if raw.start == 0 || raw.end == 0 || raw.start > raw.end {
            return None;
        }

        Some(Border {
            start: raw.start - 1,
            end: raw.end - 1,
            color: raw.color,
            font: raw.font,
            reserved: raw.reserved,
        })
    }

    /// Convert to the stored form, failing if a position cannot be stored 1-based.
    pub fn to_raw(&self) -> Option<RawBorder> {
        Some(RawBorder {
            start: self.start.checked_add(1)?,
            end: self.end.checked_add(1)?,
            color: self.color,
            font: self.font,
            reserved: self.reserved,
        })
    }
}

/// How the borders of an entry are carried
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BorderSet {
    /// Borders that are styled spans, shown as inline markers
    Spans(Vec<Border>),

    /// A lone border acting as a flag with no visual meaning
    ///
    /// It is kept byte for byte and never shown as a marker.
    Flag(RawBorder),
}

impl Default for BorderSet {
    fn default() -> Self {
        BorderSet::Spans(Vec::new())
    }
}

impl BorderSet {
    /// Number of borders written to disk
    pub fn len(&self) -> usize {
        match self {
            BorderSet::Spans(spans) => spans.len(),
            BorderSet::Flag(_) => 1,
        }
    }

    /// Whether no borders are stored at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borders that should be shown as inline markers
    pub fn spans(&self) -> &[Border] {
        match self {
            BorderSet::Spans(spans) => spans,
            BorderSet::Flag(_) => &[],
        }
    }
}

/// One decoded entry record
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntryRecord {
    /// Opaque flag bytes
    pub flags: Flags,

    /// Clean text with line breaks normalized to `\n`
    pub text: String,

    /// Borders following the text
    pub borders: BorderSet,
}

impl EntryRecord {
    /// Number of Unicode scalar values in the text
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Number of UTF-8 bytes in the text
    pub fn byte_size(&self) -> usize {
        self.text.len()
    }
}

/// An entry together with the hash of its resource name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entry {
    pub hash: u32,
    pub record: EntryRecord,
}

/// A whole TXB container
///
/// Offsets and sizes are derived from the entries when encoding.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Container {
    pub version: Version,
    pub entries: Vec<Entry>,
}

impl Container {
    /// Number of entries contained in this TXB.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this TXB contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the hash table in entry order
    pub fn hashes(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|e| e.hash)
    }

    /// Get an entry by its resource hash
    pub fn by_hash(&self, hash: u32) -> Option<&Entry> {
        self.entries.iter().find(|e| e.hash == hash)
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn read_header() -> binrw::BinResult<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x74, 0x78, 0x62, 0x4C,
            0x02, 0x00, 0x00, 0x00,
            0x28, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
        ]);

        let expected = TxbHeader {
            version: [0x02, 0x00, 0x00, 0x00],
            total_size: 40,
            entry_count: 1,
        };

        assert_eq!(TxbHeader::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn read_header_bad_magic() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x74, 0x78, 0x62, 0x42,
            0x02, 0x00, 0x00, 0x00,
            0x28, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
        ]);

        assert!(matches!(
            TxbHeader::read(&mut input),
            Err(binrw::Error::BadMagic { .. })
        ));
    }

    #[test]
    fn write_entry_header() -> binrw::BinResult<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x05, 0x00,
            0x07, 0x00,
            0x02, 0x00,
            0x00, 0x01,
        ];

        let header = EntryHeader {
            char_count: 5,
            byte_size: 7,
            border_count: 2,
            flags: [0x00, 0x01],
        };

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn read_raw_border() -> binrw::BinResult<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x01, 0x00,
            0x00, 0x01,
            0x03, 0x04,
            0x00, 0x00,
        ]);

        let expected = RawBorder {
            start: 1,
            end: 256,
            color: 3,
            font: 4,
            reserved: [0, 0],
        };

        assert_eq!(RawBorder::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn border_positions_are_shifted() {
        let raw = RawBorder {
            start: 1,
            end: 2,
            color: 7,
            font: 1,
            reserved: [0, 0],
        };

        let border = Border::from_raw(raw).expect("valid border");
        assert_eq!(border, Border::new(0, 1, 7, 1, [0, 0]));
        assert_eq!(border.stored_start(), 1);
        assert_eq!(border.stored_end(), 2);
        assert_eq!(border.to_raw(), Some(raw));
    }

    #[test]
    fn border_rejects_invalid_positions() {
        let zero = RawBorder {
            start: 0,
            end: 2,
            ..Default::default()
        };
        let reversed = RawBorder {
            start: 3,
            end: 2,
            ..Default::default()
        };

        assert_eq!(Border::from_raw(zero), None);
        assert_eq!(Border::from_raw(reversed), None);
    }

    #[test]
    fn flags_display() {
        assert_eq!(Flags([0x00, 0x1a]).to_string(), "00 1a");
    }

    #[test]
    fn border_to_raw_overflow() {
        let border = Border::new(0, u16::MAX, 1, 1, [0, 0]);
        assert_eq!(border.to_raw(), None);
    }

    #[test]
    fn border_set_len() {
        let border = Border::new(0, 1, 2, 3, [0, 0]);
        let flag = RawBorder {
            start: 1,
            end: 2,
            ..Default::default()
        };

        assert!(BorderSet::default().is_empty());
        assert_eq!(BorderSet::Flag(flag).len(), 1);
        assert!(BorderSet::Flag(flag).spans().is_empty());
        assert_eq!(BorderSet::Spans(vec![border, border]).len(), 2);
    }
}
