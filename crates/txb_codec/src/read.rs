//! Types for reading TXB containers
//!

use binrw::BinRead;
use bon::Builder;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, Read};
use tracing::{debug, instrument, warn};

use crate::{
    error::{FormatError, Result},
    padding::padding_for,
    types::{
        Border, BorderSet, Container, Entry, EntryHeader, EntryRecord, Flags, RawBorder,
        TxbHeader, Version, HEADER_SIZE,
    },
};

/// Options for how a TXB container should be decoded
#[derive(Debug, Default, Clone, Copy, Builder)]
pub struct DecodeOptions {
    /// Keep an entry's lone border as an opaque flag instead of a styled span
    #[builder(default)]
    pub force_borders: bool,
}

impl Container {
    /// Read a whole container from `reader`.
    ///
    /// ```no_run
    /// use txb_codec::{read::DecodeOptions, Container};
    ///
    /// fn list_texts(path: &str) -> txb_codec::error::Result<()> {
    ///     let file = std::fs::File::open(path)?;
    ///     let txb = Container::read(file, DecodeOptions::default())?;
    ///
    ///     for entry in &txb.entries {
    ///         println!("{:08x}: {}", entry.hash, entry.record.text);
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn read(mut reader: impl Read, options: DecodeOptions) -> Result<Container> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        decode(&data, options)
    }
}

/// Decode a container held entirely in memory.
#[instrument(skip(data), fields(size = data.len()), err)]
pub fn decode(data: &[u8], options: DecodeOptions) -> Result<Container> {
    let mut cursor = Cursor::new(data);

    let header = TxbHeader::read(&mut cursor).map_err(|e| FormatError::from_binrw(e, 0))?;
    debug!(
        version = ?header.version,
        total_size = header.total_size,
        entry_count = header.entry_count,
        "read header"
    );

    if header.total_size as usize != data.len() {
        warn!(
            declared = header.total_size,
            actual = data.len(),
            "header size does not match data size"
        );
    }

    // each entry takes at least a hash and an offset
    let count = header.entry_count as usize;
    let capacity = count.min(data.len().saturating_sub(HEADER_SIZE as usize) / 8);

    let mut hashes = Vec::with_capacity(capacity);
    for _ in 0..count {
        let offset = cursor.position();
        let hash = cursor
            .read_u32::<LittleEndian>()
            .map_err(|e| FormatError::from_io(e, offset))?;
        hashes.push(hash);
    }

    let mut offsets = Vec::with_capacity(capacity);
    while offsets.len() < count {
        match cursor.read_u32::<LittleEndian>() {
            Ok(offset) => offsets.push(offset),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
    }

    if offsets.len() != count {
        return Err(FormatError::CountMismatch {
            declared: header.entry_count,
            found: offsets.len(),
        }
        .into());
    }

    let text_start = cursor.position();
    let mut entries = Vec::with_capacity(count);
    for (i, (hash, offset)) in hashes.into_iter().zip(offsets).enumerate() {
        cursor.set_position(text_start + offset as u64);
        let record = read_entry(&mut cursor, i + 1, options)?;
        entries.push(Entry { hash, record });
    }

    Ok(Container {
        version: Version(header.version),
        entries,
    })
}

/// Read the entry record starting at the cursor's position.
///
/// `entry` is the 1-based index of the entry and is only used for error reporting.
#[instrument(skip(cursor, options), level = "trace", err)]
pub fn read_entry(
    cursor: &mut Cursor<&[u8]>,
    entry: usize,
    options: DecodeOptions,
) -> Result<EntryRecord> {
    let start = cursor.position();
    let header = EntryHeader::read(cursor).map_err(|e| FormatError::from_binrw(e, start))?;
    debug!(
        entry,
        offset = start,
        char_count = header.char_count,
        byte_size = header.byte_size,
        border_count = header.border_count,
        "read entry header"
    );

    let byte_size = usize::try_from(header.byte_size).map_err(|_| FormatError::InvalidLength {
        entry,
        value: header.byte_size,
    })?;
    let border_count =
        usize::try_from(header.border_count).map_err(|_| FormatError::InvalidLength {
            entry,
            value: header.border_count,
        })?;

    let text_offset = cursor.position();
    let mut raw_text = vec![0u8; byte_size];
    cursor
        .read_exact(&mut raw_text)
        .map_err(|e| FormatError::from_io(e, text_offset))?;
    let raw_text =
        String::from_utf8(raw_text).map_err(|source| FormatError::InvalidText { entry, source })?;

    let chars = raw_text.chars().count();
    if usize::try_from(header.char_count).ok() != Some(chars) {
        warn!(
            entry,
            declared = header.char_count,
            actual = chars,
            "character count does not match text"
        );
    }

    skip_padding(cursor, byte_size, border_count > 0);

    let mut raw = Vec::with_capacity(border_count);
    for _ in 0..border_count {
        let offset = cursor.position();
        raw.push(RawBorder::read(cursor).map_err(|e| FormatError::from_binrw(e, offset))?);
    }

    let borders = match raw.as_slice() {
        [flag] if options.force_borders => BorderSet::Flag(*flag),
        _ => BorderSet::Spans(
            raw.iter()
                .map(|r| {
                    Border::from_raw(*r).ok_or(FormatError::InvalidBorder {
                        entry,
                        start: r.start,
                        end: r.end,
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?,
        ),
    };

    Ok(EntryRecord {
        flags: Flags(header.flags),
        text: raw_text.replace("\r\n", "\n"),
        borders,
    })
}

/// Move past the zero bytes following a text payload.
///
/// Writers do not always agree on padding, so the whole run of zeros is consumed. When borders
/// follow, a border may itself start with zero bytes, so no more than the expected padding is taken.
fn skip_padding(cursor: &mut Cursor<&[u8]>, byte_size: usize, borders_follow: bool) {
    let data: &[u8] = cursor.get_ref();
    let position = cursor.position() as usize;

    let run = data
        .get(position..)
        .unwrap_or_default()
        .iter()
        .take_while(|b| **b == 0)
        .count();

    let expected = padding_for(byte_size);
    let skip = if borders_follow && run > expected {
        expected
    } else {
        run
    };

    cursor.set_position((position + skip) as u64);
}
