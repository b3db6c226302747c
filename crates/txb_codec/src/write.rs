//! Types for writing TXB containers
//!

use binrw::BinWrite;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Seek, Write};
use tracing::{debug, instrument};

use crate::{
    error::{EncodingError, Result},
    padding::{padding_for, OffsetTracker, MAX_PADDING},
    types::{
        BorderSet, Container, EntryHeader, EntryRecord, RawBorder, TxbHeader, BORDER_SIZE,
        ENTRY_HEADER_SIZE,
    },
};

impl Container {
    /// Encode the container and write it to `writer`.
    ///
    /// ```
    /// # fn doit() -> txb_codec::error::Result<()>
    /// # {
    /// use txb_codec::{Container, Entry, EntryRecord};
    ///
    /// let txb = Container {
    ///     entries: vec![Entry {
    ///         hash: txb_codec::fnv1a_32("demo"),
    ///         record: EntryRecord {
    ///             text: "hello".into(),
    ///             ..Default::default()
    ///         },
    ///     }],
    ///     ..Default::default()
    /// };
    ///
    /// // We use a buffer here, though you'd normally use a `File`
    /// let mut buf = Vec::new();
    /// txb.write(&mut buf)?;
    /// assert_eq!(buf.len(), 40);
    /// # Ok(())
    /// # }
    /// # doit().unwrap();
    /// ```
    pub fn write(&self, mut writer: impl Write) -> Result<()> {
        writer.write_all(&encode(self)?)?;
        Ok(())
    }
}

fn fit<T: TryFrom<usize>>(
    entry: usize,
    field: &'static str,
    value: usize,
) -> std::result::Result<T, EncodingError> {
    T::try_from(value).map_err(|_| EncodingError::SizeOverflow {
        entry,
        field,
        value,
    })
}

/// Build the stored header and borders of a record, checking every value fits its field.
fn prepare(
    entry: usize,
    record: &EntryRecord,
) -> std::result::Result<(EntryHeader, Vec<RawBorder>), EncodingError> {
    let header = EntryHeader {
        char_count: fit(entry, "character count", record.char_count())?,
        byte_size: fit(entry, "byte size", record.byte_size())?,
        border_count: fit(entry, "border count", record.borders.len())?,
        flags: record.flags.0,
    };

    let borders = match &record.borders {
        BorderSet::Flag(raw) => vec![*raw],
        BorderSet::Spans(spans) => spans
            .iter()
            .map(|border| {
                border.to_raw().ok_or(EncodingError::SizeOverflow {
                    entry,
                    field: "border position",
                    value: border.start.max(border.end) as usize + 1,
                })
            })
            .collect::<std::result::Result<_, _>>()?,
    };

    Ok((header, borders))
}

/// Check that `record` can be stored, without writing anything.
///
/// `entry` is the 1-based index reported in the error.
pub fn validate_record(entry: usize, record: &EntryRecord) -> std::result::Result<(), EncodingError> {
    prepare(entry, record).map(|_| ())
}

/// Write one entry record, returning the number of bytes written.
pub fn write_entry<W: Write + Seek>(
    writer: &mut W,
    entry: usize,
    record: &EntryRecord,
) -> Result<usize> {
    let (header, borders) = prepare(entry, record)?;
    let padding = padding_for(record.byte_size());

    header.write(writer)?;
    writer.write_all(record.text.as_bytes())?;
    writer.write_all(&[0u8; MAX_PADDING][..padding])?;
    for border in &borders {
        border.write(writer)?;
    }

    Ok(ENTRY_HEADER_SIZE + record.byte_size() + padding + borders.len() * BORDER_SIZE)
}

/// Encode a container to its binary form.
///
/// The total size and the offset table are filled in once every record has been written.
#[instrument(skip(container), fields(entries = container.len()), err)]
pub fn encode(container: &Container) -> Result<Vec<u8>> {
    let entry_count: u32 = fit(0, "entry count", container.len())?;

    let mut out = Cursor::new(Vec::new());
    TxbHeader {
        version: container.version.0,
        total_size: 0,
        entry_count,
    }
    .write(&mut out)?;

    for hash in container.hashes() {
        out.write_u32::<LittleEndian>(hash)?;
    }

    let offset_table = out.position();
    for _ in 0..entry_count {
        out.write_u32::<LittleEndian>(0)?;
    }

    let mut tracker = OffsetTracker::with_capacity(container.len());
    for (i, entry) in container.entries.iter().enumerate() {
        tracker.begin_record();
        let written = write_entry(&mut out, i + 1, &entry.record)?;
        tracker.advance(written);
    }

    let total_size: u32 = fit(0, "total size", out.position() as usize)?;
    debug!(total_size, text_size = tracker.position(), "backpatching tables");

    out.set_position(8);
    out.write_u32::<LittleEndian>(total_size)?;

    // offsets are below the checked total size
    out.set_position(offset_table);
    for offset in tracker.into_offsets() {
        out.write_u32::<LittleEndian>(offset as u32)?;
    }

    Ok(out.into_inner())
}
