//! Padding and offset arithmetic for entry records.
//!
//! Every text payload is followed by at least one zero byte, and the text plus its padding always
//! ends on a 4 byte boundary. An already aligned payload gets a full 4 bytes:
//!
//! | `byte_size % 16` | Padding      |
//! |------------------|--------------|
//! | 0                | 4            |
//! | 1..=3            | 4 - remainder  |
//! | 4..=7            | 8 - remainder  |
//! | 8..=11           | 12 - remainder |
//! | 12..=15          | 16 - remainder |

/// Smallest number of zero bytes that may follow a text payload
pub const MIN_PADDING: usize = 1;

/// Largest number of zero bytes that may follow a text payload
pub const MAX_PADDING: usize = 4;

/// Number of zero bytes written after a text payload of `byte_size` bytes.
pub const fn padding_for(byte_size: usize) -> usize {
    match byte_size % 16 {
        0 => 4,
        r @ 1..=3 => 4 - r,
        r @ 4..=7 => 8 - r,
        r @ 8..=11 => 12 - r,
        r => 16 - r,
    }
}

/// Tracks where each record starts relative to the end of the offset table.
#[derive(Debug, Default, Clone)]
pub(crate) struct OffsetTracker {
    cursor: u64,
    offsets: Vec<u64>,
}

impl OffsetTracker {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cursor: 0,
            offsets: Vec::with_capacity(capacity),
        }
    }

    /// Record the current cursor as the offset of the next record.
    pub fn begin_record(&mut self) -> u64 {
        self.offsets.push(self.cursor);
        self.cursor
    }

    /// Move the cursor past `len` bytes of record data.
    pub fn advance(&mut self, len: usize) {
        self.cursor += len as u64;
    }

    pub fn position(&self) -> u64 {
        self.cursor
    }

    pub fn into_offsets(self) -> Vec<u64> {
        self.offsets
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn padding_table() {
        assert_eq!(padding_for(0), 4);
        assert_eq!(padding_for(1), 3);
        assert_eq!(padding_for(3), 1);
        assert_eq!(padding_for(4), 4);
        assert_eq!(padding_for(5), 3);
        assert_eq!(padding_for(7), 1);
        assert_eq!(padding_for(8), 4);
        assert_eq!(padding_for(11), 1);
        assert_eq!(padding_for(12), 4);
        assert_eq!(padding_for(15), 1);
        assert_eq!(padding_for(16), 4);
        assert_eq!(padding_for(21), 3);
    }

    #[test]
    fn padding_bounds_and_alignment() {
        for byte_size in 0..4096 {
            let padding = padding_for(byte_size);
            assert!(
                (MIN_PADDING..=MAX_PADDING).contains(&padding),
                "{byte_size} -> {padding}"
            );
            assert_eq!((byte_size + padding) % 4, 0, "{byte_size} -> {padding}");
        }
    }

    #[test]
    fn offsets_are_relative_to_first_record() {
        let mut tracker = OffsetTracker::with_capacity(2);

        assert_eq!(tracker.begin_record(), 0);
        tracker.advance(16);
        assert_eq!(tracker.begin_record(), 16);
        tracker.advance(20);

        assert_eq!(tracker.position(), 36);
        assert_eq!(tracker.into_offsets(), vec![0, 16]);
    }
}
