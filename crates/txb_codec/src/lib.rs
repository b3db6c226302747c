//! This library handles reading from and creating **TXB** text resource containers.
//!
//! # TXB Container Format Documentation
//!
//! A TXB container stores the localized dialogue and interface strings of a title. Each string is
//! addressed by the hash of its resource name and may carry styled spans ("borders") with a color
//! and a font. TXB files are typically identified with the `.txb` extension.
//!
//! ## File Structure
//!
//! A TXB file consists of a header, a hash table, an offset table and the entry records.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x7478624C ("txbL")                               |
//! | 0x0004         | Version                | 4 bytes: Opaque, passed through unchanged                  |
//! | 0x0008         | Total Size             | 4 bytes: Size of the whole file                            |
//! | 0x000C         | Entry Count            | 4 bytes: Number of entries                                 |
//! | 0x0010         | Hash Table             | 4 bytes per entry: FNV-1a hash of the resource name        |
//! | ...            | Offset Table           | 4 bytes per entry: Offset of the entry record              |
//! | ...            | Entry Records          | Variable                                                   |
//!
//! ### Offset Table
//!
//! Offsets are relative to the first byte after the offset table. Records are not required to be
//! stored in table order.
//!
//! ### Entry Record
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Character Count        | 2 bytes: Signed number of characters in the text        |
//! | 0x0002         | Byte Size              | 2 bytes: Signed number of UTF-8 bytes in the text       |
//! | 0x0004         | Border Count           | 2 bytes: Signed number of borders after the text        |
//! | 0x0006         | Flags                  | 2 bytes: Opaque                                         |
//! | 0x0008         | Text                   | Byte Size bytes: UTF-8 text                             |
//! | ...            | Padding                | 1 to 4 zero bytes, see [`padding`]                      |
//! | ...            | Borders                | 8 bytes per border                                      |
//!
//! ### Border
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Start                  | 2 bytes: 1-based position of the first character        |
//! | 0x0002         | End                    | 2 bytes: 1-based position of the last character         |
//! | 0x0004         | Color                  | 1 byte                                                  |
//! | 0x0005         | Font                   | 1 byte                                                  |
//! | 0x0006         | Reserved               | 2 bytes: Opaque                                         |
//!
//! An entry with a single border may use it as a flag without any visual meaning. Whether such a
//! border is shown as a styled span is decided by [`read::DecodeOptions::force_borders`].
//!
//! ## Annotated Text
//!
//! The [`text`] module converts containers to and from an editable text document, where borders
//! are written inline as `[c]text[/c=color;font]`.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.txb`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Text Encoding**: UTF-8, line breaks stored as `\n` or `\r\n`
//!

pub mod error;
pub mod hash;
pub mod marker;
pub mod padding;
pub mod read;
pub mod text;
pub mod types;
pub mod write;

pub use hash::{fnv1a_32, Dictionary, EntryName, HashResolver, NoNames, SuffixResolver};
pub use read::{decode, DecodeOptions};
pub use text::{pack, render, PackOptions, PackReport};
pub use types::{Border, BorderSet, Container, Entry, EntryRecord, Flags, RawBorder, Version};
pub use write::encode;
