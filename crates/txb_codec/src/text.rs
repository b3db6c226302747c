//! The annotated text exchange format.
//!
//! Each entry becomes one block, separated from the next by a blank line:
//!
//! ```text
//! [menu_title]
//! b'00 01'
//! Press [c]START[/c=3;1]
//! [/t2]
//! ```
//!
//! The first line holds the resource name, or `unknown_` and the hash bytes when the name could
//! not be resolved. The second line holds the two flag bytes. The last line holds the 1-based
//! index of the entry in its container, which restores the entry order when packing.

use bon::Builder;
use derive_more::derive::{Deref, Index, IntoIterator};
use std::{cmp::Ordering, fmt};
use tracing::{debug, info, instrument, warn};
use winnow::{
    combinator::{delimited, separated_pair},
    prelude::*,
    stream::AsChar,
    token::{take_till, take_while},
    PResult,
};

use crate::{
    error::{BlockError, EncodingError, TextParseError},
    hash::{EntryName, HashResolver, NoNames},
    marker::{embed, extract, has_markers},
    read::DecodeOptions,
    types::{Border, BorderSet, Container, Entry, EntryRecord, Flags, RawBorder, Version},
    write::validate_record,
};

/// One entry in its annotated text form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub name: EntryName,
    pub flags: Flags,

    /// Text with inline border markers
    pub text: String,

    /// 1-based index of the entry inside its container
    pub index: u32,

    /// 1-based ordinal of the block inside its document
    pub block: usize,

    /// 1-based line the block starts on
    pub line: usize,
}

impl fmt::Display for TextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]\nb'{}'\n{}\n[/t{}]",
            self.name, self.flags, self.text, self.index
        )
    }
}

impl TextBlock {
    /// Number of lines the block takes up, not counting the separating blank line
    fn line_count(&self) -> usize {
        self.text.matches('\n').count() + 4
    }
}

/// Resolved names in ascending order first, then unresolved hashes by their entry index.
fn render_order(a: &TextBlock, b: &TextBlock) -> Ordering {
    match (&a.name, &b.name) {
        (EntryName::Known(x), EntryName::Known(y)) => x.cmp(y).then(a.index.cmp(&b.index)),
        (EntryName::Known(_), EntryName::Unknown(_)) => Ordering::Less,
        (EntryName::Unknown(_), EntryName::Known(_)) => Ordering::Greater,
        (EntryName::Unknown(_), EntryName::Unknown(_)) => a.index.cmp(&b.index),
    }
}

/// Turn every entry of `container` into a block, in document order.
pub fn to_blocks(container: &Container, resolver: &impl HashResolver) -> Vec<TextBlock> {
    let mut blocks: Vec<TextBlock> = container
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| TextBlock {
            name: EntryName::resolve(entry.hash, resolver),
            flags: entry.record.flags,
            text: embed(&entry.record.text, entry.record.borders.spans()),
            index: i as u32 + 1,
            block: 0,
            line: 0,
        })
        .collect();

    blocks.sort_by(render_order);

    let mut line = 1;
    for (i, block) in blocks.iter_mut().enumerate() {
        block.block = i + 1;
        block.line = line;
        line += block.line_count() + 1;
    }

    blocks
}

/// Render a decoded container as an annotated text document.
#[instrument(skip_all, fields(entries = container.len()))]
pub fn render(container: &Container, resolver: &impl HashResolver) -> String {
    let blocks = to_blocks(container, resolver);
    let unresolved = blocks.iter().filter(|b| !b.name.is_known()).count();
    debug!(unresolved, "rendering blocks");

    let mut out = String::new();
    for block in &blocks {
        out.push_str(&block.to_string());
        out.push_str("\n\n");
    }

    out
}

fn header<'s>(s: &mut &'s str) -> PResult<&'s str> {
    delimited('[', take_till(1.., [']', '[']), ']').parse_next(s)
}

fn hex_byte(s: &mut &str) -> PResult<u8> {
    take_while(2, AsChar::is_hex_digit)
        .try_map(|hex| u8::from_str_radix(hex, 16))
        .parse_next(s)
}

fn flags(s: &mut &str) -> PResult<Flags> {
    delimited("b'", separated_pair(hex_byte, ' ', hex_byte), '\'')
        .map(|(a, b)| Flags([a, b]))
        .parse_next(s)
}

fn terminal<'s>(s: &mut &'s str) -> PResult<&'s str> {
    delimited("[/t", take_till(0.., ']'), ']').parse_next(s)
}

fn is_terminal_line(line: &str) -> bool {
    terminal.parse(line.trim()).is_ok()
}

/// A `[name]` line directly followed by a flag line opens a new block.
fn opens_block(line: &str, next: Option<&str>) -> bool {
    let line = line.trim();
    let named = matches!(header.parse(line), Ok(name) if name != "c" && !name.starts_with('/'));
    named && next.is_some_and(|n| n.trim_start().starts_with("b'"))
}

struct RawBlock<'a> {
    block: usize,
    line: usize,
    lines: Vec<&'a str>,
}

impl RawBlock<'_> {
    fn content(&self) -> String {
        self.lines.join("\n")
    }

    fn parse(&self) -> Result<TextBlock, TextParseError> {
        let first = self.lines.first().map(|l| l.trim()).unwrap_or_default();
        let label = header
            .parse(first)
            .ok()
            .filter(|label| !label.starts_with('/'))
            .ok_or_else(|| TextParseError::MissingHeader(first.to_owned()))?;
        let name = EntryName::parse(label)
            .ok_or_else(|| TextParseError::InvalidUnknownHash(label.to_owned()))?;

        let flag_line = self
            .lines
            .get(1)
            .map(|l| l.trim())
            .filter(|l| l.starts_with("b'"))
            .ok_or(TextParseError::MissingFlags)?;
        let flags = flags
            .parse(flag_line)
            .map_err(|_| TextParseError::InvalidFlags(flag_line.to_owned()))?;

        let last = match self.lines.as_slice() {
            [_, _, .., last] if is_terminal_line(last) => last.trim(),
            _ => return Err(TextParseError::MissingTerminal),
        };
        let index = terminal
            .parse(last)
            .ok()
            .and_then(|digits| digits.parse::<u32>().ok())
            .filter(|index| *index > 0)
            .ok_or_else(|| TextParseError::InvalidIndex(last.to_owned()))?;

        Ok(TextBlock {
            name,
            flags,
            text: self.lines[2..self.lines.len() - 1].join("\n"),
            index,
            block: self.block,
            line: self.line,
        })
    }
}

/// Group lines into blocks. A block runs from its header to its `[/tN]` line, or up to the next
/// header when the terminal line is missing.
fn split_blocks(input: &str) -> Vec<RawBlock<'_>> {
    let lines: Vec<&str> = input.split('\n').collect();
    let mut blocks = Vec::new();
    let mut current: Option<RawBlock> = None;

    for (i, line) in lines.iter().copied().enumerate() {
        let next = lines.get(i + 1).copied();

        match current.as_mut() {
            None if line.trim().is_empty() => continue,
            Some(block) if !opens_block(line, next) => block.lines.push(line),
            _ => {
                blocks.extend(current.take());
                current = Some(RawBlock {
                    block: blocks.len() + 1,
                    line: i + 1,
                    lines: vec![line],
                });
            }
        }

        if is_terminal_line(line) {
            blocks.extend(current.take());
        }
    }

    blocks.extend(current);
    blocks
}

/// Normalise CRLF and lone CR line breaks to LF.
pub fn normalize_line_breaks(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

/// Parse an annotated text document into blocks.
///
/// Blocks that cannot be parsed are returned as errors and do not stop the remaining blocks from
/// being parsed. Blocks are returned in document order.
#[instrument(skip_all, fields(size = input.len()))]
pub fn parse(input: &str) -> (Vec<TextBlock>, Vec<BlockError>) {
    let input = normalize_line_breaks(input);
    let mut blocks = Vec::new();
    let mut errors = Vec::new();

    for raw in split_blocks(&input) {
        match raw.parse() {
            Ok(block) => blocks.push(block),
            Err(kind) => errors.push(BlockError {
                block: raw.block,
                line: raw.line,
                content: raw.content(),
                kind,
            }),
        }
    }

    debug!(blocks = blocks.len(), errors = errors.len(), "parsed document");
    (blocks, errors)
}

/// Options for how annotated text should be packed into a TXB container
#[derive(Debug, Default, Clone, Copy, Builder)]
pub struct PackOptions {
    /// Version to stamp when there is no source container
    pub version: Option<Version>,

    /// Single-border policy used when decoding the source container
    #[builder(default)]
    pub force_borders: bool,
}

impl PackOptions {
    /// Options for decoding the source container
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::builder()
            .force_borders(self.force_borders)
            .build()
    }
}

/// Every block that could not be packed, in document order
#[derive(Debug, Default, Clone, PartialEq, Eq, Deref, Index, IntoIterator)]
#[into_iterator(owned, ref)]
pub struct PackReport(Vec<BlockError>);

/// Reserved bytes of the source border at `index`, if there is one.
fn source_reserved(source: Option<&EntryRecord>, index: usize) -> [u8; 2] {
    match source.map(|record| &record.borders) {
        Some(BorderSet::Spans(spans)) => spans.get(index).map(|b| b.reserved),
        Some(BorderSet::Flag(flag)) if index == 0 => Some(flag.reserved),
        _ => None,
    }
    .unwrap_or_default()
}

/// A flag border covering the whole text, keeping the source flag's attribute bytes.
fn whole_text_flag(entry: usize, text: &str, flag: &RawBorder) -> Result<RawBorder, EncodingError> {
    let len = text.chars().count().max(1);
    let end = u16::try_from(len).map_err(|_| EncodingError::SizeOverflow {
        entry,
        field: "border position",
        value: len,
    })?;

    Ok(RawBorder {
        start: 1,
        end,
        ..*flag
    })
}

fn pack_block(block: &TextBlock, source: Option<&EntryRecord>) -> Result<Entry, TextParseError> {
    let entry = block.index as usize;
    let (text, spans) = extract(&block.text)?;

    let borders = match source.map(|record| &record.borders) {
        Some(BorderSet::Flag(flag)) if !has_markers(&block.text) => {
            BorderSet::Flag(whole_text_flag(entry, &text, flag)?)
        }
        _ => BorderSet::Spans(
            spans
                .into_iter()
                .enumerate()
                .map(|(j, span)| Border {
                    reserved: source_reserved(source, j),
                    ..span
                })
                .collect(),
        ),
    };

    let record = EntryRecord {
        flags: block.flags,
        text,
        borders,
    };
    validate_record(entry, &record)?;

    Ok(Entry {
        hash: block.name.hash(&NoNames),
        record,
    })
}

/// Pack an annotated text document into a container.
///
/// Entries are ordered by the index on their `[/tN]` line. With a `source` container, its version
/// is kept and border attribute bytes are reused from the source entry with the same index.
/// Blocks that fail to parse or pack are left out and listed in the returned report.
#[instrument(skip_all, fields(source = source.is_some()))]
pub fn pack(
    input: &str,
    source: Option<&Container>,
    options: &PackOptions,
) -> (Container, PackReport) {
    let (mut blocks, mut errors) = parse(input);
    blocks.sort_by_key(|block| block.index);

    let mut entries = Vec::with_capacity(blocks.len());
    for block in &blocks {
        let source_record = source
            .and_then(|container| container.entries.get(block.index as usize - 1))
            .map(|entry| &entry.record);

        if source.is_some() && source_record.is_none() {
            warn!(index = block.index, "no source entry for block");
        }

        match pack_block(block, source_record) {
            Ok(entry) => entries.push(entry),
            Err(kind) => errors.push(BlockError {
                block: block.block,
                line: block.line,
                content: block.to_string(),
                kind,
            }),
        }
    }

    errors.sort_by_key(|error| error.block);
    info!(
        entries = entries.len(),
        errors = errors.len(),
        "packed document"
    );

    let version = source
        .map(|container| container.version)
        .or(options.version)
        .unwrap_or_default();

    (Container { version, entries }, PackReport(errors))
}
