//! Resource name hashing and reverse lookup.
//!
//! Entries are keyed by the FNV-1a 32 bit hash of their resource name. Decoding needs the reverse
//! direction, which is only possible through a dictionary of candidate names. Names that cannot be
//! resolved are labelled `unknown_` followed by the hash bytes in file order, which can always be
//! turned back into the original hash.

use indexmap::IndexMap;
use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};
use tracing::{instrument, warn};

/// FNV-1a 32 bit offset basis
pub const FNV1A_32_OFFSET: u32 = 0x811c9dc5;

/// FNV-1a 32 bit prime
pub const FNV1A_32_PRIME: u32 = 0x01000193;

/// Label prefix for hashes that could not be resolved
pub const UNKNOWN_PREFIX: &str = "unknown_";

/// Hash a resource name.
///
/// Each Unicode scalar value is folded in by its code point, not by its UTF-8 bytes.
pub fn fnv1a_32(name: &str) -> u32 {
    name.chars().fold(FNV1A_32_OFFSET, |hash, c| {
        (hash ^ c as u32).wrapping_mul(FNV1A_32_PRIME)
    })
}

/// Mapping between resource names and their hashes
pub trait HashResolver {
    /// Hash a resource name
    fn hash(&self, name: &str) -> u32 {
        fnv1a_32(name)
    }

    /// Find the resource name for a hash, if it is known
    fn lookup(&self, hash: u32) -> Option<Cow<'_, str>>;
}

impl<T: HashResolver + ?Sized> HashResolver for &T {
    fn hash(&self, name: &str) -> u32 {
        (**self).hash(name)
    }

    fn lookup(&self, hash: u32) -> Option<Cow<'_, str>> {
        (**self).lookup(hash)
    }
}

/// Resolver that knows no names, every hash becomes an `unknown_` label
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNames;

impl HashResolver for NoNames {
    fn lookup(&self, _hash: u32) -> Option<Cow<'_, str>> {
        None
    }
}

/// A fixed set of known resource names
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    names: IndexMap<u32, String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one name per line, ignoring blank lines and surrounding whitespace.
    #[instrument(skip(reader), err)]
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut dictionary = Self::new();
        for line in reader.lines() {
            let line = line?;
            let name = line.trim();
            if !name.is_empty() {
                dictionary.insert(name);
            }
        }

        Ok(dictionary)
    }

    /// Add a name, returning its hash.
    ///
    /// A name whose hash is already taken by a different name is ignored.
    pub fn insert(&mut self, name: impl Into<String>) -> u32 {
        let name = name.into();
        let hash = fnv1a_32(&name);

        match self.names.get(&hash) {
            Some(existing) if *existing != name => {
                warn!("hash collision on {hash:#010x}, keeping {existing} and ignoring {name}");
            }
            Some(_) => {}
            None => {
                self.names.insert(hash, name);
            }
        }

        hash
    }

    /// Number of names in the dictionary
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the dictionary holds no names
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(|s| s.as_str())
    }
}

impl<S: Into<String>> FromIterator<S> for Dictionary {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut dictionary = Self::new();
        for name in iter {
            dictionary.insert(name);
        }
        dictionary
    }
}

impl HashResolver for Dictionary {
    fn lookup(&self, hash: u32) -> Option<Cow<'_, str>> {
        self.names.get(&hash).map(|s| Cow::Borrowed(s.as_str()))
    }
}

/// Dictionary lookup that also tries known names ending in two digits with a suffix letter appended
///
/// Some file families number their lines `..._01a`, `..._01b` without listing the lettered
/// variants anywhere.
#[derive(Debug, Clone)]
pub struct SuffixResolver<D> {
    dictionary: D,
    suffixes: Vec<char>,
}

impl<D> SuffixResolver<D> {
    /// Wrap a dictionary trying the suffixes `a`, `b` and `c`.
    pub fn new(dictionary: D) -> Self {
        Self::with_suffixes(dictionary, ['a', 'b', 'c'])
    }

    pub fn with_suffixes(dictionary: D, suffixes: impl IntoIterator<Item = char>) -> Self {
        Self {
            dictionary,
            suffixes: suffixes.into_iter().collect(),
        }
    }
}

fn ends_with_two_digits(name: &str) -> bool {
    let mut tail = name.chars().rev();
    matches!(
        (tail.next(), tail.next()),
        (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit()
    )
}

impl<D: std::borrow::Borrow<Dictionary>> HashResolver for SuffixResolver<D> {
    fn lookup(&self, hash: u32) -> Option<Cow<'_, str>> {
        let dictionary = self.dictionary.borrow();
        if let Some(name) = dictionary.lookup(hash) {
            return Some(name);
        }

        dictionary
            .names()
            .filter(|name| ends_with_two_digits(name))
            .flat_map(|name| self.suffixes.iter().map(move |s| format!("{name}{s}")))
            .find(|candidate| fnv1a_32(candidate) == hash)
            .map(Cow::Owned)
    }
}

/// The label of an entry in the annotated text format
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryName {
    /// A resolved resource name
    Known(String),

    /// A hash without a known name
    Unknown(u32),
}

impl EntryName {
    /// Label a hash, resolving it through `resolver` when possible.
    pub fn resolve(hash: u32, resolver: &impl HashResolver) -> Self {
        match resolver.lookup(hash) {
            Some(name) => EntryName::Known(name.into_owned()),
            None => EntryName::Unknown(hash),
        }
    }

    /// Parse a label, treating `unknown_XXXXXXXX` as a literal hash.
    ///
    /// Returns `None` for an `unknown_` label without exactly 8 hex digits.
    pub fn parse(label: &str) -> Option<Self> {
        let Some(hex) = label.strip_prefix(UNKNOWN_PREFIX) else {
            return Some(EntryName::Known(label.to_owned()));
        };

        if hex.len() != 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }

        Some(EntryName::Unknown(u32::from_le_bytes(bytes)))
    }

    /// The hash this label stands for
    pub fn hash(&self, resolver: &impl HashResolver) -> u32 {
        match self {
            EntryName::Known(name) => resolver.hash(name),
            EntryName::Unknown(hash) => *hash,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, EntryName::Known(_))
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryName::Known(name) => f.write_str(name),
            EntryName::Unknown(hash) => {
                f.write_str(UNKNOWN_PREFIX)?;
                for byte in hash.to_le_bytes() {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}
