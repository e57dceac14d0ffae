use std::fmt;

/// Four-character chunk identifier.
///
/// Tags are literally ASCII characters on the wire, so they are read and
/// compared as big-endian derived 32-bit integers. All other integer
/// fields in the container are little-endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(u32);

impl Tag {
    /// The zero tag, used where a chunk has no type field.
    pub const ZERO: Tag = Tag(0);

    pub const fn new(bytes: [u8; 4]) -> Tag {
        Tag(u32::from_be_bytes(bytes))
    }

    pub const fn from_u32(v: u32) -> Tag {
        Tag(v)
    }

    /// Converts a four byte ASCII string to a tag. Shorter strings are
    /// padded with spaces, longer ones are trimmed to 4 bytes.
    pub fn from_ascii(s: &str) -> Tag {
        let mut bytes = [b' '; 4];
        for (dst, src) in bytes.iter_mut().zip(s.bytes()) {
            *dst = src;
        }
        Tag::new(bytes)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl From<[u8; 4]> for Tag {
    fn from(bytes: [u8; 4]) -> Tag {
        Tag::new(bytes)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes()))
    }
}
