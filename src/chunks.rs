//! The chunk contract and the ordered chunk collection.
//!
//! Every chunk decoder, the root container included, satisfies the
//! [`Chunk`] trait: it knows its tag, its payload size, how to decode
//! itself from a stream positioned right after its tag, how to encode
//! itself back byte-exactly, and how to reset to a zero state so the
//! [`Registry`](crate::registry::Registry) can pool it for reuse.

use std::any::Any;

use crate::prelude::*;
use crate::tag::Tag;
use crate::wire::{SkipRead, real_size};

mod data;
mod fmt;
mod info;
mod labl;
mod list;
mod ltxt;
mod raw;
mod smpl;

pub use data::*;
pub use fmt::*;
pub use info::*;
pub use labl::*;
pub use list::*;
pub use ltxt::*;
pub use raw::*;
pub use smpl::*;

// Popular chunk IDs without dedicated decoders.
pub const ID_JUNK: Tag = Tag::new(*b"JUNK");
pub const ID_ID3: Tag = Tag::new(*b"id3 ");

/// A RIFF chunk decoder and encoder.
pub trait Chunk: Any {
    /// Four byte ASCII identifier of the chunk.
    fn id(&self) -> Tag;

    /// Chunk size in bytes. The tag, the size field and the extra
    /// padding byte (if present) are not counted in the returned value.
    fn size(&self) -> u32;

    /// Chunk type, [`Tag::ZERO`] if the chunk has no type field.
    fn chunk_type(&self) -> Tag {
        Tag::ZERO
    }

    /// True if there can be more than one chunk with this tag at one
    /// level of the file.
    fn multi(&self) -> bool;

    /// Sub-chunks of the chunk, `None` if the chunk does not nest.
    fn chunks(&self) -> Option<&Chunks> {
        None
    }

    /// True if the chunk was decoded by the raw fallback decoder.
    fn raw(&self) -> bool {
        false
    }

    /// Decodes the chunk from src. Expects src to be positioned right
    /// after the chunk tag. Returns the number of bytes read; on error
    /// the count may not be accurate.
    fn read_from(&mut self, src: &mut dyn SkipRead) -> R<u64>;

    /// Encodes the chunk to w. Returns the number of bytes written.
    fn write_to(&mut self, w: &mut dyn Write) -> R<u64>;

    /// Resets the chunk to its zero state so it can be reused.
    fn reset(&mut self);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Ordered collection of decoded chunks.
#[derive(Default)]
pub struct Chunks(pub(crate) Vec<Box<dyn Chunk>>);

impl Chunks {
    pub fn new() -> Chunks {
        Chunks(Vec::new())
    }

    pub fn with_capacity(cap: usize) -> Chunks {
        Chunks(Vec::with_capacity(cap))
    }

    pub fn push(&mut self, ch: Box<dyn Chunk>) {
        self.0.push(ch);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Chunk> {
        self.0.iter().map(|ch| ch.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Chunk>> {
        self.0.iter_mut()
    }

    /// Returns the first chunk with the given tag.
    pub fn first(&self, id: Tag) -> Option<&dyn Chunk> {
        self.0.iter().find(|ch| ch.id() == id).map(|ch| ch.as_ref())
    }

    pub fn first_mut(&mut self, id: Tag) -> Option<&mut Box<dyn Chunk>> {
        self.0.iter_mut().find(|ch| ch.id() == id)
    }

    /// Returns the number of chunks with the given tag.
    pub fn count(&self, id: Tag) -> usize {
        self.0.iter().filter(|ch| ch.id() == id).count()
    }

    /// Returns chunk tags in the order they were seen in the file.
    pub fn ids(&self) -> Vec<Tag> {
        self.0.iter().map(|ch| ch.id()).collect()
    }

    /// Returns the on-wire size (with padding bytes) of all the chunks
    /// in the collection.
    pub fn size(&self) -> u32 {
        self.0
            .iter()
            // Add 8 for the chunk tag and size fields.
            .map(|ch| real_size(ch.size()) + 8)
            .sum()
    }

    /// Writes all the chunks in the collection to w.
    pub fn write_to(&mut self, w: &mut dyn Write) -> R<u64> {
        let mut sum = 0u64;
        for ch in &mut self.0 {
            sum += ch.write_to(w)?;
        }
        Ok(sum)
    }

    /// Removes the first chunk with the given tag, keeping the relative
    /// order of the rest. Does nothing if the tag is absent.
    pub fn remove(&mut self, id: Tag) -> Option<Box<dyn Chunk>> {
        let at = self.0.iter().position(|ch| ch.id() == id)?;
        Some(self.0.remove(at))
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Box<dyn Chunk>> + '_ {
        self.0.drain(..)
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}
