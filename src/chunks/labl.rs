use std::any::Any;

use crate::error::{RiffError, ctx_decode, ctx_encode, link};
use crate::prelude::*;
use crate::registry::Maker;
use crate::wire::{grow, read_padding_if, trim_zero_right, write_padding_if, write_tag_and_size};

/// LIST sub-chunk ID "labl".
pub const ID_LABL: Tag = Tag::new(*b"labl");

/// Text label associated with a cue point, always contained inside an
/// associated data ("adtl") LIST chunk. Digital audio editors display it
/// next to markers or flags.
pub struct ChunkLabl {
    size: u32,

    /// ID of a cue point defined in the cue point list this label
    /// belongs to. Must be unique among all label cue point IDs.
    pub cue_point_id: u32,

    // Null terminated label text. Odd-length text is padded on the wire;
    // the padding is not counted in the chunk size.
    label: Vec<u8>,
}

impl ChunkLabl {
    pub fn new() -> ChunkLabl {
        ChunkLabl {
            size: 0,
            cue_point_id: 0,
            label: Vec::new(),
        }
    }

    /// Returns a [`Maker`] creating [`ChunkLabl`] instances.
    pub fn maker() -> Maker {
        Box::new(|| Box::new(ChunkLabl::new()))
    }

    /// Label text with trailing zero bytes removed.
    pub fn label(&self) -> &[u8] {
        trim_zero_right(&self.label)
    }
}

impl Default for ChunkLabl {
    fn default() -> ChunkLabl {
        ChunkLabl::new()
    }
}

impl Chunk for ChunkLabl {
    fn id(&self) -> Tag {
        ID_LABL
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn multi(&self) -> bool {
        true
    }

    fn read_from(&mut self, src: &mut dyn SkipRead) -> R<u64> {
        let mut sum = 0u64;

        self.size = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(link(ID_INFO, ID_LABL)))?;
        sum += 4;

        // The cue point ID must fit in the declared size.
        if self.size < 4 {
            return Err(RiffError::TooShort).with_context(|| ctx_decode(link(ID_INFO, ID_LABL)));
        }

        self.cue_point_id = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(link(ID_INFO, ID_LABL)))?;
        sum += 4;

        grow(&mut self.label, (self.size - 4) as usize); // Subtract the cue point ID field.
        src.read_exact(&mut self.label)
            .with_context(|| ctx_decode(link(ID_INFO, ID_LABL)))?;
        sum += (self.size - 4) as u64;

        sum += read_padding_if(src, self.size)
            .with_context(|| ctx_decode(link(ID_INFO, ID_LABL)))?;

        Ok(sum)
    }

    fn write_to(&mut self, w: &mut dyn Write) -> R<u64> {
        let mut sum = 0u64;

        sum += write_tag_and_size(w, ID_LABL, self.size)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LABL)))?;

        w.write_u32::<LittleEndian>(self.cue_point_id)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LABL)))?;
        sum += 4;

        w.write_all(&self.label)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LABL)))?;
        sum += self.label.len() as u64;

        sum += write_padding_if(w, self.size)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LABL)))?;

        Ok(sum)
    }

    fn reset(&mut self) {
        self.size = 0;
        self.cue_point_id = 0;
        self.label.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
