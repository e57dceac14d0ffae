use std::any::Any;

use crate::error::{RiffError, ctx_decode, ctx_encode, link};
use crate::prelude::*;
use crate::registry::Maker;
use crate::wire::{grow, read_padding_if, trim_zero_right, write_padding_if, write_tag_and_size};

/// LIST sub-chunk ID "ltxt".
pub const ID_LTXT: Tag = Tag::new(*b"ltxt");

// Size of the ltxt static fields in bytes.
const LTXT_STATIC_SIZE: u32 = 20;

/// Labeled text chunk: associates a text label with a region or section
/// of waveform data, shown as marked regions in digital audio editors.
pub struct ChunkLtxt {
    size: u32,

    /// ID of the cue point the region starts at.
    pub cue_point_id: u32,

    /// How many samples from the cue point the region spans.
    pub sam_len: u32,

    /// What the text is used for, e.g. "scrp" for script text or "capt"
    /// for close-caption.
    pub pur_id: u32,

    // Locale information about the text, typically used for queries to
    // the operating system.
    pub country: u16,
    pub language: u16,
    pub dialect: u16,
    pub code_page: u16,

    // Null terminated text. Odd-length text is padded on the wire; the
    // padding is not counted in the chunk size.
    text: Vec<u8>,
}

impl ChunkLtxt {
    pub fn new() -> ChunkLtxt {
        ChunkLtxt {
            size: 0,
            cue_point_id: 0,
            sam_len: 0,
            pur_id: 0,
            country: 0,
            language: 0,
            dialect: 0,
            code_page: 0,
            text: Vec::new(),
        }
    }

    /// Returns a [`Maker`] creating [`ChunkLtxt`] instances.
    pub fn maker() -> Maker {
        Box::new(|| Box::new(ChunkLtxt::new()))
    }

    /// Region text with trailing zero bytes removed.
    pub fn text(&self) -> &[u8] {
        trim_zero_right(&self.text)
    }
}

impl Default for ChunkLtxt {
    fn default() -> ChunkLtxt {
        ChunkLtxt::new()
    }
}

impl Chunk for ChunkLtxt {
    fn id(&self) -> Tag {
        ID_LTXT
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
            .with_context(|| ctx_decode(link(ID_INFO, ID_LTXT)))?;
        sum += 4;

        // The static fields must fit in the declared size.
        if self.size < LTXT_STATIC_SIZE {
            return Err(RiffError::TooShort).with_context(|| ctx_decode(link(ID_INFO, ID_LTXT)));
        }

        self.cue_point_id = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(link(ID_INFO, ID_LTXT)))?;
        self.sam_len = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(link(ID_INFO, ID_LTXT)))?;
        self.pur_id = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(link(ID_INFO, ID_LTXT)))?;
        self.country = src
            .read_u16::<LittleEndian>()
            .with_context(|| ctx_decode(link(ID_INFO, ID_LTXT)))?;
        self.language = src
            .read_u16::<LittleEndian>()
            .with_context(|| ctx_decode(link(ID_INFO, ID_LTXT)))?;
        self.dialect = src
            .read_u16::<LittleEndian>()
            .with_context(|| ctx_decode(link(ID_INFO, ID_LTXT)))?;
        self.code_page = src
            .read_u16::<LittleEndian>()
            .with_context(|| ctx_decode(link(ID_INFO, ID_LTXT)))?;
        sum += LTXT_STATIC_SIZE as u64;

        grow(&mut self.text, (self.size - LTXT_STATIC_SIZE) as usize);
        src.read_exact(&mut self.text)
            .with_context(|| ctx_decode(link(ID_INFO, ID_LTXT)))?;
        sum += (self.size - LTXT_STATIC_SIZE) as u64;

        sum += read_padding_if(src, self.size)
            .with_context(|| ctx_decode(link(ID_INFO, ID_LTXT)))?;

        Ok(sum)
    }

    fn write_to(&mut self, w: &mut dyn Write) -> R<u64> {
        let mut sum = 0u64;

        sum += write_tag_and_size(w, ID_LTXT, self.size)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LTXT)))?;

        w.write_u32::<LittleEndian>(self.cue_point_id)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LTXT)))?;
        w.write_u32::<LittleEndian>(self.sam_len)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LTXT)))?;
        w.write_u32::<LittleEndian>(self.pur_id)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LTXT)))?;
        w.write_u16::<LittleEndian>(self.country)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LTXT)))?;
        w.write_u16::<LittleEndian>(self.language)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LTXT)))?;
        w.write_u16::<LittleEndian>(self.dialect)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LTXT)))?;
        w.write_u16::<LittleEndian>(self.code_page)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LTXT)))?;
        sum += LTXT_STATIC_SIZE as u64;

        w.write_all(&self.text)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LTXT)))?;
        sum += self.text.len() as u64;

        sum += write_padding_if(w, self.size)
            .with_context(|| ctx_encode(link(ID_INFO, ID_LTXT)))?;

        Ok(sum)
    }

    fn reset(&mut self) {
        self.size = 0;
        self.cue_point_id = 0;
        self.sam_len = 0;
        self.pur_id = 0;
        self.country = 0;
        self.language = 0;
        self.dialect = 0;
        self.code_page = 0;
        self.text.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
