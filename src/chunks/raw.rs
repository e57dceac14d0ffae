use std::any::Any;

use crate::error::{RiffError, ctx_decode, ctx_encode, link};
use crate::prelude::*;
use crate::registry::RawMaker;
use crate::wire::{grow, read_padding_if, real_size, write_padding_if, write_tag_and_size};

// Used only in error reporting, never on the wire.
const ID_RAWC: Tag = Tag::new(*b"RAWC");

/// Decoder for unknown (not registered) chunks.
///
/// In load mode the whole payload is kept in an owned buffer that is
/// reused across decodes. In skip mode the payload is skipped (seeking
/// when the source supports it) and the chunk cannot be written back.
pub struct ChunkRaw {
    id: Tag,
    size: u32,
    data: Option<Vec<u8>>,
}

impl ChunkRaw {
    pub fn new(id: Tag, load: bool) -> ChunkRaw {
        ChunkRaw {
            id,
            size: 0,
            data: load.then(|| Vec::with_capacity(1 << 8)),
        }
    }

    /// Returns a [`RawMaker`] creating [`ChunkRaw`] instances.
    pub fn maker(load: bool) -> RawMaker {
        Box::new(move |id| Box::new(ChunkRaw::new(id, load)))
    }

    /// Raw chunk payload. Empty in skip mode.
    pub fn body(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }
}

impl Chunk for ChunkRaw {
    fn id(&self) -> Tag {
        self.id
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn multi(&self) -> bool {
        true
    }

    fn raw(&self) -> bool {
        true
    }

    fn read_from(&mut self, src: &mut dyn SkipRead) -> R<u64> {
        let mut sum = 0u64;

        self.size = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(link(ID_RAWC, self.id)))?;
        sum += 4;

        let Some(data) = self.data.as_mut() else {
            let rs = real_size(self.size); // Skip padding byte along with the payload.
            src.skip(rs as u64)
                .with_context(|| ctx_decode(link(ID_RAWC, self.id)))?;
            return Ok(sum + rs as u64);
        };

        grow(data, self.size as usize);
        src.read_exact(data)
            .with_context(|| ctx_decode(link(ID_RAWC, self.id)))?;
        sum += self.size as u64;

        sum += read_padding_if(src, self.size)
            .with_context(|| ctx_decode(link(ID_RAWC, self.id)))?;

        Ok(sum)
    }

    fn write_to(&mut self, w: &mut dyn Write) -> R<u64> {
        let Some(data) = self.data.as_ref() else {
            return Err(RiffError::SkipDataMode.into());
        };

        let mut sum = 0u64;
        let size = data.len() as u32;

        sum += write_tag_and_size(w, self.id, size)
            .with_context(|| ctx_encode(link(ID_RAWC, self.id)))?;

        w.write_all(data)
            .with_context(|| ctx_encode(link(ID_RAWC, self.id)))?;
        sum += size as u64;

        sum += write_padding_if(w, size)
            .with_context(|| ctx_encode(link(ID_RAWC, self.id)))?;

        Ok(sum)
    }

    fn reset(&mut self) {
        self.size = 0;
        if let Some(data) = self.data.as_mut() {
            data.clear();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
