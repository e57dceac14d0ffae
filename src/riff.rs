//! The root container: reads the top-level header, dispatches every
//! sub-chunk to the registry and validates the overall size.

use std::any::Any;
use std::fs::File;
use std::path::Path;

use memmap2::MmapOptions;

use crate::error::{RiffError, ctx_decode, ctx_encode};
use crate::prelude::*;
use crate::registry::{Registry, SharedRegistry};
use crate::wire::{read_size, read_tag, read_tag_opt, write_tag_and_size};

/// The "RIFF" magic tag.
pub const ID_RIFF: Tag = Tag::new(*b"RIFF");

// Supported resource types as defined in the RIFF header.
pub const TYPE_WAVE: Tag = Tag::new(*b"WAVE");
pub const TYPE_AVI: Tag = Tag::new(*b"AVI ");
pub const TYPE_RMID: Tag = Tag::new(*b"RMID");

/// Constructor option instructing decoders to load chunk metadata and
/// data.
pub const LOAD_DATA: bool = true;

/// Constructor option instructing decoders to skip chunk data and load
/// only metadata. It is up to each chunk decoder to decide what counts
/// as data vs metadata.
pub const SKIP_DATA: bool = false;

// Files above this size are memory mapped instead of read into memory.
const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;

/// A file in Resource Interchange File Format.
pub struct Riff {
    // Header content length in bytes. The tag and the leading size field
    // of the outer wrapper are not counted.
    size: u32,

    // The type of the resource (e.g. WAVE).
    riff_type: Tag,

    // Decoded chunks in the order they appeared in the file.
    chunks: Chunks,

    // Registered chunk decoders, shared with LIST chunks.
    reg: SharedRegistry,
}

impl Riff {
    /// Returns a new container with all "out of the box" chunk decoders
    /// registered.
    pub fn new(load: bool) -> Riff {
        let reg = Registry::shared(ChunkRaw::maker(load));
        {
            let mut r = reg.borrow_mut();
            r.register(ID_FMT, ChunkFmt::maker());
            r.register(ID_DATA, ChunkData::maker(load));
            r.register(ID_SMPL, ChunkSmpl::maker());
        }
        reg.borrow_mut()
            .register(ID_LIST, ChunkList::maker(load, &reg));

        Riff::bare(Some(reg))
    }

    /// Returns a new container without any chunk decoders registered.
    /// With `None` a registry is created with the raw fallback decoder
    /// set to skip data.
    pub fn bare(reg: Option<SharedRegistry>) -> Riff {
        let reg = reg.unwrap_or_else(|| Registry::shared(ChunkRaw::maker(SKIP_DATA)));
        Riff {
            size: 0,
            riff_type: Tag::ZERO,
            chunks: Chunks::with_capacity(4),
            reg,
        }
    }

    /// Builds a fresh container of the given type from an
    /// already-decoded or edited chunk collection, recomputing the
    /// aggregate size.
    pub fn compose(riff_type: Tag, chunks: Chunks) -> Riff {
        let mut rif = Riff::bare(None);
        rif.riff_type = riff_type;
        rif.modify(chunks);
        rif
    }

    /// Replaces the container children and recomputes the size field in
    /// place. Previous children go back to the registry pool.
    pub fn modify(&mut self, chunks: Chunks) {
        self.release_children();
        self.chunks = chunks;
        self.size = 4 + self.chunks.size();
    }

    /// The resource type tag from the header.
    pub fn riff_type(&self) -> Tag {
        self.riff_type
    }

    /// Decoded chunks in the order they appeared in the file.
    pub fn chunks(&self) -> &Chunks {
        &self.chunks
    }

    pub fn set_riff_type(&mut self, riff_type: Tag) {
        self.riff_type = riff_type;
    }

    /// The registry this container dispatches chunk decoding through.
    pub fn registry(&self) -> &SharedRegistry {
        &self.reg
    }

    /// True if a decoder for the tag is registered.
    pub fn is_registered(&self, id: Tag) -> bool {
        self.reg.borrow().has(id)
    }

    pub fn chunks_mut(&mut self) -> &mut Chunks {
        &mut self.chunks
    }

    /// Decodes a whole file. Large files are memory mapped, small ones
    /// are read into memory.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> R<u64> {
        let mut file = File::open(path.as_ref())?;
        let file_size = file.metadata()?.len();

        if file_size > MMAP_THRESHOLD {
            let mmap = unsafe { MmapOptions::new().map(&file)? };
            self.read_from(&mut Cursor::new(&mmap[..]))
        } else {
            let mut data = vec![0; file_size as usize];
            file.read_exact(&mut data)?;
            self.read_from(&mut Cursor::new(&data[..]))
        }
    }

    /// Decodes the container from src. Returns the total number of
    /// bytes consumed.
    ///
    /// The scan stops at a clean end of stream; when the declared header
    /// size disagrees with the bytes actually consumed the recorded size
    /// is corrected to match reality, tolerating producers that
    /// mis-declare total file size. Any other error is fatal.
    pub fn read_from(&mut self, src: &mut dyn SkipRead) -> R<u64> {
        self.reset();

        let mut sum: u64 = 0;

        let id = read_tag(src)?;
        sum += 4;

        if id != ID_RIFF {
            return Err(RiffError::NotRiff.into());
        }

        self.size = read_size(src)?;
        sum += 4;

        self.riff_type = Tag::from_u32(
            src.read_u32::<BigEndian>()
                .with_context(|| ctx_decode(ID_RIFF))?,
        );
        sum += 4;

        loop {
            // A clean end of stream is the expected termination of the
            // chunk scan; a partial tag is not.
            let id = match read_tag_opt(src).context("error reading chunk ID")? {
                Some(id) => id,
                None => break,
            };
            sum += 4;

            sum += self.decode_chunk(id, src)?;
        }

        if self.size as u64 != sum - 8 {
            dprintln!("correcting RIFF size {} -> {}", self.size, sum - 8);
            self.size = (sum - 8) as u32;
        }

        Ok(sum)
    }

    /// Encodes the container to w, recomputing the header size from the
    /// chunk collection. Returns the number of bytes written.
    pub fn write_to(&mut self, w: &mut dyn Write) -> R<u64> {
        let mut sum = 0u64;

        // Recalculate chunks size and add the RIFF type field.
        self.size = 4 + self.chunks.size();

        sum += write_tag_and_size(w, ID_RIFF, self.size)
            .with_context(|| ctx_encode(ID_RIFF))?;

        w.write_u32::<BigEndian>(self.riff_type.value())
            .with_context(|| ctx_encode(ID_RIFF))?;
        sum += 4;

        sum += self.chunks.write_to(w)?;

        Ok(sum)
    }

    /// Resets the container so it can be reused, returning all chunks
    /// to the registry pool.
    pub fn reset(&mut self) {
        self.release_children();
    }

    fn release_children(&mut self) {
        let mut reg = self.reg.borrow_mut();
        for ch in self.chunks.drain() {
            reg.put(ch);
        }
    }

    fn decode_chunk(&mut self, id: Tag, src: &mut dyn SkipRead) -> R<u64> {
        if let Some(seen) = self.chunks.first(id)
            && !seen.multi()
        {
            return Err(RiffError::DuplicateChunk(id).into());
        }

        let mut dec = self.reg.borrow_mut().get(id);
        dec.reset();
        let n = dec.read_from(src)?;
        self.chunks.push(dec);
        Ok(n)
    }
}

impl Chunk for Riff {
    fn id(&self) -> Tag {
        ID_RIFF
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn chunk_type(&self) -> Tag {
        self.riff_type
    }

    fn multi(&self) -> bool {
        false
    }

    fn chunks(&self) -> Option<&Chunks> {
        Some(&self.chunks)
    }

    fn read_from(&mut self, src: &mut dyn SkipRead) -> R<u64> {
        Riff::read_from(self, src)
    }

    fn write_to(&mut self, w: &mut dyn Write) -> R<u64> {
        Riff::write_to(self, w)
    }

    fn reset(&mut self) {
        Riff::reset(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
