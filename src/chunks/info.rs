use std::any::Any;

use crate::error::{ctx_decode, ctx_encode, link};
use crate::prelude::*;
use crate::registry::RawMaker;
use crate::wire::{grow, read_padding_if, trim_zero_right, write_padding_if, write_tag_and_size};

/// LIST sub-chunk type "INFO".
pub const ID_INFO: Tag = Tag::new(*b"INFO");

// The INFO text labels.
// Source: http://bwfmetaedit.sourceforge.net/listinfo.html
pub const LAB_IARL: Tag = Tag::new(*b"IARL"); // Archival location.
pub const LAB_IART: Tag = Tag::new(*b"IART"); // Artist.
pub const LAB_ICMS: Tag = Tag::new(*b"ICMS"); // Commissioned by.
pub const LAB_ICMT: Tag = Tag::new(*b"ICMT"); // General comments.
pub const LAB_ICOP: Tag = Tag::new(*b"ICOP"); // Copyright information.
pub const LAB_ICRD: Tag = Tag::new(*b"ICRD"); // Creation date (year-month-day).
pub const LAB_IENG: Tag = Tag::new(*b"IENG"); // Engineer.
pub const LAB_IGNR: Tag = Tag::new(*b"IGNR"); // Genre.
pub const LAB_IKEY: Tag = Tag::new(*b"IKEY"); // Keywords.
pub const LAB_IMED: Tag = Tag::new(*b"IMED"); // Original medium.
pub const LAB_INAM: Tag = Tag::new(*b"INAM"); // Title.
pub const LAB_IPRD: Tag = Tag::new(*b"IPRD"); // Album.
pub const LAB_ITRK: Tag = Tag::new(*b"ITRK"); // Track.
pub const LAB_ISBJ: Tag = Tag::new(*b"ISBJ"); // Subject.
pub const LAB_ISFT: Tag = Tag::new(*b"ISFT"); // Software package.
pub const LAB_ISRC: Tag = Tag::new(*b"ISRC"); // Source.
pub const LAB_ISRF: Tag = Tag::new(*b"ISRF"); // Source form.
pub const LAB_ITCH: Tag = Tag::new(*b"ITCH"); // Technician.

/// INFO sub-chunk of the LIST chunk: a tag-keyed null terminated text
/// string used to "tag" files with information falling into a number of
/// predefined categories.
pub struct ChunkInfo {
    id: Tag,
    size: u32,
    text: Vec<u8>,
}

impl ChunkInfo {
    pub fn new(id: Tag) -> ChunkInfo {
        ChunkInfo {
            id,
            size: 0,
            text: Vec::new(),
        }
    }

    /// Returns a [`RawMaker`] creating [`ChunkInfo`] instances.
    pub fn maker() -> RawMaker {
        Box::new(|id| Box::new(ChunkInfo::new(id)))
    }

    /// Label text with trailing zero bytes removed.
    pub fn text(&self) -> &[u8] {
        trim_zero_right(&self.text)
    }
}

impl Chunk for ChunkInfo {
    fn id(&self) -> Tag {
        self.id
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
            .with_context(|| ctx_decode(link(ID_INFO, self.id)))?;
        sum += 4;

        grow(&mut self.text, self.size as usize);
        src.read_exact(&mut self.text)
            .with_context(|| ctx_decode(link(ID_INFO, self.id)))?;
        sum += self.size as u64;

        // An odd text length means the padding byte was added to the end.
        sum += read_padding_if(src, self.size)
            .with_context(|| ctx_decode(link(ID_INFO, self.id)))?;

        Ok(sum)
    }

    fn write_to(&mut self, w: &mut dyn Write) -> R<u64> {
        let mut sum = 0u64;

        sum += write_tag_and_size(w, self.id, self.size)
            .with_context(|| ctx_encode(link(ID_INFO, self.id)))?;

        w.write_all(&self.text)
            .with_context(|| ctx_encode(link(ID_INFO, self.id)))?;
        sum += self.text.len() as u64;

        sum += write_padding_if(w, self.size)
            .with_context(|| ctx_encode(link(ID_INFO, self.id)))?;

        Ok(sum)
    }

    fn reset(&mut self) {
        self.size = 0;
        self.text.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Human-readable name of an INFO sub-chunk label, falling back to the
/// ASCII rendering of the tag.
pub fn info_label(lab: Tag) -> String {
    match lab {
        LAB_IARL => "archival location".to_string(),
        LAB_IART => "artist".to_string(),
        LAB_ICMS => "commissioned".to_string(),
        LAB_ICMT => "comments".to_string(),
        LAB_ICOP => "copyright".to_string(),
        LAB_ICRD => "creation date".to_string(),
        LAB_IENG => "engineer".to_string(),
        LAB_IGNR => "genre".to_string(),
        LAB_IKEY => "keywords".to_string(),
        LAB_IMED => "original medium".to_string(),
        LAB_INAM => "title".to_string(),
        LAB_IPRD => "album".to_string(),
        LAB_ITRK => "track".to_string(),
        LAB_ISBJ => "subject".to_string(),
        LAB_ISFT => "software".to_string(),
        LAB_ISRC => "source".to_string(),
        LAB_ISRF => "source form".to_string(),
        LAB_ITCH => "technician".to_string(),
        other => other.to_string(),
    }
}
