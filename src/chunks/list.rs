use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::{RiffError, ctx_decode, ctx_encode, link};
use crate::prelude::*;
use crate::registry::{Maker, RawMaker, Registry, SharedRegistry};
use crate::wire::{read_padding_if, read_tag, write_padding_if, write_tag_and_size};

pub const ID_LIST: Tag = Tag::new(*b"LIST");

/// LIST type "adtl", the associated data list holding labl and ltxt
/// sub-chunks.
pub const ID_ADTL: Tag = Tag::new(*b"adtl");

/// LIST chunk: a four byte list type followed by a tight sequence of
/// complete sub-chunks.
///
/// The decoder for sub-chunks is chosen once per list from the list
/// type, except that tags registered in the shared registry take
/// precedence over the list-type default.
pub struct ChunkList {
    size: u32,

    /// List type, e.g. [`ID_INFO`] or [`ID_ADTL`].
    pub list_type: Tag,

    // Sub-chunks in file order.
    chunks: Chunks,

    // Registry shared with the owning container. Weak so pooled list
    // instances do not keep the registry alive in a reference cycle.
    reg: Weak<RefCell<Registry>>,

    load: bool,
}

impl ChunkList {
    pub fn new(load: bool, reg: &SharedRegistry) -> ChunkList {
        ChunkList {
            size: 0,
            list_type: Tag::ZERO,
            chunks: Chunks::new(),
            reg: Rc::downgrade(reg),
            load,
        }
    }

    /// Returns a [`Maker`] creating [`ChunkList`] instances bound to the
    /// given registry.
    pub fn maker(load: bool, reg: &SharedRegistry) -> Maker {
        let reg = Rc::downgrade(reg);
        Box::new(move || {
            Box::new(ChunkList {
                size: 0,
                list_type: Tag::ZERO,
                chunks: Chunks::new(),
                reg: reg.clone(),
                load,
            })
        })
    }

    /// Replaces the list children and recomputes the size field in
    /// place. Previous children go back to the registry pool.
    pub fn modify(&mut self, chunks: Chunks) {
        self.release_children();
        self.chunks = chunks;
        self.size = 4 + self.chunks.size();
    }

    fn registry(&self) -> R<SharedRegistry> {
        self.reg
            .upgrade()
            .ok_or_else(|| anyhow!("list chunk used after its registry was dropped"))
    }

    fn release_children(&mut self) {
        match self.reg.upgrade() {
            Some(reg) => {
                let mut reg = reg.borrow_mut();
                for ch in self.chunks.drain() {
                    reg.put(ch);
                }
            }
            None => self.chunks.clear(),
        }
    }
}

impl Chunk for ChunkList {
    fn id(&self) -> Tag {
        ID_LIST
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn chunk_type(&self) -> Tag {
        self.list_type
    }

    fn multi(&self) -> bool {
        true
    }

    fn chunks(&self) -> Option<&Chunks> {
        Some(&self.chunks)
    }

    fn read_from(&mut self, src: &mut dyn SkipRead) -> R<u64> {
        let reg = self.registry()?;

        let mut sum = 0u64;

        self.size = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_LIST))?;
        sum += 4;

        self.list_type = Tag::from_u32(
            src.read_u32::<BigEndian>()
                .with_context(|| ctx_decode(ID_LIST))?,
        );
        sum += 4;

        // Default decoder for child tags not registered externally,
        // chosen once for the whole list from the list type.
        let mkr: RawMaker = match self.list_type {
            ID_INFO => ChunkInfo::maker(),
            ID_ADTL => {
                let mut reg = reg.borrow_mut();
                reg.register(ID_LABL, ChunkLabl::maker());
                reg.register(ID_LTXT, ChunkLtxt::maker());
                ChunkRaw::maker(self.load)
            }
            _ => ChunkRaw::maker(self.load),
        };

        loop {
            if sum - 4 >= self.size as u64 {
                return Err(RiffError::InvalidList.into());
            }

            let id = read_tag(src)?;
            sum += 4;

            let pooled = reg.borrow_mut().get_no_raw(id);
            let mut dec = pooled.unwrap_or_else(|| mkr(id));
            dec.reset();

            let n = dec
                .read_from(src)
                .with_context(|| ctx_decode(link(ID_LIST, id)))?;
            sum += n;
            self.chunks.push(dec);

            // Break the loop once all bytes declared in size are read.
            if sum - 4 == self.size as u64 {
                break;
            }
        }

        sum += read_padding_if(src, self.size)
            .with_context(|| ctx_decode(link(ID_LIST, self.list_type)))?;

        Ok(sum)
    }

    fn write_to(&mut self, w: &mut dyn Write) -> R<u64> {
        if self.load == SKIP_DATA {
            return Err(RiffError::SkipDataMode.into());
        }

        let mut sum = 0u64;
        let size = self.chunks.size() + 4; // Add four bytes for the list type.

        sum += write_tag_and_size(w, ID_LIST, size).with_context(|| ctx_encode(ID_LIST))?;

        w.write_u32::<BigEndian>(self.list_type.value())
            .with_context(|| ctx_encode(ID_LIST))?;
        sum += 4;

        sum += self
            .chunks
            .write_to(w)
            .with_context(|| ctx_encode(ID_LIST))?;

        sum += write_padding_if(w, size).with_context(|| ctx_encode(ID_LIST))?;

        Ok(sum)
    }

    fn reset(&mut self) {
        self.size = 0;
        self.list_type = Tag::ZERO;
        self.release_children();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // A complete child chunk: tag + size + payload + pad.
    fn child(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(tag);
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            bytes.push(0);
        }
        bytes
    }

    // LIST chunk body (after the LIST tag) for the given type and
    // already-encoded children.
    fn body(list_type: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
        let total: usize = children.iter().map(|c| c.len()).sum();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(4 + total as u32).to_le_bytes());
        bytes.extend_from_slice(list_type);
        for c in children {
            bytes.extend_from_slice(c);
        }
        bytes
    }

    fn list(load: bool) -> (SharedRegistry, ChunkList) {
        let reg = Registry::shared(ChunkRaw::maker(load));
        let ch = ChunkList::new(load, &reg);
        (reg, ch)
    }

    #[test]
    fn decode_info_list_with_one_child() {
        let (_reg, mut ch) = list(true);
        let src = body(b"INFO", &[child(b"IART", b"artist\0")]);
        let n = ch.read_from(&mut Cursor::new(&src)).unwrap();

        assert_eq!(n, src.len() as u64);
        assert_eq!(ch.chunk_type().value(), 0x494e464f);
        let subs = ch.chunks().unwrap();
        assert_eq!(subs.len(), 1);
        let info = subs.first(LAB_IART).unwrap();
        assert_eq!(info.id(), LAB_IART);
        let info = info.as_any().downcast_ref::<ChunkInfo>().unwrap();
        assert_eq!(info.text(), b"artist");
    }

    #[test]
    fn decode_adtl_list_registers_label_decoders() {
        let (reg, mut ch) = list(true);

        let mut labl = Vec::new();
        labl.extend_from_slice(b"labl");
        labl.extend_from_slice(&9u32.to_le_bytes());
        labl.extend_from_slice(&5u32.to_le_bytes()); // cue point ID
        labl.extend_from_slice(b"mark\0");
        labl.push(0); // pad

        let src = body(b"adtl", &[labl]);
        ch.read_from(&mut Cursor::new(&src)).unwrap();

        assert!(reg.borrow().has(ID_LABL));
        assert!(reg.borrow().has(ID_LTXT));

        let subs = ch.chunks().unwrap();
        let labl = subs
            .first(ID_LABL)
            .unwrap()
            .as_any()
            .downcast_ref::<ChunkLabl>()
            .unwrap();
        assert_eq!(labl.cue_point_id, 5);
        assert_eq!(labl.label(), b"mark");
    }

    #[test]
    fn unknown_list_type_uses_raw_children() {
        let (_reg, mut ch) = list(true);
        let src = body(b"wxyz", &[child(b"AAAA", &[1, 2])]);
        ch.read_from(&mut Cursor::new(&src)).unwrap();

        let subs = ch.chunks().unwrap();
        assert!(subs.first(Tag::new(*b"AAAA")).unwrap().raw());
    }

    #[test]
    fn registered_child_tag_takes_precedence() {
        let (reg, mut ch) = list(true);
        // IART inside an unknown list type would default to raw; a
        // registered decoder must win.
        reg.borrow_mut()
            .register(LAB_IART, Box::new(|| Box::new(ChunkInfo::new(LAB_IART))));

        let src = body(b"wxyz", &[child(b"IART", b"name\0\0")]);
        ch.read_from(&mut Cursor::new(&src)).unwrap();

        let subs = ch.chunks().unwrap();
        let info = subs.first(LAB_IART).unwrap();
        assert!(!info.raw());
        let info = info.as_any().downcast_ref::<ChunkInfo>().unwrap();
        assert_eq!(info.text(), b"name");
    }

    #[test]
    fn empty_list_is_invalid() {
        let (_reg, mut ch) = list(true);
        let src = body(b"INFO", &[]);
        let err = ch.read_from(&mut Cursor::new(&src)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RiffError>(),
            Some(&RiffError::InvalidList)
        );
    }

    #[test]
    fn child_overrunning_declared_size_is_invalid() {
        let (_reg, mut ch) = list(true);
        // Declared size only covers the list type plus 8 bytes, but the
        // child is 14 bytes long.
        let mut src = body(b"INFO", &[child(b"IART", b"artist")]);
        src[0..4].copy_from_slice(&12u32.to_le_bytes());

        let err = ch.read_from(&mut Cursor::new(&src)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RiffError>(),
            Some(&RiffError::InvalidList)
        );
    }

    #[test]
    fn roundtrip_keeps_raw_bytes() {
        let (_reg, mut ch) = list(true);
        let src = body(
            b"INFO",
            &[child(b"IART", b"artist\0"), child(b"INAM", b"title\0")],
        );
        ch.read_from(&mut Cursor::new(&src)).unwrap();

        let mut out = Vec::new();
        let n = ch.write_to(&mut out).unwrap();
        assert_eq!(n, 4 + src.len() as u64);
        assert_eq!(&out[..4], b"LIST");
        assert_eq!(&out[4..], &src[..]);
    }

    #[test]
    fn write_in_skip_mode_fails() {
        let (_reg, mut ch) = list(false);
        let err = ch.write_to(&mut Vec::new()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RiffError>(),
            Some(&RiffError::SkipDataMode)
        );
    }

    #[test]
    fn modify_replaces_children_and_size() {
        let (_reg, mut ch) = list(true);
        let src = body(b"INFO", &[child(b"IART", b"artist\0")]);
        ch.read_from(&mut Cursor::new(&src)).unwrap();

        let mut replacement = Chunks::new();
        let mut info = ChunkInfo::new(LAB_INAM);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&6u32.to_le_bytes());
        bytes.extend_from_slice(b"title\0");
        info.read_from(&mut Cursor::new(bytes)).unwrap();
        replacement.push(Box::new(info));

        ch.modify(replacement);
        assert_eq!(ch.chunks().unwrap().len(), 1);
        assert_eq!(ch.size(), 4 + 8 + 6);
    }

    #[test]
    fn reset_returns_children_to_pool() {
        let (reg, mut ch) = list(true);
        let src = body(b"INFO", &[child(b"IART", b"artist\0")]);
        ch.read_from(&mut Cursor::new(&src)).unwrap();
        ch.reset();

        assert_eq!(ch.size(), 0);
        assert_eq!(ch.chunk_type(), Tag::ZERO);
        assert_eq!(ch.chunks().unwrap().len(), 0);
        // The child landed in the pool and comes back out.
        assert!(reg.borrow_mut().get_no_raw(LAB_IART).is_some());
    }
}
