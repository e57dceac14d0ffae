use std::any::Any;
use std::time::Duration;

use crate::error::{RiffError, ctx_decode, ctx_encode};
use crate::prelude::*;
use crate::registry::Maker;
use crate::wire::{grow, read_padding_if, real_size, write_padding_if, write_tag_and_size};

pub const ID_DATA: Tag = Tag::new(*b"data");

/// Waveform payload chunk.
///
/// In skip mode the payload is not retained, which keeps the memory
/// footprint down when only metadata is of interest; such a chunk cannot
/// be written back.
pub struct ChunkData {
    size: u32,
    data: Option<Vec<u8>>,
}

impl ChunkData {
    pub fn new(load: bool) -> ChunkData {
        ChunkData {
            size: 0,
            data: load.then(|| Vec::with_capacity(1 << 15)),
        }
    }

    /// Returns a [`Maker`] creating [`ChunkData`] instances.
    pub fn maker(load: bool) -> Maker {
        Box::new(move || Box::new(ChunkData::new(load)))
    }

    /// Payload bytes. Empty in skip mode.
    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Sets payload bytes. Fails in skip mode.
    pub fn set_data(&mut self, data: &[u8]) -> R<()> {
        let Some(buf) = self.data.as_mut() else {
            return Err(RiffError::SkipDataMode.into());
        };
        grow(buf, data.len());
        buf.copy_from_slice(data);
        self.size = data.len() as u32;
        Ok(())
    }

    /// Playback duration given average byte rate abr.
    pub fn duration(&self, abr: u32) -> Duration {
        if abr == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.size as f64 / abr as f64)
    }
}

impl Chunk for ChunkData {
    fn id(&self) -> Tag {
        ID_DATA
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn multi(&self) -> bool {
        false
    }

    fn read_from(&mut self, src: &mut dyn SkipRead) -> R<u64> {
        let mut sum = 0u64;

        self.size = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_DATA))?;
        sum += 4;

        let Some(data) = self.data.as_mut() else {
            let rs = real_size(self.size); // Skip padding byte along with the payload.
            src.skip(rs as u64).with_context(|| ctx_decode(ID_DATA))?;
            return Ok(sum + rs as u64);
        };

        grow(data, self.size as usize);
        src.read_exact(data).with_context(|| ctx_decode(ID_DATA))?;
        sum += self.size as u64;

        sum += read_padding_if(src, self.size).with_context(|| ctx_decode(ID_DATA))?;

        Ok(sum)
    }

    fn write_to(&mut self, w: &mut dyn Write) -> R<u64> {
        let Some(data) = self.data.as_ref() else {
            return Err(RiffError::SkipDataMode.into());
        };

        let mut sum = 0u64;

        sum += write_tag_and_size(w, ID_DATA, self.size).with_context(|| ctx_encode(ID_DATA))?;

        w.write_all(data).with_context(|| ctx_encode(ID_DATA))?;
        sum += data.len() as u64;

        sum += write_padding_if(w, self.size).with_context(|| ctx_encode(ID_DATA))?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body(payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            bytes.push(0);
        }
        bytes
    }

    #[test]
    fn decode_odd_payload_consumes_padding() {
        // 15 payload bytes: 4 size + 15 + 1 pad = 20 bytes after the tag.
        let payload: Vec<u8> = (1..=15).collect();
        let mut ch = ChunkData::new(true);
        let n = ch.read_from(&mut Cursor::new(body(&payload))).unwrap();
        assert_eq!(n, 20);
        assert_eq!(ch.size(), 15);
        assert_eq!(ch.data(), &payload[..]);
    }

    #[test]
    fn decode_even_payload_has_no_padding() {
        let mut ch = ChunkData::new(true);
        let n = ch.read_from(&mut Cursor::new(body(&[1, 2, 3, 4]))).unwrap();
        assert_eq!(n, 8);
        assert_eq!(ch.size(), 4);
    }

    #[test]
    fn skip_mode_retains_only_size() {
        let mut ch = ChunkData::new(false);
        let n = ch.read_from(&mut Cursor::new(body(&[1, 2, 3]))).unwrap();
        assert_eq!(n, 8);
        assert_eq!(ch.size(), 3);
        assert_eq!(ch.data(), &[] as &[u8]);
    }

    #[test]
    fn set_data_fails_in_skip_mode() {
        let mut ch = ChunkData::new(false);
        let err = ch.set_data(&[1, 2]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RiffError>(),
            Some(&RiffError::SkipDataMode)
        );
    }

    #[test]
    fn write_in_skip_mode_fails() {
        let mut ch = ChunkData::new(false);
        ch.read_from(&mut Cursor::new(body(&[1, 2]))).unwrap();
        let err = ch.write_to(&mut Vec::new()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RiffError>(),
            Some(&RiffError::SkipDataMode)
        );
    }

    #[test]
    fn set_data_then_write_roundtrips() {
        let mut ch = ChunkData::new(true);
        ch.set_data(&[9, 8, 7]).unwrap();
        assert_eq!(ch.size(), 3);

        let mut out = Vec::new();
        let n = ch.write_to(&mut out).unwrap();
        assert_eq!(n, 12);

        let mut back = ChunkData::new(true);
        let m = back.read_from(&mut Cursor::new(&out[4..])).unwrap();
        assert_eq!(m, 8);
        assert_eq!(back.data(), &[9, 8, 7]);
    }

    #[test]
    fn truncated_input_errors_at_every_offset() {
        let bytes = body(&[1, 2, 3]);
        for cut in 1..bytes.len() {
            let mut ch = ChunkData::new(true);
            let err = ch.read_from(&mut Cursor::new(&bytes[..cut])).unwrap_err();
            assert!(crate::error::is_unexpected_eof(&err), "prefix {cut}");
        }
    }

    #[test]
    fn duration_from_byte_rate() {
        let mut ch = ChunkData::new(true);
        ch.set_data(&[0; 88200]).unwrap();
        assert_eq!(ch.duration(88200), Duration::from_secs(1));
        assert_eq!(ch.duration(0), Duration::ZERO);
    }
}
