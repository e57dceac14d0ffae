use std::any::Any;
use std::time::Duration;

use crate::error::{RiffError, ctx_decode, ctx_encode};
use crate::prelude::*;
use crate::registry::Maker;
use crate::wire::{grow, read_padding_if, real_size, write_padding_if, write_tag_and_size};

pub const ID_FMT: Tag = Tag::new(*b"fmt ");

/// Size of the fmt chunk static part in bytes, without the tag and the
/// extra format bytes.
pub const FMT_CHUNK_SIZE: u32 = 16;

// Compression codes.
pub const COMP_NONE: u16 = 0x0000; // Uncompressed PCM file.
pub const COMP_PCM: u16 = 0x0001; // Microsoft Pulse Code Modulation (PCM).

/// Format descriptor chunk: how the waveform data is stored.
///
/// The 16-byte static record may be followed by extra format bytes whose
/// own length is a two byte prefix within the payload. A missing extra
/// section, a present-but-empty one and a non-empty one are three
/// distinct states on the wire; [`ChunkFmt::write_zero_extra`] keeps the
/// middle one round-tripping losslessly.
pub struct ChunkFmt {
    size: u32,

    /// Compression code. See the `COMP_*` constants.
    pub comp_code: u16,

    /// How many separate audio signals are encoded in the data chunk.
    /// Values: mono = 1, stereo = 2, etc.
    pub channel_cnt: u16,

    /// Samples taken per second at each channel, unaffected by the
    /// number of channels.
    pub sample_rate: u32,

    /// Bytes of waveform data streamed per second during playback.
    /// avg_byte_rate = sample_rate * block_align.
    pub avg_byte_rate: u32,

    /// Bytes per sample frame.
    /// block_align = round(bits_per_sample / 8) * channel_cnt.
    pub block_align: u16,

    /// Bits used to define each sample, usually 8, 16, 24 or 32.
    pub bits_per_sample: u16,

    // Extra format bytes. Absent for uncompressed PCM but may exist and
    // hold anything a compression type needs to decode the waveform.
    extra: Vec<u8>,

    /// Some producers write the zero extra-bytes length even though no
    /// extra bytes follow. Set during decode so the zero is written back.
    pub write_zero_extra: bool,
}

impl ChunkFmt {
    pub fn new() -> ChunkFmt {
        ChunkFmt {
            size: FMT_CHUNK_SIZE,
            comp_code: 0,
            channel_cnt: 0,
            sample_rate: 0,
            avg_byte_rate: 0,
            block_align: 0,
            bits_per_sample: 0,
            extra: Vec::new(),
            write_zero_extra: false,
        }
    }

    /// Returns a [`Maker`] creating [`ChunkFmt`] instances.
    pub fn maker() -> Maker {
        Box::new(|| Box::new(ChunkFmt::new()))
    }

    /// Extra format bytes.
    pub fn extra(&self) -> &[u8] {
        &self.extra
    }

    /// Sets extra format bytes and recomputes the chunk size.
    pub fn set_extra(&mut self, extra: &[u8]) {
        grow(&mut self.extra, extra.len());
        self.extra.copy_from_slice(extra);

        let el = extra.len() as u32;
        self.size = FMT_CHUNK_SIZE;
        if el > 0 {
            self.size += 2 + real_size(el);
        }
        if el == 0 && self.write_zero_extra {
            self.size += 2;
        }
    }

    /// Playback duration of a data payload of ds bytes.
    pub fn duration(&self, ds: u32) -> Duration {
        if self.avg_byte_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(ds as f64 / self.avg_byte_rate as f64)
    }
}

impl Default for ChunkFmt {
    fn default() -> ChunkFmt {
        ChunkFmt::new()
    }
}

impl Chunk for ChunkFmt {
    fn id(&self) -> Tag {
        ID_FMT
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
            .with_context(|| ctx_decode(ID_FMT))?;
        sum += 4;

        if self.size < FMT_CHUNK_SIZE {
            return Err(RiffError::TooShort).with_context(|| ctx_decode(ID_FMT));
        }

        self.comp_code = src
            .read_u16::<LittleEndian>()
            .with_context(|| ctx_decode(ID_FMT))?;
        self.channel_cnt = src
            .read_u16::<LittleEndian>()
            .with_context(|| ctx_decode(ID_FMT))?;
        self.sample_rate = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_FMT))?;
        self.avg_byte_rate = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_FMT))?;
        self.block_align = src
            .read_u16::<LittleEndian>()
            .with_context(|| ctx_decode(ID_FMT))?;
        self.bits_per_sample = src
            .read_u16::<LittleEndian>()
            .with_context(|| ctx_decode(ID_FMT))?;
        sum += 16;

        if self.size > FMT_CHUNK_SIZE {
            // The first two bytes are the length of the extra format
            // bytes; the length field itself is not part of the extra
            // bytes.
            let es = src
                .read_u16::<LittleEndian>()
                .with_context(|| ctx_decode(ID_FMT))?;
            sum += 2;

            // Room declared by the chunk size beyond the length field.
            // Zero means the producer wrote a bare zero length.
            let room = self.size as i64 - FMT_CHUNK_SIZE as i64 - 2;
            if room == 0 {
                self.write_zero_extra = true;
            }

            grow(&mut self.extra, es as usize);
            src.read_exact(&mut self.extra)
                .with_context(|| ctx_decode(ID_FMT))?;
            sum += es as u64;

            // An odd extra length means a padding byte was added to the
            // end of the extra bytes.
            sum += read_padding_if(src, es as u32).with_context(|| ctx_decode(ID_FMT))?;
        }

        sum += read_padding_if(src, self.size).with_context(|| ctx_decode(ID_FMT))?;

        Ok(sum)
    }

    fn write_to(&mut self, w: &mut dyn Write) -> R<u64> {
        let mut sum = 0u64;

        let eln = self.extra.len() as u32;
        let mut size = FMT_CHUNK_SIZE;
        if eln > 0 || self.write_zero_extra {
            // Adding 2 for the extra format bytes length field.
            size += real_size(eln) + 2;
        }

        sum += write_tag_and_size(w, ID_FMT, size).with_context(|| ctx_encode(ID_FMT))?;

        w.write_u16::<LittleEndian>(self.comp_code)
            .with_context(|| ctx_encode(ID_FMT))?;
        w.write_u16::<LittleEndian>(self.channel_cnt)
            .with_context(|| ctx_encode(ID_FMT))?;
        w.write_u32::<LittleEndian>(self.sample_rate)
            .with_context(|| ctx_encode(ID_FMT))?;
        w.write_u32::<LittleEndian>(self.avg_byte_rate)
            .with_context(|| ctx_encode(ID_FMT))?;
        w.write_u16::<LittleEndian>(self.block_align)
            .with_context(|| ctx_encode(ID_FMT))?;
        w.write_u16::<LittleEndian>(self.bits_per_sample)
            .with_context(|| ctx_encode(ID_FMT))?;
        sum += 16;

        if eln > 0 || self.write_zero_extra {
            w.write_u16::<LittleEndian>(eln as u16)
                .with_context(|| ctx_encode(ID_FMT))?;
            sum += 2;

            w.write_all(&self.extra)
                .with_context(|| ctx_encode(ID_FMT))?;
            sum += eln as u64;

            sum += write_padding_if(w, eln).with_context(|| ctx_encode(ID_FMT))?;
        }

        sum += write_padding_if(w, size).with_context(|| ctx_encode(ID_FMT))?;

        Ok(sum)
    }

    fn reset(&mut self) {
        self.size = FMT_CHUNK_SIZE;
        self.comp_code = 0;
        self.channel_cnt = 0;
        self.sample_rate = 0;
        self.avg_byte_rate = 0;
        self.block_align = 0;
        self.bits_per_sample = 0;
        self.extra.clear();
        self.write_zero_extra = false;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
