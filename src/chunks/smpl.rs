use std::any::Any;

use crate::error::{RiffError, ctx_decode, ctx_encode};
use crate::prelude::*;
use crate::registry::Maker;
use crate::wire::{grow, read_padding_if, write_padding_if, write_tag_and_size};

pub const ID_SMPL: Tag = Tag::new(*b"smpl");

/// Size of the smpl chunk static part in bytes. Does not count the tag,
/// the sample loops or the sampler data bytes.
pub const SMPL_CHUNK_SIZE: u32 = 36;

/// Size of a single sample loop record in bytes.
pub const SAMPLE_LOOP_SIZE: u32 = 24;

/// Sample loop record used in [`ChunkSmpl`].
///
/// Source:
/// https://sites.google.com/site/musicgapi/technical-documents/wav-file-format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleLoop {
    /// ID of a cue point in the cue point list, which also ties any text
    /// labels in the associated data list to this loop.
    pub cue_point_id: u32,

    /// How the waveform samples are looped:
    ///
    /// - 0 - loop forward (normal)
    /// - 1 - alternating loop (forward/backward, also known as Ping Pong)
    /// - 2 - loop backward (reverse)
    /// - 3-31 - reserved for future standard types
    /// - 32-0xFFFFFFFF - sampler specific types (defined by manufacturer)
    pub loop_type: u32,

    /// Byte offset into the waveform data of the first sample to be
    /// played in the loop.
    pub start: u32,

    /// Byte offset into the waveform data of the last sample to be
    /// played in the loop.
    pub end: u32,

    /// Fraction of a sample at which to loop, letting a loop be fine
    /// tuned at a resolution greater than one sample. 0 means no
    /// fraction, 0x80000000 means 1/2 of a sample length.
    pub fraction: u32,

    /// Number of times to play the loop; 0 is an infinite sustain loop
    /// interrupted by some external force.
    pub play_cnt: u32,
}

/// Sampler chunk: MIDI sampler calibration data plus a list of sample
/// loops and an opaque sampler specific tail.
///
/// The tail length is derived from the chunk size; the declared sampler
/// data count field is not trusted for this derivation.
pub struct ChunkSmpl {
    size: u32,

    /// MIDI Manufacturers Association code of the sampler intended to
    /// receive this file's waveform, 0 if not specified. The high byte
    /// indicates the number of low-order bytes (1 or 3) valid for the
    /// code, e.g. 0x01000013 for Digidesign and 0x30000041 for Microsoft.
    pub manufacturer: u32,

    /// MIDI model ID defined by the manufacturer, 0 if not specified.
    pub product: u32,

    /// Duration of one sample during playback in nanoseconds, normally
    /// 1 / samples-per-second from the format chunk.
    pub sample_period: u32,

    /// Musical note at which the sample is played at its original
    /// sample rate.
    pub midi_unity_note: u32,

    /// Fraction of a semitone up from the unity note; 0x80000000 means
    /// 1/2 semitone (50 cents).
    pub midi_pitch_fraction: u32,

    /// SMPTE time format used by the offset field: 0 (none), 24, 25,
    /// 29 (30 drop) or 30 frames per second.
    pub smpte_format: u32,

    /// SMPTE offset for synchronization to the first sample, in
    /// 0xhhmmssff format.
    pub smpte_offset: u32,

    /// Number of sample loop definitions that follow, may be 0.
    pub sample_loop_cnt: u32,

    /// Number of sampler specific data bytes declared by the producer.
    pub sampler_data_cnt: u32,

    /// Loop descriptions in file order. The order carries no meaning;
    /// each loop's cue point position determines the play order.
    pub sample_loops: Vec<SampleLoop>,

    // Optional sampler specific data.
    sampler_data: Vec<u8>,
}

impl ChunkSmpl {
    pub fn new() -> ChunkSmpl {
        ChunkSmpl {
            size: 0,
            manufacturer: 0,
            product: 0,
            sample_period: 0,
            midi_unity_note: 0,
            midi_pitch_fraction: 0,
            smpte_format: 0,
            smpte_offset: 0,
            sample_loop_cnt: 0,
            sampler_data_cnt: 0,
            sample_loops: Vec::new(),
            sampler_data: Vec::new(),
        }
    }

    /// Returns a [`Maker`] creating [`ChunkSmpl`] instances.
    pub fn maker() -> Maker {
        Box::new(|| Box::new(ChunkSmpl::new()))
    }

    /// Sampler specific data bytes.
    pub fn sampler_data(&self) -> &[u8] {
        &self.sampler_data
    }

    /// Appends a loop description and recomputes the chunk size.
    pub fn add_loop(&mut self, sl: SampleLoop) {
        self.sample_loops.push(sl);
        self.recalc();
    }

    /// Sets sampler specific data and recomputes the chunk size.
    pub fn set_sampler_data(&mut self, data: &[u8]) {
        grow(&mut self.sampler_data, data.len());
        self.sampler_data.copy_from_slice(data);
        self.recalc();
    }

    fn recalc(&mut self) {
        self.sample_loop_cnt = self.sample_loops.len() as u32;
        self.sampler_data_cnt =
            self.sample_loop_cnt * SAMPLE_LOOP_SIZE + self.sampler_data.len() as u32;
        self.size = SMPL_CHUNK_SIZE
            + self.sample_loop_cnt * SAMPLE_LOOP_SIZE
            + self.sampler_data.len() as u32;
    }
}

impl Default for ChunkSmpl {
    fn default() -> ChunkSmpl {
        ChunkSmpl::new()
    }
}

impl Chunk for ChunkSmpl {
    fn id(&self) -> Tag {
        ID_SMPL
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
            .with_context(|| ctx_decode(ID_SMPL))?;
        sum += 4;

        if self.size < SMPL_CHUNK_SIZE {
            return Err(RiffError::TooShort).with_context(|| ctx_decode(ID_SMPL));
        }

        self.manufacturer = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_SMPL))?;
        self.product = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_SMPL))?;
        self.sample_period = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_SMPL))?;
        self.midi_unity_note = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_SMPL))?;
        self.midi_pitch_fraction = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_SMPL))?;
        self.smpte_format = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_SMPL))?;
        self.smpte_offset = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_SMPL))?;
        self.sample_loop_cnt = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_SMPL))?;
        self.sampler_data_cnt = src
            .read_u32::<LittleEndian>()
            .with_context(|| ctx_decode(ID_SMPL))?;
        sum += SMPL_CHUNK_SIZE as u64;

        // We trust size more than the declared sampler data count.
        let extra = self.size as i64
            - SMPL_CHUNK_SIZE as i64
            - self.sample_loop_cnt as i64 * SAMPLE_LOOP_SIZE as i64;
        if extra < 0 {
            return Err(RiffError::SizeMismatch).with_context(|| ctx_decode(ID_SMPL));
        }

        for _ in 0..self.sample_loop_cnt {
            let sl = SampleLoop {
                cue_point_id: src
                    .read_u32::<LittleEndian>()
                    .with_context(|| ctx_decode(ID_SMPL))?,
                loop_type: src
                    .read_u32::<LittleEndian>()
                    .with_context(|| ctx_decode(ID_SMPL))?,
                start: src
                    .read_u32::<LittleEndian>()
                    .with_context(|| ctx_decode(ID_SMPL))?,
                end: src
                    .read_u32::<LittleEndian>()
                    .with_context(|| ctx_decode(ID_SMPL))?,
                fraction: src
                    .read_u32::<LittleEndian>()
                    .with_context(|| ctx_decode(ID_SMPL))?,
                play_cnt: src
                    .read_u32::<LittleEndian>()
                    .with_context(|| ctx_decode(ID_SMPL))?,
            };
            self.sample_loops.push(sl);
            sum += SAMPLE_LOOP_SIZE as u64;
        }

        grow(&mut self.sampler_data, extra as usize);
        src.read_exact(&mut self.sampler_data)
            .with_context(|| ctx_decode(ID_SMPL))?;
        sum += extra as u64;

        sum += read_padding_if(src, self.size).with_context(|| ctx_decode(ID_SMPL))?;

        Ok(sum)
    }

    fn write_to(&mut self, w: &mut dyn Write) -> R<u64> {
        let mut sum = 0u64;

        let size = SMPL_CHUNK_SIZE
            + self.sample_loops.len() as u32 * SAMPLE_LOOP_SIZE
            + self.sampler_data.len() as u32;

        self.sample_loop_cnt = self.sample_loops.len() as u32;
        self.sampler_data_cnt =
            self.sample_loop_cnt * SAMPLE_LOOP_SIZE + self.sampler_data.len() as u32;

        sum += write_tag_and_size(w, ID_SMPL, size).with_context(|| ctx_encode(ID_SMPL))?;

        w.write_u32::<LittleEndian>(self.manufacturer)
            .with_context(|| ctx_encode(ID_SMPL))?;
        w.write_u32::<LittleEndian>(self.product)
            .with_context(|| ctx_encode(ID_SMPL))?;
        w.write_u32::<LittleEndian>(self.sample_period)
            .with_context(|| ctx_encode(ID_SMPL))?;
        w.write_u32::<LittleEndian>(self.midi_unity_note)
            .with_context(|| ctx_encode(ID_SMPL))?;
        w.write_u32::<LittleEndian>(self.midi_pitch_fraction)
            .with_context(|| ctx_encode(ID_SMPL))?;
        w.write_u32::<LittleEndian>(self.smpte_format)
            .with_context(|| ctx_encode(ID_SMPL))?;
        w.write_u32::<LittleEndian>(self.smpte_offset)
            .with_context(|| ctx_encode(ID_SMPL))?;
        w.write_u32::<LittleEndian>(self.sample_loop_cnt)
            .with_context(|| ctx_encode(ID_SMPL))?;
        w.write_u32::<LittleEndian>(self.sampler_data_cnt)
            .with_context(|| ctx_encode(ID_SMPL))?;
        sum += SMPL_CHUNK_SIZE as u64;

        for sl in &self.sample_loops {
            w.write_u32::<LittleEndian>(sl.cue_point_id)
                .with_context(|| ctx_encode(ID_SMPL))?;
            w.write_u32::<LittleEndian>(sl.loop_type)
                .with_context(|| ctx_encode(ID_SMPL))?;
            w.write_u32::<LittleEndian>(sl.start)
                .with_context(|| ctx_encode(ID_SMPL))?;
            w.write_u32::<LittleEndian>(sl.end)
                .with_context(|| ctx_encode(ID_SMPL))?;
            w.write_u32::<LittleEndian>(sl.fraction)
                .with_context(|| ctx_encode(ID_SMPL))?;
            w.write_u32::<LittleEndian>(sl.play_cnt)
                .with_context(|| ctx_encode(ID_SMPL))?;
            sum += SAMPLE_LOOP_SIZE as u64;
        }

        if !self.sampler_data.is_empty() {
            w.write_all(&self.sampler_data)
                .with_context(|| ctx_encode(ID_SMPL))?;
            sum += self.sampler_data.len() as u64;
        }

        sum += write_padding_if(w, size).with_context(|| ctx_encode(ID_SMPL))?;

        Ok(sum)
    }

    fn reset(&mut self) {
        self.size = 0;
        self.manufacturer = 0;
        self.product = 0;
        self.sample_period = 0;
        self.midi_unity_note = 0;
        self.midi_pitch_fraction = 0;
        self.smpte_format = 0;
        self.smpte_offset = 0;
        self.sample_loop_cnt = 0;
        self.sampler_data_cnt = 0;
        self.sample_loops.clear();
        self.sampler_data.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
