//! Byte fixture helpers shared by the integration tests.

/// A complete chunk: tag + little-endian size + payload + pad byte if
/// the payload length is odd.
pub fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(tag);
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        bytes.push(0);
    }
    bytes
}

/// A complete container: RIFF magic + size covering everything after the
/// size field + resource type + the given chunks.
pub fn container(riff_type: &[u8; 4], chunks: &[Vec<u8>]) -> Vec<u8> {
    let total: usize = chunks.iter().map(|c| c.len()).sum();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(4 + total as u32).to_le_bytes());
    bytes.extend_from_slice(riff_type);
    for c in chunks {
        bytes.extend_from_slice(c);
    }
    bytes
}

/// A plain 16-byte PCM fmt chunk.
pub fn fmt_chunk() -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u16.to_le_bytes()); // PCM
    payload.extend_from_slice(&2u16.to_le_bytes()); // channels
    payload.extend_from_slice(&44100u32.to_le_bytes()); // sample rate
    payload.extend_from_slice(&176400u32.to_le_bytes()); // byte rate
    payload.extend_from_slice(&4u16.to_le_bytes()); // block align
    payload.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    chunk(b"fmt ", &payload)
}

/// A LIST chunk of the given type wrapping already-encoded children.
pub fn list_chunk(list_type: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
    let total: usize = children.iter().map(|c| c.len()).sum();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"LIST");
    bytes.extend_from_slice(&(4 + total as u32).to_le_bytes());
    bytes.extend_from_slice(list_type);
    for c in children {
        bytes.extend_from_slice(c);
    }
    bytes
}

/// A smpl chunk with consistent counts, one loop record and the given
/// sampler data.
pub fn smpl_chunk(sampler_data: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&0u32.to_le_bytes()); // manufacturer
    payload.extend_from_slice(&0u32.to_le_bytes()); // product
    payload.extend_from_slice(&22675u32.to_le_bytes()); // sample period
    payload.extend_from_slice(&60u32.to_le_bytes()); // unity note
    payload.extend_from_slice(&0u32.to_le_bytes()); // pitch fraction
    payload.extend_from_slice(&0u32.to_le_bytes()); // SMPTE format
    payload.extend_from_slice(&0u32.to_le_bytes()); // SMPTE offset
    payload.extend_from_slice(&1u32.to_le_bytes()); // loop count
    payload.extend_from_slice(&(24 + sampler_data.len() as u32).to_le_bytes());
    for v in [1u32, 0, 0, 4096, 0, 0] {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    payload.extend_from_slice(sampler_data);
    chunk(b"smpl", &payload)
}
