//! Byte-exact round-trip coverage: whatever decodes must encode back to
//! the identical bytes, padding included.

mod common;

use std::io::Cursor;

use pretty_assertions::assert_eq;
use riffcodex_lib::*;

use common::{chunk, container, fmt_chunk, list_chunk, smpl_chunk};

fn roundtrip(bytes: &[u8]) -> Vec<u8> {
    let mut rif = Riff::new(LOAD_DATA);
    let n = rif.read_from(&mut Cursor::new(bytes)).unwrap();
    assert_eq!(n, bytes.len() as u64);

    let mut out = Vec::new();
    let written = rif.write_to(&mut out).unwrap();
    assert_eq!(written, out.len() as u64);
    assert_eq!(written, 12 + rif.chunks().size() as u64);
    out
}

#[test]
fn minimal_wave_roundtrips() {
    let bytes = container(b"WAVE", &[fmt_chunk(), chunk(b"data", &[1, 2, 3, 4])]);
    assert_eq!(roundtrip(&bytes), bytes);
}

#[test]
fn odd_sized_payloads_keep_their_padding() {
    let bytes = container(
        b"WAVE",
        &[fmt_chunk(), chunk(b"data", &[1, 2, 3]), chunk(b"JUNK", &[9])],
    );
    assert_eq!(roundtrip(&bytes), bytes);
}

#[test]
fn fmt_with_extra_bytes_roundtrips() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&2u16.to_le_bytes()); // non-PCM
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&8000u32.to_le_bytes());
    payload.extend_from_slice(&8000u32.to_le_bytes());
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&8u16.to_le_bytes());
    payload.extend_from_slice(&2u16.to_le_bytes()); // extra length
    payload.extend_from_slice(&[0xCA, 0xFE]); // extra bytes

    let bytes = container(b"WAVE", &[chunk(b"fmt ", &payload), chunk(b"data", &[0; 2])]);
    assert_eq!(roundtrip(&bytes), bytes);
}

#[test]
fn fmt_with_empty_extra_marker_roundtrips() {
    // Declared size 18: a bare zero extra length with no extra bytes.
    // The marker must survive the round trip byte-identically.
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&8000u32.to_le_bytes());
    payload.extend_from_slice(&8000u32.to_le_bytes());
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&8u16.to_le_bytes());
    payload.extend_from_slice(&0u16.to_le_bytes());

    let bytes = container(b"WAVE", &[chunk(b"fmt ", &payload), chunk(b"data", &[0; 2])]);
    assert_eq!(roundtrip(&bytes), bytes);
}

#[test]
fn info_list_roundtrips() {
    let info = list_chunk(
        b"INFO",
        &[
            chunk(b"IART", b"artist\0\0"),
            chunk(b"INAM", b"title\0"),
            chunk(b"ISFT", b"riffcodex\0"),
        ],
    );
    let bytes = container(b"WAVE", &[fmt_chunk(), info, chunk(b"data", &[0; 4])]);
    assert_eq!(roundtrip(&bytes), bytes);
}

#[test]
fn adtl_list_roundtrips() {
    let mut labl = Vec::new();
    labl.extend_from_slice(&3u32.to_le_bytes()); // cue point ID
    labl.extend_from_slice(b"mark one\0");

    let mut ltxt = Vec::new();
    ltxt.extend_from_slice(&3u32.to_le_bytes()); // cue point ID
    ltxt.extend_from_slice(&44100u32.to_le_bytes()); // sample length
    ltxt.extend_from_slice(b"scrp"); // purpose
    ltxt.extend_from_slice(&0u16.to_le_bytes());
    ltxt.extend_from_slice(&0u16.to_le_bytes());
    ltxt.extend_from_slice(&0u16.to_le_bytes());
    ltxt.extend_from_slice(&0u16.to_le_bytes());
    ltxt.extend_from_slice(b"region\0\0");

    let adtl = list_chunk(b"adtl", &[chunk(b"labl", &labl), chunk(b"ltxt", &ltxt)]);
    let bytes = container(b"WAVE", &[fmt_chunk(), adtl, chunk(b"data", &[0; 2])]);
    assert_eq!(roundtrip(&bytes), bytes);
}

#[test]
fn sampler_chunk_roundtrips() {
    let bytes = container(b"WAVE", &[fmt_chunk(), smpl_chunk(&[0xAA, 0xBB, 0xCC])]);
    assert_eq!(roundtrip(&bytes), bytes);
}

#[test]
fn unknown_chunks_roundtrip_verbatim() {
    let bytes = container(
        b"AVI ",
        &[chunk(b"av01", &[1; 7]), chunk(b"av02", &[2; 8])],
    );
    assert_eq!(roundtrip(&bytes), bytes);
}

#[test]
fn avi_and_rmid_types_are_preserved() {
    for (typ, tag) in [(b"AVI ", TYPE_AVI), (b"RMID", TYPE_RMID)] {
        let bytes = container(typ, &[chunk(b"JUNK", &[0; 2])]);
        let mut rif = Riff::new(LOAD_DATA);
        rif.read_from(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(rif.riff_type(), tag);
        let mut out = Vec::new();
        rif.write_to(&mut out).unwrap();
        assert_eq!(out, bytes);
    }
}

#[test]
fn decoded_fields_survive_reencoding() {
    let info = list_chunk(b"INFO", &[chunk(b"IGNR", b"noise\0")]);
    let bytes = container(
        b"WAVE",
        &[fmt_chunk(), info, smpl_chunk(&[7; 5]), chunk(b"data", &[3; 9])],
    );

    let first = roundtrip(&bytes);
    // A second pass over the re-encoded bytes must be a fixed point.
    assert_eq!(roundtrip(&first), first);
}
