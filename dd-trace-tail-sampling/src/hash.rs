// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Seeded 32 bit murmur3 (x86 variant), see <https://en.wikipedia.org/wiki/MurmurHash>.
//!
//! The output must stay bit for bit identical to other samplers hashing the same trace
//! ids with the same seed, otherwise a fleet would keep inconsistent subsets of traces.

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;
const C3: u32 = 0x85eb_ca6b;
const C4: u32 = 0xc2b2_ae35;
const R1: u32 = 15;
const R2: u32 = 13;
const M: u32 = 5;
const N: u32 = 0xe654_6b64;

#[inline]
fn scramble(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(R1).wrapping_mul(C2)
}

pub fn murmur3_32(key: &[u8], seed: u32) -> u32 {
    let mut hash = seed;

    let mut chunks = key.chunks_exact(4);
    for chunk in &mut chunks {
        let k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        hash ^= scramble(k);
        hash = hash.rotate_left(R2).wrapping_mul(M).wrapping_add(N);
    }

    // Trace and span ids are always a multiple of 4 bytes long, the tail only matters
    // for other keys.
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let remaining = tail
            .iter()
            .rev()
            .fold(0u32, |acc, &byte| (acc << 8) | u32::from(byte));
        hash ^= scramble(remaining);
    }

    hash ^= key.len() as u32;
    hash ^= hash >> 16;
    hash = hash.wrapping_mul(C3);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(C4);
    hash ^= hash >> 16;
    hash
}
