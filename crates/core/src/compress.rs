// Copyright 2025 Irreducible Inc.

//! The BLAKE3 single-block compression function.
//!
//! This is the ground truth the circuit under test is checked against: any
//! disagreement between a circuit evaluation and [`compress`] is a bug in
//! the circuit. The permutation schedule and rotation constants below are
//! fixed data reproduced from the specification; they are verified by the
//! golden-vector tests before any differential result is trusted.
//!
//! https://github.com/BLAKE3-team/BLAKE3/blob/master/reference_impl/reference_impl.rs

/// Initialization vector, shared with SHA-256.
pub const IV: [u32; 8] = [
	0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Message word permutation applied between rounds.
pub const MSG_PERMUTATION: [usize; 16] = [2, 6, 3, 10, 7, 0, 4, 13, 1, 11, 12, 5, 9, 14, 15, 8];

/// Bytes in a full message block.
pub const BLOCK_LEN: usize = 64;

pub const CHUNK_START: u8 = 1 << 0;
pub const CHUNK_END: u8 = 1 << 1;
pub const PARENT: u8 = 1 << 2;
pub const ROOT: u8 = 1 << 3;
pub const KEYED_HASH: u8 = 1 << 4;
pub const DERIVE_KEY_CONTEXT: u8 = 1 << 5;
pub const DERIVE_KEY_MATERIAL: u8 = 1 << 6;

/// The mixing function, G, which mixes either a column or a diagonal.
fn g(state: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize, mx: u32, my: u32) {
	state[a] = state[a].wrapping_add(state[b]).wrapping_add(mx);
	state[d] = (state[d] ^ state[a]).rotate_right(16);
	state[c] = state[c].wrapping_add(state[d]);
	state[b] = (state[b] ^ state[c]).rotate_right(12);
	state[a] = state[a].wrapping_add(state[b]).wrapping_add(my);
	state[d] = (state[d] ^ state[a]).rotate_right(8);
	state[c] = state[c].wrapping_add(state[d]);
	state[b] = (state[b] ^ state[c]).rotate_right(7);
}

fn round(state: &mut [u32; 16], m: &[u32; 16]) {
	// Mix the columns.
	g(state, 0, 4, 8, 12, m[0], m[1]);
	g(state, 1, 5, 9, 13, m[2], m[3]);
	g(state, 2, 6, 10, 14, m[4], m[5]);
	g(state, 3, 7, 11, 15, m[6], m[7]);
	// Mix the diagonals.
	g(state, 0, 5, 10, 15, m[8], m[9]);
	g(state, 1, 6, 11, 12, m[10], m[11]);
	g(state, 2, 7, 8, 13, m[12], m[13]);
	g(state, 3, 4, 9, 14, m[14], m[15]);
}

fn permute(m: &mut [u32; 16]) {
	let original = *m;
	for i in 0..16 {
		m[i] = original[MSG_PERMUTATION[i]];
	}
}

/// Compresses one message block.
///
/// `h` is the input chaining value, `m` the 16-word message block, `t0`/`t1`
/// the low and high counter words, `b` the number of valid message bytes,
/// and `d` the domain flags. Returns the full 16-word output state; the new
/// chaining value is its first eight words (see [`chaining_value`]).
///
/// Pure and total: all arithmetic wraps mod 2^32 and there is no failure
/// path. Upholding the block-length and padding invariants is the vector
/// builder's job.
pub fn compress(h: &[u32; 8], m: &[u32; 16], t0: u32, t1: u32, b: u8, d: u8) -> [u32; 16] {
	let mut state = [
		h[0],
		h[1],
		h[2],
		h[3],
		h[4],
		h[5],
		h[6],
		h[7],
		IV[0],
		IV[1],
		IV[2],
		IV[3],
		t0,
		t1,
		b as u32,
		d as u32,
	];
	let mut block = *m;

	round(&mut state, &block); // round 1
	permute(&mut block);
	round(&mut state, &block); // round 2
	permute(&mut block);
	round(&mut state, &block); // round 3
	permute(&mut block);
	round(&mut state, &block); // round 4
	permute(&mut block);
	round(&mut state, &block); // round 5
	permute(&mut block);
	round(&mut state, &block); // round 6
	permute(&mut block);
	round(&mut state, &block); // round 7

	for i in 0..8 {
		state[i] ^= state[i + 8];
		state[i + 8] ^= h[i];
	}
	state
}

/// The truncated output: the first eight words of the post-compression
/// state, used as the next chaining value and as the digest words of a root
/// block.
pub fn chaining_value(state: &[u32; 16]) -> [u32; 8] {
	state[..8].try_into().expect("state has 16 words")
}
