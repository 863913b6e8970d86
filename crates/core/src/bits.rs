// Copyright 2025 Irreducible Inc.

//! Fixed-width binary string conversions.
//!
//! The circuit side consumes and produces words as fixed-width bit vectors,
//! most significant bit first. These conversions are lossless and
//! order-preserving; `from_binary(&to_fixed_binary(x, 32)?)` returns `x` for
//! every `x`.

use crate::error::Error;

/// Encodes `value` as exactly `width` bits, MSB first, zero-padded on the
/// left.
///
/// Fails if `width` exceeds 32 or if `value` does not fit in `width` bits.
pub fn to_fixed_binary(value: u32, width: u32) -> Result<String, Error> {
	if width > 32 || (width < 32 && value >> width != 0) {
		return Err(Error::SerializationRange { value, width });
	}
	let bits = (0..width)
		.rev()
		.map(|i| if value >> i & 1 == 1 { '1' } else { '0' })
		.collect();
	Ok(bits)
}

/// Encodes a word in the standard 32-bit width. Total.
pub fn to_binary32(value: u32) -> String {
	to_fixed_binary(value, 32).expect("32-bit encoding is total")
}

/// Decodes an MSB-first bit string produced by [`to_fixed_binary`].
///
/// Fails on empty input, characters other than `0`/`1`, or more than 32
/// bits.
pub fn from_binary(bits: &str) -> Result<u32, Error> {
	if bits.is_empty() || bits.len() > 32 {
		return Err(Error::InvalidBitString {
			bits: bits.to_string(),
		});
	}
	let mut value = 0u32;
	for ch in bits.chars() {
		let bit = match ch {
			'0' => 0,
			'1' => 1,
			_ => {
				return Err(Error::InvalidBitString {
					bits: bits.to_string(),
				})
			}
		};
		value = value << 1 | bit;
	}
	Ok(value)
}
