// Copyright 2025 Irreducible Inc.

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
	#[error("block length {len} is not a positive multiple of 4 in (0, 64]")]
	InvalidBlockLength { len: u8 },
	#[error("value {value:#x} does not fit in {width} bits")]
	SerializationRange { value: u32, width: u32 },
	#[error("invalid bit string {bits:?}")]
	InvalidBitString { bits: String },
}
