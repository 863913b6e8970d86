// Copyright 2025 Irreducible Inc.

//! Reference implementation of the BLAKE3 single-block compression function
//! together with the deterministic test-vector machinery used to check a
//! circuit implementation against it.
//!
//! The compression engine in [`compress`] is the ground truth: it is pure,
//! total, and bit-exact with respect to the official BLAKE3 specification.
//! [`generator::Lcg`] and [`vector::build_vector`] produce reproducible
//! inputs for it, and [`bits`] converts between native words and the
//! fixed-width bit-vector convention the circuit side speaks.

pub mod bits;
pub mod compress;
pub mod error;
pub mod generator;
pub mod vector;

pub use compress::{chaining_value, compress, CHUNK_END, CHUNK_START, IV, ROOT};
pub use error::Error;
pub use generator::Lcg;
pub use vector::{build_vector, CompressionVector, VectorParams};
