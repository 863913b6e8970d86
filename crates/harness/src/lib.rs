// Copyright 2025 Irreducible Inc.

//! Differential oracle for a BLAKE3 compression circuit.
//!
//! [`oracle::run_suite`] drives test vectors through the reference engine
//! and an injected circuit evaluator and aggregates every disagreement
//! instead of stopping at the first one. [`toolchain`] wraps the external
//! circuit toolchain (witness and proof generation) and provides the
//! subprocess transport for the evaluator boundary.

pub mod error;
pub mod oracle;
pub mod toolchain;

pub use error::Error;
pub use oracle::{run_suite, FailureKind, SuiteReport, VectorFailure, WordDiff};
pub use toolchain::{Stage, StageReport, SubprocessEvaluator, Toolchain};
