// Copyright 2025 Irreducible Inc.

//! The differential oracle.
//!
//! Each vector is compressed by the reference engine and handed to the
//! injected circuit evaluator; the two 16-word outputs must agree bit for
//! bit. The reference engine is trusted as ground truth, so every
//! disagreement is recorded against the circuit. Vectors are independent
//! and run in parallel; the failure list is sorted by vector index so
//! reports are reproducible regardless of scheduling.

use std::fmt;

use b3diff_core::CompressionVector;
use itertools::izip;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::Error;

/// A single disagreeing output word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordDiff {
	pub index: usize,
	pub expected: u32,
	pub actual: u32,
}

#[derive(Debug)]
pub enum FailureKind {
	/// The evaluator returned, but some output words disagree with the
	/// reference engine.
	Mismatch { diffs: Vec<WordDiff> },
	/// The evaluator itself failed (external tool error, timeout after one
	/// retry, malformed output).
	Evaluator(Error),
}

#[derive(Debug)]
pub struct VectorFailure {
	pub vector_index: usize,
	pub vector: CompressionVector,
	pub kind: FailureKind,
}

#[derive(Debug)]
pub struct SuiteReport {
	pub total: usize,
	pub failures: Vec<VectorFailure>,
}

impl SuiteReport {
	pub fn is_pass(&self) -> bool {
		self.failures.is_empty()
	}
}

impl fmt::Display for SuiteReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "{}/{} vectors passed", self.total - self.failures.len(), self.total)?;
		for failure in &self.failures {
			match &failure.kind {
				FailureKind::Mismatch { diffs } => {
					writeln!(
						f,
						"vector {}: {} word(s) disagree (b={} d={} t=[{}, {}])",
						failure.vector_index,
						diffs.len(),
						failure.vector.b,
						failure.vector.d,
						failure.vector.t[0],
						failure.vector.t[1],
					)?;
					for diff in diffs {
						writeln!(
							f,
							"  out[{:>2}]: expected {:#010x}, circuit returned {:#010x}",
							diff.index, diff.expected, diff.actual
						)?;
					}
				}
				FailureKind::Evaluator(err) => {
					writeln!(f, "vector {}: evaluator failed: {}", failure.vector_index, err)?;
				}
			}
		}
		Ok(())
	}
}

/// Runs every vector through the reference engine and `evaluate`, collecting
/// all failures rather than aborting on the first.
///
/// `evaluate` is the circuit under test behind an opaque function boundary;
/// any transport (in-process witness computation, subprocess, file exchange)
/// is acceptable as long as the vector-to-output mapping is honored. A
/// timed-out evaluation is retried once with a fresh call before it is
/// recorded as terminal.
#[instrument("oracle::run_suite", skip_all, fields(n_vectors = vectors.len()))]
pub fn run_suite<F>(vectors: &[CompressionVector], evaluate: F) -> SuiteReport
where
	F: Fn(&CompressionVector) -> Result<[u32; 16], Error> + Sync,
{
	let mut failures: Vec<VectorFailure> = vectors
		.par_iter()
		.enumerate()
		.filter_map(|(vector_index, vector)| {
			let kind = check_vector(vector, &evaluate)?;
			debug!(vector_index, "vector failed");
			Some(VectorFailure {
				vector_index,
				vector: vector.clone(),
				kind,
			})
		})
		.collect();

	// Parallel collection order depends on scheduling; reports must not.
	failures.sort_by_key(|failure| failure.vector_index);

	SuiteReport {
		total: vectors.len(),
		failures,
	}
}

fn check_vector<F>(vector: &CompressionVector, evaluate: &F) -> Option<FailureKind>
where
	F: Fn(&CompressionVector) -> Result<[u32; 16], Error> + Sync,
{
	let expected = vector.compress();

	let result = match evaluate(vector) {
		Err(Error::ExternalTimeout { .. }) => evaluate(vector),
		other => other,
	};

	let actual = match result {
		Ok(actual) => actual,
		Err(err) => return Some(FailureKind::Evaluator(err)),
	};

	let diffs: Vec<WordDiff> = izip!(0.., expected, actual)
		.filter(|&(_, expected, actual)| expected != actual)
		.map(|(index, expected, actual)| WordDiff {
			index,
			expected,
			actual,
		})
		.collect();

	if diffs.is_empty() {
		None
	} else {
		Some(FailureKind::Mismatch { diffs })
	}
}
