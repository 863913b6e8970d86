// Copyright 2025 Irreducible Inc.

use std::time::Duration;

use crate::toolchain::Stage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{stage} exited with code {code:?}: {stderr}")]
	ExternalTool {
		stage: Stage,
		code: Option<i32>,
		stdout: String,
		stderr: String,
	},
	#[error("{stage} timed out after {elapsed:?}")]
	ExternalTimeout { stage: Stage, elapsed: Duration },
	#[error("evaluator produced invalid output: {reason}")]
	InvalidEvaluatorOutput { reason: String },
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
	#[error("{0}")]
	Core(#[from] b3diff_core::Error),
}
