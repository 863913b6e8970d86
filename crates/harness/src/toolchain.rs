// Copyright 2025 Irreducible Inc.

//! External circuit-toolchain invocation.
//!
//! The circuit compiler, witness generator, and prover live outside this
//! repository and are driven as subprocesses. Their internal file formats
//! are never parsed here; on failure only the raw stdout/stderr are
//! surfaced. Every call is bounded by a timeout, and a timed-out child is
//! killed rather than orphaned.

use std::{
	fmt, fs,
	io::{self, Read, Write},
	path::PathBuf,
	process::{Child, Command, Stdio},
	thread,
	time::{Duration, Instant},
};

use b3diff_core::{bits, CompressionVector};
use tracing::{debug, instrument};

use crate::error::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The external stage a subprocess call belongs to, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Witness,
	Prove,
	Evaluate,
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Witness => "witness generation",
			Self::Prove => "proof generation",
			Self::Evaluate => "circuit evaluation",
		};
		f.write_str(name)
	}
}

/// Outcome of a successful external stage.
#[derive(Debug, Clone)]
pub struct StageReport {
	pub stage: Stage,
	pub elapsed: Duration,
	pub stdout: String,
}

/// Driver for the external toolchain CLI.
///
/// The command shape follows the toolchain convention
/// `<program> <base_args..> <subcommand> <circuit> <vector name>`, with
/// vector documents written under `<input_dir>/<circuit>/<name>.json`
/// beforehand.
#[derive(Debug, Clone)]
pub struct Toolchain {
	program: String,
	base_args: Vec<String>,
	circuit: String,
	input_dir: PathBuf,
	timeout: Duration,
}

impl Toolchain {
	pub fn new(
		program: impl Into<String>,
		circuit: impl Into<String>,
		input_dir: impl Into<PathBuf>,
	) -> Self {
		Self {
			program: program.into(),
			base_args: Vec::new(),
			circuit: circuit.into(),
			input_dir: input_dir.into(),
			timeout: DEFAULT_TIMEOUT,
		}
	}

	/// Arguments inserted before every subcommand, e.g. `["circomkit"]` when
	/// the program is a package runner.
	pub fn with_base_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.base_args = args.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Serializes `vector` to the input document the toolchain expects and
	/// returns the written path.
	pub fn write_vector(
		&self,
		name: &str,
		vector: &CompressionVector,
	) -> Result<PathBuf, Error> {
		let dir = self.input_dir.join(&self.circuit);
		fs::create_dir_all(&dir)?;
		let path = dir.join(format!("{name}.json"));
		fs::write(&path, serde_json::to_vec_pretty(vector)?)?;
		debug!(path = %path.display(), "wrote vector document");
		Ok(path)
	}

	/// Computes a witness for the named vector. Blocking; returns the
	/// elapsed wall-clock time on success.
	#[instrument("toolchain::compute_witness", skip(self))]
	pub fn compute_witness(&self, name: &str) -> Result<StageReport, Error> {
		self.run_stage(Stage::Witness, &["witness", &self.circuit, name])
	}

	/// Produces a proof for the named vector. Blocking.
	#[instrument("toolchain::prove", skip(self))]
	pub fn prove(&self, name: &str) -> Result<StageReport, Error> {
		self.run_stage(Stage::Prove, &["prove", &self.circuit, name])
	}

	fn run_stage(&self, stage: Stage, args: &[&str]) -> Result<StageReport, Error> {
		let mut command = Command::new(&self.program);
		command.args(&self.base_args).args(args);
		let (output, elapsed) = run_with_timeout(command, stage, None, self.timeout)?;
		Ok(StageReport {
			stage,
			elapsed,
			stdout: output,
		})
	}
}

/// Subprocess transport for the circuit-evaluator boundary.
///
/// The child receives the vector JSON document on stdin and must print the
/// 16 output words as whitespace-separated 32-bit bit strings, MSB first,
/// the same convention the circuit's own output signals use.
#[derive(Debug, Clone)]
pub struct SubprocessEvaluator {
	program: String,
	args: Vec<String>,
	timeout: Duration,
}

impl SubprocessEvaluator {
	pub fn new(program: impl Into<String>) -> Self {
		Self {
			program: program.into(),
			args: Vec::new(),
			timeout: DEFAULT_TIMEOUT,
		}
	}

	pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.args = args.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Evaluates the circuit on one vector.
	pub fn evaluate(&self, vector: &CompressionVector) -> Result<[u32; 16], Error> {
		let mut command = Command::new(&self.program);
		command.args(&self.args);
		let input = serde_json::to_vec(vector)?;
		let (output, _) =
			run_with_timeout(command, Stage::Evaluate, Some(input.as_slice()), self.timeout)?;
		parse_output_words(&output)
	}
}

fn parse_output_words(output: &str) -> Result<[u32; 16], Error> {
	let words: Vec<u32> = output
		.split_whitespace()
		.map(|token| {
			bits::from_binary(token).map_err(|_| Error::InvalidEvaluatorOutput {
				reason: format!("token {token:?} is not a 32-bit bit string"),
			})
		})
		.collect::<Result<_, _>>()?;
	words
		.try_into()
		.map_err(|words: Vec<u32>| Error::InvalidEvaluatorOutput {
			reason: format!("expected 16 output words, got {}", words.len()),
		})
}

/// Runs a subprocess to completion with a deadline, killing it if the
/// deadline passes. Returns captured stdout and the elapsed time.
fn run_with_timeout(
	mut command: Command,
	stage: Stage,
	stdin: Option<&[u8]>,
	timeout: Duration,
) -> Result<(String, Duration), Error> {
	command
		.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
		.stdout(Stdio::piped())
		.stderr(Stdio::piped());

	let start = Instant::now();
	let mut child = command.spawn()?;

	if let Some(input) = stdin {
		// The document fits comfortably in the pipe buffer, and both output
		// pipes are drained on their own threads, so this write cannot
		// deadlock. A child that exits without reading its input closes the
		// pipe; that shows up as a nonzero exit below, not as an I/O error.
		let mut handle = child.stdin.take().expect("stdin was piped");
		if let Err(err) = handle.write_all(input) {
			if err.kind() != io::ErrorKind::BrokenPipe {
				return Err(err.into());
			}
		}
	}

	let stdout_reader = spawn_pipe_reader(child.stdout.take().expect("stdout was piped"));
	let stderr_reader = spawn_pipe_reader(child.stderr.take().expect("stderr was piped"));

	let status = match wait_with_deadline(&mut child, start, timeout)? {
		Some(status) => status,
		None => {
			child.kill()?;
			child.wait()?;
			drop((stdout_reader, stderr_reader));
			return Err(Error::ExternalTimeout {
				stage,
				elapsed: start.elapsed(),
			});
		}
	};
	let elapsed = start.elapsed();

	let stdout = stdout_reader.join().expect("reader thread does not panic");
	let stderr = stderr_reader.join().expect("reader thread does not panic");

	if !status.success() {
		return Err(Error::ExternalTool {
			stage,
			code: status.code(),
			stdout,
			stderr,
		});
	}

	debug!(%stage, ?elapsed, "external stage completed");
	Ok((stdout, elapsed))
}

fn wait_with_deadline(
	child: &mut Child,
	start: Instant,
	timeout: Duration,
) -> Result<Option<std::process::ExitStatus>, Error> {
	loop {
		if let Some(status) = child.try_wait()? {
			return Ok(Some(status));
		}
		if start.elapsed() >= timeout {
			return Ok(None);
		}
		thread::sleep(POLL_INTERVAL);
	}
}

fn spawn_pipe_reader(mut pipe: impl Read + Send + 'static) -> thread::JoinHandle<String> {
	thread::spawn(move || {
		let mut buf = String::new();
		// A child that exits without closing the pipe still EOFs it; read
		// errors degrade to whatever was captured so far.
		let _ = pipe.read_to_string(&mut buf);
		buf
	})
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use b3diff_core::{bits, build_vector, Lcg, VectorParams};

	use super::*;

	fn sample_vector() -> CompressionVector {
		let mut gen = Lcg::new(42);
		build_vector(&mut gen, &VectorParams::default()).unwrap()
	}

	fn shell_evaluator(script: &str) -> SubprocessEvaluator {
		SubprocessEvaluator::new("sh")
			.with_args(["-c", script])
			.with_timeout(Duration::from_secs(10))
	}

	#[test]
	fn test_write_vector_document() {
		let dir = std::env::temp_dir().join("b3diff_toolchain_test");
		let toolchain = Toolchain::new("true", "blake3_compression", &dir);
		let vector = sample_vector();

		let path = toolchain.write_vector("testInp", &vector).unwrap();
		assert!(path.ends_with("blake3_compression/testInp.json"));

		let raw = fs::read_to_string(&path).unwrap();
		let parsed: CompressionVector = serde_json::from_str(&raw).unwrap();
		assert_eq!(parsed, vector);

		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn test_successful_stage_reports_elapsed() {
		let toolchain = Toolchain::new("true", "blake3_compression", "inputs");
		let report = toolchain.compute_witness("testInp").unwrap();
		assert_eq!(report.stage, Stage::Witness);
		assert!(report.elapsed < Duration::from_secs(10));
	}

	#[test]
	fn test_failing_stage_surfaces_stderr() {
		let toolchain = Toolchain::new("sh", "blake3_compression", "inputs")
			.with_base_args(["-c", "echo boom >&2; exit 3", "--"]);
		let err = toolchain.prove("testInp").unwrap_err();
		assert_matches!(
			err,
			Error::ExternalTool { stage: Stage::Prove, code: Some(3), ref stderr, .. }
				if stderr.contains("boom")
		);
	}

	#[test]
	fn test_timeout_kills_child() {
		let evaluator = shell_evaluator("sleep 30").with_timeout(Duration::from_millis(100));
		let start = Instant::now();
		let err = evaluator.evaluate(&sample_vector()).unwrap_err();
		assert_matches!(err, Error::ExternalTimeout { stage: Stage::Evaluate, .. });
		// The child must have been killed, not waited to completion.
		assert!(start.elapsed() < Duration::from_secs(5));
	}

	#[test]
	fn test_evaluator_parses_bit_string_output() {
		let expected: [u32; 16] = core::array::from_fn(|i| (i as u32) * 0x11111111);
		let bits_line = expected.map(bits::to_binary32).join(" ");
		let evaluator = shell_evaluator(&format!("cat >/dev/null; echo {bits_line}"));
		assert_eq!(evaluator.evaluate(&sample_vector()).unwrap(), expected);
	}

	#[test]
	fn test_evaluator_rejects_wrong_word_count() {
		let evaluator = shell_evaluator(&format!("cat >/dev/null; echo {}", bits::to_binary32(7)));
		assert_matches!(
			evaluator.evaluate(&sample_vector()),
			Err(Error::InvalidEvaluatorOutput { .. })
		);
	}

	#[test]
	fn test_evaluator_rejects_non_binary_tokens() {
		let evaluator = shell_evaluator("cat >/dev/null; echo 123 456");
		assert_matches!(
			evaluator.evaluate(&sample_vector()),
			Err(Error::InvalidEvaluatorOutput { .. })
		);
	}
}
