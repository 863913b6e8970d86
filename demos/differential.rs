// Copyright 2025 Irreducible Inc.

use std::time::Duration;

use anyhow::{bail, Result};
use b3diff_core::{build_vector, CompressionVector, Lcg, VectorParams, CHUNK_END, CHUNK_START};
use b3diff_harness::{run_suite, SubprocessEvaluator};
use clap::Parser;
use rand::{rngs::OsRng, Rng};

#[derive(Debug, Parser)]
struct Args {
	/// Evaluator command. It receives one vector JSON document on stdin and
	/// must print the 16 output words as 32-bit bit strings.
	evaluator: String,
	/// Extra arguments passed to the evaluator command.
	#[arg(last = true)]
	evaluator_args: Vec<String>,
	/// The number of compressions to verify.
	#[arg(short, long, default_value_t = 100)]
	n_vectors: usize,
	/// Generator seed; equal seeds produce identical suites.
	#[arg(long, default_value_t = 6429)]
	seed: u64,
	/// Draw a fresh seed from the OS instead of using --seed.
	#[arg(long)]
	random_seed: bool,
	/// Per-evaluation timeout in seconds.
	#[arg(long, default_value_t = 30)]
	timeout_secs: u64,
}

fn build_suite(gen: &mut Lcg, n_vectors: usize) -> Vec<CompressionVector> {
	// The first vector is the canonical full-block chunk compression; the
	// rest vary block length, flags, and counter.
	let mut vectors = Vec::with_capacity(n_vectors);
	if n_vectors == 0 {
		return vectors;
	}
	let first = VectorParams {
		flags: CHUNK_START | CHUNK_END,
		..VectorParams::default()
	};
	vectors.push(build_vector(gen, &first).expect("full block length is valid"));

	while vectors.len() < n_vectors {
		let block_len = ((gen.next_u32() % 16 + 1) * 4) as u8;
		let flags = (gen.next_u32() & (CHUNK_START | CHUNK_END) as u32) as u8;
		let counter = (gen.next_u32() as u64) << 32 | gen.next_u32() as u64;
		let params = VectorParams {
			block_len,
			flags,
			counter,
			..VectorParams::default()
		};
		vectors.push(build_vector(gen, &params).expect("block length is a multiple of 4"));
	}
	vectors
}

fn main() -> Result<()> {
	let args = Args::parse();

	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.init();

	let seed = if args.random_seed { OsRng.gen() } else { args.seed };
	println!("Verifying {} Blake3 compressions (seed {seed})", args.n_vectors);

	let vector_gen_scope = tracing::info_span!("generating vectors").entered();
	let mut gen = Lcg::new(seed);
	let vectors = build_suite(&mut gen, args.n_vectors);
	drop(vector_gen_scope);

	let evaluator = SubprocessEvaluator::new(args.evaluator.as_str())
		.with_args(args.evaluator_args)
		.with_timeout(Duration::from_secs(args.timeout_secs));

	let report = run_suite(&vectors, |vector| evaluator.evaluate(vector));
	print!("{report}");

	if !report.is_pass() {
		bail!("{} of {} vectors failed", report.failures.len(), report.total);
	}
	Ok(())
}
