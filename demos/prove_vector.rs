// Copyright 2025 Irreducible Inc.

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use b3diff_core::{build_vector, Lcg, VectorParams, CHUNK_END, CHUNK_START};
use b3diff_harness::Toolchain;
use clap::Parser;

#[derive(Debug, Parser)]
struct Args {
	/// Toolchain runner program.
	#[arg(long, default_value = "npx")]
	program: String,
	/// Arguments inserted before each toolchain subcommand.
	#[arg(long = "base-arg", default_values_t = ["circomkit".to_string()])]
	base_args: Vec<String>,
	/// Circuit name as known to the toolchain.
	#[arg(long, default_value = "blake3_compression")]
	circuit: String,
	/// Directory vector documents are written under.
	#[arg(long, default_value = "inputs")]
	input_dir: PathBuf,
	/// Name of the vector document.
	#[arg(long, default_value = "testInp")]
	name: String,
	/// Generator seed for the vector's message block.
	#[arg(long, default_value_t = 6429)]
	seed: u64,
	/// Also produce a proof after witness generation.
	#[arg(long)]
	prove: bool,
	/// Per-stage timeout in seconds.
	#[arg(long, default_value_t = 120)]
	timeout_secs: u64,
}

fn main() -> Result<()> {
	let args = Args::parse();

	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.init();

	let mut gen = Lcg::new(args.seed);
	let params = VectorParams {
		flags: CHUNK_START | CHUNK_END,
		..VectorParams::default()
	};
	let vector = build_vector(&mut gen, &params)?;

	let toolchain = Toolchain::new(args.program.as_str(), args.circuit.as_str(), &args.input_dir)
		.with_base_args(args.base_args)
		.with_timeout(Duration::from_secs(args.timeout_secs));

	let path = toolchain.write_vector(&args.name, &vector)?;
	println!("Wrote vector to {}", path.display());

	let witness = toolchain.compute_witness(&args.name)?;
	println!("Witness generation took {:?}", witness.elapsed);

	if args.prove {
		let proof = toolchain.prove(&args.name)?;
		println!("Proving took {:?}", proof.elapsed);
	}
	Ok(())
}
