// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! roster - create user accounts in bulk from a CSV file
//!
//! Each CSV row is validated, converted to the management API's user shape
//! and submitted over one authenticated session. Progress and the final
//! summary are written as structured logs.

mod args;
mod logging;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Instrument};

use roster_client::RestConnector;
use roster_core::TracingReporter;

use args::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();
	logging::init_tracing(args.log_level, args.log_format)?;

	match args.command {
		Command::Create(create) => {
			let params = create.into_job_params();
			let result = roster_core::execute(&params, &RestConnector, &TracingReporter)
				.instrument(logging::service_span())
				.await;
			debug!(
				succeeded = result.succeeded.len(),
				failed = result.failed.len(),
				"run complete"
			);
		}
	}

	Ok(())
}
