// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::convert::Infallible;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use roster_common_secret::SecretString;
use roster_core::{JobParams, RunOptions};

/// roster - create user accounts in bulk from a CSV file
#[derive(Parser, Debug)]
#[command(name = "roster", version, about, long_about = None)]
pub struct Args {
	/// Log level (RUST_LOG takes precedence when set)
	#[arg(long, global = true, env = "ROSTER_LOG_LEVEL", default_value = "info")]
	pub log_level: tracing::Level,

	/// Log output format
	#[arg(long, global = true, value_enum, default_value_t = LogFormat::Json)]
	pub log_format: LogFormat,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
	Json,
	Compact,
	Pretty,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Create users based on CSV input
	Create(CreateArgs),
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
	/// Username to log in as
	#[arg(long, env = "ROSTER_USERNAME")]
	pub username: String,

	/// Password for the given username
	#[arg(long, env = "ROSTER_PASSWORD", hide_env_values = true, value_parser = parse_secret)]
	pub password: SecretString,

	/// Server URL including scheme (e.g. https://mgmt.example.internal)
	#[arg(long, env = "ROSTER_URL")]
	pub url: String,

	/// CSV file to read users from
	#[arg(long)]
	pub csv: PathBuf,

	/// Log the actions that would be taken without creating any user
	#[arg(long)]
	pub simulate: bool,

	/// Attempt every user in the CSV instead of stopping at the first failed creation
	#[arg(long, alias = "ignoreErrors")]
	pub ignore_errors: bool,

	/// Per-request timeout (e.g. 30s, 2m)
	#[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
	pub timeout: Duration,

	/// Verify the server's TLS certificate
	#[arg(long)]
	pub strict_tls: bool,
}

fn parse_secret(value: &str) -> Result<SecretString, Infallible> {
	Ok(SecretString::from(value))
}

impl CreateArgs {
	pub fn into_job_params(self) -> JobParams {
		JobParams {
			url: self.url,
			username: self.username,
			password: self.password,
			csv: self.csv,
			options: RunOptions {
				simulate: self.simulate,
				ignore_errors: self.ignore_errors,
			},
			timeout: self.timeout,
			accept_invalid_certs: !self.strict_tls,
		}
	}
}
