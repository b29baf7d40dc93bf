// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Run reporting.
//!
//! The loop and the job never log directly. They hand [`RunEvent`]s to a
//! [`Reporter`] chosen by the caller: [`TracingReporter`] in the binary, a
//! capturing fake in tests.

use std::path::PathBuf;
use std::time::Duration;

use roster_common_secret::SecretString;
use tracing::{error, info};

use crate::record::{ParsedUserRecord, ValidationError};
use crate::session::CreateMode;

/// Outcome of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
	/// Usernames created, in input order.
	pub succeeded: Vec<String>,
	/// Usernames that failed validation or creation, in input order.
	pub failed: Vec<String>,
	/// Records rejected by validation, with or without a username.
	pub invalid: usize,
	/// Valid records skipped because the run was simulated.
	pub simulated: usize,
	pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub enum RunEvent {
	Started {
		url: String,
		username: String,
		password: SecretString,
		csv: PathBuf,
		simulate: bool,
		ignore_errors: bool,
	},
	Loaded {
		count: usize,
	},
	Connected {
		url: String,
	},
	InvalidRecord {
		error: ValidationError,
	},
	Creating {
		user: ParsedUserRecord,
		simulate: bool,
	},
	Created {
		username: String,
		mode: CreateMode,
	},
	CreateFailed {
		username: String,
		error: String,
	},
	Aborted {
		error: String,
	},
	Finished {
		result: RunResult,
	},
}

/// Logging capability injected into the run.
pub trait Reporter: Send + Sync {
	fn info(&self, event: &RunEvent);
	fn error(&self, event: &RunEvent);
}

/// Writes run events as structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
	fn info(&self, event: &RunEvent) {
		match event {
			RunEvent::Started {
				url,
				username,
				password,
				csv,
				simulate,
				ignore_errors,
			} => info!(
				url = %url,
				username = %username,
				password = %password,
				csv = %csv.display(),
				simulate,
				ignore_errors,
				"starting"
			),
			RunEvent::Loaded { count } => info!(count, "creating {count} new user accounts"),
			RunEvent::Connected { url } => info!(url = %url, "connected to server"),
			RunEvent::Creating { user, simulate } => {
				info!(username = %user.username(), user = ?user, simulate, "creating user")
			}
			RunEvent::Created { username, mode } => {
				info!(username = %username, mode = %mode, "created user {username} with {mode}")
			}
			RunEvent::Finished { result } => {
				info!(elapsed = ?result.elapsed, "total time to load");
				info!(
					succeeded_count = result.succeeded.len(),
					failed_count = result.failed.len(),
					invalid = result.invalid,
					simulated = result.simulated,
					succeeded = ?result.succeeded,
					failed = ?result.failed,
					"created {} users, failed on {} users",
					result.succeeded.len(),
					result.failed.len()
				);
				info!("disconnecting from server");
			}
			other => info!(event = ?other, "run event"),
		}
	}

	fn error(&self, event: &RunEvent) {
		match event {
			RunEvent::InvalidRecord { error } => error!(
				username = error.record().username().unwrap_or_default(),
				errors = ?error.messages(),
				record = ?error.record(),
				"failed to create user"
			),
			RunEvent::CreateFailed { username, error } => {
				error!(username = %username, error = %error, "failed to create user {username}")
			}
			RunEvent::Aborted { error } => error!(error = %error, "error loading users"),
			other => error!(event = ?other, "run event"),
		}
	}
}
