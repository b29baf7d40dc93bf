// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionError;

/// The CSV input could not be read. Fatal: no record is processed.
#[derive(Debug, Error)]
pub enum ParseError {
	#[error("failed to read {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("malformed CSV in {}: {source}", .path.display())]
	Csv {
		path: PathBuf,
		#[source]
		source: csv::Error,
	},
}

/// Errors that end a job before every record was attempted.
#[derive(Debug, Error)]
pub enum JobError {
	#[error(transparent)]
	Parse(#[from] ParseError),

	#[error("failed to connect: {0}")]
	Connect(#[source] SessionError),

	#[error("failed to create user {username}: {source}")]
	Submission {
		username: String,
		#[source]
		source: SessionError,
	},
}
