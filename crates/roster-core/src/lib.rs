// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Core of the roster bulk user-creation job.
//!
//! - [`input`]: reads the CSV file into [`UserRecord`]s
//! - [`record`]: validation and boolean coercion of records
//! - [`loader`]: the sequential submission loop and job orchestration
//! - [`session`]: traits implemented by the management API adapter
//! - [`report`]: the [`Reporter`] capability and the run summary

pub mod error;
pub mod input;
pub mod loader;
pub mod record;
pub mod report;
pub mod session;

pub use error::{JobError, ParseError};
pub use input::{read_records, read_records_from};
pub use loader::{execute, run, JobParams, RunOptions};
pub use record::{
	transform, validate, FieldValue, ParsedUserRecord, UserRecord, ValidationError, FLAG_FIELDS,
	REQUIRED_FIELDS,
};
pub use report::{Reporter, RunEvent, RunResult, TracingReporter};
pub use session::{ConnectOptions, Connector, CreateMode, SessionError, UserSession};
