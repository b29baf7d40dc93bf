// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Seams to the remote management API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use roster_common_secret::SecretString;
use thiserror::Error;

use crate::record::ParsedUserRecord;

/// How the new account gets its first password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
	/// The record carries a `password` column.
	ProvidedPassword,
	/// The server generates a password and emails it to the user.
	EmailGeneratedPassword,
}

impl CreateMode {
	pub fn emails_password(self) -> bool {
		matches!(self, CreateMode::EmailGeneratedPassword)
	}
}

impl fmt::Display for CreateMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CreateMode::ProvidedPassword => f.write_str("provided password"),
			CreateMode::EmailGeneratedPassword => f.write_str("emailed generated password"),
		}
	}
}

/// Errors reported by a session or while opening one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
	#[error("invalid server url: {0}")]
	InvalidUrl(String),

	#[error("authentication failed: {0}")]
	Authentication(String),

	#[error("request rejected with status {status}: {detail}")]
	Rejected { status: u16, detail: String },

	#[error("transport error: {0}")]
	Transport(String),

	#[error("invalid response: {0}")]
	InvalidResponse(String),
}

/// Everything needed to open a session.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
	/// Server URL including scheme, e.g. `https://mgmt.example.internal`.
	pub host: String,
	pub username: String,
	pub password: SecretString,
	pub timeout: Duration,
	pub accept_invalid_certs: bool,
}

/// An authenticated session able to create accounts.
#[async_trait]
pub trait UserSession: Send + Sync {
	async fn create_user(
		&self,
		user: &ParsedUserRecord,
		mode: CreateMode,
	) -> Result<(), SessionError>;
}

/// Opens a [`UserSession`]. Called once per job.
#[async_trait]
pub trait Connector: Send + Sync {
	type Session: UserSession;

	async fn connect(&self, options: &ConnectOptions) -> Result<Self::Session, SessionError>;
}
