// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for credentials handled by roster.
//!
//! The admin password given on the command line and the bearer token returned
//! by the management API both travel through structured logs and error
//! values. Wrapped in a [`SecretString`] they format as [`REDACTED`], are
//! wiped from memory on drop, and are only readable through
//! [`SecretString::expose`].
//!
//! ```
//! use roster_common_secret::SecretString;
//!
//! let password = SecretString::new("hunter2");
//! assert_eq!(password.to_string(), "[REDACTED]");
//! assert_eq!(password.expose(), "hunter2");
//! ```

use std::fmt;

use zeroize::Zeroizing;

/// Placeholder written wherever a secret would otherwise appear.
pub const REDACTED: &str = "[REDACTED]";

/// A password or token that must never reach logs.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(value: impl Into<String>) -> Self {
		Self(Zeroizing::new(value.into()))
	}

	/// The plain value. Call only where the secret goes on the wire.
	pub fn expose(&self) -> &str {
		self.0.as_str()
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("SecretString").field(&REDACTED).finish()
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

// Tokens arrive in API responses; nothing ever serializes one back out.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		<String as serde::Deserialize>::deserialize(deserializer).map(Self::new)
	}
}
