// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Request timeout used when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport settings for the management API connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
	/// Per-request timeout.
	pub timeout: Duration,
	/// Skip server certificate verification. Management servers are commonly
	/// deployed with self-signed certificates.
	pub accept_invalid_certs: bool,
}

impl Default for TransportOptions {
	fn default() -> Self {
		Self {
			timeout: DEFAULT_TIMEOUT,
			accept_invalid_certs: true,
		}
	}
}

/// Returns the roster User-Agent string.
///
/// Format: `roster/{version}`
pub fn user_agent() -> String {
	format!("roster/{}", env!("CARGO_PKG_VERSION"))
}

fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Builds a client configured with `options`.
pub fn build_client(options: &TransportOptions) -> reqwest::Result<Client> {
	if options.accept_invalid_certs {
		tracing::warn!("TLS certificate verification is disabled");
	}
	builder()
		.timeout(options.timeout)
		.danger_accept_invalid_certs(options.accept_invalid_certs)
		.build()
}
