// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::args::LogFormat;

const CRATE_TARGETS: [&str; 4] = ["roster", "roster_core", "roster_client", "roster_common_http"];

/// Default filter: roster crates at `level`, everything else at warn.
fn default_directives(level: tracing::Level) -> String {
	let level = level.as_str().to_ascii_lowercase();
	let mut directives = vec!["warn".to_string()];
	directives.extend(CRATE_TARGETS.iter().map(|target| format!("{target}={level}")));
	directives.join(",")
}

/// Value of the `service` field carried by every line logged during a run.
pub const SERVICE: &str = "roster";

/// Root span for a run. JSON lines logged inside it carry `service`.
pub fn service_span() -> tracing::Span {
	tracing::info_span!("roster", service = SERVICE)
}

pub fn init_tracing(level: tracing::Level, format: LogFormat) -> Result<()> {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

	let registry = tracing_subscriber::registry().with(filter);
	let initialized = match format {
		LogFormat::Json => registry
			.with(fmt::layer().json().with_writer(std::io::stdout))
			.try_init(),
		LogFormat::Compact => registry
			.with(fmt::layer().compact().with_writer(std::io::stdout))
			.try_init(),
		LogFormat::Pretty => registry
			.with(fmt::layer().with_writer(std::io::stdout))
			.try_init(),
	};
	initialized.context("failed to initialize logging")
}
