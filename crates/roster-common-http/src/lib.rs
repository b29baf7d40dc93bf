// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client construction for roster.
//!
//! Every request roster sends carries the same User-Agent and honours the
//! transport options chosen on the command line.

mod client;

pub use client::{build_client, user_agent, TransportOptions, DEFAULT_TIMEOUT};
