// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP implementation of the roster session traits.
//!
//! [`RestConnector`] authenticates once against the management API and hands
//! back a [`RestSession`] holding the bearer token for account creation.

mod session;
mod wire;

pub use session::{RestConnector, RestSession};
