// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! JSON:API documents exchanged with the management API.

use roster_common_secret::SecretString;
use roster_core::ParsedUserRecord;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub(crate) struct AuthenticateRequest<'a> {
	pub identification: &'a str,
	pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct AuthenticateResponse {
	pub data: AuthenticatedUser,
}

#[derive(Deserialize)]
pub(crate) struct AuthenticatedUser {
	pub meta: AuthenticatedMeta,
}

#[derive(Deserialize)]
pub(crate) struct AuthenticatedMeta {
	#[serde(rename = "access-token")]
	pub access_token: SecretString,
}

#[derive(Serialize)]
pub(crate) struct CreateUserRequest<'a> {
	data: NewUser<'a>,
}

#[derive(Serialize)]
struct NewUser<'a> {
	#[serde(rename = "type")]
	kind: &'static str,
	attributes: &'a ParsedUserRecord,
}

impl<'a> CreateUserRequest<'a> {
	pub fn new(user: &'a ParsedUserRecord) -> Self {
		Self {
			data: NewUser {
				kind: "users",
				attributes: user,
			},
		}
	}
}

#[derive(Deserialize)]
struct ErrorDocument {
	#[serde(default)]
	errors: Vec<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
	detail: Option<String>,
	title: Option<String>,
}

/// Best human-readable reason in an error response body.
pub(crate) fn error_detail(body: &str) -> String {
	if let Ok(document) = serde_json::from_str::<ErrorDocument>(body) {
		if let Some(reason) = document
			.errors
			.into_iter()
			.find_map(|e| e.detail.or(e.title))
		{
			return reason;
		}
	}

	let body = body.trim();
	if body.is_empty() {
		"empty response body".to_string()
	} else {
		body.to_string()
	}
}
