// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! User records read from CSV, their validation and boolean coercion.
//!
//! A field is *present* when its column exists and the cell is non-empty. An
//! empty cell is treated exactly like a missing column.

use std::collections::BTreeMap;
use std::fmt;

use roster_common_secret::REDACTED;
use serde::Serialize;
use thiserror::Error;

use crate::session::CreateMode;

pub const USERNAME: &str = "username";
pub const EMAIL: &str = "email";
pub const FULL_NAME: &str = "fullName";
pub const PASSWORD: &str = "password";

/// Fields every record must carry.
pub const REQUIRED_FIELDS: [&str; 3] = [USERNAME, EMAIL, FULL_NAME];

/// Tri-state fields: legal only as absent, `"true"` or `"false"`.
pub const FLAG_FIELDS: [&str; 3] = ["isAdmin", "isLocal", "enabled"];

/// One CSV data row keyed by header name. Values are kept verbatim.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
	fields: BTreeMap<String, String>,
}

impl UserRecord {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
		self.fields.insert(field.into(), value.into());
	}

	/// Raw value of `field`, empty or not.
	pub fn get(&self, field: &str) -> Option<&str> {
		self.fields.get(field).map(String::as_str)
	}

	/// Value of `field` when it is present and non-empty.
	pub fn present(&self, field: &str) -> Option<&str> {
		self.get(field).filter(|value| !value.is_empty())
	}

	pub fn username(&self) -> Option<&str> {
		self.present(USERNAME)
	}

	pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
		self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

impl<K, V> FromIterator<(K, V)> for UserRecord
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			fields: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

impl fmt::Debug for UserRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut map = f.debug_map();
		for (name, value) in &self.fields {
			if name == PASSWORD {
				map.entry(name, &REDACTED);
			} else {
				map.entry(name, value);
			}
		}
		map.finish()
	}
}

/// A field of a [`ParsedUserRecord`]. Serializes as a bare JSON string or
/// boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
	Text(String),
	Flag(bool),
}

/// A validated record with its tri-state fields coerced to booleans. This is
/// the attribute set sent to the management API.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedUserRecord {
	fields: BTreeMap<String, FieldValue>,
}

impl ParsedUserRecord {
	pub fn get(&self, field: &str) -> Option<&FieldValue> {
		self.fields.get(field)
	}

	pub fn text(&self, field: &str) -> Option<&str> {
		match self.fields.get(field) {
			Some(FieldValue::Text(value)) => Some(value),
			_ => None,
		}
	}

	pub fn flag(&self, field: &str) -> Option<bool> {
		match self.fields.get(field) {
			Some(FieldValue::Flag(value)) => Some(*value),
			_ => None,
		}
	}

	/// Username of the record; empty only if the record skipped validation.
	pub fn username(&self) -> &str {
		self.text(USERNAME).unwrap_or_default()
	}

	pub fn has_password(&self) -> bool {
		self.text(PASSWORD).is_some_and(|p| !p.is_empty())
	}

	/// Submission variant for this record.
	pub fn create_mode(&self) -> CreateMode {
		if self.has_password() {
			CreateMode::ProvidedPassword
		} else {
			CreateMode::EmailGeneratedPassword
		}
	}
}

impl fmt::Debug for ParsedUserRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut map = f.debug_map();
		for (name, value) in &self.fields {
			match value {
				_ if name == PASSWORD => map.entry(name, &REDACTED),
				FieldValue::Text(text) => map.entry(name, text),
				FieldValue::Flag(flag) => map.entry(name, flag),
			};
		}
		map.finish()
	}
}

/// Everything wrong with one record, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid user record: {}", .messages.join("; "))]
pub struct ValidationError {
	messages: Vec<String>,
	record: UserRecord,
}

impl ValidationError {
	pub fn messages(&self) -> &[String] {
		&self.messages
	}

	pub fn record(&self) -> &UserRecord {
		&self.record
	}
}

/// Checks required fields and tri-state legality. All checks run; messages
/// keep check order.
pub fn validate(record: &UserRecord) -> Result<(), ValidationError> {
	let mut messages = Vec::new();

	for field in REQUIRED_FIELDS {
		if record.present(field).is_none() {
			messages.push(format!("Missing {field}"));
		}
	}

	for field in FLAG_FIELDS {
		if let Some(value) = record.present(field) {
			if value != "true" && value != "false" {
				messages.push(format!(
					"Invalid value for `{field}`. Must be `true` or `false`"
				));
			}
		}
	}

	if messages.is_empty() {
		Ok(())
	} else {
		Err(ValidationError {
			messages,
			record: record.clone(),
		})
	}
}

/// Coerces present tri-state fields to `value == "true"` and copies every
/// other field unchanged. Expects a record that passed [`validate`]; nothing
/// is re-checked here.
///
/// An empty tri-state cell is left out of the result instead of being sent as
/// `""`, so the API only ever receives booleans for these fields and applies
/// its own default.
pub fn transform(record: &UserRecord) -> ParsedUserRecord {
	let fields = record
		.fields
		.iter()
		.filter_map(|(name, value)| {
			let parsed = if FLAG_FIELDS.contains(&name.as_str()) {
				if value.is_empty() {
					return None;
				}
				FieldValue::Flag(value == "true")
			} else {
				FieldValue::Text(value.clone())
			};
			Some((name.clone(), parsed))
		})
		.collect();

	ParsedUserRecord { fields }
}
