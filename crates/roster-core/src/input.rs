// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! CSV input: a header row followed by one user per line.

use std::fs::File;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::ParseError;
use crate::record::UserRecord;

/// Reads every record of the CSV file at `path`, in file order.
///
/// The whole file is read before returning, so a malformed row anywhere in
/// the file fails the load without yielding any record.
pub fn read_records(path: &Path) -> Result<Vec<UserRecord>, ParseError> {
	let file = File::open(path).map_err(|source| ParseError::Io {
		path: path.to_path_buf(),
		source,
	})?;
	read_records_from(file, path)
}

/// Like [`read_records`] but from any reader. `source` names the input in
/// errors.
pub fn read_records_from<R: io::Read>(
	reader: R,
	source: &Path,
) -> Result<Vec<UserRecord>, ParseError> {
	let csv_error = |err: csv::Error| ParseError::Csv {
		path: source.to_path_buf(),
		source: err,
	};

	// Blank lines are skipped by the csv reader itself. Rows whose width
	// differs from the header are an error.
	let mut reader = csv::ReaderBuilder::new()
		.delimiter(b',')
		.has_headers(true)
		.flexible(false)
		.from_reader(reader);

	let headers = reader.headers().map_err(csv_error)?.clone();

	let mut records = Vec::new();
	for row in reader.records() {
		let row = row.map_err(csv_error)?;
		records.push(headers.iter().zip(row.iter()).collect::<UserRecord>());
	}

	debug!(
		source = %source.display(),
		columns = headers.len(),
		count = records.len(),
		"read user records"
	);
	Ok(records)
}
