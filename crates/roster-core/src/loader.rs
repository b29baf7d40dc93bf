// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The submission loop and the job around it.
//!
//! Records are handled strictly one after another in file order: validate,
//! transform, then submit unless simulating. A validation failure is always
//! skipped over. A submission failure stops the loop unless `ignore_errors`
//! is set. Either way the caller still gets a [`RunResult`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use roster_common_secret::SecretString;
use tracing::{debug, instrument};

use crate::error::JobError;
use crate::input::read_records;
use crate::record::{transform, validate, UserRecord};
use crate::report::{Reporter, RunEvent, RunResult};
use crate::session::{ConnectOptions, Connector, UserSession};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
	/// Log what would be created without calling the server.
	pub simulate: bool,
	/// Keep going after a failed creation.
	pub ignore_errors: bool,
}

/// Parameters of one job, as given on the command line.
#[derive(Debug, Clone)]
pub struct JobParams {
	pub url: String,
	pub username: String,
	pub password: SecretString,
	pub csv: PathBuf,
	pub options: RunOptions,
	pub timeout: Duration,
	pub accept_invalid_certs: bool,
}

impl JobParams {
	pub fn connect_options(&self) -> ConnectOptions {
		ConnectOptions {
			host: self.url.clone(),
			username: self.username.clone(),
			password: self.password.clone(),
			timeout: self.timeout,
			accept_invalid_certs: self.accept_invalid_certs,
		}
	}
}

#[derive(Debug, Default)]
struct Tally {
	succeeded: Vec<String>,
	failed: Vec<String>,
	invalid: usize,
	simulated: usize,
}

impl Tally {
	fn into_result(self, elapsed: Duration) -> RunResult {
		RunResult {
			succeeded: self.succeeded,
			failed: self.failed,
			invalid: self.invalid,
			simulated: self.simulated,
			elapsed,
		}
	}
}

/// Runs the submission loop over already loaded records.
///
/// An aborting submission failure is reported through `reporter` and ends the
/// loop; the records after it appear in neither list.
pub async fn run<S>(
	records: &[UserRecord],
	session: &S,
	options: RunOptions,
	reporter: &dyn Reporter,
) -> RunResult
where
	S: UserSession + ?Sized,
{
	let started = Instant::now();
	let mut tally = Tally::default();

	if let Err(err) = submit_records(records, session, options, reporter, &mut tally).await {
		reporter.error(&RunEvent::Aborted {
			error: err.to_string(),
		});
	}

	tally.into_result(started.elapsed())
}

/// Runs a whole job: load the CSV, connect, submit, report.
///
/// The CSV is loaded before connecting, so a malformed file never opens a
/// session. Whatever happens, the final summary is reported and returned.
#[instrument(skip_all, fields(url = %params.url, csv = %params.csv.display()))]
pub async fn execute<C>(params: &JobParams, connector: &C, reporter: &dyn Reporter) -> RunResult
where
	C: Connector,
{
	let started = Instant::now();
	reporter.info(&RunEvent::Started {
		url: params.url.clone(),
		username: params.username.clone(),
		password: params.password.clone(),
		csv: params.csv.clone(),
		simulate: params.options.simulate,
		ignore_errors: params.options.ignore_errors,
	});

	let mut tally = Tally::default();
	if let Err(err) = load_and_submit(params, connector, reporter, &mut tally).await {
		reporter.error(&RunEvent::Aborted {
			error: err.to_string(),
		});
	}

	let result = tally.into_result(started.elapsed());
	reporter.info(&RunEvent::Finished {
		result: result.clone(),
	});
	result
}

async fn load_and_submit<C>(
	params: &JobParams,
	connector: &C,
	reporter: &dyn Reporter,
	tally: &mut Tally,
) -> Result<(), JobError>
where
	C: Connector,
{
	let records = read_records(&params.csv)?;
	reporter.info(&RunEvent::Loaded {
		count: records.len(),
	});

	let session = connector
		.connect(&params.connect_options())
		.await
		.map_err(JobError::Connect)?;
	reporter.info(&RunEvent::Connected {
		url: params.url.clone(),
	});

	submit_records(&records, &session, params.options, reporter, tally).await
}

async fn submit_records<S>(
	records: &[UserRecord],
	session: &S,
	options: RunOptions,
	reporter: &dyn Reporter,
	tally: &mut Tally,
) -> Result<(), JobError>
where
	S: UserSession + ?Sized,
{
	for (index, record) in records.iter().enumerate() {
		if let Err(error) = validate(record) {
			tally.invalid += 1;
			if let Some(username) = record.username() {
				tally.failed.push(username.to_string());
			}
			reporter.error(&RunEvent::InvalidRecord { error });
			continue;
		}

		let user = transform(record);
		reporter.info(&RunEvent::Creating {
			user: user.clone(),
			simulate: options.simulate,
		});
		if options.simulate {
			tally.simulated += 1;
			continue;
		}

		let username = user.username().to_string();
		let mode = user.create_mode();
		debug!(row = index + 1, username = %username, mode = %mode, "submitting user");

		match session.create_user(&user, mode).await {
			Ok(()) => {
				reporter.info(&RunEvent::Created {
					username: username.clone(),
					mode,
				});
				tally.succeeded.push(username);
			}
			Err(source) => {
				reporter.error(&RunEvent::CreateFailed {
					username: username.clone(),
					error: source.to_string(),
				});
				tally.failed.push(username.clone());
				if !options.ignore_errors {
					return Err(JobError::Submission { username, source });
				}
			}
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::record::ParsedUserRecord;
	use crate::session::{CreateMode, SessionError};
	use async_trait::async_trait;
	use std::io::Write;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::{Arc, Mutex};
	use tempfile::NamedTempFile;

	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	enum Level {
		Info,
		Error,
	}

	#[derive(Default)]
	struct CapturingReporter {
		events: Mutex<Vec<(Level, RunEvent)>>,
	}

	impl CapturingReporter {
		fn events(&self) -> Vec<(Level, RunEvent)> {
			self.events.lock().unwrap().clone()
		}

		fn errors(&self) -> usize {
			self.events()
				.iter()
				.filter(|(level, _)| *level == Level::Error)
				.count()
		}

		fn kinds(&self) -> Vec<&'static str> {
			self.events()
				.iter()
				.map(|(_, event)| match event {
					RunEvent::Started { .. } => "started",
					RunEvent::Loaded { .. } => "loaded",
					RunEvent::Connected { .. } => "connected",
					RunEvent::InvalidRecord { .. } => "invalid",
					RunEvent::Creating { .. } => "creating",
					RunEvent::Created { .. } => "created",
					RunEvent::CreateFailed { .. } => "create_failed",
					RunEvent::Aborted { .. } => "aborted",
					RunEvent::Finished { .. } => "finished",
				})
				.collect()
		}
	}

	impl Reporter for CapturingReporter {
		fn info(&self, event: &RunEvent) {
			self.events.lock().unwrap().push((Level::Info, event.clone()));
		}

		fn error(&self, event: &RunEvent) {
			self.events.lock().unwrap().push((Level::Error, event.clone()));
		}
	}

	type Calls = Arc<Mutex<Vec<(String, CreateMode)>>>;

	#[derive(Default)]
	struct FakeSession {
		calls: Calls,
		reject: Vec<String>,
	}

	impl FakeSession {
		fn rejecting(usernames: &[&str]) -> Self {
			Self {
				reject: usernames.iter().map(|u| u.to_string()).collect(),
				..Self::default()
			}
		}

		fn calls(&self) -> Vec<(String, CreateMode)> {
			self.calls.lock().unwrap().clone()
		}
	}

	#[async_trait]
	impl UserSession for FakeSession {
		async fn create_user(
			&self,
			user: &ParsedUserRecord,
			mode: CreateMode,
		) -> Result<(), SessionError> {
			let username = user.username().to_string();
			self.calls.lock().unwrap().push((username.clone(), mode));
			if self.reject.contains(&username) {
				return Err(SessionError::Rejected {
					status: 409,
					detail: format!("user {username} already exists"),
				});
			}
			Ok(())
		}
	}

	#[derive(Default)]
	struct FakeConnector {
		calls: Calls,
		connects: AtomicUsize,
		refuse: bool,
	}

	#[async_trait]
	impl Connector for FakeConnector {
		type Session = FakeSession;

		async fn connect(&self, options: &ConnectOptions) -> Result<FakeSession, SessionError> {
			self.connects.fetch_add(1, Ordering::SeqCst);
			if self.refuse {
				return Err(SessionError::Authentication(format!(
					"bad credentials for {}",
					options.username
				)));
			}
			Ok(FakeSession {
				calls: Arc::clone(&self.calls),
				reject: Vec::new(),
			})
		}
	}

	fn user(username: &str) -> UserRecord {
		[
			("username", username.to_string()),
			("email", format!("{username}@example.com")),
			("fullName", format!("User {username}")),
		]
		.into_iter()
		.collect()
	}

	fn users(names: &[&str]) -> Vec<UserRecord> {
		names.iter().map(|name| user(name)).collect()
	}

	const SUBMIT: RunOptions = RunOptions {
		simulate: false,
		ignore_errors: false,
	};

	#[tokio::test]
	async fn all_valid_records_succeed_in_input_order() {
		let session = FakeSession::default();
		let reporter = CapturingReporter::default();

		let result = run(&users(&["ann", "bob", "cy"]), &session, SUBMIT, &reporter).await;

		assert_eq!(result.succeeded, ["ann", "bob", "cy"]);
		assert!(result.failed.is_empty());
		assert_eq!(result.invalid, 0);
		assert_eq!(session.calls().len(), 3);
		assert_eq!(reporter.errors(), 0);
	}

	#[tokio::test]
	async fn submission_failure_aborts_remaining_records() {
		let session = FakeSession::rejecting(&["bob"]);
		let reporter = CapturingReporter::default();

		let result = run(&users(&["ann", "bob", "cy"]), &session, SUBMIT, &reporter).await;

		assert_eq!(result.succeeded, ["ann"]);
		assert_eq!(result.failed, ["bob"]);
		let attempted: Vec<_> = session.calls().into_iter().map(|(u, _)| u).collect();
		assert_eq!(attempted, ["ann", "bob"]);
		assert_eq!(
			reporter.kinds(),
			["creating", "created", "creating", "create_failed", "aborted"]
		);
	}

	#[tokio::test]
	async fn ignore_errors_continues_past_submission_failure() {
		let session = FakeSession::rejecting(&["bob"]);
		let reporter = CapturingReporter::default();
		let options = RunOptions {
			ignore_errors: true,
			..SUBMIT
		};

		let result = run(&users(&["ann", "bob", "cy"]), &session, options, &reporter).await;

		assert_eq!(result.succeeded, ["ann", "cy"]);
		assert_eq!(result.failed, ["bob"]);
		assert_eq!(session.calls().len(), 3);
		assert!(!reporter.kinds().contains(&"aborted"));
	}

	#[tokio::test]
	async fn invalid_records_are_skipped_even_without_ignore_errors() {
		let mut missing_email = user("bob");
		missing_email.insert("email", "");
		let mut nameless = user("x");
		nameless.insert("username", "");
		let mut bad_flag = user("dee");
		bad_flag.insert("isAdmin", "maybe");

		let records = vec![user("ann"), missing_email, nameless, bad_flag, user("cy")];
		let session = FakeSession::default();
		let reporter = CapturingReporter::default();

		let result = run(&records, &session, SUBMIT, &reporter).await;

		assert_eq!(result.succeeded, ["ann", "cy"]);
		assert_eq!(result.failed, ["bob", "dee"]);
		assert_eq!(result.invalid, 3);
		let attempted: Vec<_> = session.calls().into_iter().map(|(u, _)| u).collect();
		assert_eq!(attempted, ["ann", "cy"]);
		assert_eq!(reporter.errors(), 3);
	}

	#[tokio::test]
	async fn simulate_never_calls_the_session() {
		let mut invalid = user("bob");
		invalid.insert("enabled", "nope");
		let records = vec![user("ann"), invalid, user("cy")];
		let session = FakeSession::default();
		let reporter = CapturingReporter::default();
		let options = RunOptions {
			simulate: true,
			ignore_errors: false,
		};

		let result = run(&records, &session, options, &reporter).await;

		assert!(session.calls().is_empty());
		assert!(result.succeeded.is_empty());
		assert_eq!(result.failed, ["bob"]);
		assert_eq!(result.simulated, 2);
		assert_eq!(reporter.kinds(), ["creating", "invalid", "creating"]);
	}

	#[tokio::test]
	async fn password_column_selects_submission_variant() {
		let mut with_password = user("ann");
		with_password.insert("password", "Initial#1");
		let mut empty_password = user("bob");
		empty_password.insert("password", "");
		let records = vec![with_password, empty_password, user("cy")];
		let session = FakeSession::default();

		run(&records, &session, SUBMIT, &CapturingReporter::default()).await;

		assert_eq!(
			session.calls(),
			[
				("ann".to_string(), CreateMode::ProvidedPassword),
				("bob".to_string(), CreateMode::EmailGeneratedPassword),
				("cy".to_string(), CreateMode::EmailGeneratedPassword),
			]
		);
	}

	#[tokio::test]
	async fn submitted_record_has_coerced_flags() {
		struct Inspecting(Mutex<Vec<ParsedUserRecord>>);

		#[async_trait]
		impl UserSession for Inspecting {
			async fn create_user(
				&self,
				user: &ParsedUserRecord,
				_mode: CreateMode,
			) -> Result<(), SessionError> {
				self.0.lock().unwrap().push(user.clone());
				Ok(())
			}
		}

		let mut record = user("ann");
		record.insert("isAdmin", "true");
		record.insert("isLocal", "false");
		let session = Inspecting(Mutex::new(Vec::new()));

		run(&[record], &session, SUBMIT, &CapturingReporter::default()).await;

		let seen = session.0.lock().unwrap();
		assert_eq!(seen[0].flag("isAdmin"), Some(true));
		assert_eq!(seen[0].flag("isLocal"), Some(false));
		assert_eq!(seen[0].flag("enabled"), None);
	}

	fn csv_file(contents: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file
	}

	fn params(csv: &NamedTempFile, options: RunOptions) -> JobParams {
		JobParams {
			url: "https://mgmt.example.internal".to_string(),
			username: "admin".to_string(),
			password: "hunter2".into(),
			csv: csv.path().to_path_buf(),
			options,
			timeout: Duration::from_secs(5),
			accept_invalid_certs: true,
		}
	}

	#[tokio::test]
	async fn execute_loads_connects_submits_and_reports() {
		let csv = csv_file(
			"username,email,fullName,isAdmin\n\
			 ann,ann@example.com,Ann,true\n\
			 bob,bob@example.com,Bob,false\n",
		);
		let connector = FakeConnector::default();
		let reporter = CapturingReporter::default();

		let result = execute(&params(&csv, SUBMIT), &connector, &reporter).await;

		assert_eq!(result.succeeded, ["ann", "bob"]);
		assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
		assert_eq!(
			reporter.kinds(),
			[
				"started",
				"loaded",
				"connected",
				"creating",
				"created",
				"creating",
				"created",
				"finished"
			]
		);
		match reporter.events().last() {
			Some((Level::Info, RunEvent::Finished { result: reported })) => {
				assert_eq!(reported, &result)
			}
			other => panic!("expected finished event, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn malformed_csv_aborts_before_connecting() {
		let csv = csv_file("username,email,fullName\nann,ann@example.com\n");
		let connector = FakeConnector::default();
		let reporter = CapturingReporter::default();

		let result = execute(&params(&csv, SUBMIT), &connector, &reporter).await;

		assert_eq!(connector.connects.load(Ordering::SeqCst), 0);
		assert!(result.succeeded.is_empty() && result.failed.is_empty());
		assert_eq!(reporter.kinds(), ["started", "aborted", "finished"]);
	}

	#[tokio::test]
	async fn connection_failure_is_reported_and_finalized() {
		let csv = csv_file("username,email,fullName\nann,ann@example.com,Ann\n");
		let connector = FakeConnector {
			refuse: true,
			..FakeConnector::default()
		};
		let reporter = CapturingReporter::default();

		let result = execute(&params(&csv, SUBMIT), &connector, &reporter).await;

		assert!(connector.calls.lock().unwrap().is_empty());
		assert_eq!(result, RunResult { elapsed: result.elapsed, ..RunResult::default() });
		assert_eq!(reporter.kinds(), ["started", "loaded", "aborted", "finished"]);
		match &reporter.events()[2] {
			(Level::Error, RunEvent::Aborted { error }) => {
				assert!(error.contains("bad credentials for admin"))
			}
			other => panic!("expected aborted event, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn started_event_carries_redacted_password() {
		let csv = csv_file("username,email,fullName\n");
		let reporter = CapturingReporter::default();

		execute(
			&params(&csv, SUBMIT),
			&FakeConnector::default(),
			&reporter,
		)
		.await;

		let first = format!("{:?}", reporter.events()[0]);
		assert!(first.contains("Started"));
		assert!(!first.contains("hunter2"));
	}
}
