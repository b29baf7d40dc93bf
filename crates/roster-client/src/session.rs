// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use roster_common_http::TransportOptions;
use roster_common_secret::SecretString;
use roster_core::{
	ConnectOptions, Connector, CreateMode, ParsedUserRecord, SessionError, UserSession,
};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::wire::{error_detail, AuthenticateRequest, AuthenticateResponse, CreateUserRequest};

/// Opens [`RestSession`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestConnector;

#[async_trait]
impl Connector for RestConnector {
	type Session = RestSession;

	async fn connect(&self, options: &ConnectOptions) -> Result<RestSession, SessionError> {
		RestSession::connect(options).await
	}
}

/// An authenticated connection to the management API.
pub struct RestSession {
	base_url: Url,
	http: reqwest::Client,
	token: SecretString,
}

impl RestSession {
	/// Authenticates with `options` and keeps the returned bearer token.
	#[instrument(skip_all, fields(host = %options.host, username = %options.username))]
	pub async fn connect(options: &ConnectOptions) -> Result<Self, SessionError> {
		let base_url = parse_base_url(&options.host)?;
		let http = roster_common_http::build_client(&TransportOptions {
			timeout: options.timeout,
			accept_invalid_certs: options.accept_invalid_certs,
		})
		.map_err(|e| SessionError::Transport(e.to_string()))?;

		let url = endpoint(&base_url, "v2/authenticate")?;
		debug!(url = %url, "authenticating");
		let response = http
			.post(url)
			.json(&AuthenticateRequest {
				identification: &options.username,
				password: options.password.expose(),
			})
			.send()
			.await
			.map_err(transport_error)?;

		if !response.status().is_success() {
			let status = response.status();
			let body = response.text().await.unwrap_or_default();
			warn!(status = %status, "authentication failed");
			return Err(SessionError::Authentication(format!(
				"{status} - {}",
				error_detail(&body)
			)));
		}

		let auth: AuthenticateResponse = response
			.json()
			.await
			.map_err(|e| SessionError::InvalidResponse(format!("authentication response: {e}")))?;
		info!("authenticated");

		Ok(Self {
			base_url,
			http,
			token: auth.data.meta.access_token,
		})
	}
}

#[async_trait]
impl UserSession for RestSession {
	#[instrument(skip_all, fields(username = %user.username(), mode = %mode))]
	async fn create_user(
		&self,
		user: &ParsedUserRecord,
		mode: CreateMode,
	) -> Result<(), SessionError> {
		let mut url = endpoint(&self.base_url, "api/users")?;
		if mode.emails_password() {
			url.query_pairs_mut().append_pair("emailPassword", "true");
		}

		let response = self
			.http
			.post(url)
			.bearer_auth(self.token.expose())
			.json(&CreateUserRequest::new(user))
			.send()
			.await
			.map_err(transport_error)?;

		if !response.status().is_success() {
			let status = response.status();
			let body = response.text().await.unwrap_or_default();
			debug!(status = %status, "create user rejected");
			return Err(SessionError::Rejected {
				status: status.as_u16(),
				detail: error_detail(&body),
			});
		}

		Ok(())
	}
}

/// Parses the server URL, keeping any path prefix for relative joins.
fn parse_base_url(host: &str) -> Result<Url, SessionError> {
	let normalized = format!("{}/", host.trim_end_matches('/'));
	let url =
		Url::parse(&normalized).map_err(|e| SessionError::InvalidUrl(format!("{host}: {e}")))?;
	match url.scheme() {
		"http" | "https" => Ok(url),
		other => Err(SessionError::InvalidUrl(format!(
			"{host}: unsupported scheme {other}"
		))),
	}
}

fn endpoint(base_url: &Url, path: &str) -> Result<Url, SessionError> {
	base_url
		.join(path)
		.map_err(|e| SessionError::InvalidUrl(format!("{base_url}{path}: {e}")))
}

fn transport_error(err: reqwest::Error) -> SessionError {
	SessionError::Transport(err.to_string())
}
