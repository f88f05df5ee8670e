// ABOUTME: HTTP command channel for the managed cluster run-command API.
// ABOUTME: POSTs runCommand and polls the returned Location until the result is terminal.

use async_trait::async_trait;
use reqwest::header::{LOCATION, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::CommandError;
use super::{CommandChannel, CommandResult, OperationStatus, Submission, TerminalState};
use crate::credential::{Credential, CredentialError};
use crate::types::{ClusterHandle, OperationId};

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_API_VERSION: &str = "2023-10-01";

/// Run-command channel for one cluster, authenticated with an injected credential.
pub struct ArmChannel {
    client: Client,
    endpoint: String,
    api_version: String,
    cluster: ClusterHandle,
    credential: Credential,
}

impl std::fmt::Debug for ArmChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmChannel")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("cluster", &self.cluster)
            .field("credential", &self.credential)
            .finish()
    }
}

#[derive(Serialize)]
struct RunCommandRequest<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

#[derive(Deserialize)]
struct RunCommandResult {
    #[serde(default)]
    properties: Option<CommandResultProperties>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandResultProperties {
    provisioning_state: Option<String>,
    exit_code: Option<i32>,
    logs: Option<String>,
    reason: Option<String>,
}

impl RunCommandResult {
    fn into_status(self) -> OperationStatus {
        let Some(props) = self.properties else {
            return OperationStatus::Running { retry_after: None };
        };

        let state = match props.provisioning_state.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("Succeeded") => TerminalState::Succeeded,
            Some(s) if s.eq_ignore_ascii_case("Failed") || s.eq_ignore_ascii_case("Canceled") => {
                TerminalState::Failed
            }
            _ => return OperationStatus::Running { retry_after: None },
        };

        OperationStatus::Terminal(CommandResult {
            state,
            logs: props.logs.unwrap_or_default(),
            exit_code: props.exit_code,
            reason: props.reason,
        })
    }
}

impl ArmChannel {
    pub fn new(endpoint: impl Into<String>, cluster: ClusterHandle, credential: Credential) -> Self {
        Self::with_client(Client::new(), endpoint, cluster, credential)
    }

    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        cluster: ClusterHandle,
        credential: Credential,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            cluster,
            credential,
        }
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn cluster(&self) -> &ClusterHandle {
        &self.cluster
    }

    fn run_command_url(&self) -> String {
        format!(
            "{}{}/runCommand?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.cluster.id(),
            self.api_version
        )
    }
}

#[async_trait]
impl CommandChannel for ArmChannel {
    async fn submit(
        &self,
        command: &str,
        context: Option<&str>,
    ) -> Result<Submission, CommandError> {
        let token = self.credential.bearer()?;
        let response = self
            .client
            .post(self.run_command_url())
            .bearer_auth(token)
            .json(&RunCommandRequest { command, context })
            .send()
            .await
            .map_err(request_error)?;

        match response.status() {
            StatusCode::OK => match read_result(response).await? {
                OperationStatus::Terminal(result) => Ok(Submission::Finished(result)),
                OperationStatus::Running { .. } => Err(CommandError::Dispatch(
                    "synchronous response without a terminal state".to_string(),
                )),
            },
            StatusCode::ACCEPTED => {
                let retry_after = retry_after(&response);
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| {
                        CommandError::Dispatch(
                            "command accepted without a Location header".to_string(),
                        )
                    })?;
                Ok(Submission::Accepted {
                    operation: OperationId::new(location),
                    retry_after,
                })
            }
            _ => Err(status_error(response).await),
        }
    }

    async fn status(&self, operation: &OperationId) -> Result<OperationStatus, CommandError> {
        let token = self.credential.bearer()?;
        let response = self
            .client
            .get(operation.as_str())
            .bearer_auth(token)
            .send()
            .await
            .map_err(request_error)?;

        match response.status() {
            StatusCode::ACCEPTED => Ok(OperationStatus::Running {
                retry_after: retry_after(&response),
            }),
            StatusCode::OK => read_result(response).await,
            _ => Err(status_error(response).await),
        }
    }
}

async fn read_result(response: Response) -> Result<OperationStatus, CommandError> {
    let result: RunCommandResult =
        response
            .json()
            .await
            .map_err(|e| CommandError::TransportFailure {
                reason: Some(format!("unreadable command result: {e}")),
            })?;
    Ok(result.into_status())
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn request_error(err: reqwest::Error) -> CommandError {
    if err.is_connect() || err.is_timeout() {
        CommandError::Connection(err.to_string())
    } else {
        CommandError::Dispatch(err.to_string())
    }
}

async fn status_error(response: Response) -> CommandError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CredentialError::Rejected(format!("status {status}: {body}")).into()
        }
        _ => CommandError::Dispatch(format!("status {status}: {body}")),
    }
}
