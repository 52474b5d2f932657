//! [`SleepIqClient`] over the SleepIQ REST API.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::{ClientError, ClientOutput, SleepIqClient};
use crate::config::SleepIqConfig;
use crate::model::{BedSnapshot, SideSnapshot, Sleeper};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://prod-api.sleepiq.sleepnumber.com/rest";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sleeper id the API uses for an unassigned side.
const NO_SLEEPER: &str = "0";

/// HTTP client for one SleepIQ account.
///
/// Logging in stores a session key (and cookies) reused by the following
/// requests.
pub struct HttpSleepIqClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    session_key: Option<String>,
}

impl HttpSleepIqClient {
    /// Create a client for the production API.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unexpected`] if the HTTP client cannot be built.
    pub fn new(config: &SleepIqConfig) -> Result<Self, ClientError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a client for an alternative API root.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unexpected`] if the HTTP client cannot be built.
    pub fn with_base_url(
        config: &SleepIqConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sleephub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ClientError::Unexpected(Box::new(err)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            session_key: None,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let key = self
            .session_key
            .as_deref()
            .ok_or_else(|| ClientError::Unexpected("not logged in to SleepIQ".into()))?;
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(&[("_k", key)])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Unexpected(
                format!("GET {path} returned {status}").into(),
            ));
        }
        decode(response).await
    }
}

impl SleepIqClient for HttpSleepIqClient {
    async fn login(&mut self, _output: &mut ClientOutput) -> Result<(), ClientError> {
        let response = self
            .http
            .put(format!("{}/login", self.base_url))
            .json(&LoginRequest {
                login: &self.username,
                password: &self.password,
            })
            .send()
            .await
            .map_err(transport)?;

        check_login_status(response.status())?;
        let body: LoginResponse = decode(response).await?;
        tracing::debug!(user_id = %body.user_id, "logged in to SleepIQ");
        self.session_key = Some(body.key);
        Ok(())
    }

    async fn beds_with_sleeper_status(
        &mut self,
        output: &mut ClientOutput,
    ) -> Result<Vec<BedSnapshot>, ClientError> {
        let beds: BedsResponse = self.get("/bed").await?;
        let sleepers: SleepersResponse = self.get("/sleeper").await?;
        let statuses: FamilyStatusResponse = self.get("/bed/familyStatus").await?;
        Ok(join_beds(beds.beds, sleepers.sleepers, statuses.beds, output))
    }
}

fn transport(err: reqwest::Error) -> ClientError {
    ClientError::Connection(Box::new(err))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&body).map_err(|err| ClientError::MalformedResponse(Box::new(err)))
}

fn check_login_status(status: StatusCode) -> Result<(), ClientError> {
    match status {
        StatusCode::UNAUTHORIZED => Err(ClientError::InvalidCredentials {
            reason: "Incorrect username or password".to_string(),
        }),
        StatusCode::FORBIDDEN => Err(ClientError::InvalidCredentials {
            reason: "Account access forbidden".to_string(),
        }),
        status if status.is_success() => Ok(()),
        status => Err(ClientError::Unexpected(
            format!("login returned {status}").into(),
        )),
    }
}

/// Join beds, sleepers and per-side status into snapshots.
///
/// Beds without a status entry are skipped with a notice.
fn join_beds(
    beds: Vec<WireBed>,
    sleepers: Vec<WireSleeper>,
    statuses: Vec<WireBedStatus>,
    output: &mut ClientOutput,
) -> Vec<BedSnapshot> {
    let sleepers: HashMap<String, String> = sleepers
        .into_iter()
        .map(|s| (s.sleeper_id, s.first_name))
        .collect();
    let mut statuses: HashMap<String, WireBedStatus> = statuses
        .into_iter()
        .map(|s| (s.bed_id.clone(), s))
        .collect();

    let mut snapshots = Vec::with_capacity(beds.len());
    for bed in beds {
        let Some(status) = statuses.remove(&bed.bed_id) else {
            output.note(format_args!("no status reported for bed {}, skipping", bed.bed_id));
            continue;
        };
        let left = side_snapshot(&bed.sleeper_left_id, status.left_side, &sleepers, output);
        let right = side_snapshot(&bed.sleeper_right_id, status.right_side, &sleepers, output);
        snapshots.push(BedSnapshot {
            bed_id: bed.bed_id,
            name: bed.name,
            mac_address: bed.mac_address,
            model: bed.model,
            sku: bed.sku,
            generation: bed.generation,
            purchase_date: bed.purchase_date.unwrap_or_default(),
            registration_date: bed.registration_date.unwrap_or_default(),
            size: bed.size,
            left,
            right,
        });
    }
    snapshots
}

fn side_snapshot(
    sleeper_id: &str,
    status: WireSideStatus,
    sleepers: &HashMap<String, String>,
    output: &mut ClientOutput,
) -> Option<SideSnapshot> {
    if sleeper_id.is_empty() || sleeper_id == NO_SLEEPER {
        return None;
    }
    let Some(first_name) = sleepers.get(sleeper_id) else {
        output.note(format_args!("unknown sleeper {sleeper_id}, ignoring side"));
        return None;
    };
    Some(SideSnapshot {
        is_in_bed: status.is_in_bed,
        sleep_number: status.sleep_number,
        alert_id: status.alert_id,
        alert_detailed_message: status.alert_detailed_message,
        sleeper: Sleeper {
            first_name: first_name.clone(),
        },
    })
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    login: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(default)]
    user_id: String,
    key: String,
}

#[derive(Deserialize)]
struct BedsResponse {
    beds: Vec<WireBed>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBed {
    bed_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mac_address: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    sku: String,
    #[serde(default)]
    generation: String,
    #[serde(default)]
    purchase_date: Option<String>,
    #[serde(default)]
    registration_date: Option<String>,
    #[serde(default)]
    size: String,
    #[serde(default)]
    sleeper_left_id: String,
    #[serde(default)]
    sleeper_right_id: String,
}

#[derive(Deserialize)]
struct SleepersResponse {
    sleepers: Vec<WireSleeper>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSleeper {
    sleeper_id: String,
    #[serde(default)]
    first_name: String,
}

#[derive(Deserialize)]
struct FamilyStatusResponse {
    beds: Vec<WireBedStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBedStatus {
    bed_id: String,
    left_side: WireSideStatus,
    right_side: WireSideStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSideStatus {
    is_in_bed: bool,
    sleep_number: i64,
    #[serde(default)]
    alert_id: i64,
    #[serde(default)]
    alert_detailed_message: String,
}
