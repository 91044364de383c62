use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use pa_core::ids::{LobbyId, PairId};
use pa_core::pairing::{NewUserPair, UserPair, UserSession};
use pa_core::ports::{PairingStorePort, StoreError};
use pa_core::UserCode;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::rows::{IdOnlyRow, MarkPairedPatch, NewUserPairRow, UserPairRow, UserSessionRow};

const SESSIONS_TABLE: &str = "user_sessions";
const PAIRS_TABLE: &str = "user_pairs";

/// `user_sessions` / `user_pairs` over a PostgREST endpoint
/// (`{backend_url}/rest/v1/`), authenticated with the anon key.
pub struct PostgrestPairingStore {
    client: reqwest::Client,
    rest_base: Url,
    anon_key: String,
}

fn map_reqwest_error(err: reqwest::Error) -> StoreError {
    if err.is_decode() {
        StoreError::Decode(err.to_string())
    } else if let Some(status) = err.status() {
        StoreError::Status {
            status: status.as_u16(),
            body: err.to_string(),
        }
    } else {
        StoreError::Request(err.to_string())
    }
}

impl PostgrestPairingStore {
    pub fn new(backend_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, StoreError> {
        let mut base = Url::parse(backend_url.trim())
            .map_err(|e| StoreError::Request(format!("invalid backend url {backend_url:?}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_base = base
            .join("rest/v1/")
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            client,
            rest_base,
            anon_key: anon_key.to_string(),
        })
    }

    fn table_url(&self, table: &str, query: &[(&str, String)]) -> Result<Url, StoreError> {
        let mut url = self
            .rest_base
            .join(table)
            .map_err(|e| StoreError::Request(e.to_string()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), %body, "store request rejected");
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn rows<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Vec<T>, StoreError> {
        let response = self.send(builder).await?;
        response.json::<Vec<T>>().await.map_err(map_reqwest_error)
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// `in.("A","B")`; quoting keeps the hyphens inside one literal.
fn in_list(codes: &[UserCode]) -> String {
    let quoted: Vec<String> = codes.iter().map(|c| format!("\"{c}\"")).collect();
    format!("in.({})", quoted.join(","))
}

#[async_trait]
impl PairingStorePort for PostgrestPairingStore {
    async fn upsert_session(&self, session: &UserSession) -> Result<(), StoreError> {
        let url = self.table_url(SESSIONS_TABLE, &[("on_conflict", "user_code".to_string())])?;
        let body = vec![UserSessionRow::from(session)];
        self.send(
            self.request(Method::POST, url)
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(&body),
        )
        .await?;
        debug!(code = %session.code, "session upserted");
        Ok(())
    }

    async fn find_session_by_code(
        &self,
        code: &UserCode,
    ) -> Result<Option<UserSession>, StoreError> {
        let url = self.table_url(
            SESSIONS_TABLE,
            &[
                ("user_code", eq(code.as_str())),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ],
        )?;
        let rows: Vec<UserSessionRow> = self.rows(self.request(Method::GET, url)).await?;
        Ok(rows.into_iter().next().map(UserSession::from))
    }

    async fn insert_pair(&self, pair: &NewUserPair) -> Result<UserPair, StoreError> {
        let url = self.table_url(PAIRS_TABLE, &[])?;
        let rows: Vec<UserPairRow> = self
            .rows(
                self.request(Method::POST, url)
                    .header("Prefer", "return=representation")
                    .json(&NewUserPairRow::from(pair)),
            )
            .await?;
        rows.into_iter()
            .next()
            .map(UserPair::from)
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))
    }

    async fn mark_sessions_paired(
        &self,
        codes: &[UserCode],
        pair_id: &PairId,
    ) -> Result<(), StoreError> {
        if codes.is_empty() {
            return Ok(());
        }
        let url = self.table_url(SESSIONS_TABLE, &[("user_code", in_list(codes))])?;
        let patch = MarkPairedPatch {
            is_paired: true,
            pair_id: pair_id.as_str(),
        };
        self.send(
            self.request(Method::PATCH, url)
                .header("Prefer", "return=minimal")
                .json(&patch),
        )
        .await?;
        Ok(())
    }

    async fn delete_pair(&self, pair_id: &PairId) -> Result<(), StoreError> {
        let url = self.table_url(PAIRS_TABLE, &[("id", eq(pair_id.as_str()))])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn find_pair_by_lobby(&self, lobby_id: &LobbyId) -> Result<Option<UserPair>, StoreError> {
        let url = self.table_url(
            PAIRS_TABLE,
            &[
                ("lobby_id", eq(lobby_id.as_str())),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ],
        )?;
        let rows: Vec<UserPairRow> = self.rows(self.request(Method::GET, url)).await?;
        Ok(rows.into_iter().next().map(UserPair::from))
    }

    async fn delete_sessions_expired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let url = self.table_url(
            SESSIONS_TABLE,
            &[
                (
                    "expires_at",
                    format!("lt.{}", cutoff.to_rfc3339_opts(SecondsFormat::Millis, true)),
                ),
                ("select", "id".to_string()),
            ],
        )?;
        let deleted: Vec<IdOnlyRow> = self
            .rows(
                self.request(Method::DELETE, url)
                    .header("Prefer", "return=representation"),
            )
            .await?;
        Ok(deleted.len() as u64)
    }
}
