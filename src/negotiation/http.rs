use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::info;

use super::messages::{
    CancelDraftRequest, CancelDraftResponse, CreateSessionRequest, EndSessionRequest,
    EndSessionResponse, JoinSessionRequest, SessionResponse,
};
use super::types::{
    EndMetadata, FinalizeAck, JoinCredential, Role, SessionGrant, StartParams,
};
use super::{DraftService, SessionNegotiator};

/// Coordination service client over HTTP.
///
/// One instance is shared by all controllers talking to the same service.
/// Every call is a single attempt; the caller owns retries and deadlines.
pub struct HttpSessionService {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl HttpSessionService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Attach a bearer token sent with every request
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp>
    where
        Req: serde::Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .with_context(|| format!("Failed to reach coordination service at {}", path))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Coordination service error {} on {}: {}", status, path, body);
        }

        resp.json::<Resp>()
            .await
            .with_context(|| format!("Failed to decode coordination service response from {}", path))
    }

    fn grant_from_response(resp: SessionResponse, role: Role) -> SessionGrant {
        let credential = JoinCredential {
            session_id: resp.session.id.clone(),
            role,
            token: resp.token,
            transport_url: resp.url,
            issued_at: Utc::now(),
        };

        SessionGrant {
            session: resp.session,
            credential,
        }
    }
}

#[async_trait::async_trait]
impl SessionNegotiator for HttpSessionService {
    async fn create_session(&self, params: &StartParams) -> Result<SessionGrant> {
        info!("Requesting new session (title={:?})", params.title);

        let req = CreateSessionRequest {
            topic_id: params.topic_id.clone(),
            title: params.title.clone(),
        };

        let resp: SessionResponse = self
            .post_json("/v1/sessions", &req)
            .await
            .context("Create session request failed")?;

        info!("Session {} created in room {}", resp.session.id, resp.session.room);

        Ok(Self::grant_from_response(resp, Role::Host))
    }

    async fn join_session(&self, session_id: &str, role: Role) -> Result<SessionGrant> {
        info!("Requesting join credential for session {} as {}", session_id, role.as_str());

        let req = JoinSessionRequest {
            session_id: session_id.to_string(),
            role,
        };

        let resp: SessionResponse = self
            .post_json("/v1/sessions/join", &req)
            .await
            .context("Join session request failed")?;

        Ok(Self::grant_from_response(resp, role))
    }

    async fn finalize(&self, session_id: &str, metadata: &EndMetadata) -> Result<FinalizeAck> {
        info!("Finalizing session {}", session_id);

        let req = EndSessionRequest {
            recording_key: metadata.recording_key.clone(),
            duration_seconds: metadata.duration_seconds,
        };

        let resp: EndSessionResponse = self
            .post_json(&format!("/v1/sessions/{}/end", session_id), &req)
            .await
            .context("End session request failed")?;

        Ok(FinalizeAck {
            status: resp.status,
            ended_at: resp.ended_at,
        })
    }
}

#[async_trait::async_trait]
impl DraftService for HttpSessionService {
    async fn cancel_draft(&self, resource_id: &str) -> Result<()> {
        info!("Cancelling draft resource {}", resource_id);

        let req = CancelDraftRequest {
            resource_id: resource_id.to_string(),
        };

        let _resp: CancelDraftResponse = self
            .post_json("/v1/drafts/cancel", &req)
            .await
            .context("Cancel draft request failed")?;

        Ok(())
    }
}
