mod report;

use std::time::Duration;

use reqwest::{StatusCode, Url, header};

use self::report::ProductionReport;
use crate::{cli::EnvoyArgs, core::sample::SampleData, prelude::*};

/// Client for the local API of the Envoy gateway.
///
/// The long-lived owner token is exchanged for a short-lived session once at
/// startup; the session is refreshed transparently when the gateway reports
/// it expired, at most once per fetch.
pub struct Client {
    inner: reqwest::Client,
    base_url: Url,
    token: String,
    session_id: Option<String>,
}

impl Client {
    pub fn new(args: EnvoyArgs, timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent("envoy-logger")
            .timeout(timeout)
            // The gateway usually serves a self-signed certificate on the LAN.
            .danger_accept_invalid_certs(args.accept_invalid_certs)
            .build()?;
        Ok(Self { inner, base_url: args.url, token: args.token, session_id: None })
    }

    /// Exchange the owner token for a local session.
    #[instrument(skip_all)]
    pub async fn login(&mut self) -> Result {
        info!("logging in…");
        let response = self
            .inner
            .get(self.base_url.join("auth/check_jwt")?)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("failed to reach the gateway")?
            .error_for_status()
            .context("the gateway rejected the owner token")?;
        self.session_id = Some(session_id_from(response.headers())?);
        Ok(())
    }

    /// Fetch one power snapshot, re-authenticating once if the session expired.
    #[instrument(skip_all)]
    pub async fn fetch_sample(&mut self) -> Result<SampleData> {
        match self.get_report().await? {
            Fetched::Report(report) => report.try_into(),
            Fetched::SessionExpired => {
                warn!("session expired, re-authenticating…");
                self.login().await?;
                match self.get_report().await? {
                    Fetched::Report(report) => report.try_into(),
                    Fetched::SessionExpired => bail!("still unauthorized after a fresh login"),
                }
            }
        }
    }

    async fn get_report(&self) -> Result<Fetched> {
        let response = self
            .inner
            .get(self.base_url.join("production.json")?)
            .query(&[("details", "1")])
            .header(header::COOKIE, self.session_cookie()?)
            .send()
            .await
            .context("failed to request the production report")?;
        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Ok(Fetched::SessionExpired);
        }
        let report = response
            .error_for_status()
            .context("the gateway failed to produce a report")?
            .json::<ProductionReport>()
            .await
            .context("failed to deserialize the production report")?;
        Ok(Fetched::Report(report))
    }

    fn session_cookie(&self) -> Result<String> {
        let session_id = self.session_id.as_deref().context("not logged in")?;
        Ok(format!("sessionId={session_id}"))
    }
}

enum Fetched {
    Report(ProductionReport),
    SessionExpired,
}

fn session_id_from(headers: &header::HeaderMap) -> Result<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .find_map(|pair| pair.trim().strip_prefix("sessionId="))
        .map(ToOwned::to_owned)
        .context("no session cookie in the login response")
}
