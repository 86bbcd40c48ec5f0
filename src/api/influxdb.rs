pub mod point;

use std::time::Duration;

use reqwest::{
    Url,
    header::{self, HeaderMap, HeaderValue},
};

use self::point::Point;
use crate::{cli::InfluxDbArgs, prelude::*};

/// Thin client for the InfluxDB 2.x [write API](https://docs.influxdata.com/influxdb/v2/api/#operation/PostWrite).
pub struct Client {
    inner: reqwest::Client,
    write_url: Url,
}

impl Client {
    pub fn new(args: InfluxDbArgs, timeout: Duration) -> Result<Self> {
        let mut token = HeaderValue::from_str(&format!("Token {}", args.token))
            .context("the store token is not a valid header value")?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, token);
        let inner = reqwest::Client::builder()
            .user_agent("envoy-logger")
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let mut write_url =
            args.url.join("api/v2/write").context("failed to build the write URL")?;
        write_url
            .query_pairs_mut()
            .append_pair("org", &args.org)
            .append_pair("bucket", &args.bucket)
            .append_pair("precision", "s");

        Ok(Self { inner, write_url })
    }

    /// Write one batch of points.
    ///
    /// The batch is serialized as one request body, so the store sees all
    /// points of a tick or none of them.
    #[instrument(skip_all, fields(n_points = points.len()))]
    pub async fn write_batch(&self, points: &[Point]) -> Result {
        let body =
            points.iter().map(Point::to_line_protocol).collect::<Vec<String>>().join("\n");
        let response = self
            .inner
            .post(self.write_url.clone())
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .context("failed to reach the time-series store")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("the time-series store rejected the batch ({status}): {body}");
        }
        debug!(n_points = points.len(), "written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_url_ok() -> Result {
        let client = Client::new(
            InfluxDbArgs {
                url: Url::parse("http://localhost:8086/")?,
                token: "secret".to_string(),
                org: "home".to_string(),
                bucket: "power meter".to_string(),
            },
            Duration::from_secs(10),
        )?;
        assert_eq!(
            client.write_url.as_str(),
            "http://localhost:8086/api/v2/write?org=home&bucket=power+meter&precision=s",
        );
        Ok(())
    }
}
