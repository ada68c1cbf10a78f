use crate::HeartBeat;
use anyhow::Result;
use std::future::Future;

/// Delivers one heartbeat and hands back the raw response body.
///
/// `Err` means no body was produced at all. HTTP error statuses still yield
/// `Ok(body)` so the caller can read the server's error field.
pub trait HeartBeatTransport: Send + Sync + 'static {
    fn post(&self, heartbeat: HeartBeat) -> impl Future<Output = Result<String>> + Send + '_;
}

pub mod http {
    use super::*;
    use anyhow::Context as _;
    use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
    use reqwest::Client;

    pub const DEFAULT_API_URL: &str = "https://api.wakatime.com/api/v1";

    #[derive(Clone)]
    pub struct HttpTransport {
        client: Client,
        endpoint: String,
    }

    impl HttpTransport {
        const MACHINE_NAME_HEADER: &'static str = "x-machine-name";

        pub fn new(api_url: &str, api_key: &str, user_agent: &str, machine_name: &str) -> Result<Self> {
            let endpoint = format!(
                "{}/users/current/heartbeats?api_key={}",
                api_url.trim_end_matches('/'),
                urlencoding::encode(api_key)
            );

            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            headers.insert(
                USER_AGENT,
                HeaderValue::from_str(user_agent).context("user agent is not a valid header value")?,
            );
            headers.insert(
                Self::MACHINE_NAME_HEADER,
                HeaderValue::from_str(&urlencoding::encode(machine_name))
                    .context("machine name is not a valid header value")?,
            );

            let basic = format!("Basic {}", base64::encode(api_key.as_bytes()));
            let mut basic = HeaderValue::from_str(&basic).context("api key is not a valid header value")?;
            basic.set_sensitive(true);
            headers.insert(AUTHORIZATION, basic);

            let client = Client::builder()
                .default_headers(headers)
                .build()
                .context("failed to create http client")?;

            Ok(Self { client, endpoint })
        }
    }

    impl HeartBeatTransport for HttpTransport {
        fn post(&self, heartbeat: HeartBeat) -> impl Future<Output = Result<String>> + Send + '_ {
            async move {
                let response = self
                    .client
                    .post(&self.endpoint)
                    .json(&heartbeat)
                    .send()
                    .await
                    .context("failed to send heartbeat")?;

                tracing::trace!("heartbeat endpoint answered {}", response.status());

                response
                    .text()
                    .await
                    .context("failed to read heartbeat response")
            }
        }
    }
}
