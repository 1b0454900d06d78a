use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::{config::FetcherConfig, FetchError, RemoteDrawResult};

use super::Transport;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A transport issuing HTTP `GET` requests.
///
/// Transient failures are retried with exponential backoff up to
/// [`FetcherConfig::get_transport_retries`] times, which defaults to zero. Any non-success
/// status is reported as [`FetchError::Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// The HTTP client used to make requests.
    client: ClientWithMiddleware,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl HttpTransport {
    /// Creates a new HTTP transport from the user agent, connect timeout and retry settings of
    /// `config`.
    pub fn new(config: &FetcherConfig) -> RemoteDrawResult<Self> {
        let client = Client::builder()
            .user_agent(config.get_user_agent())
            .connect_timeout(config.connect_timeout())
            .build()?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(*config.get_transport_retries());
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client })
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, identifier: &str) -> Result<Bytes, FetchError> {
        let response = self.client.get(identifier).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!(
                "{identifier} responded with status {status}"
            )));
        }

        Ok(response.bytes().await?)
    }
}
