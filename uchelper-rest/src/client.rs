use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::RestError;

const HEALTH_CHECK_GREETING: &str = "Hello, Unity Catalog!";

/// Handle on a Unity Catalog server. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UnityCatalogApi {
    base_url: String,
    client: Client,
}

impl UnityCatalogApi {
    pub fn new(uc_url: &str) -> Result<Self, RestError> {
        Self::with_timeout(
            uc_url,
            Duration::from_secs(uchelper_config::CONFIG.request_timeout_secs),
        )
    }

    pub fn with_timeout(uc_url: &str, timeout: Duration) -> Result<Self, RestError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: uc_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, uchelper_config::API_PATH, path)
    }

    /// Endpoint of the resource `name` under `path`. `name` is percent-encoded as one segment.
    pub(crate) fn resource_url(&self, path: &str, name: &str) -> Result<Url, RestError> {
        let mut url = Url::parse(&self.endpoint(path)).map_err(|e| {
            RestError::InvalidArgument(format!("Invalid Unity Catalog URL {}: {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                RestError::InvalidArgument(format!(
                    "Unity Catalog URL {} cannot be a base",
                    self.base_url
                ))
            })?
            .push(name);
        Ok(url)
    }

    /// Checks that Unity Catalog is running at the configured address.
    pub async fn health_check(&self) -> Result<bool, RestError> {
        let response = match self.client.get(&self.base_url).send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() => {
                tracing::debug!("Unity Catalog is not reachable: {}", e);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        if !response.status().is_success() {
            return Ok(false);
        }

        Ok(response.text().await?.contains(HEALTH_CHECK_GREETING))
    }
}

pub(crate) fn force_param(force: bool) -> [(&'static str, &'static str); 1] {
    // The server only understands lowercase booleans.
    [("force", if force { "true" } else { "false" })]
}
