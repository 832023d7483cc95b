use serde::de::DeserializeOwned;

use crate::{client::UnityCatalogApi, error::RestError, response};

impl UnityCatalogApi {
    /// Collects every page of a list endpoint. `key` names the array field of each page.
    pub(crate) async fn list_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        key: &str,
    ) -> Result<Vec<T>, RestError> {
        let mut items = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut request = self.client().get(self.endpoint(path)).query(query);
            if let Some(token) = &token {
                request = request.query(&[("page_token", token.as_str())]);
            }
            let mut page: serde_json::Map<String, serde_json::Value> =
                response::decode(request.send().await?).await?;

            if let Some(values) = page.remove(key) {
                if !values.is_null() {
                    let values: Vec<T> = serde_json::from_value(values).map_err(|e| {
                        RestError::InvalidResponse(format!("Failed to decode {key}: {e}"))
                    })?;
                    items.extend(values);
                }
            }

            // The token should be null on the last page, but some endpoints send "".
            token = page
                .remove("next_page_token")
                .and_then(|t| t.as_str().map(str::to_string))
                .filter(|t| !t.is_empty());
            if token.is_none() {
                break;
            }
            tracing::debug!("Fetching next page of {}", path);
        }

        Ok(items)
    }
}
