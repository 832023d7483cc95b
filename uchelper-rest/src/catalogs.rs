use std::collections::HashMap;

use uchelper_models::{name::validate_identifier, Catalog};

use crate::{
    client::{force_param, UnityCatalogApi},
    error::RestError,
    response,
};

const CATALOGS_ENDPOINT: &str = "/catalogs";
const NOT_EMPTY_MESSAGE: &str = "Cannot delete catalog with schemas";

#[derive(serde::Serialize)]
struct CreateCatalog<'a> {
    name: &'a str,
    comment: Option<&'a str>,
    properties: &'a HashMap<String, String>,
}

#[derive(serde::Serialize)]
struct UpdateCatalog<'a> {
    new_name: Option<&'a str>,
    comment: Option<&'a str>,
    properties: &'a HashMap<String, String>,
}

impl UnityCatalogApi {
    /// Creates a catalog from the name, comment and properties of `catalog`.
    pub async fn create_catalog(&self, catalog: &Catalog) -> Result<Catalog, RestError> {
        validate_identifier("catalog", &catalog.name)?;
        tracing::debug!("Creating catalog {}", catalog.name);

        let body = CreateCatalog {
            name: &catalog.name,
            comment: catalog.comment.as_deref(),
            properties: &catalog.properties,
        };
        let response = self
            .client()
            .post(self.endpoint(CATALOGS_ENDPOINT))
            .json(&body)
            .send()
            .await?;
        response::decode(response).await
    }

    /// Deletes a catalog. Without `force` only an empty catalog is deleted.
    ///
    /// Returns whether the catalog was deleted.
    pub async fn delete_catalog(&self, name: &str, force: bool) -> Result<bool, RestError> {
        validate_identifier("catalog", name)?;
        tracing::debug!("Deleting catalog {} (force: {})", name, force);

        let response = self
            .client()
            .delete(self.resource_url(CATALOGS_ENDPOINT, name)?)
            .query(&force_param(force))
            .send()
            .await?;

        match response::check(response).await {
            Ok(_) => Ok(true),
            Err(RestError::Server { message, .. }) if message.contains(NOT_EMPTY_MESSAGE) => {
                tracing::warn!("Catalog {} is not empty, not deleting", name);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list_catalogs(&self) -> Result<Vec<Catalog>, RestError> {
        self.list_paged(CATALOGS_ENDPOINT, &[], "catalogs").await
    }

    pub async fn get_catalog(&self, name: &str) -> Result<Catalog, RestError> {
        validate_identifier("catalog", name)?;
        let response = self
            .client()
            .get(self.resource_url(CATALOGS_ENDPOINT, name)?)
            .send()
            .await?;
        response::decode(response).await
    }

    /// Updates the name, comment and properties of catalog `name` from `catalog`.
    pub async fn update_catalog(&self, name: &str, catalog: &Catalog) -> Result<Catalog, RestError> {
        validate_identifier("catalog", name)?;
        validate_identifier("catalog", &catalog.name)?;
        tracing::debug!("Updating catalog {}", name);

        let body = UpdateCatalog {
            new_name: (catalog.name != name).then_some(catalog.name.as_str()),
            comment: catalog.comment.as_deref(),
            properties: &catalog.properties,
        };
        let response = self
            .client()
            .patch(self.resource_url(CATALOGS_ENDPOINT, name)?)
            .json(&body)
            .send()
            .await?;
        response::decode(response).await
    }
}
