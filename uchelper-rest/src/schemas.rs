use std::collections::HashMap;

use uchelper_models::{name::validate_identifier, Schema, SchemaName};

use crate::{
    client::{force_param, UnityCatalogApi},
    error::RestError,
    response,
};

const SCHEMAS_ENDPOINT: &str = "/schemas";
const NOT_EMPTY_MESSAGE: &str = "Cannot delete schema with tables";

#[derive(serde::Serialize)]
struct CreateSchema<'a> {
    name: &'a str,
    catalog_name: &'a str,
    comment: Option<&'a str>,
    properties: &'a HashMap<String, String>,
}

#[derive(serde::Serialize)]
struct UpdateSchema<'a> {
    comment: Option<&'a str>,
    properties: &'a HashMap<String, String>,
    new_name: Option<&'a str>,
}

impl UnityCatalogApi {
    pub async fn create_schema(&self, schema: &Schema) -> Result<Schema, RestError> {
        let full_name = SchemaName::new(&schema.catalog_name, &schema.name)?;
        tracing::debug!("Creating schema {}", full_name);

        let body = CreateSchema {
            name: &schema.name,
            catalog_name: &schema.catalog_name,
            comment: schema.comment.as_deref(),
            properties: &schema.properties,
        };
        let response = self
            .client()
            .post(self.endpoint(SCHEMAS_ENDPOINT))
            .json(&body)
            .send()
            .await?;
        response::decode(response).await
    }

    /// Deletes a schema. Without `force` only a schema without tables is deleted.
    ///
    /// Returns whether the schema was deleted.
    pub async fn delete_schema(
        &self,
        catalog: &str,
        schema: &str,
        force: bool,
    ) -> Result<bool, RestError> {
        let full_name = SchemaName::new(catalog, schema)?;
        tracing::debug!("Deleting schema {} (force: {})", full_name, force);

        let response = self
            .client()
            .delete(self.resource_url(SCHEMAS_ENDPOINT, &full_name.to_string())?)
            .query(&force_param(force))
            .send()
            .await?;

        match response::check(response).await {
            Ok(_) => Ok(true),
            Err(RestError::Server { message, .. }) if message.contains(NOT_EMPTY_MESSAGE) => {
                tracing::warn!("Schema {} has tables, not deleting", full_name);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_schema(&self, catalog: &str, schema: &str) -> Result<Schema, RestError> {
        let full_name = SchemaName::new(catalog, schema)?;
        let response = self
            .client()
            .get(self.resource_url(SCHEMAS_ENDPOINT, &full_name.to_string())?)
            .send()
            .await?;
        response::decode(response).await
    }

    pub async fn list_schemas(&self, catalog: &str) -> Result<Vec<Schema>, RestError> {
        validate_identifier("catalog", catalog)?;
        self.list_paged(SCHEMAS_ENDPOINT, &[("catalog_name", catalog)], "schemas")
            .await
    }

    /// Updates the name, comment and properties of `catalog.schema_name` from `new_schema`.
    pub async fn update_schema(
        &self,
        catalog: &str,
        schema_name: &str,
        new_schema: &Schema,
    ) -> Result<Schema, RestError> {
        let full_name = SchemaName::new(catalog, schema_name)?;
        validate_identifier("schema", &new_schema.name)?;
        tracing::debug!("Updating schema {}", full_name);

        let body = UpdateSchema {
            comment: new_schema.comment.as_deref(),
            properties: &new_schema.properties,
            new_name: (new_schema.name != schema_name).then_some(new_schema.name.as_str()),
        };
        let response = self
            .client()
            .patch(self.resource_url(SCHEMAS_ENDPOINT, &full_name.to_string())?)
            .json(&body)
            .send()
            .await?;
        response::decode(response).await
    }
}
