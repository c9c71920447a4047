//! REST API client for one record collection.
//!
//! Wraps the collection endpoints (list, create, update, delete) using
//! [`reqwest`]. Create and update send `multipart/form-data` with one text
//! part per schema field and an optional binary `image` part.

use std::time::Duration;

use catalog_core::form::Submission;
use catalog_core::record::WireRecord;
use catalog_core::schema::RecordSchema;
use catalog_core::types::RecordId;
use reqwest::multipart::{Form, Part};
use reqwest::Url;

/// Multipart part name carrying the image file.
pub const IMAGE_PART: &str = "image";

/// HTTP client for a single remote collection.
#[derive(Debug, Clone)]
pub struct CatalogApi {
    client: reqwest::Client,
    collection_url: Url,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The configured base URL cannot address a collection.
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Catalog API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl CatalogApi {
    /// Create a client for `schema`'s collection under `base_url`.
    ///
    /// * `base_url` - API root, e.g. `http://host:3000/api`.
    /// * `timeout`  - per-request timeout.
    pub fn new(
        base_url: &str,
        schema: &RecordSchema,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url, schema)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        schema: &RecordSchema,
    ) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let mut collection_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        collection_url
            .path_segments_mut()
            .map_err(|_| invalid("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(schema.collection);

        Ok(Self {
            client,
            collection_url,
        })
    }

    /// Full URL of the collection endpoint.
    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    /// Fetch every record: `GET /<collection>`.
    pub async fn list(&self) -> Result<Vec<WireRecord>, ApiError> {
        tracing::debug!(url = %self.collection_url, "Listing records");
        let response = self.client.get(self.collection_url.clone()).send().await?;
        Self::read_records(response).await
    }

    /// Create a record: `POST /<collection>` with a multipart body.
    pub async fn create(&self, submission: &Submission) -> Result<WireRecord, ApiError> {
        tracing::debug!(url = %self.collection_url, "Creating record");
        let response = self
            .client
            .post(self.collection_url.clone())
            .multipart(Self::multipart_form(submission)?)
            .send()
            .await?;

        Self::read_records(response).await
    }

    /// Replace a record: `PUT /<collection>/<id>` with a multipart body.
    ///
    /// Without a staged image no `image` part is sent and the server keeps
    /// the stored one.
    pub async fn update(
        &self,
        id: &RecordId,
        submission: &Submission,
    ) -> Result<WireRecord, ApiError> {
        let url = self.record_url(id)?;
        tracing::debug!(url = %url, "Updating record");
        let response = self
            .client
            .put(url)
            .multipart(Self::multipart_form(submission)?)
            .send()
            .await?;

        Self::read_records(response).await
    }

    /// Delete a record: `DELETE /<collection>/<id>`. The response body is
    /// ignored.
    pub async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        let url = self.record_url(id)?;
        tracing::debug!(url = %url, "Deleting record");
        let response = self.client.delete(url).send().await?;

        Self::confirm_deleted(response).await
    }

    // ---- private helpers ----

    /// URL of a single record, with `id` percent-encoded as one path segment.
    fn record_url(&self, id: &RecordId) -> Result<Url, ApiError> {
        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl {
                url: self.collection_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .push(id.as_str());
        Ok(url)
    }

    /// Build the multipart body: one text part per field, in schema order,
    /// plus the image file if one is staged.
    fn multipart_form(submission: &Submission) -> Result<Form, ApiError> {
        let mut form = submission
            .fields
            .iter()
            .fold(Form::new(), |form, (name, value)| {
                form.text(*name, value.clone())
            });

        if let Some(upload) = &submission.image {
            let part = Part::bytes(upload.bytes.clone())
                .file_name(upload.file_name.clone())
                .mime_str(&upload.content_type)?;
            form = form.part(IMAGE_PART, part);
        }

        Ok(form)
    }

    /// Turn a non-2xx reply from the catalog server into
    /// [`ApiError::ApiError`], carrying the server's message (Express sends
    /// plain text or a JSON `{ message }`) trimmed of surrounding whitespace.
    async fn reject_failure(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(text) => text.trim().to_string(),
            Err(_) => "<unreadable body>".to_string(),
        };
        tracing::debug!(status = status.as_u16(), body = %body, "Catalog API rejected request");
        Err(ApiError::ApiError {
            status: status.as_u16(),
            body,
        })
    }

    /// Decode the record (or record list) a list, create or update returned.
    async fn read_records<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::reject_failure(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Delete replies with a confirmation message nobody reads.
    async fn confirm_deleted(response: reqwest::Response) -> Result<(), ApiError> {
        Self::reject_failure(response).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
