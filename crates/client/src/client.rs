//! Stateful catalog client.
//!
//! [`CatalogClient`] owns the local collection and the form state for one
//! schema. Local state changes only after the server confirms a request; on
//! any failure the error is logged, returned, and both stay untouched.

use catalog_core::collection::LocalCollection;
use catalog_core::error::CoreError;
use catalog_core::form::{FormState, SubmitTarget};
use catalog_core::image::ImageUpload;
use catalog_core::record::{decode_records, Record};
use catalog_core::schema::RecordSchema;
use catalog_core::types::RecordId;
use catalog_core::view::{derive_view, CatalogView, SortKey};

use crate::api::CatalogApi;
use crate::config::ClientConfig;
use crate::error::ClientResult;

pub struct CatalogClient {
    api: CatalogApi,
    schema: &'static RecordSchema,
    collection: LocalCollection,
    form: FormState,
    reload_after_submit: bool,
}

impl CatalogClient {
    /// Create a client with an empty collection and an idle form.
    pub fn new(api: CatalogApi, schema: &'static RecordSchema) -> Self {
        Self {
            api,
            schema,
            collection: LocalCollection::new(),
            form: FormState::new(schema),
            reload_after_submit: false,
        }
    }

    /// Build the API layer and client from a loaded configuration.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let api = CatalogApi::new(&config.api_url, config.schema, config.request_timeout)?;
        Ok(Self::new(api, config.schema).with_reload_after_submit(config.reload_after_submit))
    }

    /// Refetch the whole collection after each successful submit.
    pub fn with_reload_after_submit(mut self, enabled: bool) -> Self {
        self.reload_after_submit = enabled;
        self
    }

    pub fn schema(&self) -> &'static RecordSchema {
        self.schema
    }

    pub fn collection(&self) -> &LocalCollection {
        &self.collection
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    // ---- remote operations ----

    /// Replace the local collection with the server's.
    ///
    /// Images are transcoded to inline URIs before storage. On failure the
    /// previous collection is kept. Returns the number of records loaded.
    pub async fn load_all(&mut self) -> ClientResult<usize> {
        let wire = match self.api.list().await {
            Ok(wire) => wire,
            Err(e) => {
                tracing::error!(collection = self.schema.collection, error = %e, "Failed to fetch records");
                return Err(e.into());
            }
        };

        let records = match decode_records(self.schema, wire) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(collection = self.schema.collection, error = %e, "Failed to decode records");
                return Err(e.into());
            }
        };

        self.collection.replace_all(records);
        tracing::info!(
            collection = self.schema.collection,
            count = self.collection.len(),
            "Records loaded",
        );
        Ok(self.collection.len())
    }

    /// Create or update from the current form.
    ///
    /// Validation runs first and no request is sent if it fails. On success
    /// the returned record is merged into the collection (replacing the
    /// edited record, or appended for a create) and the form is reset.
    /// Returns the identifier of the stored record.
    pub async fn submit(&mut self) -> ClientResult<RecordId> {
        let submission = match self.form.to_submission() {
            Ok(submission) => submission,
            Err(e) => {
                tracing::warn!(collection = self.schema.collection, error = %e, "Form rejected");
                return Err(e.into());
            }
        };

        let response = match &submission.target {
            SubmitTarget::Create => self.api.create(&submission).await,
            SubmitTarget::Update(id) => self.api.update(id, &submission).await,
        };
        let wire = match response {
            Ok(wire) => wire,
            Err(e) => {
                tracing::error!(collection = self.schema.collection, error = %e, "Failed to submit record");
                return Err(e.into());
            }
        };

        let mut record = match wire.into_record(self.schema) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(collection = self.schema.collection, error = %e, "Failed to decode submitted record");
                return Err(e.into());
            }
        };

        if let SubmitTarget::Update(id) = &submission.target {
            if record.image.is_none() && submission.image.is_none() {
                record.image = self.collection.get(id).and_then(|r| r.image.clone());
            }
        }

        let id = record.id.clone();
        match self.collection.upsert(record) {
            Some(_) => tracing::info!(collection = self.schema.collection, id = %id, "Record updated"),
            None => tracing::info!(collection = self.schema.collection, id = %id, "Record created"),
        }
        self.form.reset();

        if self.reload_after_submit {
            if let Err(e) = self.load_all().await {
                tracing::warn!(error = %e, "Reload after submit failed; keeping merged record");
            }
        }

        Ok(id)
    }

    /// Delete a record on the server, then drop it locally.
    ///
    /// If the form was editing that record it is reset as well.
    pub async fn remove(&mut self, id: &RecordId) -> ClientResult<()> {
        if let Err(e) = self.api.delete(id).await {
            tracing::error!(collection = self.schema.collection, id = %id, error = %e, "Failed to delete record");
            return Err(e.into());
        }

        self.collection.remove(id);
        if self.form.editing_id() == Some(id) {
            self.form.reset();
        }
        tracing::info!(collection = self.schema.collection, id = %id, "Record deleted");
        Ok(())
    }

    // ---- form operations ----

    /// Start editing the local record with `id`.
    pub fn begin_edit(&mut self, id: &RecordId) -> ClientResult<()> {
        let record = self
            .collection
            .get(id)
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        self.form.begin_edit(record);
        Ok(())
    }

    /// Discard the form and return to creating a new record.
    pub fn cancel_edit(&mut self) {
        self.form.reset();
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> ClientResult<()> {
        self.form.set_field(name, value)?;
        Ok(())
    }

    pub fn select_image(&mut self, upload: ImageUpload) {
        self.form.select_image(upload);
    }

    // ---- view ----

    /// Filtered and optionally sorted view of the local collection.
    pub fn view(&self, search: &str, sort: Option<&SortKey>) -> CatalogView<'_> {
        derive_view(self.schema, &self.collection, search, sort)
    }

    /// Look up a local record.
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.collection.get(id)
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("collection_url", &self.api.collection_url().as_str())
            .field("records", &self.collection.len())
            .field("form", &self.form.mode())
            .finish()
    }
}

