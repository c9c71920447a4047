//! Form state: the staging area for a record being created or edited.
//!
//! The form is a two-state machine. It is [`FormMode::Idle`] when staging a
//! new record and [`FormMode::Editing`] after [`FormState::begin_edit`].
//! Submission and cancellation both return it to `Idle` via
//! [`FormState::reset`]; a failed submission leaves it untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};

use crate::error::{CoreError, ValidationErrors};
use crate::image::{ImageUpload, InlineImage};
use crate::record::Record;
use crate::schema::{FieldKind, RecordSchema};
use crate::types::RecordId;

/// Wire format for date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current state of the form machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode<'a> {
    /// Staging a new record.
    Idle,
    /// Editing the record with this identifier.
    Editing(&'a RecordId),
}

/// Where a submission goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update(RecordId),
}

/// A validated, ready-to-send snapshot of the form.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub target: SubmitTarget,
    /// `(field name, value)` in schema order; becomes multipart text parts.
    pub fields: Vec<(&'static str, String)>,
    /// New image to upload. `None` on update keeps the stored image.
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    schema: &'static RecordSchema,
    values: BTreeMap<&'static str, String>,
    image: Option<ImageUpload>,
    preview: Option<InlineImage>,
    editing: Option<RecordId>,
}

impl FormState {
    /// An empty form with every schema field set to `""`.
    pub fn new(schema: &'static RecordSchema) -> Self {
        Self {
            schema,
            values: schema.fields.iter().map(|f| (f.name, String::new())).collect(),
            image: None,
            preview: None,
            editing: None,
        }
    }

    pub fn schema(&self) -> &'static RecordSchema {
        self.schema
    }

    pub fn mode(&self) -> FormMode<'_> {
        match &self.editing {
            Some(id) => FormMode::Editing(id),
            None => FormMode::Idle,
        }
    }

    pub fn editing_id(&self) -> Option<&RecordId> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Staged image, if a new file was selected.
    pub fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    /// What the form would display: the selected file, or the edited
    /// record's existing image.
    pub fn preview(&self) -> Option<&InlineImage> {
        self.preview.as_ref()
    }

    /// Set one editable field.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), CoreError> {
        let spec = self.schema.field(name).ok_or_else(|| CoreError::UnknownField {
            collection: self.schema.collection,
            field: name.to_string(),
        })?;
        self.values.insert(spec.name, value.into());
        Ok(())
    }

    /// Stage a newly selected image and show it as the preview.
    pub fn select_image(&mut self, upload: ImageUpload) {
        self.preview = Some(upload.preview());
        self.image = Some(upload);
    }

    /// Copy `record` into the form and switch to editing it.
    ///
    /// No new image is staged; the record's current image becomes the
    /// preview so an unchanged edit keeps it.
    pub fn begin_edit(&mut self, record: &Record) {
        for spec in self.schema.fields {
            let value = match record.get(spec.name) {
                Some(v) if spec.kind == FieldKind::Date => normalize_date(&v.to_string()),
                Some(v) => v.to_string(),
                None => String::new(),
            };
            self.values.insert(spec.name, value);
        }
        self.image = None;
        self.preview = record.image.clone();
        self.editing = Some(record.id.clone());
    }

    /// Return to an empty `Idle` form.
    pub fn reset(&mut self) {
        *self = Self::new(self.schema);
    }

    /// Check required fields, field formats and the image policy.
    ///
    /// Every problem is collected, not just the first.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = ValidationErrors::new();

        for spec in self.schema.fields {
            let raw = self.value(spec.name).unwrap_or_default().trim();
            if raw.is_empty() {
                if spec.required {
                    errors.push(spec.name, "is required");
                }
                continue;
            }
            match spec.kind {
                FieldKind::Text => {}
                FieldKind::Date => {
                    if !is_valid_date(raw) {
                        errors.push(spec.name, "must be a date (YYYY-MM-DD)");
                    }
                }
                FieldKind::Number => {
                    if !raw.parse::<f64>().is_ok_and(f64::is_finite) {
                        errors.push(spec.name, "must be a number");
                    }
                }
            }
        }

        if self.editing.is_none() && self.schema.image_required_on_create() && self.image.is_none()
        {
            errors.push("image", "is required");
        }

        errors.into_result()
    }

    /// Validate and snapshot the form for sending.
    ///
    /// The form itself is not modified, so a failed request leaves it as the
    /// user left it.
    pub fn to_submission(&self) -> Result<Submission, CoreError> {
        self.validate()?;

        let target = match &self.editing {
            Some(id) => SubmitTarget::Update(id.clone()),
            None => SubmitTarget::Create,
        };
        let fields = self
            .schema
            .fields
            .iter()
            .map(|spec| {
                let value = self.value(spec.name).unwrap_or_default();
                (spec.name, value.trim().to_string())
            })
            .collect();

        Ok(Submission {
            target,
            fields,
            image: self.image.clone(),
        })
    }
}

fn is_valid_date(raw: &str) -> bool {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).is_ok() || DateTime::parse_from_rfc3339(raw).is_ok()
}

/// Reduce a stored date (possibly a full timestamp) to `YYYY-MM-DD`.
///
/// Values that are not recognizable dates are returned unchanged.
pub fn normalize_date(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.date_naive().format(DATE_FORMAT).to_string();
    }
    if let Some(prefix) = raw.get(..10) {
        if NaiveDate::parse_from_str(prefix, DATE_FORMAT).is_ok() {
            return prefix.to_string();
        }
    }
    raw.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
