//! Record schemas.
//!
//! A [`RecordSchema`] describes one remote collection: which fields a record
//! carries, which of them the form requires, which ones the list view can
//! search and sort by, and whether an image must accompany a new record.
//! The employee and movie catalogs are two instances of the same schema type.

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a field's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, compared lexicographically.
    Text,
    /// Calendar date, submitted as `YYYY-MM-DD`.
    Date,
    /// Finite number, compared numerically.
    Number,
}

/// One editable field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire name, used both in JSON and as the multipart part name.
    pub name: &'static str,
    /// Human-readable label for prompts and listings.
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub sortable: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            sortable: true,
        }
    }
}

/// Whether a record must carry an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePolicy {
    /// Image may be omitted on create and update.
    Optional,
    /// A new record must include an image; updates may keep the existing one.
    RequiredOnCreate,
}

/// Shape of one remote record collection.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordSchema {
    /// Path segment of the collection endpoint, e.g. `employees`.
    pub collection: &'static str,
    /// Singular display name, e.g. `Employee`.
    pub display_name: &'static str,
    pub fields: &'static [FieldSpec],
    /// Text fields matched against the search term.
    pub filter_fields: &'static [&'static str],
    pub image: ImagePolicy,
}

impl RecordSchema {
    /// Look up a field by wire name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn sortable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.sortable)
    }

    pub fn image_required_on_create(&self) -> bool {
        self.image == ImagePolicy::RequiredOnCreate
    }

    /// Resolve a collection name (`employees`, `movies`) to a built-in schema.
    pub fn builtin(collection: &str) -> Option<&'static RecordSchema> {
        BUILTIN_SCHEMAS
            .iter()
            .copied()
            .find(|s| s.collection.eq_ignore_ascii_case(collection))
    }
}

// ---------------------------------------------------------------------------
// Built-in schemas
// ---------------------------------------------------------------------------

pub static EMPLOYEE_SCHEMA: RecordSchema = RecordSchema {
    collection: "employees",
    display_name: "Employee",
    fields: &[
        FieldSpec::required("title", "Title", FieldKind::Text),
        FieldSpec::required("name", "Name", FieldKind::Text),
        FieldSpec::required("designation", "Designation", FieldKind::Text),
        FieldSpec::required("dob", "Date of Birth", FieldKind::Date),
        FieldSpec::required("address", "Address", FieldKind::Text),
    ],
    filter_fields: &["name", "designation"],
    image: ImagePolicy::Optional,
};

pub static MOVIE_SCHEMA: RecordSchema = RecordSchema {
    collection: "movies",
    display_name: "Movie",
    fields: &[
        FieldSpec::required("title", "Title", FieldKind::Text),
        FieldSpec::required("description", "Description", FieldKind::Text),
        FieldSpec::required("genre", "Genre", FieldKind::Text),
        FieldSpec::required("releaseDate", "Release Date", FieldKind::Date),
        FieldSpec::required("rating", "Rating", FieldKind::Number),
    ],
    filter_fields: &["title", "genre"],
    image: ImagePolicy::RequiredOnCreate,
};

/// Every schema known to [`RecordSchema::builtin`].
pub static BUILTIN_SCHEMAS: &[&RecordSchema] = &[&EMPLOYEE_SCHEMA, &MOVIE_SCHEMA];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
