//! Domain types for the catalog client.
//!
//! Everything here is free of I/O: record schemas, the wire decoding of
//! records, image transcoding, form state, the local collection mirror and
//! the derived search/sort view. The HTTP side lives in `catalog-client`.

pub mod collection;
pub mod error;
pub mod form;
pub mod image;
pub mod record;
pub mod schema;
pub mod types;
pub mod view;
