//! Build-time packaging: content database, asset copy, archive and hash.
//!
//! [`PackBuilder::build`] consumes a [`ConversionResult`](crate::legacy::ConversionResult)
//! and produces the three durable artifacts the runtime provisions from.

pub mod archive;
pub mod builder;
pub mod mock;
pub mod schema;
pub mod selection;

pub use archive::{archive_file_name, hash_file_name, read_hash_file, sha256_file};
pub use builder::{
    validate_pack_id, AssetCopyFailure, BuildReport, BuiltPack, PackBuilder, PackMetadata,
};
pub use mock::{build_mock_pack, mock_content, mock_metadata, MOCK_PACK_ID};
pub use schema::SCHEMA_VERSION;
pub use selection::{CatalogEntry, PackCatalog, PackSelection, ACTIVE_PACK, SELECTION_FILE};
