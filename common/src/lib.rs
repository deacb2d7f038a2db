//! Car Damage Check Common Library
//!
//! CLI・デスクトップ・Web(WASM)で共有される型と配置ロジック

pub mod types;
pub mod catalog;
pub mod geometry;
pub mod photo;
pub mod store;
pub mod outbox;
pub mod marker;
pub mod session;
pub mod export;
pub mod error;

pub use types::{DamageRecord, Ledger, DEFAULT_NOTE, DEFAULT_UPLOADER, PLACEHOLDER_PHOTO_URL, TIMESTAMP_FORMAT};
pub use catalog::{MarkerStyle, Variant, VariantConfig, VehicleCatalog};
pub use geometry::{BoundingBox, PointerPos};
pub use photo::{decode_data_uri, PhotoDataUri};
pub use store::{JsonFileStore, LedgerStore, LoadPolicy, MemoryStore, STORAGE_KEY};
pub use outbox::{OutboundEvent, Outbox, SheetPayload, DEFAULT_SHEET_URL};
pub use marker::{hit_test, markers_for, Marker, Popup, PopupTarget};
pub use session::{ClickOutcome, DamageSession, PendingInput};
pub use export::{export_file_name, ExportFormat};
pub use error::{Error, ExportError, Result, StorageError, ValidationError};
