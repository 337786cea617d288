//! Record store access - hosted tabular-data backend client
//!
//! This crate is the persistence boundary for retrobot:
//! - **Wire types** (`records`) - record/field shapes with the store's column names
//! - **Client** (`client`) - `RecordStore` trait plus the HTTP implementation
//!
//! The store is treated as a black box with request/response semantics: reads
//! reflect the most recent successful write and nothing stronger. There is no
//! retry or pagination layer here; callers issue at most a couple of calls per
//! command and surface failures as user-visible reply text.

pub mod client;
pub mod records;

pub use client::{HttpRecordStore, RecordStore, StoreError, CURRENT_VIEW, ITEMS_TABLE};
pub use records::{ItemFields, ItemRecord, RecordPage, ReviewPatch};
