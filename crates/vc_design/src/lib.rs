#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod value;

pub mod assembler;
pub mod cache;
pub mod context;
pub mod descriptor;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod hash;
pub mod host;
pub mod interpret;
pub mod localization;
pub mod manager;
pub mod members;
pub mod options;
pub mod serializers;
pub mod statement_table;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use document::{load_document, serialize_document};
pub use error::{DeserializeError, Diagnostic, HostError, SerializeError, StoreError};
pub use localization::LocalizationModel;
pub use manager::SerializationManager;
pub use options::{DesignerOptions, OptionsSource};
pub use store::{RestoreOptions, SerializationStore};
pub use value::Value;
