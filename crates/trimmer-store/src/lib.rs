//! Trimmer Store
//!
//! The addressing grammar and the persistent value tree shared by every other
//! Trimmer crate.
//!
//! # Core Concepts
//!
//! - [`OptionPath`]: `root/child:parameter/...` addressing with two separators
//! - [`ValueStore`]: persisted name/parameter-keyed tree of string values
//! - [`StoreNode`]: one entry, with dirty tracking
//!
//! # Example
//!
//! ```rust
//! use trimmer_store::ValueStore;
//!
//! let mut store = ValueStore::new();
//! store.set_value("Graphics/Channel:9", "0.2").unwrap();
//!
//! assert_eq!(store.get_value("graphics/channel:9"), Some("0.2"));
//! assert!(store.is_dirty(true));
//! assert!(!store.is_dirty(false));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod path;
mod store;

pub use path::{
    fold_case, is_valid_key, names_match, OptionPath, PathError, PathSegment, CHILD_SEPARATOR,
    VARIANT_SEPARATOR,
};
pub use store::{StoreNode, ValueStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
