//! Trimmer Options
//!
//! The live configuration tree: option types, their instances, variants,
//! path resolution and reconciliation with a [`trimmer_store::ValueStore`].
//!
//! # Core Concepts
//!
//! - [`OptionType`]: schema-level description of one kind of option
//! - [`OptionSchema`]: root types a tree is instantiated from
//! - [`OptionTree`]: arena of [`OptionNode`]s addressed by [`NodeId`]
//! - [`PathResolver`]: `root/child:parameter` lookups and completion
//!
//! # Example
//!
//! ```rust
//! use trimmer_options::{
//!     OptionConfig, OptionSchema, OptionTree, OptionType, PathResolver, Variance,
//! };
//!
//! struct Channel;
//!
//! impl OptionType for Channel {
//!     type Value = f32;
//!     const NAME: &'static str = "Channel";
//!
//!     fn configure(config: &mut OptionConfig<f32>) {
//!         config.default_value(1.0).variance(Variance::Array);
//!     }
//! }
//!
//! let schema = OptionSchema::builder().root::<Channel>().build().unwrap();
//! let mut tree = OptionTree::new(&schema).unwrap();
//! let channel = tree.root("Channel").unwrap();
//! let added = tree.add_variants(channel, ["10", "2"]).unwrap();
//!
//! let resolver = PathResolver::new(&tree);
//! assert_eq!(resolver.get_option("channel:1"), Some(added[1]));
//! assert_eq!(resolver.get_option("channel:2"), Some(added[0]));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod instance;
mod natural;
mod option_type;
mod registry;
mod resolver;
mod sync;
mod tree;
mod value;

pub use error::{IntegrityError, StructuralViolation, TreeError};
pub use natural::{natural_cmp, natural_cmp_opt};
pub use option_type::{
    ApplyContext, BuildTarget, Capabilities, NodeConfig, OptionConfig, OptionType, Variance,
    ARRAY_DEFAULT_PARAMETER, DICTIONARY_DEFAULT_PARAMETER,
};
pub use registry::{ChildRegistry, OptionDescriptor, OptionSchema, OptionSchemaBuilder};
pub use resolver::PathResolver;
pub use sync::{LoadSummary, SyncOptions};
pub use tree::{NodeId, NodeState, OptionNode, OptionTree};
pub use value::{LoadOutcome, OptionValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for option type definitions
pub mod prelude {
    pub use crate::{
        ApplyContext, BuildTarget, Capabilities, ChildRegistry, OptionConfig, OptionType,
        OptionValue, Variance,
    };
}
