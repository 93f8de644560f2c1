//! Trimmer Inclusion
//!
//! Decides, per root option and build target, whether the option's feature
//! and its editable option are built in.
//!
//! # Core Concepts
//!
//! - [`Inclusion`]: one of remove, feature-only, option-only, both
//! - [`InclusionChoices`]: what a profile asks for, per root
//! - [`InclusionCalculator`]: capabilities + choices + availability → inclusion
//! - [`InclusionPlan`]: one result per root, inherited by every descendant
//!
//! # Example
//!
//! ```rust
//! use trimmer_inclusion::{Inclusion, InclusionCalculator, InclusionChoices, InclusionRequest};
//! use trimmer_options::{BuildTarget, OptionSchema, OptionTree, OptionType};
//!
//! struct Console;
//!
//! impl OptionType for Console {
//!     type Value = bool;
//!     const NAME: &'static str = "Console";
//! }
//!
//! let schema = OptionSchema::builder().root::<Console>().build().unwrap();
//! let tree = OptionTree::new(&schema).unwrap();
//! let mut choices = InclusionChoices::new();
//! choices.set("Console", InclusionRequest::empty());
//!
//! let plan = InclusionCalculator::new(&tree, &choices).plan(&BuildTarget::new("desktop"));
//! assert_eq!(plan.by_name("console"), Some(Inclusion::Remove));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod calculator;
mod choices;
mod inclusion;

pub use calculator::{InclusionCalculator, InclusionPlan};
pub use choices::InclusionChoices;
pub use inclusion::{Inclusion, InclusionRequest};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
