//! Trimmer Profile
//!
//! Profiles tie a persistent [`trimmer_store::ValueStore`] and per-root
//! inclusion choices to the live option trees built from them. Hosts (an
//! editor panel, a console, a build step) go through a [`Profile`] with an
//! explicit tree handle.
//!
//! # Example
//!
//! ```rust
//! use trimmer_options::{OptionConfig, OptionSchema, OptionType};
//! use trimmer_profile::Profile;
//!
//! struct Volume;
//!
//! impl OptionType for Volume {
//!     type Value = f32;
//!     const NAME: &'static str = "Volume";
//!
//!     fn configure(config: &mut OptionConfig<f32>) {
//!         config.default_value(0.8);
//!     }
//! }
//!
//! let schema = OptionSchema::builder().root::<Volume>().build().unwrap();
//! let mut profile = Profile::new("Editor");
//! let mut tree = profile.instantiate(&schema).unwrap();
//!
//! assert_eq!(profile.execute(&mut tree, "volume", &mut ()).unwrap(), "0.8");
//! assert_eq!(profile.execute(&mut tree, "Volume = 0.5", &mut ()).unwrap(), "0.5");
//! assert_eq!(profile.store().get_value("Volume"), Some("0.5"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
mod profile;

pub use config::ProfileConfig;
pub use error::{ProfileError, Result};
pub use profile::Profile;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
