//! Option types
//!
//! An [`OptionType`] is the schema-level description of one kind of option:
//! its value type, its static facts (set once in [`OptionType::configure`]),
//! its child types and its hooks. Every node in an
//! [`OptionTree`](crate::OptionTree) is an instance of one option type.

use crate::registry::ChildRegistry;
use crate::value::OptionValue;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::{self, Display, Formatter};
use trimmer_store::is_valid_key;

/// Parameter of the default variant of an array option
pub const ARRAY_DEFAULT_PARAMETER: &str = "0";

/// Default parameter of a dictionary option unless configured otherwise
pub const DICTIONARY_DEFAULT_PARAMETER: &str = "Default";

/// Whether an option type allows parallel instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variance {
    /// Exactly one instance
    #[default]
    Single,

    /// Variants keyed by user-chosen parameters
    Dictionary,

    /// Variants keyed by their position, `1..N`
    Array,
}

impl Variance {
    /// Whether nodes of this variance can hold variants
    #[inline]
    #[must_use]
    pub fn has_variants(self) -> bool {
        !matches!(self, Self::Single)
    }
}

bitflags! {
    /// What an option type can take part in at build time
    ///
    /// Only the inclusion calculator reads these.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Capabilities: u8 {
        /// The option has an associated feature that can be compiled in or out
        const HAS_ASSOCIATED_FEATURE = 1 << 0;
        /// The editable option itself can be included in a build
        const CAN_INCLUDE_OPTION = 1 << 1;
        /// The option configures the build process
        const CONFIGURES_BUILD = 1 << 2;
        /// The option can be used while playing live in the editor
        const CAN_PLAY_LIVE = 1 << 3;
        /// The option is applied outside of play mode as well
        const EXECUTE_OUTSIDE_PLAY = 1 << 4;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::CAN_INCLUDE_OPTION | Self::CAN_PLAY_LIVE
    }
}

/// Build target an inclusion decision is made for
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildTarget(String);

impl BuildTarget {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BuildTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BuildTarget {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Static facts of an option type, filled in by [`OptionType::configure`]
#[derive(Debug, Clone)]
pub struct OptionConfig<V> {
    default_value: V,
    variance: Variance,
    default_parameter: Option<String>,
    category: Option<String>,
    capabilities: Capabilities,
    apply_order: i32,
}

impl<V: OptionValue> OptionConfig<V> {
    pub(crate) fn new() -> Self {
        Self {
            default_value: V::default(),
            variance: Variance::Single,
            default_parameter: None,
            category: None,
            capabilities: Capabilities::default(),
            apply_order: 0,
        }
    }

    /// Value used when nothing (or nothing valid) is stored
    pub fn default_value(&mut self, value: V) -> &mut Self {
        self.default_value = value;
        self
    }

    pub fn variance(&mut self, variance: Variance) -> &mut Self {
        self.variance = variance;
        self
    }

    /// Parameter of the default variant of a dictionary option
    ///
    /// Ignored for array options, whose default is pinned to `"0"`.
    pub fn default_parameter(&mut self, parameter: impl Into<String>) -> &mut Self {
        self.default_parameter = Some(parameter.into());
        self
    }

    pub fn category(&mut self, category: impl Into<String>) -> &mut Self {
        self.category = Some(category.into());
        self
    }

    pub fn capabilities(&mut self, capabilities: Capabilities) -> &mut Self {
        self.capabilities = capabilities;
        self
    }

    /// Position among siblings when applying, lower first
    pub fn apply_order(&mut self, order: i32) -> &mut Self {
        self.apply_order = order;
        self
    }

    pub(crate) fn finish(self, option: &str) -> (V, NodeConfig) {
        let default_parameter = match self.variance {
            Variance::Single => None,
            Variance::Array => Some(ARRAY_DEFAULT_PARAMETER.to_string()),
            Variance::Dictionary => match self.default_parameter {
                Some(parameter) if is_valid_key(&parameter) => Some(parameter),
                Some(parameter) => {
                    tracing::warn!(option, %parameter, "invalid default parameter replaced");
                    Some(DICTIONARY_DEFAULT_PARAMETER.to_string())
                }
                None => Some(DICTIONARY_DEFAULT_PARAMETER.to_string()),
            },
        };

        let config = NodeConfig {
            variance: self.variance,
            default_parameter,
            category: self.category,
            capabilities: self.capabilities,
            apply_order: self.apply_order,
        };
        (self.default_value, config)
    }
}

/// Resolved static facts carried by every node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    variance: Variance,
    default_parameter: Option<String>,
    category: Option<String>,
    capabilities: Capabilities,
    apply_order: i32,
}

impl NodeConfig {
    #[inline]
    #[must_use]
    pub fn variance(&self) -> Variance {
        self.variance
    }

    #[inline]
    #[must_use]
    pub fn default_parameter(&self) -> Option<&str> {
        self.default_parameter.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    #[inline]
    #[must_use]
    pub fn apply_order(&self) -> i32 {
        self.apply_order
    }
}

/// Schema-level description of one kind of option
///
/// # Example
///
/// ```rust
/// use trimmer_options::{ChildRegistry, OptionConfig, OptionType, Variance};
///
/// struct Volume;
///
/// impl OptionType for Volume {
///     type Value = f32;
///     const NAME: &'static str = "Volume";
///
///     fn configure(config: &mut OptionConfig<f32>) {
///         config.default_value(1.0).variance(Variance::Array);
///     }
/// }
///
/// struct Audio;
///
/// impl OptionType for Audio {
///     type Value = bool;
///     const NAME: &'static str = "Audio";
///
///     fn children(children: &mut ChildRegistry) {
///         children.add::<Volume>();
///     }
/// }
/// ```
pub trait OptionType: 'static {
    /// Value held by every instance
    type Value: OptionValue;

    /// Stable identifier, also the path segment
    const NAME: &'static str;

    /// Set static facts: default value, variance, category, capabilities
    ///
    /// Runs once per instance, before children and variants are attached.
    fn configure(_config: &mut OptionConfig<Self::Value>) {}

    /// Declare child option types, in declaration order
    fn children(_children: &mut ChildRegistry) {}

    /// Push the current value out to the running environment
    fn apply(_ctx: &mut ApplyContext<'_, Self::Value>) {}

    /// Whether the option exists at all for a build target
    fn is_available(_target: &BuildTarget) -> bool {
        true
    }

    /// Whether the feature may be built in without the editable option
    ///
    /// Returning `false` vetoes a feature-only inclusion.
    fn allows_feature_only(_value: &Self::Value) -> bool {
        true
    }
}

/// What an [`OptionType::apply`] hook sees
pub struct ApplyContext<'a, V> {
    pub(crate) value: &'a V,
    pub(crate) path: &'a str,
    pub(crate) parameter: Option<&'a str>,
    pub(crate) is_default_variant: bool,
    pub(crate) env: &'a mut dyn Any,
}

impl<'a, V> ApplyContext<'a, V> {
    #[inline]
    #[must_use]
    pub fn value(&self) -> &V {
        self.value
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        self.path
    }

    /// Variant parameter, the default parameter for default variants
    #[inline]
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.parameter
    }

    #[inline]
    #[must_use]
    pub fn is_default_variant(&self) -> bool {
        self.is_default_variant
    }

    /// The host environment passed to `apply`, if it has type `E`
    #[inline]
    pub fn environment<E: Any>(&mut self) -> Option<&mut E> {
        self.env.downcast_mut()
    }
}
