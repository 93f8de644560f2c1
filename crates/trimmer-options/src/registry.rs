//! Option schema registry
//!
//! Provides [`OptionDescriptor`] (per-type factory), [`ChildRegistry`] (the
//! ordered child declarations of one type) and [`OptionSchema`] (the set of
//! root types a tree is built from).

use crate::error::{StructuralViolation, TreeError};
use crate::instance::{instantiate, ErasedOption};
use crate::option_type::{BuildTarget, NodeConfig, OptionType};
use std::any::TypeId;
use std::fmt::{self, Debug, Formatter};
use trimmer_store::{fold_case, names_match};

/// Type-erased handle to one [`OptionType`]
///
/// Holds the virtual constructor used by the tree builder for the type's
/// default node, its children and its variants.
#[derive(Clone, Copy)]
pub struct OptionDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    name: &'static str,
    instantiate: fn() -> (Box<dyn ErasedOption>, NodeConfig),
    declare_children: fn(&mut ChildRegistry),
    is_available: fn(&BuildTarget) -> bool,
}

impl OptionDescriptor {
    /// Descriptor for option type `T`
    #[must_use]
    pub fn of<T: OptionType>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: T::NAME,
            instantiate: instantiate::<T>,
            declare_children: T::children,
            is_available: T::is_available,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rust type name of the option type
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    #[must_use]
    pub fn is<T: OptionType>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Whether the option exists for a build target
    #[inline]
    #[must_use]
    pub fn is_available(&self, target: &BuildTarget) -> bool {
        (self.is_available)(target)
    }

    /// Declared child types, in declaration order
    #[must_use]
    pub fn children(&self) -> Vec<OptionDescriptor> {
        let mut registry = ChildRegistry::new();
        (self.declare_children)(&mut registry);
        registry.children
    }

    pub(crate) fn instantiate(&self) -> (Box<dyn ErasedOption>, NodeConfig) {
        (self.instantiate)()
    }
}

impl Debug for OptionDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .finish()
    }
}

impl PartialEq for OptionDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for OptionDescriptor {}

/// Ordered child declarations of one option type
#[derive(Debug, Default)]
pub struct ChildRegistry {
    children: Vec<OptionDescriptor>,
}

impl ChildRegistry {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Declare child type `T`
    pub fn add<T: OptionType>(&mut self) -> &mut Self {
        self.children.push(OptionDescriptor::of::<T>());
        self
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Set of root option types
///
/// # Example
///
/// ```rust
/// use trimmer_options::{OptionSchema, OptionType};
///
/// struct Graphics;
///
/// impl OptionType for Graphics {
///     type Value = bool;
///     const NAME: &'static str = "Graphics";
/// }
///
/// let schema = OptionSchema::builder().root::<Graphics>().build().unwrap();
/// assert!(schema.contains("graphics"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionSchema {
    roots: Vec<OptionDescriptor>,
}

impl OptionSchema {
    #[inline]
    #[must_use]
    pub fn builder() -> OptionSchemaBuilder {
        OptionSchemaBuilder::default()
    }

    /// Root descriptors, in registration order
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[OptionDescriptor] {
        &self.roots
    }

    /// Lookup root by name (case-insensitive)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionDescriptor> {
        self.roots.iter().find(|d| names_match(d.name, name))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// List all root names
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.roots.iter().map(OptionDescriptor::name).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Builder for [`OptionSchema`]
#[derive(Debug, Default)]
pub struct OptionSchemaBuilder {
    roots: Vec<OptionDescriptor>,
}

impl OptionSchemaBuilder {
    /// Register root type `T`
    #[must_use]
    pub fn root<T: OptionType>(mut self) -> Self {
        self.roots.push(OptionDescriptor::of::<T>());
        self
    }

    /// Register an already erased root
    #[must_use]
    pub fn descriptor(mut self, descriptor: OptionDescriptor) -> Self {
        self.roots.push(descriptor);
        self
    }

    /// Finish the schema
    ///
    /// # Errors
    /// Returns error if two roots share a name (case-insensitive)
    pub fn build(self) -> Result<OptionSchema, TreeError> {
        let mut seen = std::collections::HashSet::new();
        for descriptor in &self.roots {
            if !seen.insert(fold_case(descriptor.name)) {
                return Err(StructuralViolation::DuplicateName {
                    parent: String::new(),
                    name: descriptor.name.to_string(),
                }
                .into());
            }
        }
        tracing::debug!(roots = self.roots.len(), "option schema built");
        Ok(OptionSchema { roots: self.roots })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option_type::{OptionConfig, Variance};

    struct Audio;
    struct Volume;
    struct Mute;
    struct AudioShadow;

    impl OptionType for Audio {
        type Value = bool;
        const NAME: &'static str = "Audio";

        fn children(children: &mut ChildRegistry) {
            children.add::<Volume>().add::<Mute>();
        }

        fn is_available(target: &BuildTarget) -> bool {
            target.as_str() != "server"
        }
    }

    impl OptionType for Volume {
        type Value = f32;
        const NAME: &'static str = "Volume";

        fn configure(config: &mut OptionConfig<f32>) {
            config.default_value(1.0).variance(Variance::Array);
        }
    }

    impl OptionType for Mute {
        type Value = bool;
        const NAME: &'static str = "Mute";
    }

    impl OptionType for AudioShadow {
        type Value = i32;
        const NAME: &'static str = "AUDIO";
    }

    #[test]
    fn descriptor_children_in_declaration_order() {
        let audio = OptionDescriptor::of::<Audio>();
        let names: Vec<_> = audio.children().iter().map(OptionDescriptor::name).collect();
        assert_eq!(names, vec!["Volume", "Mute"]);
        assert!(audio.is::<Audio>());
        assert!(!audio.is::<Mute>());
    }

    #[test]
    fn descriptor_availability() {
        let audio = OptionDescriptor::of::<Audio>();
        assert!(audio.is_available(&BuildTarget::new("desktop")));
        assert!(!audio.is_available(&BuildTarget::new("server")));
    }

    #[test]
    fn descriptor_instantiates_configured_node() {
        let (_, config) = OptionDescriptor::of::<Volume>().instantiate();
        assert_eq!(config.variance(), Variance::Array);
        assert_eq!(config.default_parameter(), Some("0"));
    }

    #[test]
    fn schema_lookup_is_case_insensitive() {
        let schema = OptionSchema::builder().root::<Audio>().build().unwrap();
        assert_eq!(schema.len(), 1);
        assert!(schema.contains("AUDIO"));
        assert!(schema.get("volume").is_none());
        assert_eq!(schema.names(), vec!["Audio"]);
    }

    #[test]
    fn schema_rejects_duplicate_roots() {
        let err = OptionSchema::builder()
            .root::<Audio>()
            .root::<AudioShadow>()
            .build()
            .unwrap_err();
        assert!(err.is_structural());
    }
}
