//! Variant lifecycle
//!
//! Only a default variant hosts other variants. Every operation validates
//! completely before touching the tree, so a failed call leaves no partial
//! mutation behind.

use super::{NodeId, OptionNode, OptionTree};
use crate::error::{StructuralViolation, TreeError};
use crate::natural::natural_cmp;
use crate::option_type::Variance;
use indexmap::IndexMap;
use std::collections::HashSet;
use trimmer_store::{fold_case, is_valid_key, names_match};

impl OptionTree {
    /// Add one variant to a default variant node
    ///
    /// Array options are renumbered right after, so the returned node may
    /// carry a different parameter than the one passed in. Adding `"10"`,
    /// `"2"` and `"1"` one call at a time therefore fails on `"1"`, which the
    /// first call was renumbered to; use [`OptionTree::add_variants`] to add
    /// raw parameters that are renumbered together.
    ///
    /// # Errors
    /// Returns error if the node cannot host variants or the parameter is
    /// empty, invalid, the default parameter or already taken
    pub fn add_variant(&mut self, id: NodeId, parameter: &str) -> Result<NodeId, TreeError> {
        self.validate_parameters(id, [parameter])?;
        let variant = self.attach_variant(id, parameter)?;
        self.renumber_if_array(id)?;
        Ok(variant)
    }

    /// Add several variants at once, renumbering a single time at the end
    ///
    /// Parameters are validated against the existing variants and against
    /// each other before anything is attached. Returned ids follow the order
    /// of `parameters`.
    ///
    /// # Errors
    /// Same conditions as [`OptionTree::add_variant`], for any parameter
    pub fn add_variants<I, S>(
        &mut self,
        id: NodeId,
        parameters: I,
    ) -> Result<Vec<NodeId>, TreeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parameters: Vec<S> = parameters.into_iter().collect();
        self.validate_parameters(id, parameters.iter().map(AsRef::<str>::as_ref))?;
        let mut added = Vec::with_capacity(parameters.len());
        for parameter in &parameters {
            added.push(self.attach_variant(id, parameter.as_ref())?);
        }
        self.renumber_if_array(id)?;
        Ok(added)
    }

    /// Lookup a variant, optionally creating it
    ///
    /// The default parameter (any casing) resolves to the node itself.
    ///
    /// # Errors
    /// Returns error if the node cannot host variants, or if creation was
    /// requested and fails
    pub fn get_variant(
        &mut self,
        id: NodeId,
        parameter: &str,
        create: bool,
    ) -> Result<Option<NodeId>, TreeError> {
        let host = self.variant_host(id)?;
        if host.default_parameter().is_some_and(|d| names_match(d, parameter)) {
            return Ok(Some(id));
        }
        if let Some(&found) = host.variants.get(&fold_case(parameter)) {
            return Ok(Some(found));
        }
        if create {
            self.add_variant(id, parameter).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Non-failing lookup used for path resolution
    ///
    /// `None` for nodes that cannot host variants as well as for misses.
    #[must_use]
    pub fn find_variant(&self, id: NodeId, parameter: &str) -> Option<NodeId> {
        let host = self.variant_host(id).ok()?;
        if host.default_parameter().is_some_and(|d| names_match(d, parameter)) {
            return Some(id);
        }
        host.variants.get(&fold_case(parameter)).copied()
    }

    /// Detach and drop a variant of a default variant node
    ///
    /// # Errors
    /// Returns error if `id` cannot host variants or `variant` is not one of
    /// its variants (the default variant itself included)
    pub fn remove_variant(&mut self, id: NodeId, variant: NodeId) -> Result<(), TreeError> {
        let host = self.variant_host(id)?;
        let Some(key) = host
            .variants
            .iter()
            .find_map(|(key, &v)| (v == variant).then(|| key.clone()))
        else {
            let variant = self.node(variant).map_or_else(
                || variant.to_string(),
                |n| n.parameter().unwrap_or_default().to_string(),
            );
            return Err(StructuralViolation::NotAVariantOf {
                option: host.name().to_string(),
                variant,
            }
            .into());
        };

        self.try_node_mut(id)?.variants.shift_remove(&key);
        self.free_subtree(variant);
        tracing::debug!(option = %self.path(id)?, parameter = %key, "variant removed");
        self.renumber_if_array(id)
    }

    /// Reassign `1..N` to the variants of an array option
    ///
    /// Variants are ordered by their current parameters in natural order.
    /// The default variant keeps `"0"`.
    ///
    /// # Errors
    /// Returns error if the node cannot host variants
    pub(crate) fn renumber_array_variants(&mut self, id: NodeId) -> Result<(), TreeError> {
        let host = self.variant_host(id)?;
        let mut ordered: Vec<(NodeId, String)> = host
            .variants
            .values()
            .filter_map(|&v| Some((v, self.node(v)?.parameter()?.to_string())))
            .collect();
        ordered.sort_by(|a, b| natural_cmp(&a.1, &b.1));

        let mut renumbered = IndexMap::with_capacity(ordered.len());
        for (position, (variant, old)) in ordered.into_iter().enumerate() {
            let parameter = (position + 1).to_string();
            if old != parameter {
                self.try_node_mut(variant)?.parameter = Some(parameter.clone());
                self.invalidate_path_recursive(variant);
            }
            renumbered.insert(parameter, variant);
        }
        self.try_node_mut(id)?.variants = renumbered;
        tracing::debug!(option = %self.path(id)?, "array variants renumbered");
        Ok(())
    }

    fn renumber_if_array(&mut self, id: NodeId) -> Result<(), TreeError> {
        if self.try_node(id)?.variance() == Variance::Array {
            self.renumber_array_variants(id)?;
        }
        Ok(())
    }

    /// The node, if it is a default variant of a variant-capable option
    fn variant_host(&self, id: NodeId) -> Result<&OptionNode, TreeError> {
        let node = self.try_node(id)?;
        if !node.variance().has_variants() {
            return Err(StructuralViolation::NotVariantCapable {
                option: node.name().to_string(),
            }
            .into());
        }
        if !node.is_default_variant {
            return Err(StructuralViolation::NotDefaultVariant {
                option: node.name().to_string(),
            }
            .into());
        }
        Ok(node)
    }

    fn validate_parameters<'p>(
        &self,
        id: NodeId,
        parameters: impl IntoIterator<Item = &'p str>,
    ) -> Result<(), TreeError> {
        let host = self.variant_host(id)?;
        let option = || host.name().to_string();
        let mut pending = HashSet::new();

        for parameter in parameters {
            if parameter.is_empty() {
                return Err(StructuralViolation::EmptyParameter { option: option() }.into());
            }
            if !is_valid_key(parameter) {
                return Err(StructuralViolation::InvalidParameter {
                    option: option(),
                    parameter: parameter.to_string(),
                }
                .into());
            }
            if host.default_parameter().is_some_and(|d| names_match(d, parameter)) {
                return Err(StructuralViolation::DefaultParameter {
                    option: option(),
                    parameter: parameter.to_string(),
                }
                .into());
            }
            let key = fold_case(parameter);
            if host.variants.contains_key(&key) || !pending.insert(key) {
                return Err(StructuralViolation::DuplicateParameter {
                    option: option(),
                    parameter: parameter.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Build a variant subtree and hang it off `id`, without renumbering
    fn attach_variant(&mut self, id: NodeId, parameter: &str) -> Result<NodeId, TreeError> {
        let descriptor = self.try_node(id)?.descriptor;
        let variant = self.build_node(descriptor, Some(id), Some(parameter.to_string()))?;
        self.try_node_mut(id)?
            .variants
            .insert(fold_case(parameter), variant);
        tracing::debug!(option = descriptor.name(), parameter, "variant added");
        Ok(variant)
    }
}
