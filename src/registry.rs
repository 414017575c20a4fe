//! Output Registry
//!
//! Insertion-ordered collection of named outputs. The insertion order *is*
//! the attachment-location order: location `i` always refers to the `i`-th
//! registered output, and every consumer — pass plan, target creation,
//! define emission, per-frame clear array — iterates the registry in this
//! one order. Lookups go through a name→index map; there is no pointer
//! aliasing between the map and the list.
//!
//! The output-count ceiling is enforced here, at registration time, so a
//! misconfiguration fails at the call that caused it rather than at build.

use rustc_hash::FxHashMap;

use crate::errors::{GBufferError, Result};
use crate::recipe::OutputRecipe;
use crate::targets::ColorTarget;

/// Fixed ceiling on simultaneously registered outputs.
pub const MAX_OUTPUT_COUNT: usize = 16;

/// One registered output: its name, its recipe, and (once built) its
/// backing image.
#[derive(Debug)]
pub struct Output {
    name: String,
    recipe: OutputRecipe,
    target: Option<ColorTarget>,
}

impl Output {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn recipe(&self) -> &OutputRecipe {
        &self.recipe
    }

    /// The backing image, present between `build`/`resize` and `destroy`.
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&ColorTarget> {
        self.target.as_ref()
    }

    pub(crate) fn set_target(&mut self, target: Option<ColorTarget>) {
        self.target = target;
    }
}

/// Insertion-ordered, name-keyed set of outputs.
#[derive(Debug, Default)]
pub struct OutputRegistry {
    outputs: Vec<Output>,
    index: FxHashMap<String, usize>,
}

impl OutputRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new output under a unique name, copying the recipe.
    ///
    /// Fails without mutating the registry when the ceiling is reached or
    /// the name is already taken.
    pub fn insert(&mut self, name: &str, recipe: OutputRecipe) -> Result<()> {
        if self.outputs.len() >= MAX_OUTPUT_COUNT {
            return Err(GBufferError::TooManyOutputs {
                name: name.to_owned(),
                max: MAX_OUTPUT_COUNT,
            });
        }
        if self.index.contains_key(name) {
            return Err(GBufferError::DuplicateOutput(name.to_owned()));
        }

        self.index.insert(name.to_owned(), self.outputs.len());
        self.outputs.push(Output {
            name: name.to_owned(),
            recipe,
            target: None,
        });
        Ok(())
    }

    /// Looks up an output by name.
    pub fn get(&self, name: &str) -> Result<&Output> {
        self.index
            .get(name)
            .map(|&i| &self.outputs[i])
            .ok_or_else(|| GBufferError::OutputNotFound(name.to_owned()))
    }

    /// Looks up an output's recipe by name.
    pub fn recipe(&self, name: &str) -> Result<&OutputRecipe> {
        self.get(name).map(Output::recipe)
    }

    /// The attachment location of a registered output.
    #[must_use]
    pub fn location_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Outputs in attachment-location order.
    pub fn iter(&self) -> impl Iterator<Item = &Output> {
        self.outputs.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Output> {
        self.outputs.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::OutputType;

    fn recipe() -> OutputRecipe {
        OutputRecipe::new(OutputType::Vec4, wgpu::TextureFormat::Rgba16Float)
    }

    #[test]
    fn insert_and_lookup_returns_equal_recipe() {
        let mut registry = OutputRegistry::new();
        let original = recipe().with_result("vec4f(world_pos, 1.0)");
        registry.insert("position", original.clone()).unwrap();

        assert_eq!(registry.recipe("position").unwrap(), &original);
    }

    #[test]
    fn lookup_of_unknown_name_fails() {
        let registry = OutputRegistry::new();
        assert!(matches!(
            registry.recipe("missing"),
            Err(GBufferError::OutputNotFound(_))
        ));
    }

    #[test]
    fn duplicate_name_is_rejected_without_mutation() {
        let mut registry = OutputRegistry::new();
        registry.insert("albedo", recipe()).unwrap();

        let err = registry.insert("albedo", recipe().with_result("1")).unwrap_err();
        assert!(matches!(err, GBufferError::DuplicateOutput(_)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.recipe("albedo").unwrap().result, "0");
    }

    #[test]
    fn ceiling_is_enforced_at_registration() {
        let mut registry = OutputRegistry::new();
        for i in 0..MAX_OUTPUT_COUNT {
            registry.insert(&format!("out{i}"), recipe()).unwrap();
        }

        let err = registry.insert("one_too_many", recipe()).unwrap_err();
        assert!(matches!(err, GBufferError::TooManyOutputs { .. }));
        assert_eq!(registry.len(), MAX_OUTPUT_COUNT);
        assert!(registry.location_of("one_too_many").is_none());
    }

    #[test]
    fn locations_follow_insertion_order() {
        let mut registry = OutputRegistry::new();
        registry.insert("b", recipe()).unwrap();
        registry.insert("a", recipe()).unwrap();
        registry.insert("c", recipe()).unwrap();

        assert_eq!(registry.location_of("b"), Some(0));
        assert_eq!(registry.location_of("a"), Some(1));
        assert_eq!(registry.location_of("c"), Some(2));

        let names: Vec<_> = registry.iter().map(Output::name).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }
}
