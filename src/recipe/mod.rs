//! Recipes: paths of steps from a start ingredient to an end ingredient.
//!
//! A recipe is held as its first ingredient followed by an ordered list of
//! hops. Over the wire it keeps the flat record shape produced by the
//! storage view: `input, utensil1, mid1, ..., utensilN, midN, steps, output`.

pub mod assembler;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{KitchenError, Result};
use crate::model::{Ingredient, Utensil};

pub use assembler::complete_recipe;

/// Longest path the recipe view enumerates.
pub const MAX_HOPS: usize = 5;

/// One step of a recipe: the utensil used and the ingredient it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop<U, I> {
    pub utensil: U,
    pub ingredient: I,
}

/// A path of 1 to [`MAX_HOPS`] steps starting at `input`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe<I, U> {
    input: I,
    hops: Vec<Hop<U, I>>,
}

/// Recipe with ingredient and utensil ids.
pub type SimpleRecipe = Recipe<i64, i64>;

/// Recipe with every ingredient and utensil expanded.
pub type DetailedRecipe = Recipe<Ingredient, Utensil>;

impl<I, U> Recipe<I, U> {
    pub fn new(input: I, hops: Vec<Hop<U, I>>) -> Result<Self> {
        if hops.is_empty() || hops.len() > MAX_HOPS {
            return Err(KitchenError::Integrity(format!(
                "A recipe needs between 1 and {} steps, got {}",
                MAX_HOPS,
                hops.len()
            )));
        }
        Ok(Self { input, hops })
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn hops(&self) -> &[Hop<U, I>] {
        &self.hops
    }

    /// Number of steps in the path.
    pub fn steps(&self) -> usize {
        self.hops.len()
    }

    /// Ingredient produced by the last step.
    pub fn output(&self) -> &I {
        self.hops
            .last()
            .map(|hop| &hop.ingredient)
            .unwrap_or(&self.input)
    }
}

impl<I: Serialize, U: Serialize> Serialize for Recipe<I, U> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + 2 * self.hops.len()))?;
        map.serialize_entry("input", &self.input)?;
        for (idx, hop) in self.hops.iter().enumerate() {
            map.serialize_entry(&format!("utensil{}", idx + 1), &hop.utensil)?;
            map.serialize_entry(&format!("mid{}", idx + 1), &hop.ingredient)?;
        }
        map.serialize_entry("steps", &self.steps())?;
        map.serialize_entry("output", self.output())?;
        map.end()
    }
}
