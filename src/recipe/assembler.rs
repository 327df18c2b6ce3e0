//! Rebuilds a [`Recipe`] from a null-filtered row of the recipe view.

use serde::de::DeserializeOwned;

use crate::error::{KitchenError, Result};
use crate::recipe::{Hop, Recipe, MAX_HOPS};
use crate::reshape::Row;

fn take<T: DeserializeOwned>(row: &mut Row, key: &str) -> Result<T> {
    let value = row
        .remove(key)
        .ok_or_else(|| KitchenError::Integrity(format!("Recipe row is missing '{}'", key)))?;
    Ok(serde_json::from_value(value)?)
}

/// Length of the path encoded in `row`: the highest `mid<k>` present,
/// checked from `mid5` down, or 1 when only `mid1` can be there.
fn path_length(row: &Row) -> usize {
    (2..=MAX_HOPS)
        .rev()
        .find(|k| row.contains_key(&format!("mid{}", k)))
        .unwrap_or(1)
}

/// Complete a recipe row whose null columns have already been dropped.
///
/// Every hop up to the path length must be present; a missing `mid1`,
/// `utensil1`, or a gap before the last hop is an integrity error.
pub fn complete_recipe<I, U>(mut row: Row) -> Result<Recipe<I, U>>
where
    I: DeserializeOwned,
    U: DeserializeOwned,
{
    let steps = path_length(&row);
    let input: I = take(&mut row, "input")?;

    let mut hops = Vec::with_capacity(steps);
    for k in 1..=steps {
        hops.push(Hop {
            utensil: take(&mut row, &format!("utensil{}", k))?,
            ingredient: take(&mut row, &format!("mid{}", k))?,
        });
    }

    if let Some(extra) = row.keys().find(|key| key.starts_with("utensil")) {
        return Err(KitchenError::Integrity(format!(
            "Recipe row has '{}' past its last step mid{}",
            extra, steps
        )));
    }
    if !row.is_empty() {
        let unknown: Vec<&String> = row.keys().collect();
        log::debug!("Ignoring unexpected recipe columns: {:?}", unknown);
    }

    Recipe::new(input, hops)
}
