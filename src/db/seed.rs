//! Demo data loader for empty databases.
//!
//! Reads `ingredient.json`, `utensil.json` and `step.json` from a seed
//! directory. Rows of one table are inserted concurrently; steps are loaded
//! after the entities they reference.

use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::db::{ingredient, step, utensil, Db};
use crate::error::{KitchenError, Result};
use crate::model::{IngredientData, SimpleStep, UtensilData};

/// Rows inserted per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub ingredients: usize,
    pub utensils: usize,
    pub steps: usize,
}

fn read_table<T: DeserializeOwned>(seed_dir: &Path, table: &str) -> Result<Vec<T>> {
    let path = seed_dir.join(format!("{}.json", table));
    let content = fs::read_to_string(&path).map_err(|e| {
        KitchenError::Config(format!("Cannot read seed file {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Whether every table of the graph is empty.
pub async fn is_empty(db: &Db) -> Result<bool> {
    let (ingredients, utensils, steps) = tokio::try_join!(
        ingredient::count(db),
        utensil::count(db),
        step::count(db),
    )?;
    Ok(ingredients == 0 && utensils == 0 && steps == 0)
}

/// Insert the seed files into the store, whatever it already holds.
pub async fn populate(db: &Db, seed_dir: &Path) -> Result<SeedReport> {
    let ingredients: Vec<IngredientData> = read_table(seed_dir, "ingredient")?;
    let utensils: Vec<UtensilData> = read_table(seed_dir, "utensil")?;
    let steps: Vec<SimpleStep> = read_table(seed_dir, "step")?;

    for data in &ingredients {
        data.validate()?;
    }
    for data in &utensils {
        data.validate()?;
    }

    let (ingredient_ids, utensil_ids) = tokio::try_join!(
        try_join_all(ingredients.into_iter().map(|data| ingredient::create(db, data))),
        try_join_all(utensils.into_iter().map(|data| utensil::create(db, data))),
    )?;
    log::debug!("Seeded ingredients {:?} and utensils {:?}", ingredient_ids, utensil_ids);

    let step_count = steps.len();
    try_join_all(steps.into_iter().map(|candidate| step::create(db, candidate))).await?;

    let report = SeedReport {
        ingredients: ingredient_ids.len(),
        utensils: utensil_ids.len(),
        steps: step_count,
    };
    log::info!(
        "Seeded {} ingredients, {} utensils and {} steps from {}",
        report.ingredients,
        report.utensils,
        report.steps,
        seed_dir.display()
    );
    Ok(report)
}

/// Populate only when the graph is empty; returns `None` when skipped.
pub async fn populate_if_empty(db: &Db, seed_dir: &Path) -> Result<Option<SeedReport>> {
    if !is_empty(db).await? {
        log::info!("Database already holds data. No population needed");
        return Ok(None);
    }
    populate(db, seed_dir).await.map(Some)
}
