use crate::db::rows::query_rows;
use crate::db::Db;
use crate::error::Result;
use crate::recipe::{complete_recipe, DetailedRecipe, SimpleRecipe};
use crate::reshape::{deepen_all, strip_null_values};

const RECIPE_ORDER: &str = "input, utensil1, mid1, utensil2, mid2, utensil3, mid3, \
     utensil4, mid4, utensil5, mid5";

const DETAILED_RECIPE_ORDER: &str = "input_id, utensil1_id, mid1_id, utensil2_id, mid2_id, \
     utensil3_id, mid3_id, utensil4_id, mid4_id, utensil5_id, mid5_id";

/// Every start-to-end path, with ingredient and utensil ids.
pub async fn get_all(db: &Db) -> Result<Vec<SimpleRecipe>> {
    let result = db
        .with_connection(|conn| {
            query_rows(conn, &format!("SELECT * FROM recipe ORDER BY {}", RECIPE_ORDER), [])
        })
        .await?;

    result
        .rows
        .iter()
        .map(|row| complete_recipe(strip_null_values(row)))
        .collect()
}

/// Every start-to-end path, with ingredients and utensils expanded.
pub async fn get_all_detailed(db: &Db) -> Result<Vec<DetailedRecipe>> {
    let result = db
        .with_connection(|conn| {
            query_rows(
                conn,
                &format!("SELECT * FROM detailed_recipe ORDER BY {}", DETAILED_RECIPE_ORDER),
                [],
            )
        })
        .await?;

    result
        .rows
        .iter()
        .map(|row| complete_recipe(deepen_all(&strip_null_values(row))))
        .collect()
}

pub async fn count(db: &Db) -> Result<i64> {
    db.with_connection(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM recipe", [], |row| row.get(0))?)
    })
    .await
}
