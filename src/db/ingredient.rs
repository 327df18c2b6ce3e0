use rusqlite::{named_params, OptionalExtension};

use crate::db::rows::query_rows;
use crate::db::Db;
use crate::error::{is_key_collision, KitchenError, Result};
use crate::model::{Ingredient, IngredientData, IngredientType};

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn into_ingredient((id, name, raw_type): (i64, String, String)) -> Result<Ingredient> {
    let ingredient_type = IngredientType::parse(&raw_type).ok_or_else(|| {
        KitchenError::Integrity(format!("Ingredient {} has unknown type '{}'", id, raw_type))
    })?;
    Ok(Ingredient {
        id,
        name,
        ingredient_type,
    })
}

pub async fn get(db: &Db, id: i64) -> Result<Option<Ingredient>> {
    let raw = db
        .with_connection(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT id, name, type FROM ingredient WHERE id = :id",
                    named_params! {":id": id},
                    from_row,
                )
                .optional()?)
        })
        .await?;
    raw.map(into_ingredient).transpose()
}

pub async fn get_all(db: &Db) -> Result<Vec<Ingredient>> {
    db.with_connection(|conn| {
        query_rows(conn, "SELECT id, name, type FROM ingredient ORDER BY id", [])?.into_records()
    })
    .await
}

/// Insert a new ingredient and return its id.
///
/// A caller-supplied id that is already taken fails with `Conflict`.
pub async fn create(db: &Db, data: IngredientData) -> Result<i64> {
    db.with_connection(move |conn| {
        conn.execute(
            "INSERT INTO ingredient (id, name, type) VALUES (:id, :name, :type)",
            named_params! {
                ":id": data.id,
                ":name": data.name,
                ":type": data.ingredient_type.as_str(),
            },
        )
        .map_err(|err| match data.id {
            Some(id) if is_key_collision(&err) => {
                log::warn!("Duplicate ingredient id {}: {}", id, err);
                KitchenError::Conflict(format!("Ingredient with id {} already exists", id))
            }
            _ => KitchenError::from_write(err),
        })?;
        Ok(conn.last_insert_rowid())
    })
    .await
}

/// Insert or replace the ingredient with `ingredient.id`.
pub async fn update(db: &Db, ingredient: Ingredient) -> Result<i64> {
    db.with_connection(move |conn| {
        conn.execute(
            "INSERT INTO ingredient (id, name, type) VALUES (:id, :name, :type)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, type = excluded.type",
            named_params! {
                ":id": ingredient.id,
                ":name": ingredient.name,
                ":type": ingredient.ingredient_type.as_str(),
            },
        )
        .map_err(KitchenError::from_write)?;
        Ok(ingredient.id)
    })
    .await
}

/// Delete by id, returning the number of rows removed.
/// Steps using the ingredient are removed by the foreign key cascade.
pub async fn destroy(db: &Db, id: i64) -> Result<usize> {
    db.with_connection(move |conn| {
        Ok(conn.execute("DELETE FROM ingredient WHERE id = :id", named_params! {":id": id})?)
    })
    .await
}

pub async fn count(db: &Db) -> Result<i64> {
    db.with_connection(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM ingredient", [], |row| row.get(0))?)
    })
    .await
}
