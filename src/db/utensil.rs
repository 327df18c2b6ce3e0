use rusqlite::{named_params, OptionalExtension};

use crate::db::rows::query_rows;
use crate::db::Db;
use crate::error::{is_key_collision, KitchenError, Result};
use crate::model::{Utensil, UtensilData};

pub async fn get(db: &Db, id: i64) -> Result<Option<Utensil>> {
    db.with_connection(move |conn| {
        Ok(conn
            .query_row(
                "SELECT id, name, waitTimeInMillis FROM utensil WHERE id = :id",
                named_params! {":id": id},
                |row| {
                    Ok(Utensil {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        wait_time_in_millis: row.get(2)?,
                    })
                },
            )
            .optional()?)
    })
    .await
}

pub async fn get_all(db: &Db) -> Result<Vec<Utensil>> {
    db.with_connection(|conn| {
        query_rows(conn, "SELECT id, name, waitTimeInMillis FROM utensil ORDER BY id", [])?
            .into_records()
    })
    .await
}

pub async fn create(db: &Db, data: UtensilData) -> Result<i64> {
    db.with_connection(move |conn| {
        conn.execute(
            "INSERT INTO utensil (id, name, waitTimeInMillis) VALUES (:id, :name, :wait)",
            named_params! {
                ":id": data.id,
                ":name": data.name,
                ":wait": data.wait_time_in_millis,
            },
        )
        .map_err(|err| match data.id {
            Some(id) if is_key_collision(&err) => {
                log::warn!("Duplicate utensil id {}: {}", id, err);
                KitchenError::Conflict(format!("Utensil with id {} already exists", id))
            }
            _ => KitchenError::from_write(err),
        })?;
        Ok(conn.last_insert_rowid())
    })
    .await
}

/// Insert or replace the utensil with `utensil.id`.
pub async fn update(db: &Db, utensil: Utensil) -> Result<i64> {
    db.with_connection(move |conn| {
        conn.execute(
            "INSERT INTO utensil (id, name, waitTimeInMillis) VALUES (:id, :name, :wait)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                waitTimeInMillis = excluded.waitTimeInMillis",
            named_params! {
                ":id": utensil.id,
                ":name": utensil.name,
                ":wait": utensil.wait_time_in_millis,
            },
        )
        .map_err(KitchenError::from_write)?;
        Ok(utensil.id)
    })
    .await
}

pub async fn destroy(db: &Db, id: i64) -> Result<usize> {
    db.with_connection(move |conn| {
        Ok(conn.execute("DELETE FROM utensil WHERE id = :id", named_params! {":id": id})?)
    })
    .await
}

pub async fn count(db: &Db) -> Result<i64> {
    db.with_connection(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM utensil", [], |row| row.get(0))?)
    })
    .await
}
