use rusqlite::types::ToSql;
use rusqlite::{named_params, OptionalExtension};

use crate::db::rows::{query_rows, QueryResult};
use crate::db::Db;
use crate::error::{KitchenError, Result};
use crate::model::{DetailedStep, SimpleStep, StepFilter};

/// Column names of the filtered components in `step` and `detailed_step`.
const STEP_COLUMNS: [&str; 3] = ["input", "utensil", "output"];
const DETAILED_COLUMNS: [&str; 3] = ["input_id", "utensil_id", "output_id"];

/// `WHERE` clause and bound values for the components set in `filter`.
fn where_clause(filter: &StepFilter, columns: [&str; 3]) -> (String, Vec<(&'static str, i64)>) {
    let names = [":input", ":utensil", ":output"];
    let values = [filter.input, filter.utensil, filter.output];

    let mut constraints = Vec::new();
    let mut bound = Vec::new();
    for ((column, name), value) in columns.iter().zip(names).zip(values) {
        if let Some(value) = value {
            constraints.push(format!("{} = {}", column, name));
            bound.push((name, value));
        }
    }

    if constraints.is_empty() {
        (String::new(), bound)
    } else {
        (format!(" WHERE {}", constraints.join(" AND ")), bound)
    }
}

async fn select(db: &Db, source: &'static str, filter: StepFilter) -> Result<QueryResult> {
    db.with_connection(move |conn| {
        let columns = if source == "step" { STEP_COLUMNS } else { DETAILED_COLUMNS };
        let (clause, bound) = where_clause(&filter, columns);
        let sql = format!(
            "SELECT * FROM {}{} ORDER BY {}",
            source,
            clause,
            columns.join(", ")
        );
        let params: Vec<(&str, &dyn ToSql)> = bound
            .iter()
            .map(|(name, value)| (*name, value as &dyn ToSql))
            .collect();
        query_rows(conn, &sql, params.as_slice())
    })
    .await
}

fn triple(step: SimpleStep) -> StepFilter {
    StepFilter {
        input: Some(step.input),
        utensil: Some(step.utensil),
        output: Some(step.output),
    }
}

pub async fn get(db: &Db, step: SimpleStep) -> Result<Option<SimpleStep>> {
    db.with_connection(move |conn| {
        Ok(conn
            .query_row(
                "SELECT input, utensil, output FROM step
                 WHERE input = :input AND utensil = :utensil AND output = :output",
                named_params! {":input": step.input, ":utensil": step.utensil, ":output": step.output},
                |row| Ok(SimpleStep::new(row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?)
    })
    .await
}

pub async fn get_detailed(db: &Db, step: SimpleStep) -> Result<Option<DetailedStep>> {
    let mut found = search_detailed(db, triple(step)).await?;
    Ok(found.pop())
}

/// Steps matching every component set in `filter`; an empty filter matches all.
pub async fn search(db: &Db, filter: StepFilter) -> Result<Vec<SimpleStep>> {
    select(db, "step", filter).await?.into_records()
}

pub async fn search_detailed(db: &Db, filter: StepFilter) -> Result<Vec<DetailedStep>> {
    select(db, "detailed_step", filter).await?.deepen_into()
}

pub async fn get_all(db: &Db) -> Result<Vec<SimpleStep>> {
    search(db, StepFilter::default()).await
}

pub async fn get_all_detailed(db: &Db) -> Result<Vec<DetailedStep>> {
    search_detailed(db, StepFilter::default()).await
}

pub async fn query_detailed_from_input(db: &Db, input: i64) -> Result<Vec<DetailedStep>> {
    search_detailed(db, StepFilter { input: Some(input), ..Default::default() }).await
}

pub async fn query_detailed_from_output(db: &Db, output: i64) -> Result<Vec<DetailedStep>> {
    search_detailed(db, StepFilter { output: Some(output), ..Default::default() }).await
}

pub async fn query_detailed_from_utensil(db: &Db, utensil: i64) -> Result<Vec<DetailedStep>> {
    search_detailed(db, StepFilter { utensil: Some(utensil), ..Default::default() }).await
}

pub async fn count(db: &Db) -> Result<i64> {
    db.with_connection(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM step", [], |row| row.get(0))?)
    })
    .await
}

/// Insert a step. Storage constraints (shared components, type rules,
/// missing references) surface as `Conflict`.
pub async fn create(db: &Db, step: SimpleStep) -> Result<()> {
    db.with_connection(move |conn| {
        conn.execute(
            "INSERT INTO step (input, utensil, output) VALUES (:input, :utensil, :output)",
            named_params! {":input": step.input, ":utensil": step.utensil, ":output": step.output},
        )
        .map_err(KitchenError::from_write)?;
        Ok(())
    })
    .await
}

/// Delete the exact triple, returning the number of rows removed.
pub async fn destroy(db: &Db, step: SimpleStep) -> Result<usize> {
    db.with_connection(move |conn| {
        Ok(conn.execute(
            "DELETE FROM step WHERE input = :input AND utensil = :utensil AND output = :output",
            named_params! {":input": step.input, ":utensil": step.utensil, ":output": step.output},
        )?)
    })
    .await
}
