//! Business rules a new step must satisfy before it is stored.
//!
//! All lookups are issued concurrently; the rejection reported is always the
//! first failing rule in a fixed order, whatever order the reads finish in.

use thiserror::Error;

use crate::db::{ingredient, step, utensil, Db};
use crate::error::{KitchenError, Result};
use crate::model::{Ingredient, IngredientType, SimpleStep, StepFilter, Utensil};

/// Why a candidate step was refused, in precedence order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepRejection {
    #[error("Input and output can't be the same ingredient")]
    SameIngredient,

    #[error("The specified input ingredient doesn't exist")]
    InputMissing,

    #[error("Input ingredient can't be an end ingredient")]
    InputIsEnd,

    #[error("The specified utensil doesn't exist")]
    UtensilMissing,

    #[error("The specified output ingredient doesn't exist")]
    OutputMissing,

    #[error("Output ingredient can't be a start ingredient")]
    OutputIsStart,

    #[error("This step already exists")]
    AlreadyExists,

    #[error("Steps can't share 2 or more components with another step")]
    SharesComponents(Vec<SimpleStep>),
}

impl From<StepRejection> for KitchenError {
    fn from(rejection: StepRejection) -> Self {
        let message = rejection.to_string();
        match rejection {
            StepRejection::SharesComponents(conflicts) => KitchenError::Validation {
                message,
                conflicts: Some(conflicts),
            },
            _ => KitchenError::validation(message),
        }
    }
}

/// Everything the rules need to know about the current graph.
#[derive(Debug, Clone, Default)]
pub struct StepLookups {
    pub input: Option<Ingredient>,
    pub utensil: Option<Utensil>,
    pub output: Option<Ingredient>,
    pub existing: Option<SimpleStep>,
    /// Steps matching the candidate on at least one pair of components.
    pub pair_matches: Vec<SimpleStep>,
}

/// Apply the rules to already fetched lookups. First failure wins.
pub fn evaluate(candidate: SimpleStep, lookups: &StepLookups) -> std::result::Result<(), StepRejection> {
    if candidate.input == candidate.output {
        return Err(StepRejection::SameIngredient);
    }

    match &lookups.input {
        None => return Err(StepRejection::InputMissing),
        Some(input) if input.ingredient_type == IngredientType::End => {
            return Err(StepRejection::InputIsEnd)
        }
        Some(_) => {}
    }

    if lookups.utensil.is_none() {
        return Err(StepRejection::UtensilMissing);
    }

    match &lookups.output {
        None => return Err(StepRejection::OutputMissing),
        Some(output) if output.ingredient_type == IngredientType::Start => {
            return Err(StepRejection::OutputIsStart)
        }
        Some(_) => {}
    }

    if lookups.existing.is_some() {
        return Err(StepRejection::AlreadyExists);
    }

    let mut conflicts: Vec<SimpleStep> = lookups
        .pair_matches
        .iter()
        .copied()
        .filter(|existing| *existing != candidate && existing.shared_components(&candidate) >= 2)
        .collect();
    conflicts.sort_unstable();
    conflicts.dedup();

    if !conflicts.is_empty() {
        return Err(StepRejection::SharesComponents(conflicts));
    }

    Ok(())
}

fn pair_filters(candidate: SimpleStep) -> [StepFilter; 3] {
    [
        StepFilter { input: Some(candidate.input), utensil: Some(candidate.utensil), output: None },
        StepFilter { input: Some(candidate.input), utensil: None, output: Some(candidate.output) },
        StepFilter { input: None, utensil: Some(candidate.utensil), output: Some(candidate.output) },
    ]
}

/// Fetch every lookup concurrently, then evaluate.
///
/// The same-ingredient rule needs no reads and is checked before any query
/// is issued.
pub async fn validate_new_step(db: &Db, candidate: SimpleStep) -> Result<()> {
    if candidate.input == candidate.output {
        return Err(StepRejection::SameIngredient.into());
    }

    let [by_input_utensil, by_input_output, by_utensil_output] = pair_filters(candidate);

    let (input, utensil, output, existing, pair_a, pair_b, pair_c) = tokio::try_join!(
        ingredient::get(db, candidate.input),
        utensil::get(db, candidate.utensil),
        ingredient::get(db, candidate.output),
        step::get(db, candidate),
        step::search(db, by_input_utensil),
        step::search(db, by_input_output),
        step::search(db, by_utensil_output),
    )?;

    let lookups = StepLookups {
        input,
        utensil,
        output,
        existing,
        pair_matches: pair_a.into_iter().chain(pair_b).chain(pair_c).collect(),
    };

    evaluate(candidate, &lookups).map_err(|rejection| {
        log::debug!("Rejected step {:?}: {}", candidate, rejection);
        KitchenError::from(rejection)
    })
}

/// Validate `candidate`, then store it.
pub async fn create_step(db: &Db, candidate: SimpleStep) -> Result<()> {
    validate_new_step(db, candidate).await?;
    store_validated(db, candidate).await
}

/// Insert a step that already passed validation.
///
/// A constraint failure here means a clashing step was stored after the
/// checks ran, so the rules are evaluated again to name it.
async fn store_validated(db: &Db, candidate: SimpleStep) -> Result<()> {
    match step::create(db, candidate).await {
        Err(KitchenError::Conflict(message)) => {
            log::warn!("Step {:?} rejected on insert: {}", candidate, message);
            validate_new_step(db, candidate).await?;
            Err(KitchenError::Conflict(message))
        }
        other => other,
    }
}
