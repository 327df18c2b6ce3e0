//! Entities of the crafting graph and the payloads used to create them.

use serde::{Deserialize, Serialize};

use crate::error::{KitchenError, Result};

/// Position of an ingredient in the crafting graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientType {
    Start,
    Mid,
    End,
}

impl IngredientType {
    /// Column value stored in `ingredient.type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientType::Start => "start",
            IngredientType::Mid => "mid",
            IngredientType::End => "end",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "start" => Some(IngredientType::Start),
            "mid" => Some(IngredientType::Mid),
            "end" => Some(IngredientType::End),
            _ => None,
        }
    }
}

/// A typed node of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub ingredient_type: IngredientType,
}

/// Body of `POST /ingredients` and `PUT /ingredients/{id}`.
///
/// `id` is optional on creation; when omitted the store assigns one.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngredientData {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub ingredient_type: IngredientType,
}

impl IngredientData {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(KitchenError::InvalidInput(
                "\"name\" is not allowed to be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_id(self, id: i64) -> Ingredient {
        Ingredient {
            id,
            name: self.name,
            ingredient_type: self.ingredient_type,
        }
    }
}

/// A tool used by steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utensil {
    pub id: i64,
    pub name: String,
    #[serde(rename = "waitTimeInMillis")]
    pub wait_time_in_millis: i64,
}

/// Body of `POST /utensils` and `PUT /utensils/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UtensilData {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "waitTimeInMillis")]
    pub wait_time_in_millis: i64,
}

impl UtensilData {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(KitchenError::InvalidInput(
                "\"name\" is not allowed to be empty".to_string(),
            ));
        }
        if self.wait_time_in_millis < 0 {
            return Err(KitchenError::InvalidInput(
                "\"waitTimeInMillis\" must be greater than or equal to 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_id(self, id: i64) -> Utensil {
        Utensil {
            id,
            name: self.name,
            wait_time_in_millis: self.wait_time_in_millis,
        }
    }
}

/// A directed edge `input --utensil--> output`, identified by the whole triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimpleStep {
    pub input: i64,
    pub utensil: i64,
    pub output: i64,
}

impl SimpleStep {
    pub fn new(input: i64, utensil: i64, output: i64) -> Self {
        Self {
            input,
            utensil,
            output,
        }
    }

    /// Number of components (input, utensil, output) both steps agree on.
    pub fn shared_components(&self, other: &SimpleStep) -> usize {
        usize::from(self.input == other.input)
            + usize::from(self.utensil == other.utensil)
            + usize::from(self.output == other.output)
    }

    /// Parse the `{input}-{utensil}-{output}` path form.
    pub fn parse_triple(value: &str) -> Option<Self> {
        let mut parts = value.split('-');
        let input = parts.next()?.parse().ok()?;
        let utensil = parts.next()?.parse().ok()?;
        let output = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(input, utensil, output))
    }
}

/// A step with every component expanded to its full entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedStep {
    pub input: Ingredient,
    pub utensil: Utensil,
    pub output: Ingredient,
}

/// Partial predicate over step components; `None` matches anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepFilter {
    pub input: Option<i64>,
    pub utensil: Option<i64>,
    pub output: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ingredient_type_serializes_lowercase() {
        let ingredient = Ingredient {
            id: 1,
            name: "flour".to_string(),
            ingredient_type: IngredientType::Start,
        };
        let value = serde_json::to_value(&ingredient).unwrap();
        assert_eq!(value, json!({"id": 1, "name": "flour", "type": "start"}));
    }

    #[test]
    fn test_utensil_uses_camel_case_wait_time() {
        let utensil: Utensil =
            serde_json::from_value(json!({"id": 2, "name": "oven", "waitTimeInMillis": 500}))
                .unwrap();
        assert_eq!(utensil.wait_time_in_millis, 500);
    }

    #[test]
    fn test_ingredient_data_rejects_unknown_fields() {
        let result: std::result::Result<IngredientData, _> =
            serde_json::from_value(json!({"name": "x", "type": "mid", "colour": "red"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_utensil_data_negative_wait_time() {
        let data = UtensilData {
            id: None,
            name: "pan".to_string(),
            wait_time_in_millis: -1,
        };
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_shared_components() {
        let a = SimpleStep::new(1, 1, 2);
        assert_eq!(a.shared_components(&SimpleStep::new(1, 2, 3)), 1);
        assert_eq!(a.shared_components(&SimpleStep::new(1, 1, 3)), 2);
        assert_eq!(a.shared_components(&a), 3);
    }

    #[test]
    fn test_parse_triple() {
        assert_eq!(SimpleStep::parse_triple("101-1-102"), Some(SimpleStep::new(101, 1, 102)));
        assert_eq!(SimpleStep::parse_triple("101-1"), None);
        assert_eq!(SimpleStep::parse_triple("101-1-102-4"), None);
        assert_eq!(SimpleStep::parse_triple("a-1-2"), None);
    }
}
