// ============================================================================
// VALIDATION DES RECETTES
// ============================================================================
//
// Point unique de validation pour la création et la modification.
// Ordre des vérifications (le premier échec gagne):
//   1. liste d'ingrédients présente et non vide  → MissingIngredients
//   2. aucun id d'ingrédient répété              → DuplicateIngredients(ids)
//   3. cooking_time >= 1 et chaque amount >= 1   → InvalidQuantity
//
// L'existence des ingrédients en BD est vérifiée ensuite par recipe_service.
//
// ============================================================================

use std::collections::BTreeMap;

use crate::errors::ValidationError;
use crate::models::dto::IngredientAmount;

pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 32767;
pub const MIN_AMOUNT: i32 = 1;

/// Valide la liste d'ingrédients et le temps de cuisson (None = inchangé, PATCH)
pub fn validate_recipe_input(
    ingredients: Option<&[IngredientAmount]>,
    cooking_time: Option<i32>,
) -> Result<Vec<IngredientAmount>, ValidationError> {
    let ingredients = match ingredients {
        Some(list) if !list.is_empty() => list,
        _ => return Err(ValidationError::MissingIngredients),
    };

    let duplicates = duplicate_ids(ingredients);
    if !duplicates.is_empty() {
        return Err(ValidationError::DuplicateIngredients(duplicates));
    }

    if let Some(cooking_time) = cooking_time {
        validate_cooking_time(cooking_time)?;
    }

    if let Some(line) = ingredients.iter().find(|line| line.amount < MIN_AMOUNT) {
        return Err(ValidationError::InvalidQuantity(format!(
            "Amount for ingredient {} must be at least {}",
            line.id, MIN_AMOUNT
        )));
    }

    Ok(ingredients.to_vec())
}

pub fn validate_cooking_time(cooking_time: i32) -> Result<(), ValidationError> {
    if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&cooking_time) {
        return Err(ValidationError::InvalidQuantity(format!(
            "Cooking time must be between {} and {} minutes",
            MIN_COOKING_TIME, MAX_COOKING_TIME
        )));
    }
    Ok(())
}

/// Ids présents plus d'une fois, triés
fn duplicate_ids(ingredients: &[IngredientAmount]) -> Vec<i32> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for line in ingredients {
        *counts.entry(line.id).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i32, amount: i32) -> IngredientAmount {
        IngredientAmount { id, amount }
    }

    #[test]
    fn test_valid_input_is_returned_in_order() {
        let input = vec![line(3, 100), line(1, 2)];
        let validated = validate_recipe_input(Some(input.as_slice()), Some(15)).unwrap();
        assert_eq!(validated, input);
    }

    #[test]
    fn test_missing_or_empty_ingredients() {
        assert_eq!(
            validate_recipe_input(None, Some(10)),
            Err(ValidationError::MissingIngredients)
        );
        assert_eq!(
            validate_recipe_input(Some(&[][..]), Some(10)),
            Err(ValidationError::MissingIngredients)
        );
    }

    #[test]
    fn test_duplicate_ingredients_name_the_ids() {
        let input = vec![line(1, 2), line(1, 3)];
        assert_eq!(
            validate_recipe_input(Some(input.as_slice()), Some(10)),
            Err(ValidationError::DuplicateIngredients(vec![1]))
        );
    }

    #[test]
    fn test_duplicates_checked_before_quantities() {
        let input = vec![line(2, 0), line(2, 0), line(5, 1), line(5, 1)];
        assert_eq!(
            validate_recipe_input(Some(input.as_slice()), Some(0)),
            Err(ValidationError::DuplicateIngredients(vec![2, 5]))
        );
    }

    #[test]
    fn test_invalid_quantities() {
        let input = vec![line(1, 1)];
        assert!(matches!(
            validate_recipe_input(Some(input.as_slice()), Some(0)),
            Err(ValidationError::InvalidQuantity(_))
        ));

        let input = vec![line(1, 1), line(2, 0)];
        assert!(matches!(
            validate_recipe_input(Some(input.as_slice()), Some(10)),
            Err(ValidationError::InvalidQuantity(_))
        ));

        assert!(validate_cooking_time(MAX_COOKING_TIME + 1).is_err());
        assert!(validate_cooking_time(1).is_ok());
    }

    #[test]
    fn test_patch_without_cooking_time() {
        let input = vec![line(1, 1)];
        assert!(validate_recipe_input(Some(input.as_slice()), None).is_ok());
    }
}
