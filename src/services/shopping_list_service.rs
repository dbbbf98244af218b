// ============================================================================
// LISTE DE COURSES
// ============================================================================
//
// Description:
//   Agrège les lignes d'ingrédients de toutes les recettes du panier d'un
//   utilisateur: regroupement par (nom, unité), somme des quantités.
//   Le rendu texte est déterministe pour une date de génération donnée.
//
// Format du rapport:
//   Shopping list (generated: 2025-01-14 03:44:00):
//   1. Flour - 350 g
//   2. Milk - 200 ml
//   For the following recipes:
//   - Pancakes
//   - Waffles
//
// Panier vide: une seule ligne "Shopping list is empty."
//
// ============================================================================

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use sea_orm::*;

use crate::models::{ingredient, recipe, recipe_ingredient, shopping_cart};

pub const EMPTY_LIST_MESSAGE: &str = "Shopping list is empty.";
const RECIPE_LIST_HEADER: &str = "For the following recipes:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    pub items: Vec<ShoppingItem>,
    pub recipes: Vec<String>,
}

impl ShoppingList {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub struct ShoppingListService;

impl ShoppingListService {
    /// Construit la liste agrégée à partir du panier courant
    pub async fn build(db: &DatabaseConnection, user_id: i32) -> Result<ShoppingList, DbErr> {
        let cart = shopping_cart::Entity::find()
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .find_also_related(recipe::Entity)
            .all(db)
            .await?;

        let recipes: Vec<recipe::Model> = cart.into_iter().filter_map(|(_, r)| r).collect();
        if recipes.is_empty() {
            return Ok(ShoppingList::default());
        }

        let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let lines = recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids))
            .find_also_related(ingredient::Entity)
            .all(db)
            .await?;

        let items = aggregate(lines.into_iter().filter_map(|(line, ingredient)| {
            ingredient.map(|i| (i.name, i.measurement_unit, line.amount))
        }));

        let names: BTreeSet<String> = recipes.into_iter().map(|r| r.name).collect();

        Ok(ShoppingList {
            items,
            recipes: names.into_iter().collect(),
        })
    }
}

/// Regroupe par (nom, unité) et somme les quantités; trié par nom puis unité
pub fn aggregate<I>(lines: I) -> Vec<ShoppingItem>
where
    I: IntoIterator<Item = (String, String, i32)>,
{
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for (name, unit, amount) in lines {
        *totals.entry((name, unit)).or_insert(0) += i64::from(amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| ShoppingItem {
            name,
            measurement_unit,
            amount,
        })
        .collect()
}

pub fn render(list: &ShoppingList, generated_at: NaiveDateTime) -> String {
    if list.is_empty() {
        return EMPTY_LIST_MESSAGE.to_string();
    }

    let mut lines = Vec::with_capacity(list.items.len() + list.recipes.len() + 2);
    lines.push(format!(
        "Shopping list (generated: {}):",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    for (index, item) in list.items.iter().enumerate() {
        lines.push(format!(
            "{}. {} - {} {}",
            index + 1,
            capitalize(&item.name),
            item.amount,
            item.measurement_unit
        ));
    }

    if !list.recipes.is_empty() {
        lines.push(RECIPE_LIST_HEADER.to_string());
        lines.extend(list.recipes.iter().map(|name| format!("- {}", name)));
    }

    lines.join("\n")
}

pub fn attachment_filename(generated_at: NaiveDateTime) -> String {
    format!("Shopping_cart_{}.txt", generated_at.format("%Y%m%d%H%M%S"))
}

/// Première lettre en majuscule, le reste en minuscules
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 14)
            .and_then(|d| d.and_hms_opt(3, 44, 0))
            .unwrap()
    }

    fn line(name: &str, unit: &str, amount: i32) -> (String, String, i32) {
        (name.to_string(), unit.to_string(), amount)
    }

    fn in_cart(id: i32, recipe_id: i32, name: &str) -> (shopping_cart::Model, recipe::Model) {
        (
            shopping_cart::Model { id, user_id: 1, recipe_id },
            recipe::Model {
                id: recipe_id,
                author_id: 2,
                name: name.to_string(),
                image: "recipes_images/a.png".to_string(),
                text: "Mix.".to_string(),
                cooking_time: 10,
                pub_date: at(),
            },
        )
    }

    fn ingredient_line(
        id: i32,
        recipe_id: i32,
        ingredient_id: i32,
        name: &str,
        unit: &str,
        amount: i32,
    ) -> (recipe_ingredient::Model, ingredient::Model) {
        (
            recipe_ingredient::Model { id, recipe_id, ingredient_id, amount },
            ingredient::Model {
                id: ingredient_id,
                name: name.to_string(),
                measurement_unit: unit.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_build_sums_cart_recipes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![in_cart(1, 10, "Waffles"), in_cart(2, 11, "Pancakes")]])
            .append_query_results([vec![
                ingredient_line(1, 10, 100, "Flour", "g", 200),
                ingredient_line(2, 11, 100, "Flour", "g", 150),
                ingredient_line(3, 11, 101, "milk", "ml", 300),
            ]])
            .into_connection();

        let list = ShoppingListService::build(&db, 1).await.unwrap();
        assert_eq!(
            list.items,
            vec![
                ShoppingItem {
                    name: "Flour".to_string(),
                    measurement_unit: "g".to_string(),
                    amount: 350,
                },
                ShoppingItem {
                    name: "milk".to_string(),
                    measurement_unit: "ml".to_string(),
                    amount: 300,
                },
            ]
        );
        assert_eq!(list.recipes, vec!["Pancakes".to_string(), "Waffles".to_string()]);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("recipe_ingredient"));
    }

    #[tokio::test]
    async fn test_build_empty_cart_skips_ingredient_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<(shopping_cart::Model, recipe::Model)>::new()])
            .into_connection();

        let list = ShoppingListService::build(&db, 1).await.unwrap();
        assert_eq!(list, ShoppingList::default());
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[test]
    fn test_same_ingredient_from_two_recipes_is_summed() {
        let items = aggregate(vec![line("Flour", "g", 200), line("Flour", "g", 150)]);
        assert_eq!(
            items,
            vec![ShoppingItem {
                name: "Flour".to_string(),
                measurement_unit: "g".to_string(),
                amount: 350,
            }]
        );
    }

    #[test]
    fn test_different_units_stay_separate() {
        let items = aggregate(vec![
            line("sugar", "g", 100),
            line("milk", "ml", 200),
            line("sugar", "tbsp", 2),
            line("milk", "ml", 50),
        ]);
        let summary: Vec<(&str, &str, i64)> = items
            .iter()
            .map(|i| (i.name.as_str(), i.measurement_unit.as_str(), i.amount))
            .collect();
        assert_eq!(
            summary,
            vec![("milk", "ml", 250), ("sugar", "g", 100), ("sugar", "tbsp", 2)]
        );
    }

    #[test]
    fn test_render_report() {
        let list = ShoppingList {
            items: aggregate(vec![line("flour", "g", 350), line("EGGS", "pcs", 3)]),
            recipes: vec!["Pancakes".to_string(), "Waffles".to_string()],
        };

        let expected = "Shopping list (generated: 2025-01-14 03:44:00):\n\
                        1. Eggs - 3 pcs\n\
                        2. Flour - 350 g\n\
                        For the following recipes:\n\
                        - Pancakes\n\
                        - Waffles";
        assert_eq!(render(&list, at()), expected);
    }

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render(&ShoppingList::default(), at()), EMPTY_LIST_MESSAGE);
    }

    #[test]
    fn test_attachment_filename() {
        assert_eq!(attachment_filename(at()), "Shopping_cart_20250114034400.txt");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("flour"), "Flour");
        assert_eq!(capitalize("BROWN sugar"), "Brown sugar");
        assert_eq!(capitalize("яблоко"), "Яблоко");
        assert_eq!(capitalize(""), "");
    }
}
