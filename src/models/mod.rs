// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - users : Utilisateurs (email + mot de passe, avatar)
//   - ingredient : Catalogue des ingrédients (name, measurement_unit)
//   - recipe : Recettes publiées
//   - recipe_ingredient : Lignes d'ingrédients d'une recette (quantité)
//   - favorite_recipe : Recettes favorites d'un utilisateur
//   - shopping_cart : Recettes dans le panier d'un utilisateur
//   - subscribe : Abonnements entre utilisateurs
//   - dto : Data Transfer Objects pour les requêtes/réponses API
//
// Points d'attention:
//   - Les couples (user, recipe) et (user, author) sont uniques (index en BD)
//   - Les FK sont en ON DELETE CASCADE
//
// ============================================================================

pub mod dto;
pub mod favorite_recipe;
pub mod ingredient;
pub mod recipe;
pub mod recipe_ingredient;
pub mod shopping_cart;
pub mod subscribe;
pub mod users;
