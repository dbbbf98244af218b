// connexion BD + création du schéma à partir des entités

use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};

use crate::config::Config;
use crate::models::{
    favorite_recipe, ingredient, recipe, recipe_ingredient, shopping_cart, subscribe, users,
};

pub async fn establish_connection(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);

    Database::connect(options).await
}

/// Crée les tables manquantes (ordre parent → enfant pour les FK) et les index uniques
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, ingredient::Entity).await?;
    create_table(db, recipe::Entity).await?;
    create_table(db, recipe_ingredient::Entity).await?;
    create_table(db, favorite_recipe::Entity).await?;
    create_table(db, shopping_cart::Entity).await?;
    create_table(db, subscribe::Entity).await?;

    let backend = db.get_database_backend();
    for index in unique_indexes() {
        db.execute(backend.build(&index)).await?;
    }

    log::info!("Database schema is up to date");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(backend.build(&statement)).await?;
    Ok(())
}

fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("ux_ingredient_name_unit")
            .table(ingredient::Entity)
            .col(ingredient::Column::Name)
            .col(ingredient::Column::MeasurementUnit)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_recipe_ingredient_pair")
            .table(recipe_ingredient::Entity)
            .col(recipe_ingredient::Column::RecipeId)
            .col(recipe_ingredient::Column::IngredientId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_favorite_recipe_pair")
            .table(favorite_recipe::Entity)
            .col(favorite_recipe::Column::UserId)
            .col(favorite_recipe::Column::RecipeId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_shopping_cart_pair")
            .table(shopping_cart::Entity)
            .col(shopping_cart::Column::UserId)
            .col(shopping_cart::Column::RecipeId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_subscribe_pair")
            .table(subscribe::Entity)
            .col(subscribe::Column::UserId)
            .col(subscribe::Column::AuthorId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}
