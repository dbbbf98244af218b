pub mod flags_service;
pub mod ingredient_import;
pub mod ingredient_service;
pub mod media_store;
pub mod recipe_service;
pub mod recipe_validation;
pub mod shopping_list_service;
pub mod subscription_service;
pub mod toggle_service;
pub mod user_service;
