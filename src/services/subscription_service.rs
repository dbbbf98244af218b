use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::errors::{ApiError, ValidationError};
use crate::models::{subscribe, users};

pub struct SubscriptionService;

impl SubscriptionService {
    /// Abonne user_id à author_id; renvoie l'auteur
    pub async fn subscribe(
        db: &DatabaseConnection,
        user_id: i32,
        author_id: i32,
    ) -> Result<users::Model, ApiError> {
        let author = users::Entity::find_by_id(author_id)
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("User"))?;

        if user_id == author_id {
            return Err(ValidationError::SelfSubscription.into());
        }

        // insertion atomique: 0 ligne = déjà abonné
        let inserted = subscribe::Entity::insert(subscribe::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([subscribe::Column::UserId, subscribe::Column::AuthorId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

        if inserted == 0 {
            return Err(ValidationError::AlreadySubscribed.into());
        }

        log::info!("User {} subscribed to {}", user_id, author_id);
        Ok(author)
    }

    pub async fn unsubscribe(
        db: &DatabaseConnection,
        user_id: i32,
        author_id: i32,
    ) -> Result<(), ApiError> {
        let exists = users::Entity::find_by_id(author_id).one(db).await?.is_some();
        if !exists {
            return Err(ApiError::NotFound("User"));
        }

        let deleted = subscribe::Entity::delete_many()
            .filter(subscribe::Column::UserId.eq(user_id))
            .filter(subscribe::Column::AuthorId.eq(author_id))
            .exec(db)
            .await?;

        if deleted.rows_affected == 0 {
            return Err(ValidationError::NotSubscribed.into());
        }

        log::info!("User {} unsubscribed from {}", user_id, author_id);
        Ok(())
    }

    /// Page d'auteurs suivis (ordre d'abonnement) + nombre total
    pub async fn list_authors(
        db: &DatabaseConnection,
        user_id: i32,
        offset: u64,
        limit: u64,
    ) -> Result<(u64, Vec<users::Model>), ApiError> {
        let query = subscribe::Entity::find().filter(subscribe::Column::UserId.eq(user_id));

        let count = query.clone().count(db).await?;

        let author_ids: Vec<i32> = query
            .order_by_asc(subscribe::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.author_id)
            .collect();

        if author_ids.is_empty() {
            return Ok((count, Vec::new()));
        }

        let mut authors = users::Entity::find()
            .filter(users::Column::Id.is_in(author_ids.clone()))
            .all(db)
            .await?;

        // on garde l'ordre des abonnements
        authors.sort_by_key(|author| author_ids.iter().position(|id| *id == author.id));

        Ok((count, authors))
    }
}
