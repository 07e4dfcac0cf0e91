use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{Condominium, Owner, Unit};

/// Consultas de catálogo sobre la estructura del condominio. Las tablas
/// se administran desde otro sistema; aquí solo se leen.
pub struct DirectoryService;

impl DirectoryService {
    pub async fn find_condominium(
        pool: &PgPool,
        condominium_id: i64,
    ) -> AppResult<Option<Condominium>> {
        let condominium =
            sqlx::query_as::<_, Condominium>("SELECT * FROM condominiums WHERE id = $1")
                .bind(condominium_id)
                .fetch_optional(pool)
                .await?;

        Ok(condominium)
    }

    pub async fn find_owner_by_user(pool: &PgPool, user_id: i64) -> AppResult<Option<Owner>> {
        let owner = sqlx::query_as::<_, Owner>("SELECT * FROM owners WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(owner)
    }

    pub async fn find_units_by_owner(pool: &PgPool, owner_id: i64) -> AppResult<Vec<Unit>> {
        let units =
            sqlx::query_as::<_, Unit>("SELECT * FROM units WHERE owner_id = $1 ORDER BY id")
                .bind(owner_id)
                .fetch_all(pool)
                .await?;

        Ok(units)
    }
}
