use async_trait::async_trait;

use super::{map_sqlx_error, PgStore};
use crate::database::models::{EntityId, Map, UserId};
use crate::database::page::PageRequest;
use crate::database::store::{MapStore, StoreResult};

const COLUMNS: &str = "id, name, owner_id, is_public, created_at, modified_at";

#[async_trait]
impl MapStore for PgStore {
    async fn get_by_id(&self, id: EntityId) -> StoreResult<Option<Map>> {
        let sql = format!("SELECT {} FROM maps WHERE id = $1", COLUMNS);
        sqlx::query_as::<_, Map>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_by_owner(&self, owner_id: UserId, page: PageRequest) -> StoreResult<Vec<Map>> {
        let sql = format!(
            "SELECT {} FROM maps WHERE owner_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            COLUMNS
        );
        sqlx::query_as::<_, Map>(&sql)
            .bind(owner_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_public(&self, page: PageRequest) -> StoreResult<Vec<Map>> {
        let sql = format!(
            "SELECT {} FROM maps WHERE is_public ORDER BY id LIMIT $1 OFFSET $2",
            COLUMNS
        );
        sqlx::query_as::<_, Map>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_by_owner(&self, owner_id: UserId) -> StoreResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM maps WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_public(&self) -> StoreResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM maps WHERE is_public")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn add(&self, map: &Map) -> StoreResult<Map> {
        let sql = format!(
            "INSERT INTO maps (name, owner_id, is_public, created_at, modified_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COLUMNS
        );
        sqlx::query_as::<_, Map>(&sql)
            .bind(&map.name)
            .bind(map.owner_id)
            .bind(map.is_public)
            .bind(map.created_at)
            .bind(map.modified_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn update(&self, id: EntityId, map: &Map) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE maps SET name = $2, is_public = $3, modified_at = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(&map.name)
        .bind(map.is_public)
        .bind(map.modified_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: EntityId) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // positions only exist on linked objects
        sqlx::query(
            "UPDATE celestial_objects SET map_id = NULL, position_x = NULL, position_y = NULL, \
             position_z = NULL WHERE map_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let result = sqlx::query("DELETE FROM maps WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
