use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{map_sqlx_error, PgStore};
use crate::database::models::{
    CelestialKind, CelestialObject, EntityId, PlanetType, Position, StarType, UserId,
};
use crate::database::page::PageRequest;
use crate::database::store::{CelestialObjectStore, StoreError, StoreResult};

const COLUMNS: &str = "id, kind, name, description, image, position_x, position_y, position_z, \
     mass, temperature, radius, created_at, modified_at, owner_id, is_public, map_id, \
     brightness, star_type, has_water, has_life, planet_type";

#[derive(Debug, FromRow)]
struct CelestialObjectRow {
    id: i64,
    kind: String,
    name: String,
    description: String,
    image: String,
    position_x: Option<i32>,
    position_y: Option<i32>,
    position_z: Option<i32>,
    mass: f64,
    temperature: f64,
    radius: f64,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    owner_id: i64,
    is_public: bool,
    map_id: Option<i64>,
    brightness: Option<f64>,
    star_type: Option<String>,
    has_water: Option<bool>,
    has_life: Option<bool>,
    planet_type: Option<String>,
}

fn corrupt(id: i64, what: &str) -> StoreError {
    StoreError::Query(format!("celestial object {}: {}", id, what))
}

impl TryFrom<CelestialObjectRow> for CelestialObject {
    type Error = StoreError;

    fn try_from(row: CelestialObjectRow) -> Result<Self, Self::Error> {
        let kind = match row.kind.as_str() {
            "star" => CelestialKind::Star {
                brightness: row.brightness.ok_or_else(|| corrupt(row.id, "star without brightness"))?,
                star_type: row
                    .star_type
                    .as_deref()
                    .ok_or_else(|| corrupt(row.id, "star without star_type"))?
                    .parse::<StarType>()
                    .map_err(|e| corrupt(row.id, &e.to_string()))?,
            },
            "planet" => CelestialKind::Planet {
                has_water: row.has_water.unwrap_or(false),
                has_life: row.has_life.unwrap_or(false),
                planet_type: row
                    .planet_type
                    .as_deref()
                    .ok_or_else(|| corrupt(row.id, "planet without planet_type"))?
                    .parse::<PlanetType>()
                    .map_err(|e| corrupt(row.id, &e.to_string()))?,
            },
            other => return Err(corrupt(row.id, &format!("unknown kind '{}'", other))),
        };

        let position = match (row.position_x, row.position_y, row.position_z) {
            (Some(x), Some(y), Some(z)) => Some(Position { x, y, z }),
            _ => None,
        };

        Ok(CelestialObject {
            id: row.id,
            name: row.name,
            description: row.description,
            image: row.image,
            position,
            mass: row.mass,
            temperature: row.temperature,
            radius: row.radius,
            created_at: row.created_at,
            modified_at: row.modified_at,
            owner_id: row.owner_id,
            is_public: row.is_public,
            map_id: row.map_id,
            kind,
        })
    }
}

/// Variant columns written alongside the shared ones
struct KindColumns {
    brightness: Option<f64>,
    star_type: Option<&'static str>,
    has_water: Option<bool>,
    has_life: Option<bool>,
    planet_type: Option<&'static str>,
}

impl From<&CelestialKind> for KindColumns {
    fn from(kind: &CelestialKind) -> Self {
        match kind {
            CelestialKind::Star { brightness, star_type } => Self {
                brightness: Some(*brightness),
                star_type: Some(star_type.as_str()),
                has_water: None,
                has_life: None,
                planet_type: None,
            },
            CelestialKind::Planet { has_water, has_life, planet_type } => Self {
                brightness: None,
                star_type: None,
                has_water: Some(*has_water),
                has_life: Some(*has_life),
                planet_type: Some(planet_type.as_str()),
            },
        }
    }
}

fn into_objects(rows: Vec<CelestialObjectRow>) -> StoreResult<Vec<CelestialObject>> {
    rows.into_iter().map(CelestialObject::try_from).collect()
}

#[async_trait]
impl CelestialObjectStore for PgStore {
    async fn get_by_id(&self, id: EntityId) -> StoreResult<Option<CelestialObject>> {
        let sql = format!("SELECT {} FROM celestial_objects WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, CelestialObjectRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.map(CelestialObject::try_from).transpose()
    }

    async fn list_by_owner(&self, owner_id: UserId, page: PageRequest) -> StoreResult<Vec<CelestialObject>> {
        let sql = format!(
            "SELECT {} FROM celestial_objects WHERE owner_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, CelestialObjectRow>(&sql)
            .bind(owner_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        into_objects(rows)
    }

    async fn list_public(&self, page: PageRequest) -> StoreResult<Vec<CelestialObject>> {
        let sql = format!(
            "SELECT {} FROM celestial_objects WHERE is_public ORDER BY id LIMIT $1 OFFSET $2",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, CelestialObjectRow>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        into_objects(rows)
    }

    async fn list_by_map(&self, map_id: EntityId) -> StoreResult<Vec<CelestialObject>> {
        let sql = format!(
            "SELECT {} FROM celestial_objects WHERE map_id = $1 ORDER BY id",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, CelestialObjectRow>(&sql)
            .bind(map_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        into_objects(rows)
    }

    async fn count_by_owner(&self, owner_id: UserId) -> StoreResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM celestial_objects WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_public(&self) -> StoreResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM celestial_objects WHERE is_public")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn add(&self, object: &CelestialObject) -> StoreResult<CelestialObject> {
        let kind = KindColumns::from(&object.kind);
        let sql = format!(
            "INSERT INTO celestial_objects (kind, name, description, image, position_x, position_y, position_z, \
             mass, temperature, radius, created_at, modified_at, owner_id, is_public, map_id, \
             brightness, star_type, has_water, has_life, planet_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20) \
             RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, CelestialObjectRow>(&sql)
            .bind(object.kind.tag())
            .bind(&object.name)
            .bind(&object.description)
            .bind(&object.image)
            .bind(object.position.map(|p| p.x))
            .bind(object.position.map(|p| p.y))
            .bind(object.position.map(|p| p.z))
            .bind(object.mass)
            .bind(object.temperature)
            .bind(object.radius)
            .bind(object.created_at)
            .bind(object.modified_at)
            .bind(object.owner_id)
            .bind(object.is_public)
            .bind(object.map_id)
            .bind(kind.brightness)
            .bind(kind.star_type)
            .bind(kind.has_water)
            .bind(kind.has_life)
            .bind(kind.planet_type)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        CelestialObject::try_from(row)
    }

    async fn update(&self, id: EntityId, object: &CelestialObject) -> StoreResult<bool> {
        let kind = KindColumns::from(&object.kind);
        let result = sqlx::query(
            "UPDATE celestial_objects SET kind = $2, name = $3, description = $4, image = $5, \
             position_x = $6, position_y = $7, position_z = $8, mass = $9, temperature = $10, \
             radius = $11, modified_at = $12, is_public = $13, map_id = $14, brightness = $15, \
             star_type = $16, has_water = $17, has_life = $18, planet_type = $19 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(object.kind.tag())
        .bind(&object.name)
        .bind(&object.description)
        .bind(&object.image)
        .bind(object.position.map(|p| p.x))
        .bind(object.position.map(|p| p.y))
        .bind(object.position.map(|p| p.z))
        .bind(object.mass)
        .bind(object.temperature)
        .bind(object.radius)
        .bind(object.modified_at)
        .bind(object.is_public)
        .bind(object.map_id)
        .bind(kind.brightness)
        .bind(kind.star_type)
        .bind(kind.has_water)
        .bind(kind.has_life)
        .bind(kind.planet_type)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: EntityId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM celestial_objects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
