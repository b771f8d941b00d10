use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{EntityId, Owned, UserId};

/// Coordinates of an object inside the map it is linked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarType {
    RedDwarf,
    YellowDwarf,
    WhiteDwarf,
    BrownDwarf,
    RedGiant,
    BlueGiant,
    RedSupergiant,
    BlueSupergiant,
    NeutronStar,
}

impl StarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StarType::RedDwarf => "RedDwarf",
            StarType::YellowDwarf => "YellowDwarf",
            StarType::WhiteDwarf => "WhiteDwarf",
            StarType::BrownDwarf => "BrownDwarf",
            StarType::RedGiant => "RedGiant",
            StarType::BlueGiant => "BlueGiant",
            StarType::RedSupergiant => "RedSupergiant",
            StarType::BlueSupergiant => "BlueSupergiant",
            StarType::NeutronStar => "NeutronStar",
        }
    }
}

impl FromStr for StarType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RedDwarf" => Ok(StarType::RedDwarf),
            "YellowDwarf" => Ok(StarType::YellowDwarf),
            "WhiteDwarf" => Ok(StarType::WhiteDwarf),
            "BrownDwarf" => Ok(StarType::BrownDwarf),
            "RedGiant" => Ok(StarType::RedGiant),
            "BlueGiant" => Ok(StarType::BlueGiant),
            "RedSupergiant" => Ok(StarType::RedSupergiant),
            "BlueSupergiant" => Ok(StarType::BlueSupergiant),
            "NeutronStar" => Ok(StarType::NeutronStar),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanetType {
    Terrestrial,
    SuperEarth,
    GasGiant,
    IceGiant,
    Dwarf,
    Ocean,
}

impl PlanetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanetType::Terrestrial => "Terrestrial",
            PlanetType::SuperEarth => "SuperEarth",
            PlanetType::GasGiant => "GasGiant",
            PlanetType::IceGiant => "IceGiant",
            PlanetType::Dwarf => "Dwarf",
            PlanetType::Ocean => "Ocean",
        }
    }
}

impl FromStr for PlanetType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Terrestrial" => Ok(PlanetType::Terrestrial),
            "SuperEarth" => Ok(PlanetType::SuperEarth),
            "GasGiant" => Ok(PlanetType::GasGiant),
            "IceGiant" => Ok(PlanetType::IceGiant),
            "Dwarf" => Ok(PlanetType::Dwarf),
            "Ocean" => Ok(PlanetType::Ocean),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Raised when a stored enumeration value has no matching variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// Variant-specific data. Serialized inline with a `type` tag:
/// `{"type": "star", "brightness": 1.0, "star_type": "YellowDwarf", ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CelestialKind {
    Star {
        brightness: f64,
        star_type: StarType,
    },
    Planet {
        has_water: bool,
        has_life: bool,
        planet_type: PlanetType,
    },
}

impl CelestialKind {
    pub fn tag(&self) -> &'static str {
        match self {
            CelestialKind::Star { .. } => "star",
            CelestialKind::Planet { .. } => "planet",
        }
    }

    pub fn same_variant(&self, other: &CelestialKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialObject {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub position: Option<Position>,
    pub mass: f64,
    pub temperature: f64,
    pub radius: f64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub owner_id: UserId,
    pub is_public: bool,
    pub map_id: Option<EntityId>,
    #[serde(flatten)]
    pub kind: CelestialKind,
}

impl CelestialObject {
    /// Build an unsaved, unlinked object. The store assigns the id.
    pub fn new(draft: CelestialObjectDraft, owner_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            name: draft.name,
            description: draft.description,
            image: draft.image,
            position: None,
            mass: draft.mass,
            temperature: draft.temperature,
            radius: draft.radius,
            created_at: now,
            modified_at: now,
            owner_id,
            is_public: draft.is_public,
            map_id: None,
            kind: draft.kind,
        }
    }

    /// Replace the mutable fields from an edit payload.
    /// Identity, owner, creation time and map linkage are kept.
    pub fn apply(&mut self, draft: CelestialObjectDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.description = draft.description;
        self.image = draft.image;
        self.position = draft.position;
        self.mass = draft.mass;
        self.temperature = draft.temperature;
        self.radius = draft.radius;
        self.is_public = draft.is_public;
        self.kind = draft.kind;
        self.modified_at = now;
    }

    pub fn is_linked(&self) -> bool {
        self.map_id.is_some()
    }

    pub fn is_linked_to(&self, map_id: EntityId) -> bool {
        self.map_id == Some(map_id)
    }
}

impl Owned for CelestialObject {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }

    fn is_public(&self) -> bool {
        self.is_public
    }
}

/// Create/update payload for a celestial object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialObjectDraft {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub position: Option<Position>,
    pub mass: f64,
    pub temperature: f64,
    pub radius: f64,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub map_id: Option<EntityId>,
    #[serde(flatten)]
    pub kind: CelestialKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn star_draft_deserializes_with_type_tag() {
        let draft: CelestialObjectDraft = serde_json::from_value(json!({
            "type": "star",
            "name": "Sol",
            "description": "Our star",
            "mass": 2e30,
            "temperature": 5778.0,
            "radius": 696340.0,
            "brightness": 1.0,
            "star_type": "YellowDwarf",
            "is_public": true
        }))
        .unwrap();

        assert_eq!(
            draft.kind,
            CelestialKind::Star { brightness: 1.0, star_type: StarType::YellowDwarf }
        );
        assert_eq!(draft.image, "");
        assert!(draft.map_id.is_none());
    }

    #[test]
    fn serialized_object_carries_variant_fields_inline() {
        let draft = CelestialObjectDraft {
            name: "Terra".into(),
            description: "Home".into(),
            image: String::new(),
            position: None,
            mass: 5.97e24,
            temperature: 21.0,
            radius: 6371.0,
            is_public: false,
            map_id: None,
            kind: CelestialKind::Planet {
                has_water: true,
                has_life: true,
                planet_type: PlanetType::Terrestrial,
            },
        };
        let value = serde_json::to_value(CelestialObject::new(draft, 1, Utc::now())).unwrap();

        assert_eq!(value["type"], "planet");
        assert_eq!(value["planet_type"], "Terrestrial");
        assert_eq!(value["has_water"], true);
        assert_eq!(value["owner_id"], 1);
    }

    #[test]
    fn enum_names_round_trip_through_storage_strings() {
        assert_eq!("NeutronStar".parse::<StarType>().unwrap(), StarType::NeutronStar);
        assert_eq!(PlanetType::GasGiant.as_str().parse::<PlanetType>().unwrap(), PlanetType::GasGiant);
        assert!("Quasar".parse::<StarType>().is_err());
    }
}
