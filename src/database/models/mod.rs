pub mod celestial_object;
pub mod map;
pub mod user;

pub use celestial_object::{
    UnknownVariant,
    CelestialKind, CelestialObject, CelestialObjectDraft, PlanetType, Position, StarType,
};
pub use map::{Map, MapDraft, MapView};
pub use user::{NewUser, Role, User, UserResponse};

/// Integer identifiers used by every stored entity
pub type EntityId = i64;
pub type UserId = i64;

/// Entities with a single owning user and a public/private flag
pub trait Owned {
    fn owner_id(&self) -> UserId;

    fn is_public(&self) -> bool;

    fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id() == user_id
    }

    /// Public entities are visible to everyone, private ones only to the owner.
    fn is_visible_to(&self, viewer: Option<UserId>) -> bool {
        self.is_public() || viewer.is_some_and(|v| self.is_owned_by(v))
    }
}
