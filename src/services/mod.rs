pub mod apod_client;
pub mod celestial_object_service;
pub mod clock;
pub mod error;
pub mod map_service;
pub mod space_image_service;
pub mod user_service;
pub mod validation;

pub use apod_client::ApodClient;
pub use celestial_object_service::CelestialObjectService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ServiceError, ServiceResult, ValidationError};
pub use map_service::MapService;
pub use space_image_service::{SpaceImage, SpaceImageError, SpaceImageService, SpaceImageSource};
pub use user_service::{LoginRequest, RefreshRequest, RegisterRequest, TokenPair, UserService};
