//! Field-level rules applied before any write.
//!
//! Every check is pure and reports the first offending field. Boundaries are
//! exact: `mass` must be strictly positive, `temperature` may equal -273.

use crate::database::models::{CelestialKind, CelestialObjectDraft, EntityId, MapDraft};
use crate::database::page::PageRequest;
use crate::services::error::ValidationError;

pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const IMAGE_MAX_CHARS: usize = 500;
pub const MIN_TEMPERATURE: f64 = -273.0;

pub type ValidationResult = Result<(), ValidationError>;

fn required_text(field: &'static str, value: &str, max_chars: usize) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    bounded_text(field, value, max_chars)
}

fn bounded_text(field: &'static str, value: &str, max_chars: usize) -> ValidationResult {
    if value.chars().count() > max_chars {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_chars),
        ));
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> ValidationResult {
    // NaN fails this comparison too
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be greater than 0"))
    }
}

pub fn validate_name(value: &str) -> ValidationResult {
    required_text("name", value, NAME_MAX_CHARS)
}

/// Shared and variant-specific field checks.
///
/// `map_id` is the linkage the position rule is checked against: the
/// payload's map id on create, the stored linkage on update.
pub fn validate_celestial_object(
    draft: &CelestialObjectDraft,
    map_id: Option<EntityId>,
) -> ValidationResult {
    validate_celestial_fields(draft)?;
    validate_position(draft, map_id)
}

/// Everything except the position rule
pub fn validate_celestial_fields(draft: &CelestialObjectDraft) -> ValidationResult {
    validate_name(&draft.name)?;
    required_text("description", &draft.description, DESCRIPTION_MAX_CHARS)?;
    bounded_text("image", &draft.image, IMAGE_MAX_CHARS)?;
    positive("mass", draft.mass)?;
    positive("radius", draft.radius)?;
    if !(draft.temperature >= MIN_TEMPERATURE) {
        return Err(ValidationError::new(
            "temperature",
            format!("must be at least {}", MIN_TEMPERATURE),
        ));
    }

    match &draft.kind {
        CelestialKind::Star { brightness, .. } => positive("brightness", *brightness),
        CelestialKind::Planet { .. } => Ok(()),
    }
}

/// A position is only meaningful inside a map
pub fn validate_position(draft: &CelestialObjectDraft, map_id: Option<EntityId>) -> ValidationResult {
    if draft.position.is_some() && map_id.is_none() {
        return Err(ValidationError::new(
            "position",
            "cannot be set on an object that is not in a map",
        ));
    }
    Ok(())
}

pub fn validate_map(draft: &MapDraft) -> ValidationResult {
    validate_name(&draft.name)
}

/// Check 1-indexed paging parameters against the configured ceiling
pub fn validate_page(page: u32, page_size: u32, max_page_size: u32) -> Result<PageRequest, ValidationError> {
    if page < 1 {
        return Err(ValidationError::new("page", "must be at least 1"));
    }
    if page_size < 1 || page_size > max_page_size {
        return Err(ValidationError::new(
            "page_size",
            format!("must be between 1 and {}", max_page_size),
        ));
    }
    Ok(PageRequest::new(page, page_size))
}

/// "andromeda  galaxy" -> "Andromeda  Galaxy"; whitespace is preserved
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.trim().chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{PlanetType, Position, StarType};

    fn star() -> CelestialObjectDraft {
        CelestialObjectDraft {
            name: "Sol".into(),
            description: "Our star".into(),
            image: String::new(),
            position: None,
            mass: 2e30,
            temperature: 5778.0,
            radius: 696340.0,
            is_public: true,
            map_id: None,
            kind: CelestialKind::Star { brightness: 1.0, star_type: StarType::YellowDwarf },
        }
    }

    fn field_of(result: ValidationResult) -> &'static str {
        result.unwrap_err().field
    }

    #[test]
    fn mass_must_be_strictly_positive() {
        let mut draft = star();
        draft.mass = 0.0;
        assert_eq!(field_of(validate_celestial_object(&draft, None)), "mass");
        draft.mass = 0.0001;
        assert!(validate_celestial_object(&draft, None).is_ok());
        draft.mass = f64::NAN;
        assert!(validate_celestial_object(&draft, None).is_err());
    }

    #[test]
    fn temperature_boundary_is_inclusive() {
        let mut draft = star();
        draft.temperature = -273.0;
        assert!(validate_celestial_object(&draft, None).is_ok());
        draft.temperature = -273.01;
        assert_eq!(field_of(validate_celestial_object(&draft, None)), "temperature");
    }

    #[test]
    fn name_and_description_lengths_are_exact() {
        let mut draft = star();
        draft.name = "a".repeat(100);
        assert!(validate_celestial_object(&draft, None).is_ok());
        draft.name = "a".repeat(101);
        assert_eq!(field_of(validate_celestial_object(&draft, None)), "name");
        draft.name = "   ".into();
        assert_eq!(field_of(validate_celestial_object(&draft, None)), "name");

        let mut draft = star();
        draft.description = "d".repeat(1000);
        assert!(validate_celestial_object(&draft, None).is_ok());
        draft.description = "d".repeat(1001);
        assert_eq!(field_of(validate_celestial_object(&draft, None)), "description");
    }

    #[test]
    fn star_brightness_must_be_positive_but_planets_have_none() {
        let mut draft = star();
        draft.kind = CelestialKind::Star { brightness: 0.0, star_type: StarType::RedDwarf };
        assert_eq!(field_of(validate_celestial_object(&draft, None)), "brightness");

        draft.kind = CelestialKind::Planet {
            has_water: false,
            has_life: false,
            planet_type: PlanetType::GasGiant,
        };
        assert!(validate_celestial_object(&draft, None).is_ok());
    }

    #[test]
    fn position_requires_a_map() {
        let mut draft = star();
        draft.position = Some(Position { x: 1, y: 2, z: 3 });
        assert_eq!(field_of(validate_celestial_object(&draft, None)), "position");
        assert!(validate_celestial_object(&draft, Some(4)).is_ok());
    }

    #[test]
    fn paging_bounds() {
        assert_eq!(validate_page(1, 20, 100).unwrap(), PageRequest::new(1, 20));
        assert_eq!(validate_page(0, 20, 100).unwrap_err().field, "page");
        assert_eq!(validate_page(1, 0, 100).unwrap_err().field, "page_size");
        assert_eq!(validate_page(1, 101, 100).unwrap_err().field, "page_size");
        assert!(validate_page(3, 100, 100).is_ok());
    }

    #[test]
    fn title_case_normalises_each_word() {
        assert_eq!(title_case("alpha centauri"), "Alpha Centauri");
        assert_eq!(title_case("  BETELGEUSE  "), "Betelgeuse");
        assert_eq!(title_case("ross 128 b"), "Ross 128 B");
    }
}
