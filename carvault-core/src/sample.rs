//! Bundled example payloads, used when a vehicle is added without files.

use crate::{AttributesPayload, DecodeError, StatusPayload};

pub const STATUS_JSON: &str = include_str!("../fixtures/status.json");
pub const ATTRIBUTES_JSON: &str = include_str!("../fixtures/attributes.json");

pub fn status() -> Result<StatusPayload, DecodeError> {
    StatusPayload::from_json(STATUS_JSON)
}

pub fn attributes() -> Result<AttributesPayload, DecodeError> {
    AttributesPayload::from_json(ATTRIBUTES_JSON)
}

#[cfg(test)]
mod tests {
    #[test]
    fn bundled_status_drops_its_sentinels() {
        let status = super::status().unwrap().status;

        let tires = status.tires.unwrap();
        assert!(tires.front_left.unwrap().pressure.is_some());
        assert!(tires.rear_right.unwrap().pressure.is_none());

        let liquid = status.liquid_vehicle.unwrap();
        assert!(liquid.fuel_level_percentage.is_some());
        assert!(liquid.distance_to_empty.is_none());
    }

    #[test]
    fn bundled_attributes_decode() {
        let attrs = super::attributes().unwrap();
        assert_eq!(attrs.model_name.as_deref(), Some("F-PACE"));
        assert_eq!(attrs.number_of_doors, Some(5));
    }
}
