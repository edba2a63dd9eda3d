use serde::{Deserialize, Serialize};

use crate::json::{self, DecodeError};

/// Descriptive vehicle record. Every field is independently optional and
/// dates are kept as the text the vehicle service sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributesPayload {
    pub operation_id: Option<String>,
    pub active_demo: Option<bool>,
    pub body_style: Option<String>,
    pub brand: Option<String>,
    pub build_station: Option<String>,
    pub car_delivery_date: Option<String>,
    pub car_stage: Option<String>,
    pub car_status: Option<String>,
    pub chassis_number: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub country_of_residence: Option<String>,
    pub current_dealer_code: Option<String>,
    pub engine_number: Option<String>,
    pub exterior_paint_colour: Option<String>,
    #[serde(rename = "externalGUID")]
    pub external_guid: Option<String>,
    pub gearbox: Option<String>,
    pub hand_of_drive: Option<String>,
    pub is_warranty_started: Option<bool>,
    pub interior_colour1: Option<String>,
    pub item: Option<String>,
    pub last_modified_by_id: Option<String>,
    #[serde(rename = "lastServiceCI")]
    pub last_service_ci: Option<String>,
    pub last_service_date: Option<String>,
    pub last_service_milage: Option<i64>,
    pub mileage_date: Option<String>,
    pub model_code: Option<String>,
    pub model_name: Option<String>,
    pub model_year: Option<String>,
    pub my_code: Option<String>,
    pub number_of_doors: Option<i64>,
    pub number_of_seats: Option<i64>,
    pub odometer: Option<i64>,
    pub odometer_units: Option<String>,
    pub power_train_type: Option<String>,
    pub region_of_residence: Option<String>,
    pub registration: Option<String>,
    pub status: Option<String>,
    pub timeless: Option<bool>,
    pub transmission: Option<String>,
    pub r#type: Option<String>,
    pub update_customer: Option<String>,
    pub name: Option<String>,
    pub vh_code: Option<String>,
    pub variant_code: Option<String>,
    pub variant_name: Option<String>,
    pub vin: Option<String>,
    pub wireless_car_identifier: Option<String>,
}

impl AttributesPayload {
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        json::from_json_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_all_absent() {
        assert_eq!(
            AttributesPayload::from_json("{}").unwrap(),
            AttributesPayload::default()
        );
    }

    #[test]
    fn irregular_wire_names_are_honoured() {
        let attrs = AttributesPayload::from_json(
            r#"{"externalGUID": "g-1", "lastServiceCI": "ci", "interiorColour1": "Ebony", "type": "SUV", "lastServiceMilage": 12000}"#,
        )
        .unwrap();

        assert_eq!(attrs.external_guid.as_deref(), Some("g-1"));
        assert_eq!(attrs.last_service_ci.as_deref(), Some("ci"));
        assert_eq!(attrs.interior_colour1.as_deref(), Some("Ebony"));
        assert_eq!(attrs.r#type.as_deref(), Some("SUV"));
        assert_eq!(attrs.last_service_milage, Some(12000));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        assert!(AttributesPayload::from_json("{\"vin\": ").is_err());
        assert!(AttributesPayload::from_json("{\"numberOfDoors\": \"four\"}").is_err());
        assert!(AttributesPayload::from_json("[]").is_err());
    }

    #[test]
    fn sample_round_trips() {
        let attrs = AttributesPayload::from_json(crate::sample::ATTRIBUTES_JSON).unwrap();
        assert_eq!(attrs.vin.as_deref(), Some("SAJAA12B3CD456789"));
        let back = AttributesPayload::from_json(&json::to_json_text(&attrs)).unwrap();
        assert_eq!(back, attrs);
    }
}
