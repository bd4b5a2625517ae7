//! Request-scoped copies of the entities owned by the external data API.
//!
//! The wire format is camelCase JSON; dates travel as the ISO-8601 strings
//! produced by [`crate::time`]. Nothing here is persisted by this service.

use serde::{Deserialize, Serialize};

/// Decoded claims of a signed availability token.
///
/// Constructed fresh per request from the raw token string and discarded
/// when the request completes. Dates have already been converted from the
/// token's epoch seconds to ISO-8601.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    /// Facility identifier (the token's `sub` claim).
    pub atf_id: String,

    /// Legacy convenience claim baked into "one click" update links.
    /// Not the source of truth for persisted availability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,

    pub start_date: String,
    pub end_date: String,
}

/// One facility's bookable-capacity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub is_available: bool,
    pub start_date: String,
    pub end_date: String,

    /// Stamped with the current instant exactly when availability is
    /// written; never touched on reads.
    pub last_updated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(default)]
    pub postcode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub long: f64,
}

/// An Authorised Testing Facility record, owned entirely by the external
/// data API. Most fields are optional so that record-shape drift on the API
/// side never breaks token-gated pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorisedTestingFacility {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_location: Option<GeoLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inclusions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_serializes_camel_case() {
        let availability = Availability {
            is_available: true,
            start_date: "2020-10-06T07:01:45.000Z".to_string(),
            end_date: "2020-11-03T17:01:45.000Z".to_string(),
            last_updated: "2020-10-06T08:00:00.000Z".to_string(),
        };

        let json = serde_json::to_value(&availability).unwrap();
        assert_eq!(json["isAvailable"], true);
        assert_eq!(json["startDate"], "2020-10-06T07:01:45.000Z");
        assert_eq!(json["lastUpdated"], "2020-10-06T08:00:00.000Z");
    }

    #[test]
    fn atf_deserializes_from_sparse_record() {
        let atf: AuthorisedTestingFacility = serde_json::from_str(
            r#"{"id":"4321","name":"Derby Cars Ltd.","availability":
               {"isAvailable":false,"startDate":"a","endDate":"b","lastUpdated":"c"}}"#,
        )
        .unwrap();

        assert_eq!(atf.id, "4321");
        assert_eq!(atf.name, "Derby Cars Ltd.");
        assert!(!atf.availability.unwrap().is_available);
        assert!(atf.address.is_none());
        assert!(atf.inclusions.is_empty());
    }

    #[test]
    fn token_payload_omits_absent_legacy_claim() {
        let payload = TokenPayload {
            atf_id: "id1".to_string(),
            is_available: None,
            start_date: "2020-10-06T07:01:45.000Z".to_string(),
            end_date: "2020-11-03T17:01:45.000Z".to_string(),
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("isAvailable"));
        assert!(json.contains("\"atfId\":\"id1\""));
    }
}
