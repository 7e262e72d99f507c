//! Flight plan record model.
//!
//! A flight plan carries one string per ICAO flight plan item. Each item has
//! a stable wire code (`"7"`, `"8_type"`, `"19_pilot"`, ...) used as the JSON
//! key in the flight plan store, so files written by earlier versions of the
//! tool load unchanged.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Conventional maximum length of the aircraft identification (Item 7).
pub const MAX_IDENTIFICATION_LEN: usize = 6;

/// Flight rules (Item 8).
pub const FLIGHT_RULES: &[&str] = &["I", "V", "Y", "Z"];

/// Type of flight (Item 8).
pub const FLIGHT_TYPES: &[&str] = &["S", "G", "N", "M", "X"];

/// Wake turbulence categories (Item 9).
pub const WAKE_CATEGORIES: &[&str] = &["L", "M", "H", "J"];

/// SSR equipment (Item 10).
pub const SSR_MODES: &[&str] = &["A", "C", "S"];

/// A single ICAO flight plan item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Aircraft identification (Item 7).
    Identification,
    /// Flight rules (Item 8).
    FlightRules,
    /// Type of flight (Item 8).
    FlightType,
    /// Type of aircraft (Item 9).
    AircraftType,
    /// Wake turbulence category (Item 9).
    WakeCategory,
    /// Equipment (Item 10).
    Equipment,
    /// SSR equipment (Item 10).
    SsrEquipment,
    /// Aerodrome of departure (Item 13).
    Departure,
    /// Estimated off-block time (Item 13).
    Eobt,
    /// Cruising speed (Item 15).
    CruiseSpeed,
    /// Cruising level (Item 15).
    CruiseLevel,
    /// Route (Item 15).
    Route,
    /// Destination aerodrome (Item 16).
    Destination,
    /// Total estimated elapsed time (Item 16).
    Eet,
    /// First alternate aerodrome (Item 16).
    FirstAlternate,
    /// Second alternate aerodrome (Item 16).
    SecondAlternate,
    /// Other information (Item 18).
    OtherInformation,
    /// Endurance (Item 19).
    Endurance,
    /// Persons on board (Item 19).
    PersonsOnBoard,
    /// Aircraft colour and markings (Item 19).
    Markings,
    /// Pilot in command (Item 19).
    Pilot,
}

impl Field {
    /// Every field, in flight plan form order.
    pub const ALL: [Field; 21] = [
        Field::Identification,
        Field::FlightRules,
        Field::FlightType,
        Field::AircraftType,
        Field::WakeCategory,
        Field::Equipment,
        Field::SsrEquipment,
        Field::Departure,
        Field::Eobt,
        Field::CruiseSpeed,
        Field::CruiseLevel,
        Field::Route,
        Field::Destination,
        Field::Eet,
        Field::FirstAlternate,
        Field::SecondAlternate,
        Field::OtherInformation,
        Field::Endurance,
        Field::PersonsOnBoard,
        Field::Markings,
        Field::Pilot,
    ];

    /// The wire code used as the JSON key for this field.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Identification => "7",
            Self::FlightRules => "8",
            Self::FlightType => "8_type",
            Self::AircraftType => "9",
            Self::WakeCategory => "9_wtc",
            Self::Equipment => "10",
            Self::SsrEquipment => "10_ssr",
            Self::Departure => "13",
            Self::Eobt => "13_eobt",
            Self::CruiseSpeed => "15_speed",
            Self::CruiseLevel => "15_level",
            Self::Route => "15_route",
            Self::Destination => "16_dest",
            Self::Eet => "16_eet",
            Self::FirstAlternate => "16_alt1",
            Self::SecondAlternate => "16_alt2",
            Self::OtherInformation => "18",
            Self::Endurance => "19_endurance",
            Self::PersonsOnBoard => "19_pob",
            Self::Markings => "19_color",
            Self::Pilot => "19_pilot",
        }
    }

    /// Human-readable label for prompts and listings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Identification => "Aircraft Identification (Item 7)",
            Self::FlightRules => "Flight Rules (Item 8)",
            Self::FlightType => "Type of Flight (Item 8)",
            Self::AircraftType => "Type of Aircraft (Item 9)",
            Self::WakeCategory => "Wake Turbulence Category (Item 9)",
            Self::Equipment => "Equipment (Item 10)",
            Self::SsrEquipment => "SSR Equipment (Item 10)",
            Self::Departure => "Aerodrome of Departure (Item 13)",
            Self::Eobt => "EOBT (Item 13, HHMM)",
            Self::CruiseSpeed => "Cruising Speed (Item 15)",
            Self::CruiseLevel => "Level (Item 15)",
            Self::Route => "Route (Item 15)",
            Self::Destination => "Destination Aerodrome (Item 16)",
            Self::Eet => "EET (Item 16, HHMM)",
            Self::FirstAlternate => "First Alternate Aerodrome (Item 16)",
            Self::SecondAlternate => "Second Alternate Aerodrome (Item 16)",
            Self::OtherInformation => "Other Information (Item 18)",
            Self::Endurance => "Endurance (Item 19, HHMM)",
            Self::PersonsOnBoard => "Persons on Board (Item 19)",
            Self::Markings => "Aircraft Color/Markings (Item 19)",
            Self::Pilot => "Pilot in Command (Item 19)",
        }
    }

    /// The allowed values for enumerated items, `None` for free text.
    ///
    /// The first entry is the value a new flight plan starts with.
    #[must_use]
    pub fn options(self) -> Option<&'static [&'static str]> {
        match self {
            Self::FlightRules => Some(FLIGHT_RULES),
            Self::FlightType => Some(FLIGHT_TYPES),
            Self::WakeCategory => Some(WAKE_CATEGORIES),
            Self::SsrEquipment => Some(SSR_MODES),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Anything the message formatter can read flight plan items from.
pub trait FieldSource {
    /// Return the value of `field`, or `None` if the record does not carry it.
    fn lookup(&self, field: Field) -> Option<&str>;

    /// Return the value of `field` or a [`Error::MissingField`].
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not carry the field.
    fn require(&self, field: Field) -> Result<&str> {
        self.lookup(field)
            .ok_or_else(|| Error::missing_field(field.code()))
    }
}

/// A complete flight plan.
///
/// Serialized as a flat JSON object keyed by wire code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightPlan {
    #[serde(rename = "7")]
    identification: String,
    #[serde(rename = "8")]
    flight_rules: String,
    #[serde(rename = "8_type")]
    flight_type: String,
    #[serde(rename = "9")]
    aircraft_type: String,
    #[serde(rename = "9_wtc")]
    wake_category: String,
    #[serde(rename = "10")]
    equipment: String,
    #[serde(rename = "10_ssr")]
    ssr_equipment: String,
    #[serde(rename = "13")]
    departure: String,
    #[serde(rename = "13_eobt")]
    eobt: String,
    #[serde(rename = "15_speed")]
    cruise_speed: String,
    #[serde(rename = "15_level")]
    cruise_level: String,
    #[serde(rename = "15_route")]
    route: String,
    #[serde(rename = "16_dest")]
    destination: String,
    #[serde(rename = "16_eet")]
    eet: String,
    #[serde(rename = "16_alt1")]
    first_alternate: String,
    #[serde(rename = "16_alt2")]
    second_alternate: String,
    #[serde(rename = "18")]
    other_information: String,
    #[serde(rename = "19_endurance")]
    endurance: String,
    #[serde(rename = "19_pob")]
    persons_on_board: String,
    #[serde(rename = "19_color")]
    markings: String,
    #[serde(rename = "19_pilot")]
    pilot: String,
}

impl FlightPlan {
    /// Create a flight plan for `identification`.
    ///
    /// Enumerated items start at their first option, everything else empty.
    #[must_use]
    pub fn new(identification: impl Into<String>) -> Self {
        let mut plan = Self {
            identification: identification.into(),
            ..Self::default()
        };
        for field in Field::ALL {
            if let Some(options) = field.options() {
                plan.set(field, options[0]);
            }
        }
        plan
    }

    /// Build a plan from a possibly incomplete record.
    ///
    /// Items the record does not carry are left empty, so an incomplete
    /// stored plan can be completed by editing it.
    #[must_use]
    pub fn from_partial(raw: &RawFlightPlan) -> Self {
        let mut plan = Self::default();
        for field in Field::ALL {
            if let Some(value) = raw.lookup(field) {
                plan.set(field, value);
            }
        }
        plan
    }

    /// The aircraft identification, which is also the store key.
    #[must_use]
    pub fn identification(&self) -> &str {
        &self.identification
    }

    /// Get the value of a field.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Identification => &self.identification,
            Field::FlightRules => &self.flight_rules,
            Field::FlightType => &self.flight_type,
            Field::AircraftType => &self.aircraft_type,
            Field::WakeCategory => &self.wake_category,
            Field::Equipment => &self.equipment,
            Field::SsrEquipment => &self.ssr_equipment,
            Field::Departure => &self.departure,
            Field::Eobt => &self.eobt,
            Field::CruiseSpeed => &self.cruise_speed,
            Field::CruiseLevel => &self.cruise_level,
            Field::Route => &self.route,
            Field::Destination => &self.destination,
            Field::Eet => &self.eet,
            Field::FirstAlternate => &self.first_alternate,
            Field::SecondAlternate => &self.second_alternate,
            Field::OtherInformation => &self.other_information,
            Field::Endurance => &self.endurance,
            Field::PersonsOnBoard => &self.persons_on_board,
            Field::Markings => &self.markings,
            Field::Pilot => &self.pilot,
        }
    }

    /// Set the value of a field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    /// Builder-style variant of [`FlightPlan::set`].
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Iterate over `(field, value)` pairs in form order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL.into_iter().map(move |field| (field, self.get(field)))
    }

    /// Check that the plan can be stored.
    ///
    /// Only the identification is required. An identification longer than
    /// the conventional six characters is accepted with a warning.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the identification is blank.
    pub fn validate(&self) -> Result<()> {
        if self.identification.trim().is_empty() {
            return Err(Error::validation(format!(
                "{} is required",
                Field::Identification.label()
            )));
        }
        if self.identification.chars().count() > MAX_IDENTIFICATION_LEN {
            warn!(
                identification = %self.identification,
                "Aircraft identification is longer than {MAX_IDENTIFICATION_LEN} characters"
            );
        }
        Ok(())
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Identification => &mut self.identification,
            Field::FlightRules => &mut self.flight_rules,
            Field::FlightType => &mut self.flight_type,
            Field::AircraftType => &mut self.aircraft_type,
            Field::WakeCategory => &mut self.wake_category,
            Field::Equipment => &mut self.equipment,
            Field::SsrEquipment => &mut self.ssr_equipment,
            Field::Departure => &mut self.departure,
            Field::Eobt => &mut self.eobt,
            Field::CruiseSpeed => &mut self.cruise_speed,
            Field::CruiseLevel => &mut self.cruise_level,
            Field::Route => &mut self.route,
            Field::Destination => &mut self.destination,
            Field::Eet => &mut self.eet,
            Field::FirstAlternate => &mut self.first_alternate,
            Field::SecondAlternate => &mut self.second_alternate,
            Field::OtherInformation => &mut self.other_information,
            Field::Endurance => &mut self.endurance,
            Field::PersonsOnBoard => &mut self.persons_on_board,
            Field::Markings => &mut self.markings,
            Field::Pilot => &mut self.pilot,
        }
    }
}

impl FieldSource for FlightPlan {
    fn lookup(&self, field: Field) -> Option<&str> {
        Some(self.get(field))
    }
}

/// A flight plan record exactly as stored, possibly incomplete.
///
/// Keys are wire codes; unknown keys are kept but never read. Missing items
/// only surface as [`Error::MissingField`] when something requires them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFlightPlan(BTreeMap<String, String>);

impl RawFlightPlan {
    /// Create an empty raw record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under a field's wire code.
    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.0.insert(field.code().to_string(), value.into());
    }

    /// Remove a field, returning its previous value.
    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.0.remove(field.code())
    }

    /// The value of `field`, or an empty string if the record lacks it.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        self.lookup(field).unwrap_or_default()
    }

    /// Items the record does not carry, in form order.
    pub fn missing(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL
            .into_iter()
            .filter(move |field| self.lookup(*field).is_none())
    }

    /// Check whether every item is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing().next().is_none()
    }
}

impl FieldSource for RawFlightPlan {
    fn lookup(&self, field: Field) -> Option<&str> {
        self.0.get(field.code()).map(String::as_str)
    }
}

impl From<FlightPlan> for RawFlightPlan {
    fn from(plan: FlightPlan) -> Self {
        Self::from(&plan)
    }
}

impl From<&FlightPlan> for RawFlightPlan {
    fn from(plan: &FlightPlan) -> Self {
        Self(
            plan.fields()
                .map(|(field, value)| (field.code().to_string(), value.to_string()))
                .collect(),
        )
    }
}

impl TryFrom<RawFlightPlan> for FlightPlan {
    type Error = Error;

    fn try_from(mut raw: RawFlightPlan) -> Result<Self> {
        let mut plan = FlightPlan::default();
        for field in Field::ALL {
            let value = raw
                .remove(field)
                .ok_or_else(|| Error::missing_field(field.code()))?;
            plan.set(field, value);
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_codes_are_unique() {
        let mut codes: Vec<_> = Field::ALL.iter().map(|f| f.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Field::ALL.len());
    }

    #[test]
    fn test_field_display_is_code() {
        assert_eq!(Field::Destination.to_string(), "16_dest");
        assert_eq!(Field::Identification.to_string(), "7");
    }

    #[test]
    fn test_options_only_for_enumerated_items() {
        assert_eq!(Field::FlightRules.options(), Some(FLIGHT_RULES));
        assert_eq!(Field::SsrEquipment.options(), Some(SSR_MODES));
        assert!(Field::Route.options().is_none());
    }

    #[test]
    fn test_new_plan_uses_first_options() {
        let plan = FlightPlan::new("N123AB");
        assert_eq!(plan.identification(), "N123AB");
        assert_eq!(plan.get(Field::FlightRules), "I");
        assert_eq!(plan.get(Field::FlightType), "S");
        assert_eq!(plan.get(Field::WakeCategory), "L");
        assert_eq!(plan.get(Field::SsrEquipment), "A");
        assert_eq!(plan.get(Field::Route), "");
    }

    #[test]
    fn test_set_and_get_every_field() {
        let mut plan = FlightPlan::default();
        for field in Field::ALL {
            plan.set(field, format!("v{}", field.code()));
        }
        for (field, value) in plan.fields() {
            assert_eq!(value, format!("v{}", field.code()));
        }
    }

    #[test]
    fn test_validate_requires_identification() {
        let err = FlightPlan::new("").validate().unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let err = FlightPlan::new("   ").validate().unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_validate_accepts_long_identification() {
        assert!(FlightPlan::new("N123ABCD").validate().is_ok());
    }

    #[test]
    fn test_serializes_with_wire_codes() {
        let plan = FlightPlan::new("N123AB").with(Field::Destination, "KSQL");
        let json = serde_json::to_value(&plan).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 21);
        assert_eq!(object["7"], "N123AB");
        assert_eq!(object["16_dest"], "KSQL");
        assert_eq!(object["8_type"], "S");
    }

    #[test]
    fn test_deserialize_rejects_incomplete_record() {
        let result: std::result::Result<FlightPlan, _> =
            serde_json::from_str(r#"{"7": "N123AB", "8": "I"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_raw_lookup() {
        let mut raw = RawFlightPlan::new();
        raw.insert(Field::Identification, "N123AB");

        assert_eq!(raw.lookup(Field::Identification), Some("N123AB"));
        assert_eq!(raw.lookup(Field::Departure), None);
        assert!(matches!(
            raw.require(Field::Departure),
            Err(Error::MissingField { code }) if code == "13"
        ));
    }

    #[test]
    fn test_raw_conversion_roundtrip() {
        let plan = FlightPlan::new("N123AB").with(Field::Pilot, "J DOE");
        let raw = RawFlightPlan::from(&plan);
        assert_eq!(FlightPlan::try_from(raw).unwrap(), plan);
    }

    #[test]
    fn test_raw_missing_items() {
        let mut raw = RawFlightPlan::from(FlightPlan::new("N123AB"));
        assert!(raw.is_complete());

        raw.remove(Field::SecondAlternate);
        raw.remove(Field::Identification);
        assert!(!raw.is_complete());
        assert_eq!(
            raw.missing().collect::<Vec<_>>(),
            vec![Field::Identification, Field::SecondAlternate]
        );
        assert_eq!(raw.get(Field::Identification), "");
    }

    #[test]
    fn test_from_partial_fills_gaps() {
        let mut raw = RawFlightPlan::new();
        raw.insert(Field::Identification, "N123AB");
        raw.insert(Field::Route, "DCT");

        let plan = FlightPlan::from_partial(&raw);
        assert_eq!(plan.identification(), "N123AB");
        assert_eq!(plan.get(Field::Route), "DCT");
        assert_eq!(plan.get(Field::SecondAlternate), "");
    }

    #[test]
    fn test_raw_conversion_reports_missing_field() {
        let plan = FlightPlan::new("N123AB");
        let mut raw = RawFlightPlan::from(&plan);
        raw.remove(Field::Eet);

        let err = FlightPlan::try_from(raw).unwrap_err();
        assert!(matches!(err, Error::MissingField { code } if code == "16_eet"));
    }
}
