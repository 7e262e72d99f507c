//! ATS message formatting.
//!
//! Two layouts exist. A filed flight plan (`FPL`) renders every item of the
//! record into the parenthesised ICAO form. All other message types render
//! a short dash-separated line built from the identification, departure,
//! destination and an optional free-text addendum.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::plan::{Field, FieldSource};

/// The kind of ATS message to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Filed flight plan.
    Fpl,
    /// Delay.
    Dla,
    /// Departure.
    Dep,
    /// Arrival.
    Arr,
    /// Cancellation.
    Cnl,
    /// Modification.
    Chg,
    /// Service message.
    Svc,
    /// Alerting.
    Alr,
    /// Detresfa.
    Det,
    /// Incerfa.
    Inc,
}

impl MessageType {
    /// Every supported message type.
    pub const ALL: [MessageType; 10] = [
        MessageType::Fpl,
        MessageType::Dla,
        MessageType::Dep,
        MessageType::Arr,
        MessageType::Cnl,
        MessageType::Chg,
        MessageType::Svc,
        MessageType::Alr,
        MessageType::Det,
        MessageType::Inc,
    ];

    /// The three-letter designator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fpl => "FPL",
            Self::Dla => "DLA",
            Self::Dep => "DEP",
            Self::Arr => "ARR",
            Self::Cnl => "CNL",
            Self::Chg => "CHG",
            Self::Svc => "SVC",
            Self::Alr => "ALR",
            Self::Det => "DET",
            Self::Inc => "INC",
        }
    }

    /// Whether this type carries a free-text addendum.
    #[must_use]
    pub fn takes_addendum(self) -> bool {
        !matches!(self, Self::Fpl | Self::Cnl)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::unsupported_message_type(s))
    }
}

/// Format a message of the given type from a flight plan record.
///
/// The addendum is only used by the short layout.
///
/// # Errors
///
/// Returns [`Error::MissingField`] if the record lacks an item the layout
/// needs.
pub fn format_message<R: FieldSource + ?Sized>(
    record: &R,
    kind: MessageType,
    addendum: &str,
) -> Result<String> {
    let message = match kind {
        MessageType::Fpl => format_fpl(record)?,
        other => format_generic(record, other, addendum)?,
    };
    debug!(kind = %kind, "Formatted message");
    Ok(message)
}

/// Parse `kind` and format a message, as [`format_message`] does.
///
/// # Errors
///
/// Returns [`Error::UnsupportedMessageType`] for an unknown designator and
/// [`Error::MissingField`] for an incomplete record.
pub fn format_message_str<R: FieldSource + ?Sized>(
    record: &R,
    kind: &str,
    addendum: &str,
) -> Result<String> {
    format_message(record, kind.parse()?, addendum)
}

/// Render the full `(FPL-...)` message.
///
/// No item is validated or escaped; empty items leave their surrounding
/// spaces in place.
///
/// # Errors
///
/// Returns [`Error::MissingField`] for the first absent item.
pub fn format_fpl<R: FieldSource + ?Sized>(record: &R) -> Result<String> {
    let get = |field| record.require(field);

    Ok(format!(
        "(FPL-{id}-{rules}{kind} - {actype}/{wtc}-{equip}/{ssr} - {dep}{eobt} - \
         {speed}{level} {route} - {dest}{eet} {alt1} {alt2} - {remarks} - \
         E/{endurance} - P/{pob} - AC/{color} - PIC/{pilot})",
        id = get(Field::Identification)?,
        rules = get(Field::FlightRules)?,
        kind = get(Field::FlightType)?,
        actype = get(Field::AircraftType)?,
        wtc = get(Field::WakeCategory)?,
        equip = get(Field::Equipment)?,
        ssr = get(Field::SsrEquipment)?,
        dep = get(Field::Departure)?,
        eobt = get(Field::Eobt)?,
        speed = get(Field::CruiseSpeed)?,
        level = get(Field::CruiseLevel)?,
        route = get(Field::Route)?,
        dest = get(Field::Destination)?,
        eet = get(Field::Eet)?,
        alt1 = get(Field::FirstAlternate)?,
        alt2 = get(Field::SecondAlternate)?,
        remarks = get(Field::OtherInformation)?,
        endurance = get(Field::Endurance)?,
        pob = get(Field::PersonsOnBoard)?,
        color = get(Field::Markings)?,
        pilot = get(Field::Pilot)?,
    ))
}

/// Render the short `TYPE-ID-DEP-DEST-ADDENDUM` layout.
///
/// # Errors
///
/// Returns [`Error::MissingField`] for the first absent item.
pub fn format_generic<R: FieldSource + ?Sized>(
    record: &R,
    kind: MessageType,
    addendum: &str,
) -> Result<String> {
    let raw = format!(
        "{kind}-{id}-{dep}-{dest}-{addendum}",
        id = record.require(Field::Identification)?,
        dep = record.require(Field::Departure)?,
        dest = record.require(Field::Destination)?,
    );
    Ok(collapse_separators(&raw))
}

/// Replace each `--` with `-` in a single left-to-right pass, then strip
/// leading and trailing dashes.
///
/// Runs of three or more dashes are only partially collapsed (`---` becomes
/// `--`). Existing outboxes were produced with exactly this behavior.
#[must_use]
pub fn collapse_separators(raw: &str) -> String {
    raw.replace("--", "-").trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{FlightPlan, RawFlightPlan};

    fn sample_plan() -> FlightPlan {
        FlightPlan::new("N123AB")
            .with(Field::FlightRules, "I")
            .with(Field::FlightType, "G")
            .with(Field::AircraftType, "C172")
            .with(Field::WakeCategory, "L")
            .with(Field::Equipment, "SDG")
            .with(Field::SsrEquipment, "C")
            .with(Field::Departure, "KPAO")
            .with(Field::Eobt, "1200")
            .with(Field::CruiseSpeed, "N0110")
            .with(Field::CruiseLevel, "A050")
            .with(Field::Route, "DCT")
            .with(Field::Destination, "KSQL")
            .with(Field::Eet, "0020")
            .with(Field::Endurance, "0200")
            .with(Field::PersonsOnBoard, "2")
            .with(Field::Markings, "WHITE/BLUE")
            .with(Field::Pilot, "J DOE")
    }

    #[test]
    fn test_fpl_exact_layout() {
        let message = format_message(&sample_plan(), MessageType::Fpl, "").unwrap();
        assert_eq!(
            message,
            "(FPL-N123AB-IG - C172/L-SDG/C - KPAO1200 - N0110A050 DCT - \
             KSQL0020   -  - E/0200 - P/2 - AC/WHITE/BLUE - PIC/J DOE)"
        );
    }

    #[test]
    fn test_fpl_with_alternates_and_remarks() {
        let plan = sample_plan()
            .with(Field::FirstAlternate, "KOAK")
            .with(Field::SecondAlternate, "KSJC")
            .with(Field::OtherInformation, "PBN/B2");
        let message = format_fpl(&plan).unwrap();
        assert!(message.contains(" - KSQL0020 KOAK KSJC - PBN/B2 - E/0200"));
    }

    #[test]
    fn test_fpl_is_deterministic() {
        let plan = sample_plan();
        assert_eq!(format_fpl(&plan).unwrap(), format_fpl(&plan).unwrap());
    }

    #[test]
    fn test_fpl_ignores_addendum() {
        let plan = sample_plan();
        assert_eq!(
            format_message(&plan, MessageType::Fpl, "RMK").unwrap(),
            format_fpl(&plan).unwrap()
        );
    }

    #[test]
    fn test_fpl_missing_field() {
        let mut raw = RawFlightPlan::from(&sample_plan());
        raw.remove(Field::SecondAlternate);

        let err = format_message(&raw, MessageType::Fpl, "").unwrap_err();
        assert!(matches!(err, Error::MissingField { code } if code == "16_alt2"));
    }

    #[test]
    fn test_generic_without_addendum() {
        let message = format_message(&sample_plan(), MessageType::Dep, "").unwrap();
        assert_eq!(message, "DEP-N123AB-KPAO-KSQL");
    }

    #[test]
    fn test_generic_with_addendum() {
        let message = format_message(&sample_plan(), MessageType::Dla, "1230").unwrap();
        assert_eq!(message, "DLA-N123AB-KPAO-KSQL-1230");
    }

    #[test]
    fn test_generic_with_empty_departure() {
        let plan = sample_plan().with(Field::Departure, "");
        let message = format_message(&plan, MessageType::Arr, "1305").unwrap();
        assert_eq!(message, "ARR-N123AB-KSQL-1305");
    }

    #[test]
    fn test_generic_with_all_optional_items_empty() {
        let plan = FlightPlan::new("N123AB");
        let message = format_message(&plan, MessageType::Cnl, "").unwrap();
        assert_eq!(message, "CNL-N123AB");
    }

    #[test]
    fn test_generic_missing_field() {
        let mut raw = RawFlightPlan::new();
        raw.insert(Field::Identification, "N123AB");
        raw.insert(Field::Departure, "KPAO");

        let err = format_message(&raw, MessageType::Dep, "").unwrap_err();
        assert!(matches!(err, Error::MissingField { code } if code == "16_dest"));
    }

    #[test]
    fn test_generic_only_needs_three_items() {
        let mut raw = RawFlightPlan::new();
        raw.insert(Field::Identification, "N123AB");
        raw.insert(Field::Departure, "KPAO");
        raw.insert(Field::Destination, "KSQL");

        let message = format_message(&raw, MessageType::Svc, "QTA").unwrap();
        assert_eq!(message, "SVC-N123AB-KPAO-KSQL-QTA");
    }

    #[test]
    fn test_collapse_single_pass() {
        assert_eq!(collapse_separators("A--B"), "A-B");
        assert_eq!(collapse_separators("--A-B--"), "A-B");
        assert_eq!(collapse_separators("A---B"), "A--B");
        assert_eq!(collapse_separators("A----B"), "A--B");
        assert_eq!(collapse_separators("---"), "");
    }

    #[test]
    fn test_parse_message_type() {
        assert_eq!("FPL".parse::<MessageType>().unwrap(), MessageType::Fpl);
        assert_eq!("dep".parse::<MessageType>().unwrap(), MessageType::Dep);
        for kind in MessageType::ALL {
            assert_eq!(kind.as_str().parse::<MessageType>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_unsupported_message_type() {
        let err = "XYZ".parse::<MessageType>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedMessageType { value } if value == "XYZ"));
    }

    #[test]
    fn test_format_message_str_unsupported() {
        let err = format_message_str(&sample_plan(), "XYZ", "").unwrap_err();
        assert!(matches!(err, Error::UnsupportedMessageType { .. }));
    }

    #[test]
    fn test_takes_addendum() {
        assert!(!MessageType::Fpl.takes_addendum());
        assert!(!MessageType::Cnl.takes_addendum());
        assert!(MessageType::Dla.takes_addendum());
        assert!(MessageType::Inc.takes_addendum());
    }
}
