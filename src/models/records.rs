// src/models/records.rs
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{DuplicateCheckError, ScoringError};

const BIRTHDAY_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%Y/%m/%d"];

/// Offset the forms stored date-only birthdays at (Philippine Standard Time).
/// Timestamp birthdays are read as calendar dates in this offset.
pub const RECORD_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Opaque participant identifier, e.g. `SLP ID-123456`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw participant document as held by the document store.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantDocument {
    pub id: String,
    pub data: Value,
}

/// Raw household document as held by the document store.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdDocument {
    pub id: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantRecord {
    pub id: String,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub household_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdMember {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub birthday: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdRecord {
    pub household_id: String,
    pub household_name: String,
    pub address: Option<String>,
    pub members: Vec<HouseholdMember>,
    /// Member entries that could not be decoded; the remaining members are still scored.
    pub malformed_members: Vec<ScoringError>,
}

/// Prospective participant submitted by the registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantCandidate {
    pub full_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

impl ParticipantCandidate {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            address: None,
            birthday: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_birthday(mut self, birthday: NaiveDate) -> Self {
        self.birthday = Some(birthday);
        self
    }

    /// Builds a candidate from raw form input. A birthday that is present but
    /// cannot be read as a calendar date is rejected.
    pub fn from_form(
        full_name: &str,
        address: Option<&str>,
        birthday: Option<&str>,
    ) -> Result<Self, DuplicateCheckError> {
        let birthday = match birthday.map(str::trim).filter(|b| !b.is_empty()) {
            Some(raw) => Some(parse_birthday(raw).ok_or_else(|| {
                DuplicateCheckError::InvalidCandidate(format!("unrecognised birthday '{}'", raw))
            })?),
            None => None,
        };
        Ok(Self {
            full_name: full_name.to_string(),
            address: address.map(str::to_string),
            birthday,
        })
    }
}

/// Participant to be written after the duplicate check has been cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct NewParticipant {
    pub candidate: ParticipantCandidate,
    pub household_id: Option<String>,
    /// Demographic attributes that play no part in matching.
    pub attributes: Map<String, Value>,
}

impl NewParticipant {
    pub fn from_candidate(candidate: ParticipantCandidate) -> Self {
        Self {
            candidate,
            household_id: None,
            attributes: Map::new(),
        }
    }

    pub fn to_document(&self, id: &ParticipantId) -> ParticipantDocument {
        let mut data = self.attributes.clone();
        data.insert("fullName".into(), Value::String(self.candidate.full_name.clone()));
        if let Some(address) = &self.candidate.address {
            data.insert("address".into(), Value::String(address.clone()));
        }
        if let Some(birthday) = self.candidate.birthday {
            data.insert("birthday".into(), Value::String(birthday.format("%Y-%m-%d").to_string()));
        }
        if let Some(household_id) = &self.household_id {
            data.insert("householdId".into(), Value::String(household_id.clone()));
        }
        ParticipantDocument {
            id: id.0.clone(),
            data: Value::Object(data),
        }
    }
}

impl ParticipantRecord {
    pub fn from_document(doc: &ParticipantDocument) -> Result<Self, ScoringError> {
        let fields = as_object(&doc.id, &doc.data)?;
        Ok(Self {
            id: doc.id.clone(),
            full_name: string_field(&doc.id, fields, "fullName")?,
            address: location_field(&doc.id, fields)?,
            birthday: birthday_field(fields.get("birthday")),
            household_id: string_field(&doc.id, fields, "householdId")?,
        })
    }
}

impl HouseholdRecord {
    pub fn from_document(doc: &HouseholdDocument) -> Result<Self, ScoringError> {
        let fields = as_object(&doc.id, &doc.data)?;
        let mut members = Vec::new();
        let mut malformed_members = Vec::new();
        match fields.get("members") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    match HouseholdMember::from_value(&format!("{}/members/{}", doc.id, idx), item) {
                        Ok(member) => members.push(member),
                        Err(e) => malformed_members.push(e),
                    }
                }
            }
            Some(other) => {
                return Err(ScoringError::MalformedField {
                    id: doc.id.clone(),
                    field: "members",
                    reason: format!("expected an array, found {}", value_kind(other)),
                })
            }
        }
        Ok(Self {
            household_id: string_field(&doc.id, fields, "householdId")?
                .unwrap_or_else(|| doc.id.clone()),
            household_name: string_field(&doc.id, fields, "householdName")?.unwrap_or_default(),
            address: location_field(&doc.id, fields)?,
            members,
            malformed_members,
        })
    }
}

impl HouseholdMember {
    fn from_value(member_id: &str, value: &Value) -> Result<Self, ScoringError> {
        let fields = value.as_object().ok_or_else(|| ScoringError::MalformedField {
            id: member_id.to_string(),
            field: "members",
            reason: format!("member entry is {}", value_kind(value)),
        })?;
        Ok(Self {
            name: string_field(member_id, fields, "name")?,
            relationship: string_field(member_id, fields, "relationship")?,
            birthday: birthday_field(fields.get("birthday")),
        })
    }
}

/// Reads a calendar date from the formats the registration forms have produced.
pub fn parse_birthday(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in BIRTHDAY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

fn as_object<'a>(id: &str, data: &'a Value) -> Result<&'a Map<String, Value>, ScoringError> {
    data.as_object().ok_or_else(|| ScoringError::MalformedField {
        id: id.to_string(),
        field: "document",
        reason: format!("expected an object, found {}", value_kind(data)),
    })
}

fn string_field(
    id: &str,
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ScoringError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ScoringError::MalformedField {
            id: id.to_string(),
            field,
            reason: format!("expected a string, found {}", value_kind(other)),
        }),
    }
}

/// Free-text address, falling back to the barangay / municipality / province parts.
fn location_field(id: &str, fields: &Map<String, Value>) -> Result<Option<String>, ScoringError> {
    if let Some(address) = string_field(id, fields, "address")? {
        return Ok(Some(address));
    }
    let parts = [
        string_field(id, fields, "barangay")?,
        string_field(id, fields, "municipality")?,
        string_field(id, fields, "province")?,
    ];
    let composed = parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(if composed.is_empty() { None } else { Some(composed) })
}

fn birthday_field(value: Option<&Value>) -> Option<NaiveDate> {
    match value? {
        Value::String(raw) => parse_birthday(raw),
        Value::Object(ts) => ts
            .get("seconds")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .zip(FixedOffset::east_opt(RECORD_UTC_OFFSET_SECS))
            .map(|(dt, offset)| dt.with_timezone(&offset).date_naive()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
