//! Lead domain models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

/// A lead attribute a CSV column can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeadField {
    FullName,
    FirstName,
    LastName,
    Email,
    Phone,
    City,
    Address,
    Budget,
    Notes,
    UtmSource,
    UtmMedium,
    UtmCampaign,
    UtmTerm,
    UtmContent,
}

impl LeadField {
    pub const ALL: [LeadField; 14] = [
        LeadField::FullName,
        LeadField::FirstName,
        LeadField::LastName,
        LeadField::Email,
        LeadField::Phone,
        LeadField::City,
        LeadField::Address,
        LeadField::Budget,
        LeadField::Notes,
        LeadField::UtmSource,
        LeadField::UtmMedium,
        LeadField::UtmCampaign,
        LeadField::UtmTerm,
        LeadField::UtmContent,
    ];

    /// Wire name of the field, as the backend expects it in `columnMapping`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadField::FullName => "fullName",
            LeadField::FirstName => "firstName",
            LeadField::LastName => "lastName",
            LeadField::Email => "email",
            LeadField::Phone => "phone",
            LeadField::City => "city",
            LeadField::Address => "address",
            LeadField::Budget => "budget",
            LeadField::Notes => "notes",
            LeadField::UtmSource => "utmSource",
            LeadField::UtmMedium => "utmMedium",
            LeadField::UtmCampaign => "utmCampaign",
            LeadField::UtmTerm => "utmTerm",
            LeadField::UtmContent => "utmContent",
        }
    }

    pub fn is_utm(&self) -> bool {
        matches!(
            self,
            LeadField::UtmSource
                | LeadField::UtmMedium
                | LeadField::UtmCampaign
                | LeadField::UtmTerm
                | LeadField::UtmContent
        )
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LeadField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        LeadField::ALL
            .iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(trimmed))
            .copied()
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Unknown lead field '{}'",
                    trimmed
                )))
            })
    }
}

/// A lead projected from one CSV row through a column mapping.
///
/// Fields without a mapped column stay `None`; the backend stores them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
}

impl LeadDraft {
    fn slot_mut(&mut self, field: LeadField) -> &mut Option<String> {
        match field {
            LeadField::FullName => &mut self.full_name,
            LeadField::FirstName => &mut self.first_name,
            LeadField::LastName => &mut self.last_name,
            LeadField::Email => &mut self.email,
            LeadField::Phone => &mut self.phone,
            LeadField::City => &mut self.city,
            LeadField::Address => &mut self.address,
            LeadField::Budget => &mut self.budget,
            LeadField::Notes => &mut self.notes,
            LeadField::UtmSource => &mut self.utm_source,
            LeadField::UtmMedium => &mut self.utm_medium,
            LeadField::UtmCampaign => &mut self.utm_campaign,
            LeadField::UtmTerm => &mut self.utm_term,
            LeadField::UtmContent => &mut self.utm_content,
        }
    }

    pub fn get(&self, field: LeadField) -> Option<&str> {
        let value = match field {
            LeadField::FullName => &self.full_name,
            LeadField::FirstName => &self.first_name,
            LeadField::LastName => &self.last_name,
            LeadField::Email => &self.email,
            LeadField::Phone => &self.phone,
            LeadField::City => &self.city,
            LeadField::Address => &self.address,
            LeadField::Budget => &self.budget,
            LeadField::Notes => &self.notes,
            LeadField::UtmSource => &self.utm_source,
            LeadField::UtmMedium => &self.utm_medium,
            LeadField::UtmCampaign => &self.utm_campaign,
            LeadField::UtmTerm => &self.utm_term,
            LeadField::UtmContent => &self.utm_content,
        };
        value.as_deref()
    }

    /// Sets a field from a raw cell value.
    ///
    /// Blank cells are ignored, and a field that already holds a value keeps it.
    pub fn set_if_empty(&mut self, field: LeadField, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        let slot = self.slot_mut(field);
        if slot.is_none() {
            *slot = Some(trimmed.to_string());
        }
    }

    /// Display name: the full name, or first and last name joined.
    pub fn display_name(&self) -> Option<String> {
        if let Some(full) = &self.full_name {
            return Some(full.clone());
        }
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        LeadField::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_serializes_camel_case() {
        let json = serde_json::to_string(&LeadField::UtmCampaign).unwrap();
        assert_eq!(json, "\"utmCampaign\"");
        let parsed: LeadField = serde_json::from_str("\"fullName\"").unwrap();
        assert_eq!(parsed, LeadField::FullName);
    }

    #[test]
    fn test_field_from_str_is_case_insensitive() {
        assert_eq!("EMAIL".parse::<LeadField>().unwrap(), LeadField::Email);
        assert_eq!(" utmterm ".parse::<LeadField>().unwrap(), LeadField::UtmTerm);
        assert!("company".parse::<LeadField>().is_err());
    }

    #[test]
    fn test_as_str_matches_serde_name() {
        for field in LeadField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }

    #[test]
    fn test_set_if_empty_keeps_first_value() {
        let mut draft = LeadDraft::default();
        draft.set_if_empty(LeadField::Email, "  ");
        assert!(draft.email.is_none());
        draft.set_if_empty(LeadField::Email, " a@example.com ");
        draft.set_if_empty(LeadField::Email, "b@example.com");
        assert_eq!(draft.get(LeadField::Email), Some("a@example.com"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut draft = LeadDraft::default();
        assert!(draft.display_name().is_none());
        draft.set_if_empty(LeadField::LastName, "Levi");
        assert_eq!(draft.display_name().as_deref(), Some("Levi"));
        draft.set_if_empty(LeadField::FirstName, "Dana");
        assert_eq!(draft.display_name().as_deref(), Some("Dana Levi"));
        draft.set_if_empty(LeadField::FullName, "Dana R. Levi");
        assert_eq!(draft.display_name().as_deref(), Some("Dana R. Levi"));
    }
}
