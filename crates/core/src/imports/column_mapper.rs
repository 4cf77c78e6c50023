//! Heuristic mapping of CSV headers onto lead fields.
//!
//! Each header is lower-cased and checked against [`MAPPING_RULES`] in order.
//! The first matching rule decides the field. When two headers resolve to the
//! same field the first one keeps it and the later ones are reported as
//! conflicts and left unmapped for the user to resolve.

use serde::{Deserialize, Serialize};

use super::imports_model::ColumnMapping;
use crate::leads::{LeadDraft, LeadField};

/// A substring predicate that assigns a lead field.
///
/// A header matches when it contains every token of `all_of` and, if
/// `any_of` is non-empty, at least one token of `any_of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingRule {
    pub field: LeadField,
    pub all_of: &'static [&'static str],
    pub any_of: &'static [&'static str],
}

impl MappingRule {
    const fn new(
        field: LeadField,
        all_of: &'static [&'static str],
        any_of: &'static [&'static str],
    ) -> Self {
        Self {
            field,
            all_of,
            any_of,
        }
    }

    /// Tests an already lower-cased header.
    pub fn matches(&self, header: &str) -> bool {
        self.all_of.iter().all(|token| header.contains(token))
            && (self.any_of.is_empty() || self.any_of.iter().any(|token| header.contains(token)))
    }
}

/// Rules in priority order. UTM rules come first so "utm_campaign" never
/// falls through to a generic rule.
pub const MAPPING_RULES: &[MappingRule] = &[
    MappingRule::new(LeadField::UtmSource, &["utm", "source"], &[]),
    MappingRule::new(LeadField::UtmMedium, &["utm", "medium"], &[]),
    MappingRule::new(LeadField::UtmCampaign, &["utm", "campaign"], &[]),
    MappingRule::new(LeadField::UtmTerm, &["utm", "term"], &[]),
    MappingRule::new(LeadField::UtmContent, &["utm", "content"], &[]),
    MappingRule::new(LeadField::FullName, &["name", "full"], &[]),
    MappingRule::new(LeadField::FirstName, &["name"], &["first", "given"]),
    MappingRule::new(LeadField::LastName, &["name"], &["last", "family", "surname"]),
    MappingRule::new(LeadField::Email, &[], &["email", "mail"]),
    MappingRule::new(LeadField::Phone, &[], &["phone", "mobile", "tel"]),
    MappingRule::new(LeadField::City, &[], &["city", "location"]),
    MappingRule::new(LeadField::Address, &[], &["address", "street"]),
    MappingRule::new(LeadField::Budget, &[], &["budget", "price"]),
    MappingRule::new(LeadField::Notes, &[], &["note", "comment"]),
    MappingRule::new(LeadField::FullName, &["name"], &[]),
];

/// Two headers resolved to the same field.
///
/// Auto-map leaves `column` unmapped. A manual mapping keeps both columns,
/// and only `kept_column` supplies the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConflict {
    pub column: String,
    pub field: LeadField,
    pub kept_column: String,
}

/// Other fields a header also matched after its winning rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingAlternatives {
    pub column: String,
    pub fields: Vec<LeadField>,
}

/// Result of auto-mapping a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingProposal {
    pub mapping: ColumnMapping,
    pub unmapped: Vec<String>,
    pub conflicts: Vec<MappingConflict>,
    pub alternatives: Vec<MappingAlternatives>,
}

impl MappingProposal {
    /// True when some header could not be mapped because its field was taken.
    pub fn is_ambiguous(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Returns the field the first matching rule assigns to `header`, if any.
pub fn auto_map_header(header: &str) -> Option<LeadField> {
    let lower = header.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    MAPPING_RULES
        .iter()
        .find(|rule| rule.matches(&lower))
        .map(|rule| rule.field)
}

fn matching_fields(header: &str) -> Vec<LeadField> {
    let lower = header.trim().to_lowercase();
    let mut fields: Vec<LeadField> = Vec::new();
    if lower.is_empty() {
        return fields;
    }
    for rule in MAPPING_RULES.iter().filter(|rule| rule.matches(&lower)) {
        if !fields.contains(&rule.field) {
            fields.push(rule.field);
        }
    }
    fields
}

/// Proposes a column mapping for a header row.
///
/// Deterministic: the same headers always produce the same proposal.
pub fn auto_map(headers: &[String]) -> MappingProposal {
    let mut proposal = MappingProposal::default();

    for header in headers {
        let mut fields = matching_fields(header).into_iter();
        let Some(field) = fields.next() else {
            proposal.unmapped.push(header.clone());
            continue;
        };

        let others: Vec<LeadField> = fields.collect();
        if !others.is_empty() {
            proposal.alternatives.push(MappingAlternatives {
                column: header.clone(),
                fields: others,
            });
        }

        let kept = proposal
            .mapping
            .columns_for(field)
            .first()
            .map(|c| c.to_string());
        match kept {
            Some(kept_column) => {
                log::debug!(
                    "Column '{}' also maps to {}, already taken by '{}'",
                    header,
                    field,
                    kept_column
                );
                proposal.conflicts.push(MappingConflict {
                    column: header.clone(),
                    field,
                    kept_column,
                });
                proposal.unmapped.push(header.clone());
            }
            None => proposal.mapping.insert(header.clone(), field),
        }
    }

    proposal
}

/// Projects one CSV row onto lead fields. Unmapped columns are dropped.
pub fn apply_mapping(mapping: &ColumnMapping, headers: &[String], row: &[String]) -> LeadDraft {
    let mut draft = LeadDraft::default();
    for (index, header) in headers.iter().enumerate() {
        let (Some(field), Some(value)) = (mapping.get(header), row.get(index)) else {
            continue;
        };
        draft.set_if_empty(field, value);
    }
    draft
}
