//! Peer-review and funding extractors.
//!
//! Both walk the registry's group → summary nesting and flatten it into one
//! entry per summary, in source order. Every field degrades to a sentinel.

use std::sync::LazyLock;

use serde_json::Value;

use crate::access;
use crate::mapper::{FieldMapper, FieldSource};
use crate::sentinel;

static PEER_REVIEW: LazyLock<FieldMapper> = LazyLock::new(|| {
    FieldMapper::new(
        "PeerReviewSummary",
        [
            ("source_name", FieldSource::path(&["source", "source-name", "value"])),
            ("external_ids", FieldSource::Transform(external_id_values)),
            ("year", FieldSource::path(&["completion-date", "year", "value"])),
            ("month", FieldSource::path(&["completion-date", "month", "value"])),
            ("day", FieldSource::path(&["completion-date", "day", "value"])),
            ("organization_name", FieldSource::path(&["convening-organization", "name"])),
        ],
    )
    .expect("peer review field table")
});

static FUNDING: LazyLock<FieldMapper> = LazyLock::new(|| {
    FieldMapper::new(
        "FundingSummary",
        [
            ("source", FieldSource::path(&["source", "source-name", "value"])),
            ("title", FieldSource::path(&["title", "title", "value"])),
            ("type", FieldSource::path(&["type"])),
            ("external_ids", FieldSource::Transform(external_id_values)),
            ("grant_url", FieldSource::Transform(first_external_id_url)),
            ("start_year", FieldSource::path(&["start-date", "year", "value"])),
            ("end_year", FieldSource::path(&["end-date", "year", "value"])),
            ("organization", FieldSource::path(&["organization", "name"])),
            ("organization_city", FieldSource::path(&["organization", "address", "city"])),
        ],
    )
    .expect("funding field table")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionDate {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}

impl CompletionDate {
    /// Always `year-month-day`; a missing part prints as the literal `None`.
    pub fn formatted(&self) -> String {
        let part = |value: &Option<String>| {
            value
                .clone()
                .unwrap_or_else(|| sentinel::MISSING_DATE_PART.to_string())
        };
        format!("{}-{}-{}", part(&self.year), part(&self.month), part(&self.day))
    }

    pub fn year_or_na(&self) -> &str {
        self.year.as_deref().unwrap_or(sentinel::NOT_APPLICABLE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerReviewEntry {
    pub source_name: String,
    /// Every external id value in source order.
    pub external_ids: Vec<String>,
    pub completion: CompletionDate,
    pub organization_name: String,
}

impl PeerReviewEntry {
    /// All ids comma-joined, or "N/A" when there are none.
    pub fn external_id_value(&self) -> String {
        if self.external_ids.is_empty() {
            sentinel::NOT_APPLICABLE.to_string()
        } else {
            self.external_ids.join(", ")
        }
    }

    pub fn first_external_id(&self) -> &str {
        self.external_ids
            .first()
            .map(String::as_str)
            .unwrap_or(sentinel::NOT_APPLICABLE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingEntry {
    pub source: String,
    pub title: String,
    pub kind: String,
    pub grant_number: String,
    pub grant_url: String,
    pub start_year: String,
    pub end_year: String,
    pub organization: String,
    pub organization_city: String,
}

pub fn extract_peer_reviews(records: &[Value]) -> Vec<PeerReviewEntry> {
    let mut entries = Vec::new();
    for record in records {
        for group in access::list(Some(record), &["peer-review-group"]) {
            for summary in access::list(Some(group), &["peer-review-summary"]) {
                let review = PEER_REVIEW.project(summary);
                entries.push(PeerReviewEntry {
                    source_name: review.text_or("source_name", sentinel::NOT_APPLICABLE),
                    external_ids: review.texts("external_ids"),
                    completion: CompletionDate {
                        year: review.text("year"),
                        month: review.text("month"),
                        day: review.text("day"),
                    },
                    organization_name: review
                        .text_or("organization_name", sentinel::NOT_APPLICABLE),
                });
            }
        }
    }
    entries
}

pub fn extract_fundings(records: &[Value]) -> Vec<FundingEntry> {
    let mut entries = Vec::new();
    for record in records {
        for summary in access::list(Some(record), &["funding-summary"]) {
            let funding = FUNDING.project(summary);
            let grant_number = funding
                .texts("external_ids")
                .into_iter()
                .next()
                .unwrap_or_else(|| sentinel::NOT_APPLICABLE.to_string());
            entries.push(FundingEntry {
                source: funding.text_or("source", sentinel::NOT_APPLICABLE),
                title: funding.text_or("title", sentinel::NOT_APPLICABLE),
                kind: funding.text_or("type", sentinel::NOT_APPLICABLE),
                grant_number,
                grant_url: funding.text_or("grant_url", sentinel::NOT_APPLICABLE),
                start_year: funding.text_or("start_year", sentinel::NOT_APPLICABLE),
                end_year: funding.text_or("end_year", sentinel::PRESENT),
                organization: funding.text_or("organization", sentinel::NOT_APPLICABLE),
                organization_city: funding
                    .text_or("organization_city", sentinel::NOT_APPLICABLE),
            });
        }
    }
    entries
}

fn external_id_values(raw: &Value) -> Value {
    Value::Array(
        access::list(Some(raw), &["external-ids", "external-id"])
            .iter()
            .map(|id| Value::String(access::get_na(Some(id), &["external-id-value"])))
            .collect(),
    )
}

fn first_external_id_url(raw: &Value) -> Value {
    access::list(Some(raw), &["external-ids", "external-id"])
        .first()
        .and_then(|id| access::lookup(Some(id), &["external-id-url", "value"]))
        .cloned()
        .unwrap_or(Value::Null)
}
