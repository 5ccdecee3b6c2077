//! Report sections shared by every renderer.
//!
//! Renderers ask for identity, works and affiliations here and only decide
//! how to print them. The peer-review and funding sections come from
//! [`crate::extract`].

use std::sync::LazyLock;

use serde_json::Value;
use tracing::warn;

use crate::access;
use crate::mapper::{FieldMapper, FieldSource};
use crate::schema::{Profile, non_empty};
use crate::sentinel;

// Stands in for the summary of a group that has none.
static MISSING_SUMMARY: Value = Value::Null;

static EMPLOYMENT_SUMMARY: LazyLock<FieldMapper> =
    LazyLock::new(|| affiliation_mapper("EmploymentSummary", "employment-summary"));

static EDUCATION_SUMMARY: LazyLock<FieldMapper> =
    LazyLock::new(|| affiliation_mapper("EducationSummary", "education-summary"));

fn affiliation_mapper(typename: &str, key: &str) -> FieldMapper {
    FieldMapper::new(
        typename,
        [
            ("department", FieldSource::path(&[key, "department-name"])),
            ("role", FieldSource::path(&[key, "role-title"])),
            ("organization", FieldSource::path(&[key, "organization", "name"])),
            ("city", FieldSource::path(&[key, "organization", "address", "city"])),
            ("start_year", FieldSource::path(&[key, "start-date", "year", "value"])),
            ("end_year", FieldSource::path(&[key, "end-date", "year", "value"])),
        ],
    )
    .expect("affiliation field table")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub orcid: Option<String>,
    pub name: Option<String>,
    pub last_modified: Option<String>,
}

pub fn identity(profile: &Profile) -> Identity {
    Identity {
        orcid: non_empty(profile.orcid.as_deref()).map(str::to_string),
        name: profile.display_name(),
        last_modified: non_empty(profile.last_modify_date.as_deref()).map(str::to_string),
    }
}

/// One publication with display sentinels applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLine {
    /// 1-based position in the profile's publication list.
    pub number: usize,
    pub title: String,
    pub url: String,
    pub year: String,
    pub kind: String,
    pub citation: String,
}

pub fn work_lines(profile: &Profile) -> Vec<WorkLine> {
    profile
        .publications
        .iter()
        .enumerate()
        .map(|(index, work)| WorkLine {
            number: index + 1,
            title: or_sentinel(work.title.as_deref(), sentinel::NO_TITLE),
            url: or_sentinel(work.first_url(), sentinel::NO_URL),
            year: or_sentinel(work.publication_year.as_deref(), sentinel::UNKNOWN),
            kind: or_sentinel(work.publication_type.as_deref(), sentinel::UNKNOWN),
            citation: or_sentinel(work.citation_value.as_deref(), sentinel::NO_CITATION),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliationKind {
    Employment,
    Education,
}

impl AffiliationKind {
    fn mapper(self) -> &'static FieldMapper {
        match self {
            AffiliationKind::Employment => &EMPLOYMENT_SUMMARY,
            AffiliationKind::Education => &EDUCATION_SUMMARY,
        }
    }
}

/// How many summaries of each affiliation group a renderer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryScope {
    /// Every summary (narrative renderers).
    All,
    /// Only the first summary of each group (structured and tabular renderers).
    First,
}

/// One affiliation summary with nothing substituted; renderers pick their
/// own sentinels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Affiliation {
    /// 1-based position of the owning group in the profile, nulls included.
    pub group_number: usize,
    pub department: Option<String>,
    pub role: Option<String>,
    pub organization: Option<String>,
    pub city: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
}

/// Flattens affiliation groups, skipping null groups.
///
/// With [`SummaryScope::First`] a group whose `summaries` list is missing or
/// empty still yields one entry with every field absent.
pub fn affiliations(
    groups: &[Option<Value>],
    kind: AffiliationKind,
    scope: SummaryScope,
) -> Vec<Affiliation> {
    let mapper = kind.mapper();
    let mut entries = Vec::new();
    for (index, group) in groups.iter().enumerate() {
        let Some(group) = group else {
            continue;
        };
        if !group.is_object() {
            warn!(?kind, group = index + 1, "affiliation group is not a mapping");
        }
        let summaries = access::list(Some(group), &["summaries"]);
        let selected: &[Value] = match scope {
            SummaryScope::All => summaries,
            SummaryScope::First => match summaries.first() {
                Some(first) => std::slice::from_ref(first),
                None => std::slice::from_ref(&MISSING_SUMMARY),
            },
        };
        for summary in selected {
            let fields = mapper.project(summary);
            entries.push(Affiliation {
                group_number: index + 1,
                department: fields.text("department"),
                role: fields.text("role"),
                organization: fields.text("organization"),
                city: fields.text("city"),
                start_year: fields.text("start_year"),
                end_year: fields.text("end_year"),
            });
        }
    }
    entries
}

/// Number of affiliation groups that are not null.
pub fn present_count(groups: &[Option<Value>]) -> usize {
    groups.iter().filter(|group| group.is_some()).count()
}

fn or_sentinel(value: Option<&str>, sentinel: &str) -> String {
    non_empty(value).unwrap_or(sentinel).to_string()
}
