use anyhow::Result;
use orcid_core::extract::{FundingEntry, PeerReviewEntry, extract_fundings, extract_peer_reviews};
use orcid_core::schema::non_empty;
use orcid_core::sections::{self, Affiliation, AffiliationKind, SummaryScope};
use orcid_core::sentinel;
use orcid_core::{Profile, Publication};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::path::PathBuf;

use crate::output::ResultDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StructuredReport {
    pub orcid: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub last_modify_date: Option<String>,
    pub publications: Vec<PublicationRecord>,
    pub employments: Vec<EmploymentRecord>,
    pub educations: Vec<EducationRecord>,
    pub peer_reviews: Vec<PeerReviewRecord>,
    pub fundings: Vec<FundingRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PublicationRecord {
    pub title: Option<String>,
    pub url: Option<String>,
    pub publicationyear: Option<String>,
    pub publicationtype: Option<String>,
    pub citation_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct EmploymentRecord {
    pub department_name: String,
    pub role_title: String,
    pub organization: String,
    pub address: String,
    pub start_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct EducationRecord {
    pub department_name: String,
    pub role_title: String,
    pub organization: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PeerReviewRecord {
    pub source_name: String,
    pub external_id_value: String,
    pub completion_year: String,
    pub organization_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FundingRecord {
    pub source: String,
    pub title: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Grant Number")]
    pub grant_number: String,
    #[serde(rename = "Grant URL")]
    pub grant_url: String,
    #[serde(rename = "Start Year")]
    pub start_year: String,
    #[serde(rename = "End Year")]
    pub end_year: String,
    pub organization: String,
    #[serde(rename = "Organization City")]
    pub organization_city: String,
}

pub fn render_structured(out: &ResultDir, file_name: &str, profile: &Profile) -> Result<PathBuf> {
    let report = structured_report(profile);
    out.write(file_name, &encode(&report)?)
}

pub fn structured_report(profile: &Profile) -> StructuredReport {
    StructuredReport {
        orcid: profile.orcid.clone(),
        given_name: profile.given_name.clone(),
        family_name: profile.family_name.clone(),
        last_modify_date: profile.last_modify_date.clone(),
        publications: profile.publications.iter().map(PublicationRecord::from).collect(),
        employments: sections::affiliations(
            &profile.employments,
            AffiliationKind::Employment,
            SummaryScope::First,
        )
        .iter()
        .map(EmploymentRecord::from)
        .collect(),
        educations: sections::affiliations(
            &profile.educations,
            AffiliationKind::Education,
            SummaryScope::First,
        )
        .iter()
        .map(EducationRecord::from)
        .collect(),
        peer_reviews: extract_peer_reviews(&profile.peer_reviews)
            .iter()
            .map(PeerReviewRecord::from)
            .collect(),
        fundings: extract_fundings(&profile.fundings)
            .into_iter()
            .map(FundingRecord::from)
            .collect(),
    }
}

/// Four-space indented JSON with non-ASCII text kept as is.
pub fn encode(report: &StructuredReport) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
    report.serialize(&mut serializer)?;
    Ok(bytes)
}

impl From<&Publication> for PublicationRecord {
    fn from(work: &Publication) -> Self {
        let owned = |value: Option<&str>| non_empty(value).map(str::to_string);
        Self {
            title: work.title.clone(),
            url: owned(work.first_url()),
            publicationyear: owned(work.publication_year.as_deref()),
            publicationtype: owned(work.publication_type.as_deref()),
            citation_value: owned(work.citation_value.as_deref()),
        }
    }
}

impl From<&Affiliation> for EmploymentRecord {
    fn from(summary: &Affiliation) -> Self {
        let na = |value: &Option<String>| or(value, sentinel::NOT_APPLICABLE);
        Self {
            department_name: na(&summary.department),
            role_title: na(&summary.role),
            organization: na(&summary.organization),
            address: na(&summary.city),
            start_date: na(&summary.start_year),
        }
    }
}

impl From<&Affiliation> for EducationRecord {
    fn from(summary: &Affiliation) -> Self {
        Self {
            department_name: or(&summary.department, sentinel::NOT_APPLICABLE),
            role_title: or(&summary.role, sentinel::UNKNOWN_DEGREE),
            organization: or(&summary.organization, sentinel::UNKNOWN_INSTITUTION),
            start_date: or(&summary.start_year, sentinel::UNKNOWN_YEAR),
            end_date: or(&summary.end_year, sentinel::PRESENT),
        }
    }
}

impl From<&PeerReviewEntry> for PeerReviewRecord {
    fn from(entry: &PeerReviewEntry) -> Self {
        Self {
            source_name: entry.source_name.clone(),
            external_id_value: entry.external_id_value(),
            completion_year: entry.completion.year_or_na().to_string(),
            organization_name: entry.organization_name.clone(),
        }
    }
}

impl From<FundingEntry> for FundingRecord {
    fn from(entry: FundingEntry) -> Self {
        Self {
            source: entry.source,
            title: entry.title,
            kind: entry.kind,
            grant_number: entry.grant_number,
            grant_url: entry.grant_url,
            start_year: entry.start_year,
            end_year: entry.end_year,
            organization: entry.organization,
            organization_city: entry.organization_city,
        }
    }
}

fn or(value: &Option<String>, sentinel: &str) -> String {
    value.clone().unwrap_or_else(|| sentinel.to_string())
}
