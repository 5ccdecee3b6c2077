use anyhow::{Context, Result};
use orcid_core::Profile;
use orcid_core::extract::{FundingEntry, PeerReviewEntry, extract_fundings, extract_peer_reviews};
use orcid_core::sections::{self, AffiliationKind, SummaryScope, WorkLine};
use orcid_core::sentinel;
use rust_xlsxwriter::{Format, Workbook};
use std::path::PathBuf;
use tracing::debug;

use crate::output::ResultDir;

pub const COLUMNS: [&str; 24] = [
    "ORCID",
    "Name",
    "Last Modified Date",
    "Employments",
    "Education",
    "Publication Number",
    "Work Title",
    "Work DOI URL",
    "Work Publication Year",
    "Work Publication Type",
    "Work Citation",
    "Peer Review Source",
    "Peer Review External ID",
    "Peer Review Completion Year",
    "Peer Review Organization",
    "Funding Source",
    "Funding Title",
    "Funding Type",
    "Grant Number",
    "Grant URL",
    "Funding Start Year",
    "Funding End Year",
    "Funding Organization",
    "Funding Organization City",
];

const IDENTITY_COLUMNS: usize = 6;
const WORK_COLUMNS: usize = 5;
const REVIEW_COLUMNS: usize = 4;
const FUNDING_COLUMNS: usize = 9;
const PUBLICATION_NUMBER: usize = 5;

/// Employment groups summarized in the identity row.
const MAX_EMPLOYMENTS: usize = 3;
const JOIN: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Delimited,
    Spreadsheet,
}

impl TableFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            TableFormat::Delimited => "orcid_report.csv",
            TableFormat::Spreadsheet => "orcid_report.xlsx",
        }
    }
}

/// Writes the batch table for `profiles` under a fixed file name.
pub fn render_table(out: &ResultDir, profiles: &[Profile], format: TableFormat) -> Result<PathBuf> {
    let rows = table_rows(profiles);
    debug!(profiles = profiles.len(), rows = rows.len(), ?format, "building table");
    let bytes = match format {
        TableFormat::Delimited => encode_delimited(&rows)?,
        TableFormat::Spreadsheet => encode_spreadsheet(&rows)?,
    };
    out.write(format.file_name(), &bytes)
}

/// Data rows for every profile, header excluded.
///
/// Each profile contributes at least one row so that its identity columns
/// are never lost.
pub fn table_rows(profiles: &[Profile]) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for profile in profiles {
        let works = sections::work_lines(profile);
        let fundings = extract_fundings(&profile.fundings);
        let count = works
            .len()
            .max(profile.peer_reviews.len())
            .max(fundings.len())
            .max(1);

        for index in 0..count {
            let mut row = if index == 0 {
                identity_cells(profile)
            } else {
                blank(IDENTITY_COLUMNS)
            };
            row.extend(work_cells(works.get(index)));
            row.extend(review_cells(profile.peer_reviews.get(index)));
            row.extend(funding_cells(fundings.get(index)));
            rows.push(row);
        }
    }
    rows
}

fn identity_cells(profile: &Profile) -> Vec<String> {
    let identity = sections::identity(profile);
    let employments: Vec<String> = sections::affiliations(
        &profile.employments,
        AffiliationKind::Employment,
        SummaryScope::First,
    )
    .into_iter()
    .take(MAX_EMPLOYMENTS)
    .map(|employment| {
        [
            or(employment.department, sentinel::UNKNOWN_DEPARTMENT),
            or(employment.role, sentinel::UNKNOWN_ROLE),
            or(employment.organization, sentinel::UNKNOWN_ORGANIZATION),
            or(employment.city, sentinel::UNKNOWN_CITY),
            or(employment.start_year, sentinel::UNKNOWN_YEAR),
        ]
        .join(", ")
    })
    .collect();
    let educations: Vec<String> = sections::affiliations(
        &profile.educations,
        AffiliationKind::Education,
        SummaryScope::First,
    )
    .into_iter()
    .map(|education| {
        [
            or(education.role, sentinel::UNKNOWN_DEGREE),
            or(education.organization, sentinel::UNKNOWN_INSTITUTION),
            or(education.start_year, sentinel::UNKNOWN_YEAR),
            or(education.end_year, sentinel::PRESENT),
        ]
        .join(", ")
    })
    .collect();

    vec![
        identity.orcid.unwrap_or_default(),
        identity.name.unwrap_or_default(),
        identity.last_modified.unwrap_or_default(),
        employments.join(JOIN),
        educations.join(JOIN),
        profile.publications.len().to_string(),
    ]
}

fn work_cells(work: Option<&WorkLine>) -> Vec<String> {
    match work {
        Some(work) => vec![
            work.title.clone(),
            work.url.clone(),
            work.year.clone(),
            work.kind.clone(),
            work.citation.clone(),
        ],
        None => blank(WORK_COLUMNS),
    }
}

/// All summaries of one raw peer-review record, each column pipe-joined.
fn review_cells(record: Option<&serde_json::Value>) -> Vec<String> {
    let Some(record) = record else {
        return blank(REVIEW_COLUMNS);
    };
    let reviews = extract_peer_reviews(std::slice::from_ref(record));
    if reviews.is_empty() {
        return vec![sentinel::NOT_APPLICABLE.to_string(); REVIEW_COLUMNS];
    }
    vec![
        joined(&reviews, |review| review.source_name.clone()),
        joined(&reviews, |review| review.external_ids.join(JOIN)),
        joined(&reviews, |review| review.completion.year_or_na().to_string()),
        joined(&reviews, |review| review.organization_name.clone()),
    ]
}

fn joined(reviews: &[PeerReviewEntry], cell: impl Fn(&PeerReviewEntry) -> String) -> String {
    reviews.iter().map(cell).collect::<Vec<_>>().join(JOIN)
}

fn funding_cells(funding: Option<&FundingEntry>) -> Vec<String> {
    match funding {
        Some(funding) => vec![
            funding.source.clone(),
            funding.title.clone(),
            funding.kind.clone(),
            funding.grant_number.clone(),
            funding.grant_url.clone(),
            funding.start_year.clone(),
            funding.end_year.clone(),
            funding.organization.clone(),
            funding.organization_city.clone(),
        ],
        None => blank(FUNDING_COLUMNS),
    }
}

fn encode_delimited(rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| err.into_error())
        .context("flushing csv table")
}

fn encode_spreadsheet(rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (index, row) in rows.iter().enumerate() {
        let sheet_row = index as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            match cell.parse::<u32>() {
                Ok(count) if col == PUBLICATION_NUMBER => {
                    sheet.write_number(sheet_row, col as u16, f64::from(count))?;
                }
                _ => {
                    sheet.write_string(sheet_row, col as u16, cell.as_str())?;
                }
            }
        }
    }
    workbook.save_to_buffer().context("encoding xlsx table")
}

fn blank(width: usize) -> Vec<String> {
    vec![String::new(); width]
}

fn or(value: Option<String>, sentinel: &str) -> String {
    value.unwrap_or_else(|| sentinel.to_string())
}
