use anyhow::Result;
use orcid_core::Profile;
use orcid_core::extract::{extract_fundings, extract_peer_reviews};
use orcid_core::sections::{self, AffiliationKind, SummaryScope};
use orcid_core::sentinel;
use std::path::PathBuf;

use crate::output::ResultDir;
use crate::pdf;
use crate::settings::DocumentSettings;

/// Vertical gap after each entry.
const ENTRY_GAP: f32 = 10.0;
/// Vertical gap between sections.
const SECTION_GAP: f32 = 20.0;

/// One element of the document flow, laid out top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    /// Bold `label:` followed by a regular value.
    Field { label: String, value: String },
    Spacer(f32),
    Footer(String),
}

impl Block {
    fn field(label: impl Into<String>, value: impl Into<String>) -> Self {
        Block::Field {
            label: label.into(),
            value: value.into(),
        }
    }
}

pub fn render_document(
    out: &ResultDir,
    file_name: &str,
    profile: &Profile,
    settings: &DocumentSettings,
) -> Result<PathBuf> {
    let story = document_story(profile, settings);
    let bytes = pdf::encode(&story, settings.page_size)?;
    out.write(file_name, &bytes)
}

pub fn document_story(profile: &Profile, settings: &DocumentSettings) -> Vec<Block> {
    let identity = sections::identity(profile);
    let mut story = vec![Block::Title(settings.title.clone())];

    story.push(Block::field(
        "ORCID",
        identity.orcid.as_deref().unwrap_or(sentinel::NOT_AVAILABLE),
    ));
    story.push(Block::field(
        "Name",
        identity.name.as_deref().unwrap_or(sentinel::NOT_AVAILABLE),
    ));
    story.push(Block::Spacer(SECTION_GAP));
    story.push(Block::field(
        "Last Modified Date",
        identity
            .last_modified
            .as_deref()
            .unwrap_or(sentinel::NOT_AVAILABLE),
    ));
    story.push(Block::Spacer(SECTION_GAP));

    story.push(Block::Heading("Works".to_string()));
    for work in sections::work_lines(profile) {
        story.push(Block::field(format!("{}. Title", work.number), work.title));
        story.push(Block::field("DOI URL", work.url));
        story.push(Block::field("Publication Year", work.year));
        story.push(Block::field("Publication Type", work.kind));
        story.push(Block::field("Citation", work.citation));
        story.push(Block::Spacer(ENTRY_GAP));
    }
    story.push(Block::Spacer(SECTION_GAP));

    story.push(Block::Heading("Employment".to_string()));
    let employments = sections::affiliations(
        &profile.employments,
        AffiliationKind::Employment,
        SummaryScope::All,
    );
    for employment in employments {
        let present = [
            ("Department", employment.department),
            ("Role", employment.role),
            ("Organization", employment.organization),
            ("Address", employment.city),
            ("Employment Start Year", employment.start_year),
        ];
        for (label, value) in present {
            if let Some(value) = value {
                story.push(Block::field(label, value));
            }
        }
        story.push(Block::Spacer(ENTRY_GAP));
    }
    story.push(Block::Spacer(SECTION_GAP));

    story.push(Block::Heading("Education and Qualifications".to_string()));
    story.push(Block::field(
        "Number of Education",
        sections::present_count(&profile.educations).to_string(),
    ));
    let educations = sections::affiliations(
        &profile.educations,
        AffiliationKind::Education,
        SummaryScope::All,
    );
    for education in educations {
        story.push(Block::field(
            "Education Details No",
            education.group_number.to_string(),
        ));
        story.push(Block::field(
            "Education Role",
            education.role.as_deref().unwrap_or(sentinel::UNKNOWN_DEGREE),
        ));
        if let Some(department) = &education.department {
            story.push(Block::field("Department", department.as_str()));
        }
        story.push(Block::field(
            "Education Organization",
            education
                .organization
                .as_deref()
                .unwrap_or(sentinel::UNKNOWN_INSTITUTION),
        ));
        story.push(Block::field(
            "Education Start Year",
            education.start_year.as_deref().unwrap_or(sentinel::UNKNOWN_YEAR),
        ));
        story.push(Block::field(
            "Education End Year",
            education.end_year.as_deref().unwrap_or(sentinel::PRESENT),
        ));
        story.push(Block::Spacer(ENTRY_GAP));
    }
    story.push(Block::Spacer(SECTION_GAP));

    story.push(Block::Heading("Peer Reviews".to_string()));
    for review in extract_peer_reviews(&profile.peer_reviews) {
        story.push(Block::field("Source Name", review.source_name.as_str()));
        story.push(Block::field("External ID Value", review.first_external_id()));
        story.push(Block::field("Completion Year", review.completion.year_or_na()));
        story.push(Block::field("Organization Name", review.organization_name.as_str()));
        story.push(Block::Spacer(ENTRY_GAP));
    }

    story.push(Block::Heading("Funding Information".to_string()));
    for funding in extract_fundings(&profile.fundings) {
        story.push(Block::field("Source", funding.source));
        story.push(Block::field("Title", funding.title));
        story.push(Block::field("Type", funding.kind));
        story.push(Block::field("Grant Number", funding.grant_number));
        story.push(Block::field("Grant URL", funding.grant_url));
        story.push(Block::field("Start Year", funding.start_year));
        story.push(Block::field("End Year", funding.end_year));
        story.push(Block::field("Organization", funding.organization));
        story.push(Block::field("Organization City", funding.organization_city));
        story.push(Block::Spacer(ENTRY_GAP));
    }

    story.push(Block::Spacer(SECTION_GAP));
    story.push(Block::Footer(settings.footer.clone()));
    story
}
