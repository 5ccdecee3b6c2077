use anyhow::Result;
use orcid_core::Profile;
use orcid_core::extract::{extract_fundings, extract_peer_reviews};
use orcid_core::sections::{self, AffiliationKind, SummaryScope};
use orcid_core::sentinel;
use std::path::PathBuf;
use tracing::debug;

use crate::output::ResultDir;

pub fn render_text(out: &ResultDir, file_name: &str, profile: &Profile) -> Result<PathBuf> {
    let report = text_report(profile);
    out.write(file_name, report.as_bytes())
}

/// The plain-text report as `Label: value` lines.
pub fn text_report(profile: &Profile) -> String {
    let identity = sections::identity(profile);
    let works = sections::work_lines(profile);
    let employments = sections::affiliations(
        &profile.employments,
        AffiliationKind::Employment,
        SummaryScope::All,
    );
    let educations = sections::affiliations(
        &profile.educations,
        AffiliationKind::Education,
        SummaryScope::All,
    );
    let peer_reviews = extract_peer_reviews(&profile.peer_reviews);
    let fundings = extract_fundings(&profile.fundings);
    debug!(
        works = works.len(),
        employments = employments.len(),
        educations = educations.len(),
        peer_reviews = peer_reviews.len(),
        fundings = fundings.len(),
        "building text report"
    );

    let mut txt = String::new();
    txt.push_str(&format!("ORCID: {}\n", identity.orcid.unwrap_or_default()));
    txt.push_str(&format!("Name: {}\n", identity.name.unwrap_or_default()));
    txt.push_str(&format!(
        "Last Modified Date: {}\n",
        identity
            .last_modified
            .as_deref()
            .unwrap_or(sentinel::NOT_AVAILABLE)
    ));
    txt.push('\n');

    txt.push_str(&format!("Number of Works: {}\n", works.len()));
    for work in &works {
        txt.push('\n');
        txt.push_str(&format!("Work Details No: {}\n", work.number));
        txt.push_str(&format!("Paper title: {}\n", work.title));
        txt.push_str(&format!("Paper URL: {}\n", work.url));
        txt.push_str(&format!("Publication Year: {}\n", work.year));
        txt.push_str(&format!("Publication Type: {}\n", work.kind));
        txt.push_str(&format!("Citation: {}\n", work.citation));
    }
    txt.push_str("\n\n");

    txt.push_str("\nEmployment:\n");
    for employment in &employments {
        push_present(&mut txt, "Department name", &employment.department);
        push_present(&mut txt, "Role", &employment.role);
        push_present(&mut txt, "Organization", &employment.organization);
        push_present(&mut txt, "Address", &employment.city);
        push_present(&mut txt, "Employment Start Year", &employment.start_year);
        txt.push('\n');
    }
    txt.push_str("\n\n");

    txt.push_str(&format!(
        "Education and Qualifications: {}\n",
        sections::present_count(&profile.educations)
    ));
    for education in &educations {
        txt.push_str(&format!("Education Details No: {}\n", education.group_number));
        txt.push_str(&format!(
            "Education role: {}\n",
            education.role.as_deref().unwrap_or(sentinel::UNKNOWN_DEGREE)
        ));
        push_present(&mut txt, "Department name", &education.department);
        txt.push_str(&format!(
            "Education organization: {}\n",
            education
                .organization
                .as_deref()
                .unwrap_or(sentinel::UNKNOWN_INSTITUTION)
        ));
        txt.push_str(&format!(
            "Education Start Year: {}\n",
            education.start_year.as_deref().unwrap_or(sentinel::UNKNOWN_YEAR)
        ));
        txt.push_str(&format!(
            "Education End Year: {}\n",
            education.end_year.as_deref().unwrap_or(sentinel::PRESENT)
        ));
        txt.push('\n');
    }
    txt.push_str("\n\n");

    txt.push_str("\nPeer Review Information:\n");
    if peer_reviews.is_empty() {
        txt.push_str("No peer reviews found.\n");
    }
    for review in &peer_reviews {
        txt.push_str(&format!("Peer Review Source: {}\n", review.source_name));
        txt.push_str(&format!(
            "Peer Review External ID: {}\n",
            review.external_id_value()
        ));
        txt.push_str(&format!(
            "Peer Review Completion Date: {}\n",
            review.completion.formatted()
        ));
        txt.push_str(&format!(
            "Peer Review Organization: {}\n\n",
            review.organization_name
        ));
    }

    txt.push_str("\nFunding Information:\n");
    if fundings.is_empty() {
        txt.push_str("No funding information found.\n");
    }
    for funding in &fundings {
        txt.push_str(&format!("Source: {}\n", funding.source));
        txt.push_str(&format!("Title: {}\n", funding.title));
        txt.push_str(&format!("Type: {}\n", funding.kind));
        txt.push_str(&format!("Grant Number: {}\n", funding.grant_number));
        txt.push_str(&format!("Grant URL: {}\n", funding.grant_url));
        txt.push_str(&format!("Start Year: {}\n", funding.start_year));
        txt.push_str(&format!("End Year: {}\n", funding.end_year));
        txt.push_str(&format!("Organization: {}\n", funding.organization));
        txt.push_str(&format!(
            "Organization City: {}\n\n",
            funding.organization_city
        ));
    }

    txt
}

fn push_present(txt: &mut String, label: &str, value: &Option<String>) {
    if let Some(value) = value {
        txt.push_str(&format!("{label}: {value}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orcid_core::Publication;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_profile_keeps_every_section_header() {
        let report = text_report(&Profile::default());
        let expected = "ORCID: \n\
Name: \n\
Last Modified Date: Not Available\n\
\n\
Number of Works: 0\n\
\n\n\
\nEmployment:\n\
\n\n\
Education and Qualifications: 0\n\
\n\n\
\nPeer Review Information:\n\
No peer reviews found.\n\
\nFunding Information:\n\
No funding information found.\n";
        assert_eq!(report, expected);
    }

    #[test]
    fn works_are_numbered_with_sentinels() {
        let profile = Profile {
            publications: vec![
                Publication {
                    title: Some("On Computation".into()),
                    publication_year: Some("1843".into()),
                    ..Publication::default()
                },
                Publication::default(),
            ],
            ..Profile::default()
        };
        let report = text_report(&profile);
        assert!(report.contains(
            "Work Details No: 1\n\
Paper title: On Computation\n\
Paper URL: No DOI URL found\n\
Publication Year: 1843\n\
Publication Type: Unknown\n\
Citation: No Citation Found\n"
        ));
        assert!(report.contains("Work Details No: 2\nPaper title: No Information found\n"));
    }

    #[test]
    fn employment_omits_absent_fields() {
        let profile = Profile {
            employments: vec![
                None,
                Some(json!({"summaries": [
                    {"employment-summary": {
                        "role-title": "Analyst",
                        "organization": {"name": "Acme"}
                    }}
                ]})),
            ],
            ..Profile::default()
        };
        let report = text_report(&profile);
        assert!(report.contains("\nEmployment:\nRole: Analyst\nOrganization: Acme\n\n"));
        assert!(!report.contains("Department name"));
    }

    #[test]
    fn education_counts_present_records_and_fills_sentinels() {
        let profile = Profile {
            educations: vec![
                None,
                Some(json!({"summaries": [{"education-summary": {"department-name": "Maths"}}]})),
            ],
            ..Profile::default()
        };
        let report = text_report(&profile);
        assert!(report.contains(
            "Education and Qualifications: 1\n\
Education Details No: 2\n\
Education role: Unknown Degree\n\
Department name: Maths\n\
Education organization: Unknown Institution\n\
Education Start Year: Unknown Year\n\
Education End Year: Present\n"
        ));
    }

    #[test]
    fn peer_reviews_use_extractor_format() {
        let profile = Profile {
            peer_reviews: vec![json!({"peer-review-group": [{"peer-review-summary": [{
                "source": {"source-name": {"value": "Publons"}},
                "external-ids": {"external-id": [
                    {"external-id-value": "a"}, {"external-id-value": "b"}
                ]},
                "completion-date": {"year": {"value": "2020"}}
            }]}]})],
            ..Profile::default()
        };
        let report = text_report(&profile);
        assert!(report.contains(
            "Peer Review Source: Publons\n\
Peer Review External ID: a, b\n\
Peer Review Completion Date: 2020-None-None\n\
Peer Review Organization: N/A\n"
        ));
    }

    #[test]
    fn funding_block_lists_every_field() {
        let profile = Profile {
            fundings: vec![json!({"funding-summary": [{
                "source": {"source-name": {"value": "NSF"}},
                "title": {"title": {"value": "Engines"}},
                "type": "grant",
                "external-ids": {"external-id": [{
                    "external-id-value": "G-42",
                    "external-id-url": {"value": "https://grants.example/42"}
                }]},
                "start-date": {"year": {"value": "2019"}},
                "organization": {"name": "National Science Foundation"}
            }]})],
            ..Profile::default()
        };
        let report = text_report(&profile);
        assert!(report.ends_with(
            "\nFunding Information:\n\
Source: NSF\n\
Title: Engines\n\
Type: grant\n\
Grant Number: G-42\n\
Grant URL: https://grants.example/42\n\
Start Year: 2019\n\
End Year: Present\n\
Organization: National Science Foundation\n\
Organization City: N/A\n\n"
        ));
        assert!(!report.contains("No funding information found."));
    }
}
