use orcid_core::sections::{self, AffiliationKind, SummaryScope};
use orcid_core::{extract_fundings, extract_peer_reviews, load_profiles};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn raw_record() -> serde_json::Value {
    json!({
        "orcid-identifier": {"path": "0000-0002-1825-0097"},
        "person": {"name": {
            "given-names": {"value": "Josiah"},
            "family-name": {"value": "Carberry"}
        }},
        "history": {"last-modified-date": {"value": 1_700_000_000_000_i64}},
        "activities-summary": {
            "works": {"group": [{"work-summary": [{
                "title": {"title": {"value": "Psychoceramics"}},
                "external-ids": {"external-id": [{
                    "external-id-type": "doi",
                    "external-id-url": {"value": "https://doi.org/10.1000/182"}
                }]},
                "publication-date": {"year": {"value": "2001"}},
                "type": "journal-article"
            }]}]},
            "employments": {"affiliation-group": [null, {"summaries": [
                {"employment-summary": {
                    "role-title": "Professor",
                    "organization": {"name": "Brown"}
                }}
            ]}]},
            "educations": {"affiliation-group": []},
            "peer-reviews": {"group": [{"peer-review-group": [{"peer-review-summary": [{
                "convening-organization": {"name": "Crossref"}
            }]}]}]},
            "fundings": {"group": [{"funding-summary": [{
                "title": {"title": {"value": "Cracked Pots"}}
            }]}]}
        }
    })
}

#[test]
fn raw_records_and_profiles_load_side_by_side() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("batch.json");
    let batch = json!([raw_record(), {"orcid": "0000-0001-2345-6789", "given_name": "Ada"}]);
    fs::write(&path, serde_json::to_string(&batch).unwrap()).unwrap();

    let profiles = load_profiles(&path).unwrap();
    assert_eq!(profiles.len(), 2);

    let josiah = &profiles[0];
    assert_eq!(josiah.display_name().as_deref(), Some("Josiah Carberry"));
    assert_eq!(josiah.last_modify_date.as_deref(), Some("2023-11-14 22:13:20"));
    assert_eq!(josiah.publications.len(), 1);
    assert_eq!(josiah.publications[0].first_url(), Some("https://doi.org/10.1000/182"));
    assert_eq!(josiah.employments.len(), 2);
    assert!(josiah.employments[0].is_none());

    let employments = sections::affiliations(
        &josiah.employments,
        AffiliationKind::Employment,
        SummaryScope::All,
    );
    assert_eq!(employments.len(), 1);
    assert_eq!(employments[0].group_number, 2);
    assert_eq!(employments[0].role.as_deref(), Some("Professor"));

    let reviews = extract_peer_reviews(&josiah.peer_reviews);
    assert_eq!(reviews[0].organization_name, "Crossref");
    let fundings = extract_fundings(&josiah.fundings);
    assert_eq!(fundings[0].title, "Cracked Pots");
    assert_eq!(fundings[0].end_year, "Present");

    assert_eq!(profiles[1].given_name.as_deref(), Some("Ada"));
    assert!(profiles[1].publications.is_empty());
}
