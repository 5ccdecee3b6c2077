//! Builds a [`Profile`] from a raw registry record (`/record` document).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::debug;

use crate::access;
use crate::mapper::{FieldMapper, FieldSource, Projection};
use crate::schema::{Profile, Publication};

// Malformed field tables are programming errors and abort on first use.
static RECORD: LazyLock<FieldMapper> = LazyLock::new(|| {
    FieldMapper::new(
        "Record",
        [
            ("orcid", FieldSource::path(&["orcid-identifier", "path"])),
            (
                "given_name",
                FieldSource::path(&["person", "name", "given-names", "value"]),
            ),
            (
                "family_name",
                FieldSource::path(&["person", "name", "family-name", "value"]),
            ),
            ("last_modify_date", FieldSource::Transform(last_modified)),
            (
                "works",
                FieldSource::path(&["activities-summary", "works", "group"]),
            ),
            (
                "employments",
                FieldSource::path(&["activities-summary", "employments", "affiliation-group"]),
            ),
            (
                "educations",
                FieldSource::path(&["activities-summary", "educations", "affiliation-group"]),
            ),
            (
                "peer_reviews",
                FieldSource::path(&["activities-summary", "peer-reviews", "group"]),
            ),
            (
                "fundings",
                FieldSource::path(&["activities-summary", "fundings", "group"]),
            ),
        ],
    )
    .expect("record field table")
});

static WORK: LazyLock<FieldMapper> = LazyLock::new(|| {
    FieldMapper::new(
        "Work",
        [
            ("title", FieldSource::path(&["title", "title", "value"])),
            ("url", FieldSource::Transform(work_urls)),
            (
                "publication_year",
                FieldSource::path(&["publication-date", "year", "value"]),
            ),
            ("publication_type", FieldSource::path(&["type"])),
            ("citation_value", FieldSource::path(&["citation", "citation-value"])),
        ],
    )
    .expect("work field table")
});

/// True when `value` has the shape of a raw registry record rather than a
/// normalized profile.
pub fn is_raw_record(value: &Value) -> bool {
    value.as_object().is_some_and(|object| {
        object.contains_key("orcid-identifier") || object.contains_key("activities-summary")
    })
}

pub fn profile_from_record(raw: &Value) -> Profile {
    let record = RECORD.project(raw);

    let publications: Vec<Publication> = record
        .list("works")
        .iter()
        .flat_map(|group| access::list(Some(group), &["work-summary"]))
        .map(publication_from_summary)
        .collect();

    let profile = Profile {
        orcid: record.text("orcid"),
        given_name: record.text("given_name"),
        family_name: record.text("family_name"),
        last_modify_date: record.text("last_modify_date"),
        publications,
        employments: nullable_items(&record, "employments"),
        educations: nullable_items(&record, "educations"),
        peer_reviews: record.list("peer_reviews").to_vec(),
        fundings: record.list("fundings").to_vec(),
    };

    debug!(
        orcid = profile.orcid.as_deref().unwrap_or_default(),
        works = profile.publications.len(),
        employments = profile.employments.len(),
        educations = profile.educations.len(),
        peer_reviews = profile.peer_reviews.len(),
        fundings = profile.fundings.len(),
        "parsed registry record"
    );
    profile
}

pub fn publication_from_summary(summary: &Value) -> Publication {
    let work = WORK.project(summary);
    let url = match work.get("url").as_deref() {
        Some(Value::Object(urls)) => urls
            .iter()
            .map(|(scheme, url)| (scheme.clone(), access::text(url)))
            .collect(),
        _ => BTreeMap::new(),
    };
    Publication {
        title: work.text("title"),
        url,
        publication_year: work.text("publication_year"),
        publication_type: work.text("publication_type"),
        citation_value: work.text("citation_value"),
    }
}

fn nullable_items(record: &Projection<'_>, field: &str) -> Vec<Option<Value>> {
    record
        .list(field)
        .iter()
        .map(|item| if item.is_null() { None } else { Some(item.clone()) })
        .collect()
}

/// `history.last-modified-date.value` is epoch milliseconds; strings pass through.
fn last_modified(raw: &Value) -> Value {
    match access::lookup(Some(raw), &["history", "last-modified-date", "value"]) {
        Some(Value::Number(millis)) => millis
            .as_i64()
            .and_then(format_epoch_millis)
            .map(Value::String)
            .unwrap_or(Value::Null),
        Some(Value::String(text)) => Value::String(text.clone()),
        _ => Value::Null,
    }
}

fn format_epoch_millis(millis: i64) -> Option<String> {
    let at = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()?;
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .ok()
}

/// Scheme to URL for every external id that carries a URL. The first id of
/// a given scheme wins.
fn work_urls(raw: &Value) -> Value {
    let mut urls = Map::new();
    for id in access::list(Some(raw), &["external-ids", "external-id"]) {
        let scheme = access::get_text(Some(id), &["external-id-type"]);
        let url = access::get_text(Some(id), &["external-id-url", "value"]);
        if let (Some(scheme), Some(url)) = (scheme, url) {
            urls.entry(scheme).or_insert(Value::String(url));
        }
    }
    Value::Object(urls)
}
