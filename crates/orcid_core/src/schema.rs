use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One researcher's registry profile, as handed to every renderer.
///
/// Identity fields are plain strings. The affiliation, peer-review and
/// funding sequences keep the registry's raw nested shape and are only
/// ever read through [`crate::access`].
///
/// Decoding is lenient: scalars of the wrong type are rendered as text,
/// nulls and misshapen sequences become empty, and null publications are
/// dropped. Only a document that is not a mapping at all is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Profile {
    #[serde(deserialize_with = "lenient::text")]
    pub orcid: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub given_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub family_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub last_modify_date: Option<String>,
    #[serde(deserialize_with = "lenient::publications")]
    pub publications: Vec<Publication>,
    /// Affiliation groups: `{"summaries": [{"employment-summary": {..}}]}`; nulls are kept.
    #[serde(deserialize_with = "lenient::nullable_values")]
    pub employments: Vec<Option<Value>>,
    /// Affiliation groups: `{"summaries": [{"education-summary": {..}}]}`; nulls are kept.
    #[serde(deserialize_with = "lenient::nullable_values")]
    pub educations: Vec<Option<Value>>,
    /// Peer-review groups: `{"peer-review-group": [{"peer-review-summary": [..]}]}`.
    #[serde(deserialize_with = "lenient::values")]
    pub peer_reviews: Vec<Value>,
    /// Funding groups: `{"funding-summary": [..]}`.
    #[serde(deserialize_with = "lenient::values")]
    pub fundings: Vec<Value>,
}

impl Profile {
    /// "given family", trimmed. `None` when both parts are missing or blank.
    pub fn display_name(&self) -> Option<String> {
        let name = format!(
            "{} {}",
            self.given_name.as_deref().unwrap_or_default(),
            self.family_name.as_deref().unwrap_or_default()
        );
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Publication {
    #[serde(deserialize_with = "lenient::text")]
    pub title: Option<String>,
    /// Identifier scheme (e.g. `doi`) to resolvable URL.
    #[serde(deserialize_with = "lenient::url_map")]
    pub url: BTreeMap<String, String>,
    #[serde(deserialize_with = "lenient::text")]
    pub publication_year: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub publication_type: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub citation_value: Option<String>,
}

impl Publication {
    /// The display URL: the first value of `url` in scheme order.
    pub fn first_url(&self) -> Option<&str> {
        self.url.values().next().map(String::as_str)
    }
}

/// Treats blank strings the same as missing ones.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Field decoders that accept any JSON shape and degrade instead of failing.
mod lenient {
    use super::*;
    use crate::access;
    use tracing::warn;

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => None,
            other => Some(access::text(&other)),
        })
    }

    pub fn url_map<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, String>, D::Error> {
        let urls = match Value::deserialize(deserializer)? {
            Value::Object(urls) => urls
                .into_iter()
                .filter(|(_, url)| !url.is_null())
                .map(|(scheme, url)| (scheme, access::text(&url)))
                .collect(),
            _ => BTreeMap::new(),
        };
        Ok(urls)
    }

    pub fn values<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items,
            _ => Vec::new(),
        })
    }

    pub fn nullable_values<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Option<Value>>, D::Error> {
        let items = values(deserializer)?;
        Ok(items
            .into_iter()
            .map(|item| if item.is_null() { None } else { Some(item) })
            .collect())
    }

    pub fn publications<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Publication>, D::Error> {
        let mut publications = Vec::new();
        for (index, item) in values(deserializer)?.into_iter().enumerate() {
            match item {
                Value::Null => {}
                Value::Object(_) => match serde_json::from_value(item) {
                    Ok(publication) => publications.push(publication),
                    Err(err) => warn!(index, %err, "skipping undecodable publication"),
                },
                _ => warn!(index, "skipping publication that is not a mapping"),
            }
        }
        Ok(publications)
    }
}
