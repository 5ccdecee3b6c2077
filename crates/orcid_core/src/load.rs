use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::record::{is_raw_record, profile_from_record};
use crate::schema::Profile;

/// Reads one file of profiles.
///
/// The file is YAML when its extension is `.yaml`/`.yml` and JSON otherwise.
/// It may hold a normalized profile, a raw registry record, or an array
/// mixing both.
pub fn load_profiles(path: &Path) -> Result<Vec<Profile>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading profile input {}", path.display()))?;
    let document: Value = if is_yaml(path) {
        serde_yaml::from_str(&raw).with_context(|| format!("parsing YAML {}", path.display()))?
    } else {
        serde_json::from_str(&raw).with_context(|| format!("parsing JSON {}", path.display()))?
    };

    let profiles = match document {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                profile_from_value(item).with_context(|| {
                    format!("decoding profile #{} of {}", index + 1, path.display())
                })
            })
            .collect::<Result<Vec<_>>>()?,
        single => vec![
            profile_from_value(&single)
                .with_context(|| format!("decoding profile in {}", path.display()))?,
        ],
    };
    debug!(path = %path.display(), count = profiles.len(), "loaded profiles");
    Ok(profiles)
}

pub fn profile_from_value(value: &Value) -> Result<Profile> {
    if is_raw_record(value) {
        return Ok(profile_from_record(value));
    }
    let profile = serde_json::from_value(value.clone()).context("decoding normalized profile")?;
    Ok(profile)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Publication;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn loads_yaml_profile() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ada.yaml");
        fs::write(
            &path,
            r#"
orcid: "0000-0001-2345-6789"
given_name: Ada
family_name: Lovelace
publications:
  - title: On Computation
employments:
  - null
"#,
        )
        .unwrap();

        let profiles = load_profiles(&path).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].given_name.as_deref(), Some("Ada"));
        assert_eq!(profiles[0].publications[0].title.as_deref(), Some("On Computation"));
        assert_eq!(profiles[0].employments, vec![None]);
    }

    #[test]
    fn loads_mixed_json_array() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("batch.json");
        fs::write(
            &path,
            r#"[
                {"orcid": "0000-0000-0000-0001"},
                {"orcid-identifier": {"path": "0000-0000-0000-0002"}}
            ]"#,
        )
        .unwrap();

        let profiles = load_profiles(&path).unwrap();
        let ids: Vec<_> = profiles.iter().map(|p| p.orcid.as_deref()).collect();
        assert_eq!(ids, vec![Some("0000-0000-0000-0001"), Some("0000-0000-0000-0002")]);
    }

    #[test]
    fn reports_unreadable_input() {
        let temp = TempDir::new().unwrap();
        let err = load_profiles(&temp.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn unquoted_years_and_null_works_still_load() {
        let temp = TempDir::new().unwrap();
        let yaml = temp.path().join("ada.yaml");
        fs::write(
            &yaml,
            "publications:\n  - title: On Computation\n    publication_year: 1843\n",
        )
        .unwrap();
        let profiles = load_profiles(&yaml).unwrap();
        let expected = Publication {
            title: Some("On Computation".into()),
            publication_year: Some("1843".into()),
            ..Publication::default()
        };
        assert_eq!(profiles[0].publications, vec![expected]);

        let json = temp.path().join("nulls.json");
        fs::write(&json, r#"{"publications": [null]}"#).unwrap();
        let profiles = load_profiles(&json).unwrap();
        assert_eq!(profiles[0], Profile::default());
    }

    #[test]
    fn batch_errors_name_the_file_and_entry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("batch.json");
        fs::write(&path, r#"[{"orcid": "0000-0000-0000-0001"}, "not a profile"]"#).unwrap();
        let err = load_profiles(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("profile #2"));
        assert!(message.contains("batch.json"));
    }
}
