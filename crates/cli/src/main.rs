use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use orcid_core::{Profile, load_profiles};
use reports::settings::Settings;
use reports::{ResultDir, TableFormat};
use schemars::schema_for;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "orcidx")]
#[command(
    about = "Render ORCID researcher profiles as PDF, text, JSON or tables",
    long_about = None
)]
struct Cli {
    /// Settings file (default: ./orcidx.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one report per profile, or one table for all of them
    Render {
        #[arg(value_enum)]
        format: ReportFormat,

        /// Profile files (JSON or YAML; normalized profiles or raw records)
        #[arg(long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output file name for a single profile; directories are ignored
        #[arg(long)]
        output: Option<String>,
    },
    /// Export JSON Schemas to the ./schemas directory
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for the profile input and JSON report
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Pdf,
    Text,
    Json,
    Csv,
    Xlsx,
}

impl ReportFormat {
    fn extension(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Xlsx => "xlsx",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::discover(cli.config.as_deref())?;
    init_tracing(&settings.logging.filter);

    match cli.command {
        Commands::Render {
            format,
            input,
            output,
        } => render(&settings, format, &input, output.as_deref()),
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => schema_export(out_dir),
        },
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn render(
    settings: &Settings,
    format: ReportFormat,
    inputs: &[PathBuf],
    output: Option<&str>,
) -> Result<()> {
    let mut profiles = Vec::new();
    for path in inputs {
        profiles.extend(load_profiles(path)?);
    }
    info!(inputs = inputs.len(), profiles = profiles.len(), ?format, "rendering");

    let out = ResultDir::new(settings.output.root.clone());
    let written = match format {
        ReportFormat::Csv => {
            vec![reports::render_table(&out, &profiles, TableFormat::Delimited)?]
        }
        ReportFormat::Xlsx => {
            vec![reports::render_table(&out, &profiles, TableFormat::Spreadsheet)?]
        }
        ReportFormat::Pdf | ReportFormat::Text | ReportFormat::Json => {
            let names = output_names(&profiles, format, output)?;
            let mut written = Vec::with_capacity(profiles.len());
            for (profile, name) in profiles.iter().zip(&names) {
                written.push(render_single(&out, settings, format, name, profile)?);
            }
            written
        }
    };

    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn render_single(
    out: &ResultDir,
    settings: &Settings,
    format: ReportFormat,
    name: &str,
    profile: &Profile,
) -> Result<PathBuf> {
    match format {
        ReportFormat::Pdf => reports::render_document(out, name, profile, &settings.document),
        ReportFormat::Text => reports::render_text(out, name, profile),
        ReportFormat::Json => reports::render_structured(out, name, profile),
        ReportFormat::Csv | ReportFormat::Xlsx => {
            bail!("{format:?} is a table format and renders all profiles at once")
        }
    }
}

/// `--output` for a single profile, else `<orcid>.<ext>` (or `profile-N.<ext>`).
///
/// A repeated ORCID gets `-2`, `-3`, ... so no report overwrites another.
fn output_names(
    profiles: &[Profile],
    format: ReportFormat,
    output: Option<&str>,
) -> Result<Vec<String>> {
    if let Some(name) = output {
        if profiles.len() != 1 {
            bail!(
                "--output names a single file but the inputs hold {} profiles",
                profiles.len()
            );
        }
        return Ok(vec![name.to_string()]);
    }
    let mut seen: HashMap<String, usize> = HashMap::new();
    let names = profiles
        .iter()
        .enumerate()
        .map(|(index, profile)| {
            let stem = profile
                .orcid
                .as_deref()
                .filter(|orcid| !orcid.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("profile-{}", index + 1));
            let count = seen.entry(stem.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                format!("{stem}.{}", format.extension())
            } else {
                format!("{stem}-{count}.{}", format.extension())
            }
        })
        .collect();
    Ok(names)
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir)?;

    let profile_schema = schema_for!(orcid_core::Profile);
    write_schema(
        &out_dir,
        "Profile.schema.json",
        &serde_json::to_string_pretty(&profile_schema)?,
    )?;

    let report_schema = schema_for!(reports::StructuredReport);
    write_schema(
        &out_dir,
        "StructuredReport.schema.json",
        &serde_json::to_string_pretty(&report_schema)?,
    )?;

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}

fn write_schema(out_dir: &Path, file_name: &str, json: &str) -> Result<()> {
    let path = out_dir.join(file_name);
    fs::write(&path, json)?;
    info!(path = %path.display(), "wrote schema");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reports::settings::OutputSettings;

    fn profile(orcid: Option<&str>) -> Profile {
        Profile {
            orcid: orcid.map(str::to_string),
            ..Profile::default()
        }
    }

    #[test]
    fn output_names_default_to_orcid() {
        let profiles = vec![profile(Some("0000-0001-2345-6789")), profile(None)];
        let names = output_names(&profiles, ReportFormat::Text, None).unwrap();
        assert_eq!(names, vec!["0000-0001-2345-6789.txt", "profile-2.txt"]);
    }

    #[test]
    fn explicit_output_needs_one_profile() {
        let one = vec![profile(None)];
        assert_eq!(
            output_names(&one, ReportFormat::Pdf, Some("ada.pdf")).unwrap(),
            vec!["ada.pdf"]
        );
        let two = vec![profile(None), profile(None)];
        assert!(output_names(&two, ReportFormat::Pdf, Some("ada.pdf")).is_err());
    }

    #[test]
    fn cli_parses_render_arguments() {
        let cli = Cli::try_parse_from([
            "orcidx", "--config", "custom.toml", "render", "xlsx", "--input", "a.json", "b.yaml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Render { format, input, output } => {
                assert_eq!(format, ReportFormat::Xlsx);
                assert_eq!(input.len(), 2);
                assert!(output.is_none());
            }
            Commands::Schema { .. } => panic!("expected render"),
        }
    }

    #[test]
    fn repeated_orcids_get_distinct_names() {
        let orcid = Some("0000-0001-2345-6789");
        let profiles = vec![profile(orcid), profile(orcid), profile(None), profile(orcid)];
        let names = output_names(&profiles, ReportFormat::Json, None).unwrap();
        assert_eq!(
            names,
            vec![
                "0000-0001-2345-6789.json",
                "0000-0001-2345-6789-2.json",
                "profile-3.json",
                "0000-0001-2345-6789-3.json",
            ]
        );
    }

    #[test]
    fn render_writes_per_profile_and_table_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let input = temp.path().join("batch.json");
        fs::write(
            &input,
            r#"[
                {"orcid": "0000-0001-2345-6789", "given_name": "Ada"},
                {"orcid-identifier": {"path": "0000-0002-1825-0097"}}
            ]"#,
        )
        .unwrap();
        let settings = Settings {
            output: OutputSettings {
                root: temp.path().to_path_buf(),
            },
            ..Settings::default()
        };
        let inputs = vec![input];
        let result = temp.path().join("Result");

        for (format, extension) in [
            (ReportFormat::Pdf, "pdf"),
            (ReportFormat::Text, "txt"),
            (ReportFormat::Json, "json"),
        ] {
            render(&settings, format, &inputs, None).unwrap();
            for orcid in ["0000-0001-2345-6789", "0000-0002-1825-0097"] {
                assert!(result.join(format!("{orcid}.{extension}")).is_file());
            }
        }

        render(&settings, ReportFormat::Csv, &inputs, None).unwrap();
        render(&settings, ReportFormat::Xlsx, &inputs, None).unwrap();
        assert!(result.join("orcid_report.csv").is_file());
        assert!(result.join("orcid_report.xlsx").is_file());

        let text = fs::read_to_string(result.join("0000-0001-2345-6789.txt")).unwrap();
        assert!(text.starts_with("ORCID: 0000-0001-2345-6789\nName: Ada\n"));
    }

    #[test]
    fn render_honours_explicit_output_name() {
        let temp = tempfile::TempDir::new().unwrap();
        let input = temp.path().join("ada.json");
        fs::write(&input, r#"{"orcid": "0000-0001-2345-6789"}"#).unwrap();
        let settings = Settings {
            output: OutputSettings {
                root: temp.path().to_path_buf(),
            },
            ..Settings::default()
        };
        render(&settings, ReportFormat::Text, &[input], Some("nested/ada.txt")).unwrap();
        assert!(temp.path().join("Result/ada.txt").is_file());
    }

    #[test]
    fn schema_export_writes_both_files() {
        let temp = tempfile::TempDir::new().unwrap();
        schema_export(temp.path().to_path_buf()).unwrap();
        assert!(temp.path().join("Profile.schema.json").exists());
        assert!(temp.path().join("StructuredReport.schema.json").exists());
    }
}
