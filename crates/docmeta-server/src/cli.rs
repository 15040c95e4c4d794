//! One-shot `extract` subcommand.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use docmeta_core::PipelineOptions;
use docmeta_ingest::MetadataPipeline;
use tracing::info;

/// Parsed `extract <file> [--out <path>]` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractArgs {
    pub input: PathBuf,
    pub out: Option<PathBuf>,
}

impl ExtractArgs {
    pub fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut input = None;
        let mut out = None;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--out" | "-o" => {
                    let path = iter.next().context("--out needs a path")?;
                    out = Some(PathBuf::from(path));
                }
                flag if flag.starts_with('-') => bail!("Unknown option: {}", flag),
                path if input.is_none() => input = Some(PathBuf::from(path)),
                extra => bail!("Unexpected argument: {}", extra),
            }
        }
        let input = input.context("Usage: docmeta extract <file> [--out <path>]")?;
        Ok(Self { input, out })
    }
}

/// Pipeline options for CLI runs: `docmeta.json` in `data_dir`, then env.
pub fn load_options(data_dir: &Path) -> anyhow::Result<PipelineOptions> {
    let mut options = PipelineOptions::load(&data_dir.join("docmeta.json"))?;
    options.apply_env()?;
    Ok(options)
}

/// Extract one file and return the pruned, pretty-printed JSON.
///
/// The boolean is `false` when the file type is unsupported.
pub fn extract_file(pipeline: &MetadataPipeline, input: &Path) -> anyhow::Result<(String, bool)> {
    if !input.is_file() {
        bail!("No such file: {}", input.display());
    }
    let filename = input
        .file_name()
        .and_then(|n| n.to_str())
        .context("Input path has no file name")?;
    let response = pipeline.extract_path(input, filename);
    let json = response.to_json_pretty()?;
    Ok((json, !response.is_unsupported()))
}

/// Run the subcommand. Returns the process exit code.
pub fn run(args: &[String], data_dir: &Path) -> anyhow::Result<i32> {
    let args = ExtractArgs::parse(args)?;
    let pipeline = MetadataPipeline::from_options(load_options(data_dir)?);
    let (json, supported) = extract_file(&pipeline, &args.input)?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote metadata to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(if supported { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmeta_ingest::{create_tagger, NoopOcr};
    use std::sync::Arc;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let parsed = ExtractArgs::parse(&strings(&["notes.txt", "--out", "meta.json"])).unwrap();
        assert_eq!(parsed.input, PathBuf::from("notes.txt"));
        assert_eq!(parsed.out, Some(PathBuf::from("meta.json")));

        assert!(ExtractArgs::parse(&[]).is_err());
        assert!(ExtractArgs::parse(&strings(&["a.txt", "--out"])).is_err());
        assert!(ExtractArgs::parse(&strings(&["a.txt", "b.txt"])).is_err());
        assert!(ExtractArgs::parse(&strings(&["--verbose", "a.txt"])).is_err());
    }

    #[test]
    fn test_extract_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Objective\nMeasure the build time.").unwrap();
        let pipeline =
            MetadataPipeline::new(PipelineOptions::default(), create_tagger(), Arc::new(NoopOcr));

        let (json, supported) = extract_file(&pipeline, &path).unwrap();
        assert!(supported);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["filename"], "notes.txt");
        assert_eq!(value["purpose"], "Measure the build time.");

        assert!(extract_file(&pipeline, &dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_unsupported_file_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, [0u8, 1, 2]).unwrap();
        let pipeline =
            MetadataPipeline::new(PipelineOptions::default(), create_tagger(), Arc::new(NoopOcr));
        let (json, supported) = extract_file(&pipeline, &path).unwrap();
        assert!(!supported);
        assert!(json.contains("Unsupported file type"));
    }
}
