//! Run command implementation.

use super::open_store;
use crate::cli::RunArgs;
use crate::config::{Config, ProviderKind};
use crate::error::{CliError, Result};
use crate::output::{records_json, Formatter};
use actes_domain::{ExtractionOracle, OutputRecord};
use actes_extractor::{FieldExtractor, TesseractRecognizer};
use actes_llm::{ollama, openai, OllamaProvider, OpenAiProvider};
use actes_pipeline::{Collaborators, PipelineDriver};
use actes_store::ArchivePublisher;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff"];

/// Execute the run command.
///
/// The LLM providers use blocking HTTP clients, so they are built and dropped
/// outside the runtime; only the pipeline itself runs inside `block_on`.
pub fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let images = collect_images(&args.images_dir)?;
    if images.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "No page images found in {}",
            args.images_dir.display()
        )));
    }

    let batch = batch_name(&args)?;
    let export_path = match &args.export {
        Some(path) => path.clone(),
        None => config.export_dir()?.join(format!("{}.json", batch)),
    };

    if export_path.exists() && !args.force {
        eprintln!(
            "{}",
            formatter.warning(&format!(
                "Batch '{}' already exported to {} (use --force to reprocess)",
                batch,
                export_path.display()
            ))
        );
        return Ok(());
    }

    let recognizer = TesseractRecognizer::from_config(&config.extractor);
    recognizer.check_available()?;

    let collaborators = Collaborators {
        recognizer: Arc::new(recognizer),
        oracle: build_oracle(config, args.api_key.as_deref())?,
        publisher: Arc::new(ArchivePublisher::new(config.archive_dir()?)),
        store: Arc::new(open_store(config)?),
    };
    let driver = PipelineDriver::new(collaborators, config.pipeline.clone())?;

    info!(batch = %batch, images = images.len(), "starting batch");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(async {
        let outcome = driver.run(&images).await?;
        driver.export(&batch, &outcome.records).await?;
        Ok::<_, CliError>(outcome)
    })?;
    drop(runtime);

    println!("{}", formatter.format_records(&outcome.records)?);

    for skipped in &outcome.skipped {
        eprintln!(
            "{}",
            formatter.warning(&format!("Skipped {}: {}", skipped.image.display(), skipped.error))
        );
    }

    if outcome.records.is_empty() {
        eprintln!("{}", formatter.warning("No records produced; export not written"));
        return Ok(());
    }

    write_export(&export_path, &outcome.records)?;
    eprintln!(
        "{}",
        formatter.success(&format!(
            "Processed {} image(s), skipped {}; export written to {}",
            outcome.processed(),
            outcome.skipped.len(),
            export_path.display()
        ))
    );

    Ok(())
}

fn build_oracle(config: &Config, api_key: Option<&str>) -> Result<Arc<dyn ExtractionOracle>> {
    let llm = &config.llm;

    let oracle: Arc<dyn ExtractionOracle> = match llm.provider {
        ProviderKind::OpenAi => {
            let api_key = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| CliError::Config("OPENAI_API_KEY is not set".into()))?;
            let endpoint = llm.endpoint.as_deref().unwrap_or(openai::DEFAULT_ENDPOINT);
            let provider = OpenAiProvider::new(endpoint, llm.model.as_str(), api_key)?
                .with_max_retries(llm.max_retries);
            Arc::new(FieldExtractor::new(provider, config.extractor.clone()))
        }
        ProviderKind::Ollama => {
            let endpoint = llm.endpoint.as_deref().unwrap_or(ollama::DEFAULT_ENDPOINT);
            let provider = OllamaProvider::new(endpoint, llm.model.as_str())?
                .with_max_retries(llm.max_retries);
            Arc::new(FieldExtractor::new(provider, config.extractor.clone()))
        }
    };

    info!(provider = ?llm.provider, model = %llm.model, "extraction oracle ready");
    Ok(oracle)
}

/// Page images directly inside `dir`, in directory order
fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_image && path.is_file() {
            images.push(path);
        }
    }
    Ok(images)
}

fn batch_name(args: &RunArgs) -> Result<String> {
    if let Some(batch) = args.batch.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        return Ok(batch.to_string());
    }

    let dir = fs::canonicalize(&args.images_dir)?;
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CliError::InvalidInput(format!("Cannot name batch for {}; use --batch", dir.display()))
        })
}

fn write_export(path: &Path, records: &[OutputRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, records_json(records)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    fn args(dir: &Path) -> RunArgs {
        RunArgs {
            images_dir: dir.to_path_buf(),
            batch: None,
            export: None,
            force: false,
            api_key: None,
        }
    }

    #[test]
    fn test_collect_images_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-1.png", "page-2.PNG", "page-3.jpg", "notes.txt", "page-4.pdf"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.png")).unwrap();

        let mut names: Vec<_> = collect_images(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["page-1.png", "page-2.PNG", "page-3.jpg"]);
    }

    #[test]
    fn test_batch_name_defaults_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let batch_dir = dir.path().join("actes-2024-03");
        fs::create_dir(&batch_dir).unwrap();

        assert_eq!(batch_name(&args(&batch_dir)).unwrap(), "actes-2024-03");

        let mut named = args(&batch_dir);
        named.batch = Some(" mars ".to_string());
        assert_eq!(batch_name(&named).unwrap(), "mars");
    }

    #[test]
    fn test_existing_export_skips_batch() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("pages");
        fs::create_dir(&images).unwrap();
        fs::write(images.join("page-1.png"), b"x").unwrap();

        let export = dir.path().join("pages.json");
        fs::write(&export, "[]").unwrap();

        let mut config = Config::default();
        config.storage.database = Some(dir.path().join("actes.db"));

        let mut run_args = args(&images);
        run_args.export = Some(export.clone());

        let formatter = Formatter::new(OutputFormat::Table, false);
        execute_run(run_args, &config, &formatter).unwrap();

        assert_eq!(fs::read_to_string(&export).unwrap(), "[]");
        assert!(!dir.path().join("actes.db").exists());
    }

    #[test]
    fn test_empty_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let formatter = Formatter::new(OutputFormat::Table, false);
        let result = execute_run(args(dir.path()), &Config::default(), &formatter);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_openai_requires_api_key() {
        let result = build_oracle(&Config::default(), Some("  "));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_ollama_oracle_builds_without_key() {
        let mut config = Config::default();
        config.llm.provider = ProviderKind::Ollama;
        assert!(build_oracle(&config, None).is_ok());
    }

    #[test]
    fn test_write_export_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("mars.json");
        write_export(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
