//! The documentation run: load config, parse sources, publish to a sink

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};

use quill_core::{
    collect_source_files, extract_references, publish_script, ConfigOverrides, DocSink,
    FsPageSink, IndexBuilder, QuillConfig, Renderer, ScriptParser, SqlSink, TypeLinkTable,
    XmlDumpSink, ZipArchiveSink,
};

use crate::{Cli, Mode};

/// What a run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Scripts published
    pub scripts: usize,
    /// Files without a script header, or unreadable
    pub skipped: usize,
    /// Archive or dump file written, for zip and xml modes
    pub artifact: Option<PathBuf>,
}

/// The active sink for a run
enum Output {
    Pages(FsPageSink),
    Sql(SqlSink),
    Zip(ZipArchiveSink),
    Xml(XmlDumpSink),
}

impl Output {
    fn sink(&mut self) -> &mut dyn DocSink {
        match self {
            Output::Pages(sink) => sink,
            Output::Sql(sink) => sink,
            Output::Zip(sink) => sink,
            Output::Xml(sink) => sink,
        }
    }

    /// Finalize the sink and write archive bytes, if any, into `dir`.
    fn finish(self, dir: &Path, project: &str) -> Result<Option<PathBuf>> {
        let (bytes, extension) = match self {
            Output::Pages(mut sink) => {
                sink.finalize()?;
                return Ok(None);
            }
            Output::Sql(mut sink) => {
                sink.finalize().context("failed to finalize database")?;
                return Ok(None);
            }
            Output::Zip(sink) => (sink.into_bytes()?, "zip"),
            Output::Xml(sink) => (sink.into_bytes()?, "xml"),
        };

        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        let path = dir.join(archive_file_name(project, extension));
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(Some(path))
    }
}

/// `<project>_<YYYYmmdd_HHMMSS>.<ext>`
pub fn archive_file_name(project: &str, extension: &str) -> String {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("{project}_{stamp}.{extension}")
}

/// Load configuration and fold the command line into it.
fn load_config(cli: &Cli) -> Result<QuillConfig> {
    let mut config = match &cli.config {
        Some(path) => QuillConfig::load(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => {
            let dir = if cli.input.is_dir() {
                cli.input.as_path()
            } else {
                cli.input.parent().unwrap_or_else(|| Path::new("."))
            };
            QuillConfig::discover(dir)
                .with_context(|| format!("failed to load config from '{}'", dir.display()))?
        }
    };

    config.apply_overrides(ConfigOverrides {
        highlight: cli.syntax_language.clone(),
        no_marker: cli.no_marker,
        no_marker_seconds: cli.no_marker_seconds,
        project_name: cli.project_name.clone(),
        site_name: cli.wiki_name.clone(),
        base_url: cli.wiki_base.clone(),
        contributor: cli.wiki_user.clone(),
        sql_batch: cli.sql_batch,
        sql_batch_size: cli.sql_batch_size,
        sql_batch_id: cli.sql_batch_id.clone(),
        user_types: cli.user_types.clone(),
    })?;
    Ok(config)
}

fn source_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        Ok(vec![input.to_path_buf()])
    } else if input.is_dir() {
        collect_source_files(input)
            .with_context(|| format!("failed to scan '{}'", input.display()))
    } else {
        Err(anyhow!("Path '{}' does not exist", input.display()))
    }
}

fn open_output(cli: &Cli, config: &QuillConfig, renderer: Renderer) -> Result<Output> {
    Ok(match cli.mode {
        Mode::Wiki => Output::Pages(FsPageSink::new(&cli.output, renderer)?),
        Mode::Sql => {
            let db = cli
                .db
                .as_deref()
                .ok_or_else(|| anyhow!("--db is required with --mode sql"))?;
            Output::Sql(SqlSink::open(db, config.sql_options())?)
        }
        Mode::Zip => Output::Zip(ZipArchiveSink::new(renderer)),
        Mode::Xml => Output::Xml(XmlDumpSink::new(renderer, config.site_info())),
    })
}

/// Run one documentation pass.
pub fn run(cli: &Cli) -> Result<RunSummary> {
    let config = load_config(cli)?;

    let mut links = TypeLinkTable::with_builtins();
    if let Some(path) = &config.user_types {
        let merged = links
            .merge_json_file(path)
            .with_context(|| format!("failed to load user types '{}'", path.display()))?;
        info!(types = merged, path = %path.display(), "merged user types");
    }
    let renderer = Renderer::new(config.render_options(), Arc::new(links));

    let files = source_files(&cli.input)?;
    if files.is_empty() {
        return Err(anyhow!("No .psc files found in '{}'", cli.input.display()));
    }
    debug!(files = files.len(), mode = ?cli.mode, "starting run");

    let mut output = open_output(cli, &config, renderer)?;
    let mut index = IndexBuilder::new(config.wiki.project_name.clone());
    let mut summary = RunSummary::default();

    for file in &files {
        let mut script = match ScriptParser::parse_file(file) {
            Ok(Some(script)) => script,
            Ok(None) => {
                warn!(file = %file.display(), "no ScriptName header, skipping");
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(file = %file.display(), error = %e, "failed to read source, skipping");
                summary.skipped += 1;
                continue;
            }
        };

        extract_references(&mut script);
        publish_script(output.sink(), &script)
            .with_context(|| format!("failed to publish '{}'", file.display()))?;
        index.add_script(&script);
        summary.scripts += 1;
    }

    if cli.index {
        match &mut output {
            Output::Pages(_) => {
                index.write_to_dir(&cli.output)?;
            }
            other => index.write_to(other.sink())?,
        }
    }

    summary.artifact = output.finish(&cli.output, &config.wiki.project_name)?;
    Ok(summary)
}
