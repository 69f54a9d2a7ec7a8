//! Persistence of harvested links to the filesystem.
//!
//! These operations only use the public surface of [`Link`] and are shared
//! by every loader. None of them is transactional: when the content write
//! succeeds and the metadata write fails, the content file stays behind.
//!
//! Layout per link:
//! ```text
//! {save_dir}/content.{ext}
//! {save_dir}/metadata.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use reqwest::blocking::Client;

use crate::error::{HarvesterError, Result};
use crate::http::fetch;
use crate::link::{Link, MediaType};
use crate::text::extract_text;

/// Default stem of the content file.
pub const DEFAULT_CONTENT_NAME: &str = "content";

/// Default stem of the metadata file.
pub const DEFAULT_METADATA_NAME: &str = "metadata";

/// File stems used inside a save directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    pub filename: String,
    pub metadata_name: String,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            filename: DEFAULT_CONTENT_NAME.to_string(),
            metadata_name: DEFAULT_METADATA_NAME.to_string(),
        }
    }
}

/// Whether content is stored as fetched or as extracted text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveMode {
    #[default]
    Raw,
    Text,
}

/// Fetch a link's raw content and write it to `filename`.
pub fn save_content(client: &Client, link: &Link, filename: &Path) -> Result<()> {
    let content = fetch(client, &link.url)?;
    fs::write(filename, content.bytes)?;
    Ok(())
}

/// Fetch a link's raw content and store it with its metadata in `save_dir`.
///
/// Creates `save_dir` if needed, writes `{filename}.{ext}` and then
/// `{metadata_name}.json`. Existing files are overwritten.
///
/// # Returns
/// Path of the written content file.
pub fn save_content_with_metadata(
    client: &Client,
    link: &Link,
    save_dir: &Path,
    options: &SaveOptions,
) -> Result<PathBuf> {
    fs::create_dir_all(save_dir)?;

    let content_path = save_dir.join(link.file_name(&options.filename));
    save_content(client, link, &content_path)?;

    write_metadata(link, save_dir, options)?;
    Ok(content_path)
}

/// Fetch an HTML link and write its extracted text to `filename`.
///
/// Links of any other media type are rejected before anything is fetched.
pub fn save_text(client: &Client, link: &Link, filename: &Path) -> Result<()> {
    ensure_html(link)?;
    let content = fetch(client, &link.url)?;
    fs::write(filename, extract_text(&content.text()))?;
    Ok(())
}

/// Fetch an HTML link and store its extracted text with metadata.
///
/// The content goes to `{filename}.txt`; the metadata records
/// `extension: "txt"` and `preprocessed: true`.
pub fn save_text_with_metadata(
    client: &Client,
    link: &Link,
    save_dir: &Path,
    options: &SaveOptions,
) -> Result<PathBuf> {
    ensure_html(link)?;
    fs::create_dir_all(save_dir)?;

    let mut text_link = link.clone();
    text_link.media_type = MediaType::Txt;
    text_link.preprocessed = true;

    let content_path = save_dir.join(text_link.file_name(&options.filename));
    save_text(client, link, &content_path)?;

    write_metadata(&text_link, save_dir, options)?;
    Ok(content_path)
}

/// Store a link with metadata in the given mode.
pub fn save_link(
    client: &Client,
    link: &Link,
    save_dir: &Path,
    mode: SaveMode,
    options: &SaveOptions,
) -> Result<PathBuf> {
    match mode {
        SaveMode::Raw => save_content_with_metadata(client, link, save_dir, options),
        SaveMode::Text => save_text_with_metadata(client, link, save_dir, options),
    }
}

fn ensure_html(link: &Link) -> Result<()> {
    if link.media_type == MediaType::Html {
        Ok(())
    } else {
        Err(HarvesterError::Unsupported(format!(
            "text extraction of a {} link: {}",
            link.media_type, link.url
        )))
    }
}

fn write_metadata(link: &Link, save_dir: &Path, options: &SaveOptions) -> Result<()> {
    let metadata_path = save_dir.join(format!("{}.json", options.metadata_name));
    fs::write(metadata_path, link.to_metadata_json()?)?;
    Ok(())
}

/// Result of persisting one link with [`save_all`].
#[derive(Debug)]
pub struct SaveOutcome {
    pub link: Link,
    pub dir: PathBuf,
    pub result: Result<PathBuf>,
}

/// Directory a link at `index` is stored in under `root`.
#[must_use]
pub fn link_dir(root: &Path, index: usize) -> PathBuf {
    root.join(format!("{index:05}"))
}

/// Persist many links with up to `jobs` concurrent downloads.
///
/// Each link gets its own directory under `root`, so no two workers write
/// the same file. A failed link is reported in its outcome and does not
/// stop the others. Outcomes are returned in input order; `on_done` is
/// called as each one completes.
pub fn save_all<F>(
    client: &Client,
    links: &[Link],
    root: &Path,
    mode: SaveMode,
    options: &SaveOptions,
    jobs: usize,
    on_done: F,
) -> Result<Vec<SaveOutcome>>
where
    F: Fn(&SaveOutcome) + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()?;

    let outcomes: Vec<SaveOutcome> = pool.install(|| {
        links
            .par_iter()
            .enumerate()
            .map(|(index, link)| {
                let dir = link_dir(root, index);
                let result = save_link(client, link, &dir, mode, options);
                if let Err(e) = &result {
                    tracing::warn!(url = %link.url, error = %e, "Failed to save link");
                }
                let outcome = SaveOutcome {
                    link: link.clone(),
                    dir,
                    result,
                };
                on_done(&outcome);
                outcome
            })
            .collect()
    });

    Ok(outcomes)
}
