use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

mod manifest;

pub use manifest::{ActionState, Manifest, ManifestAction};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const IMAGES_DIR: &str = "images";
pub const DEFAULT_BUNDLE_NAME: &str = "steam-status-toggle.streamDeckPlugin";
pub const COMPRESSION_LEVEL: i64 = 9;

#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("required input '{}' is missing", path.display())]
    MissingInput { path: PathBuf },
    #[error("file name '{}' is not valid UTF-8", path.display())]
    NonUtf8Name { path: PathBuf },
    #[error("filesystem error at '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PackagingError + '_ {
    move |source| PackagingError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub output: PathBuf,
    pub entries: Vec<String>,
    pub total_bytes: u64,
}

/// Builds the distributable bundle: writes `manifest.json` into the plugin
/// directory, then zips the entry artifact, the manifest and `images/`.
///
/// Entries are sorted and stamped with a fixed timestamp, so identical
/// inputs produce identical bundles.
#[derive(Debug, Clone)]
pub struct PackagingJob {
    plugin_dir: PathBuf,
    entry_artifact: PathBuf,
    output: PathBuf,
    manifest: Manifest,
}

impl PackagingJob {
    pub fn new(plugin_dir: impl Into<PathBuf>, entry_artifact: impl Into<PathBuf>) -> Self {
        let plugin_dir = plugin_dir.into();
        Self {
            output: plugin_dir.join(DEFAULT_BUNDLE_NAME),
            plugin_dir,
            entry_artifact: entry_artifact.into(),
            manifest: Manifest::steam_status_toggle(),
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn run(&self) -> Result<PackageReport, PackagingError> {
        info!(plugin_dir = %self.plugin_dir.display(), "starting packaging");

        let entry_name = self.entry_name()?;
        let images_dir = self.plugin_dir.join(IMAGES_DIR);
        if !images_dir.is_dir() {
            return Err(PackagingError::MissingInput { path: images_dir });
        }

        let manifest_path = self.write_manifest()?;

        let mut entries = vec![
            (entry_name, self.entry_artifact.clone()),
            (MANIFEST_FILE.to_string(), manifest_path),
        ];
        collect_files(&images_dir, IMAGES_DIR, &mut entries)?;

        let total_bytes = self.write_archive(&entries)?;
        let names: Vec<String> = entries.into_iter().map(|(name, _)| name).collect();
        info!(
            output = %self.output.display(),
            entries = names.len(),
            total_bytes,
            "plugin packaged"
        );

        Ok(PackageReport {
            output: self.output.clone(),
            entries: names,
            total_bytes,
        })
    }

    fn entry_name(&self) -> Result<String, PackagingError> {
        if !self.entry_artifact.is_file() {
            return Err(PackagingError::MissingInput {
                path: self.entry_artifact.clone(),
            });
        }
        self.entry_artifact
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| PackagingError::NonUtf8Name {
                path: self.entry_artifact.clone(),
            })
    }

    fn write_manifest(&self) -> Result<PathBuf, PackagingError> {
        let path = self.plugin_dir.join(MANIFEST_FILE);
        let json = self.manifest.to_json_pretty()?;
        fs::write(&path, json).map_err(io_error(&path))?;
        debug!(path = %path.display(), "manifest written");
        Ok(path)
    }

    fn write_archive(&self, entries: &[(String, PathBuf)]) -> Result<u64, PackagingError> {
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let file = File::create(&self.output).map_err(io_error(&self.output))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL))
            .last_modified_time(zip::DateTime::default());

        for (name, path) in entries {
            zip.start_file(name.as_str(), options)?;
            let mut source = File::open(path).map_err(io_error(path))?;
            io::copy(&mut source, &mut zip).map_err(io_error(path))?;
            debug!(entry = %name, "added to archive");
        }

        let file = zip.finish()?;
        let metadata = file.metadata().map_err(io_error(&self.output))?;
        Ok(metadata.len())
    }
}

/// Appends every file below `dir`, depth first in name order, as
/// `<prefix>/<relative path>`.
fn collect_files(
    dir: &Path,
    prefix: &str,
    out: &mut Vec<(String, PathBuf)>,
) -> Result<(), PackagingError> {
    let mut children = fs::read_dir(dir)
        .map_err(io_error(dir))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error(dir))?;
    children.sort();

    for path in children {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return Err(PackagingError::NonUtf8Name { path: path.clone() });
        };
        let archive_name = format!("{prefix}/{name}");
        if path.is_dir() {
            collect_files(&path, &archive_name, out)?;
        } else {
            out.push((archive_name, path));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
