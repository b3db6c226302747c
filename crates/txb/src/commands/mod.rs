use miette::{Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

pub mod pack;
pub mod report;
pub mod unpack;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Convert TXB files into annotated text
    Unpack(unpack::UnpackArgs),
    /// Convert annotated text back into TXB files
    Pack(pack::PackArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Unpack(unpack) => unpack.handle(),
            Commands::Pack(pack) => pack.handle(),
        }
    }
}

/// Every file with `extension` among `paths`, descending into directories.
pub(crate) fn collect_inputs(paths: &[PathBuf], extension: &str) -> Vec<PathBuf> {
    paths
        .iter()
        .flat_map(|path| WalkDir::new(path).sort_by_file_name())
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect()
}

/// `<stem>_new.<extension>` next to `path`, without doubling an existing `_new` suffix.
pub(crate) fn output_path(path: &Path, extension: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let base = stem.strip_suffix("_new").unwrap_or(&*stem);
    path.with_file_name(format!("{base}_new.{extension}"))
}

pub(crate) fn create_output(path: &Path, overwrite: bool) -> Result<File> {
    if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    }
}
