use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};
use txb_codec::{text::pack, Container, PackOptions, PackReport};

use super::{collect_inputs, create_output, output_path, report::FileReport};

#[derive(Args)]
pub struct PackArgs {
    /// Input annotated text files or directories
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Do not reuse the version and border attributes of the TXB file the text came from
    #[arg(long, default_value_t = false)]
    no_source: bool,

    /// Read lone borders of the source TXB file as flags
    #[arg(short = 'b', long, default_value_t = false)]
    force_borders: bool,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// The TXB file an annotated text file was unpacked from.
///
/// `script_new.txt` comes from `script.txb`, anything else from the TXB file with the same stem.
fn source_path(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;

    stem.strip_suffix("_new")
        .into_iter()
        .chain([stem])
        .map(|base| path.with_file_name(format!("{base}.txb")))
        .find(|candidate| candidate.is_file())
}

impl PackArgs {
    fn options(&self) -> PackOptions {
        PackOptions::builder()
            .force_borders(self.force_borders)
            .build()
    }

    fn load_source(&self, path: &Path) -> Result<Option<Container>> {
        if self.no_source {
            return Ok(None);
        }

        let Some(source) = source_path(path) else {
            warn!(
                "no source txb found for {}, using default attributes",
                path.display()
            );
            return Ok(None);
        };

        info!("reusing attributes from {}", source.display());
        let f = File::open(&source)
            .into_diagnostic()
            .context(format!("path: {}", source.display()))?;
        let txb = Container::read(f, self.options().decode_options())
            .context(format!("decoding {}", source.display()))?;

        Ok(Some(txb))
    }

    fn pack_file(&self, path: &Path) -> Result<PackReport> {
        let text = std::fs::read_to_string(path)
            .into_diagnostic()
            .context(format!("path: {}", path.display()))?;
        let source = self.load_source(path)?;

        let (txb, report) = pack(&text, source.as_ref(), &self.options());

        let target = output_path(path, "txb");
        info!("writing {} entries to {}", txb.len(), target.display());

        txb.write(create_output(&target, self.overwrite)?)
            .context(format!("writing {}", target.display()))?;

        Ok(report)
    }

    pub fn handle(&self) -> Result<()> {
        let files = collect_inputs(&self.paths, "txt");
        if files.is_empty() {
            return Err(miette!("no .txt files found"));
        }

        let mut failed = 0;
        let mut reports = Vec::new();
        for path in &files {
            match self.pack_file(path) {
                Ok(report) if report.is_empty() => {}
                Ok(report) => reports.push((path, report)),
                Err(e) => {
                    error!("{e:?}");
                    failed += 1;
                }
            }
        }

        for (path, report) in &reports {
            eprint!("{}", FileReport::new(path, report));
        }

        let skipped: usize = reports.iter().map(|(_, report)| report.len()).sum();
        match (failed, skipped) {
            (0, 0) => Ok(()),
            (0, _) => Err(miette!("{skipped} blocks could not be packed")),
            _ => Err(miette!(
                "{failed} of {} files failed to pack, {skipped} blocks could not be packed",
                files.len()
            )),
        }
    }
}
