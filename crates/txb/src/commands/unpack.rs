use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};
use tracing::{error, info};
use txb_codec::{
    text::render, Container, DecodeOptions, Dictionary, HashResolver, SuffixResolver,
};

use super::{collect_inputs, create_output, output_path};

#[derive(Args)]
pub struct UnpackArgs {
    /// Input TXB files or directories
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Keep lone borders as flags instead of showing them as markers
    #[arg(short = 'b', long, default_value_t = false)]
    force_borders: bool,

    /// A file listing one resource name per line
    #[arg(short, long, value_name = "FILE")]
    dictionary: Option<PathBuf>,

    /// Also try numbered names with a letter appended
    #[arg(long, default_value_t = false)]
    suffix_fallback: bool,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl UnpackArgs {
    fn load_dictionary(&self) -> Result<Dictionary> {
        let Some(path) = &self.dictionary else {
            return Ok(Dictionary::new());
        };

        let f = File::open(path)
            .into_diagnostic()
            .context(format!("path: {}", path.display()))?;
        let dictionary = Dictionary::from_reader(BufReader::new(f))
            .into_diagnostic()
            .context(format!("reading {}", path.display()))?;

        info!("loaded {} names from {}", dictionary.len(), path.display());
        Ok(dictionary)
    }

    fn unpack_file(&self, path: &Path, resolver: &impl HashResolver) -> Result<PathBuf> {
        let f = File::open(path)
            .into_diagnostic()
            .context(format!("path: {}", path.display()))?;
        let options = DecodeOptions::builder()
            .force_borders(self.force_borders)
            .build();
        let txb = Container::read(f, options).context(format!("decoding {}", path.display()))?;

        let target = output_path(path, "txt");
        info!("writing {} entries to {}", txb.len(), target.display());

        create_output(&target, self.overwrite)?
            .write_all(render(&txb, resolver).as_bytes())
            .into_diagnostic()
            .context(format!("writing {}", target.display()))?;

        Ok(target)
    }

    pub fn handle(&self) -> Result<()> {
        let dictionary = self.load_dictionary()?;
        let files = collect_inputs(&self.paths, "txb");
        if files.is_empty() {
            return Err(miette!("no .txb files found"));
        }

        let mut failed = 0;
        for path in &files {
            let result = if self.suffix_fallback {
                self.unpack_file(path, &SuffixResolver::new(&dictionary))
            } else {
                self.unpack_file(path, &dictionary)
            };

            if let Err(e) = result {
                error!("{e:?}");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(miette!("{failed} of {} files failed to unpack", files.len()));
        }

        Ok(())
    }
}
