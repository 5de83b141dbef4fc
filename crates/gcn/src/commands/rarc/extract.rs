use std::path::PathBuf;

use clap::Args;
use gcn_rarc::RarcArchive;
use miette::{miette, Context, Result};
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input RARC archive, optionally Yay0 or Yaz0 compressed
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory, the archive is extracted to `<archive>_dir` inside it
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// Keep compressed files as they are stored
    #[arg(long, default_value_t = false)]
    no_decompress: bool,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let archive = RarcArchive::open(&self.file)
            .context(format!("opening {}", &self.file.display()))?;

        let target = self.directory.join(format!("{}_dir", archive.name()));
        if target.exists() && !self.overwrite {
            return Err(miette!(
                help = "pass --overwrite to replace it",
                "{} already exists",
                target.display()
            ));
        }

        let extracted = archive
            .extract(&self.directory, !self.no_decompress)
            .context(format!("extracting to {}", &self.directory.display()))?;
        info!(
            "extracted {} files to {}",
            archive.files().len(),
            extracted.display()
        );

        Ok(())
    }
}
