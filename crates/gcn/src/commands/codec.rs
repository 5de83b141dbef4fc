use std::path::{Path, PathBuf};

use clap::Args;
use gcn_compression::{yay0, yaz0, CompressionKind};
use miette::{miette, Context, IntoDiagnostic, Result};
use tracing::info;

#[derive(clap::Subcommand)]
pub enum CodecCommands {
    /// Compress a file
    Compress(CodecArgs),
    /// Decompress a file
    Decompress(CodecArgs),
}

#[derive(Args)]
pub struct CodecArgs {
    /// An input file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target file, derived from the input's name when omitted
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl CodecCommands {
    pub fn handle(&self, kind: CompressionKind) -> Result<()> {
        match self {
            CodecCommands::Compress(args) => args.compress(kind),
            CodecCommands::Decompress(args) => args.decompress(kind),
        }
    }
}

/// `model.bin` becomes `model.bin.szs`
fn compressed_name(path: &Path, kind: CompressionKind) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    if let Some(extension) = kind.extension() {
        name.push(".");
        name.push(extension);
    }
    PathBuf::from(name)
}

/// `model.bin.szs` becomes `model.bin`, anything else gets `.out` appended
fn decompressed_name(path: &Path, kind: CompressionKind) -> PathBuf {
    match path.extension() {
        Some(extension) if kind.extension().is_some_and(|wanted| extension == wanted) => {
            path.with_extension("")
        }
        _ => {
            let mut name = path.as_os_str().to_owned();
            name.push(".out");
            PathBuf::from(name)
        }
    }
}

impl CodecArgs {
    fn read(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("reading {}", &self.file.display()))
    }

    fn write(&self, target: &Path, data: &[u8]) -> Result<()> {
        if target.exists() && !self.overwrite {
            return Err(miette!(
                help = "pass --overwrite to replace it",
                "{} already exists",
                target.display()
            ));
        }

        std::fs::write(target, data)
            .into_diagnostic()
            .context(format!("writing {}", target.display()))
    }

    fn compress(&self, kind: CompressionKind) -> Result<()> {
        let data = self.read()?;
        let compressed = match kind {
            CompressionKind::Yay0 => yay0::compress(&data)?,
            CompressionKind::Yaz0 => yaz0::compress(&data)?,
            CompressionKind::None => data.clone(),
        };

        let target = self
            .output
            .clone()
            .unwrap_or_else(|| compressed_name(&self.file, kind));
        self.write(&target, &compressed)?;
        info!(
            "compressed {} bytes to {} bytes in {}",
            data.len(),
            compressed.len(),
            target.display()
        );

        Ok(())
    }

    fn decompress(&self, kind: CompressionKind) -> Result<()> {
        let data = self.read()?;
        let decompressed = match kind {
            CompressionKind::Yay0 => yay0::decompress(&data)?,
            CompressionKind::Yaz0 => yaz0::decompress(&data)?,
            CompressionKind::None => data.clone(),
        };

        let target = self
            .output
            .clone()
            .unwrap_or_else(|| decompressed_name(&self.file, kind));
        self.write(&target, &decompressed)?;
        info!(
            "decompressed {} bytes to {} bytes in {}",
            data.len(),
            decompressed.len(),
            target.display()
        );

        Ok(())
    }
}
