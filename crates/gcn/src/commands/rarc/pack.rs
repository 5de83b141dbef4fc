use std::path::PathBuf;

use clap::{Args, ValueEnum};
use gcn_compression::CompressionKind;
use gcn_rarc::{
    write::{build, output_path},
    RarcWriterOptions, TierPolicy,
};
use miette::{miette, Context, Result};
use tracing::info;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Tier {
    /// Load every file to main memory
    #[default]
    Memory,
    /// Load every file to ARAM
    Aram,
    /// Read every file from the disc
    Dvd,
    /// Compressed files to ARAM, the rest from the disc
    Auto,
}

impl From<Tier> for TierPolicy {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Memory => TierPolicy::Memory,
            Tier::Aram => TierPolicy::Aram,
            Tier::Dvd => TierPolicy::Dvd,
            Tier::Auto => TierPolicy::Auto,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Compression {
    /// No archive compression, written as `.arc`
    #[default]
    None,
    /// Yay0, written as `.arc.szp`
    Yay0,
    /// Yaz0, written as `.arc.szs`
    Yaz0,
}

impl From<Compression> for CompressionKind {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::None => CompressionKind::None,
            Compression::Yay0 => CompressionKind::Yay0,
            Compression::Yaz0 => CompressionKind::Yaz0,
        }
    }
}

#[derive(Args)]
pub struct PackArgs {
    /// An input directory, the archive is written next to it
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Storage tier of the packed files
    #[arg(short, long, value_enum, default_value_t = Tier::Memory)]
    tier: Tier,

    /// Compression of the whole archive
    #[arg(short, long, value_enum, default_value_t = Compression::None)]
    compression: Compression,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        let target = output_path(&self.directory, self.compression.into())
            .context(format!("resolving {}", &self.directory.display()))?;
        if target.exists() && !self.overwrite {
            return Err(miette!(
                help = "pass --overwrite to replace it",
                "{} already exists",
                target.display()
            ));
        }

        let options = RarcWriterOptions::builder()
            .tier_policy(self.tier.into())
            .compression(self.compression.into())
            .build();

        let written = build(&self.directory, options)
            .context(format!("packing {}", &self.directory.display()))?;
        info!("created {}", written.display());

        Ok(())
    }
}
