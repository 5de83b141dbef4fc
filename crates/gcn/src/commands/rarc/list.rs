use std::path::PathBuf;

use clap::Args;
use gcn_rarc::{read::Entry, types::StorageTier, RarcArchive};
use itertools::Itertools;
use miette::{Context, Result};
use owo_colors::OwoColorize;

#[derive(Args)]
pub struct ListArgs {
    /// An input RARC archive, optionally Yay0 or Yaz0 compressed
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

fn describe(entry: &Entry) -> String {
    let tier = match entry.tier() {
        Some(StorageTier::Memory) => "mram",
        Some(StorageTier::Aram) => "aram",
        Some(StorageTier::Dvd) => "dvd",
        None => "-",
    };

    [
        Some(tier),
        entry.compression().extension(),
    ]
    .into_iter()
    .flatten()
    .join(",")
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let archive = RarcArchive::open(&self.file)
            .context(format!("opening {}", &self.file.display()))?;

        println!(
            "{} ({} nodes, {} entries, {:?} header)",
            archive.name().bold(),
            archive.nodes().len(),
            archive.len(),
            archive.layout()
        );

        for (path, entry) in archive.files() {
            println!(
                "{:>10} {:<10} {}/{}",
                entry.size(),
                describe(entry).dimmed(),
                archive.root().name.blue(),
                path
            );
        }

        Ok(())
    }
}
