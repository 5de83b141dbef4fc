pub mod codec;
pub mod rarc;

use gcn_compression::CompressionKind;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle RARC archives
    Rarc {
        #[command(subcommand)]
        command: rarc::RarcCommands,
    },
    /// Handle Yaz0 (SZS) compressed files
    Yaz0 {
        #[command(subcommand)]
        command: codec::CodecCommands,
    },
    /// Handle Yay0 (SZP) compressed files
    Yay0 {
        #[command(subcommand)]
        command: codec::CodecCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Rarc { command } => command.handle(),
            Commands::Yaz0 { command } => command.handle(CompressionKind::Yaz0),
            Commands::Yay0 { command } => command.handle(CompressionKind::Yay0),
        }
    }
}
