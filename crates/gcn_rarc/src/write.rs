//! Types for writing RARC archives
//!

use std::{
    borrow::Cow,
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use binrw::BinWrite;
use bon::Builder;
use encoding_rs::SHIFT_JIS;
use gcn_compression::CompressionKind;
use indexmap::IndexMap;
use tracing::{debug, info, instrument, trace, warn};
use walkdir::WalkDir;

use crate::{
    error::{Error, Result},
    types::{
        EntryFlags, RarcEntry, RarcHeader, RarcNode, StorageTier, DIRECTORY_DATA_SIZE,
        DIRECTORY_ID, ENTRY_SIZE, HEADER_BLOCK_SIZE, HEADER_SIZE, NODE_SIZE, NO_PARENT,
    },
    util::{align, name_hash, node_kind, pad_to, path_component, BLOCK_ALIGNMENT},
};

/// Where the files of a new archive are meant to be loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TierPolicy {
    /// Every file goes to main memory
    #[default]
    Memory,

    /// Every file goes to auxiliary memory
    Aram,

    /// Every file is read from the disc on demand
    Dvd,

    /// Compressed files go to auxiliary memory, the rest stays on the disc
    Auto,
}

impl TierPolicy {
    fn tier(self, compressed: bool) -> StorageTier {
        match self {
            TierPolicy::Memory => StorageTier::Memory,
            TierPolicy::Aram => StorageTier::Aram,
            TierPolicy::Dvd => StorageTier::Dvd,
            TierPolicy::Auto if compressed => StorageTier::Aram,
            TierPolicy::Auto => StorageTier::Dvd,
        }
    }
}

/// Options for how the RARC archive should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct RarcWriterOptions {
    /// Storage tier of the files
    #[builder(default)]
    pub tier_policy: TierPolicy,

    /// Compression wrapped around the finished archive
    #[builder(default)]
    pub compression: CompressionKind,
}

/// A file to be stored in an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Name of the file
    pub name: String,
    /// Contents of the file
    pub data: Vec<u8>,
}

/// A directory tree to be stored in an archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDirectory {
    /// Name of the directory, the root's name becomes the archive name
    pub name: String,
    /// Files directly in this directory
    pub files: Vec<SourceFile>,
    /// Subdirectories
    pub directories: Vec<SourceDirectory>,
}

impl SourceDirectory {
    /// An empty directory
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a file
    pub fn with_file(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.files.push(SourceFile {
            name: name.into(),
            data: data.into(),
        });
        self
    }

    /// Add a subdirectory
    pub fn with_directory(mut self, directory: SourceDirectory) -> Self {
        self.directories.push(directory);
        self
    }

    /// Load a directory tree from disk, each level sorted by name
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn load(path: impl AsRef<Path>) -> Result<SourceDirectory> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(Error::NotADirectory(path.to_path_buf()));
        }

        let mut directory = SourceDirectory::new(directory_name(path)?);

        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_dir() {
                directory.directories.push(Self::load(entry.path())?);
            } else if entry.file_type().is_file() {
                let name = entry.file_name().to_string_lossy().into_owned();
                trace!(name = %name, "loading file");
                directory.files.push(SourceFile {
                    name,
                    data: fs::read(entry.path())?,
                });
            }
        }

        Ok(directory)
    }
}

/// RARC archive generator
///
/// ```
/// # fn doit() -> gcn_rarc::error::Result<()>
/// # {
/// use gcn_rarc::write::{RarcWriter, RarcWriterOptions, SourceDirectory, TierPolicy};
///
/// let root = SourceDirectory::new("scene")
///     .with_file("hello_world.txt", b"Hello, World!".to_vec())
///     .with_directory(SourceDirectory::new("timg"));
///
/// let archive = RarcWriter::new(
///     RarcWriterOptions::builder()
///         .tier_policy(TierPolicy::Auto)
///         .build(),
/// )
/// .write(&root)?;
///
/// assert!(archive.starts_with(b"RARC"));
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RarcWriter {
    options: RarcWriterOptions,
}

impl RarcWriter {
    /// Create a writer using `options`
    pub fn new(options: RarcWriterOptions) -> RarcWriter {
        RarcWriter { options }
    }

    /// Serialize `root` and everything below it into an archive
    #[instrument(skip_all, fields(root = %root.name), err)]
    pub fn write(&self, root: &SourceDirectory) -> Result<Vec<u8>> {
        let mut layout = Layout::new(self.options.tier_policy);

        let mut node = layout.node(root)?;
        node.kind = *b"ROOT";
        layout.nodes.push(node);
        layout.add_directory(root, 0, None)?;

        let archive = layout.finish()?;

        if let Cow::Owned(compressed) = gcn_compression::compress(self.options.compression, &archive)? {
            if compressed.len() < archive.len() {
                debug!(
                    compression = ?self.options.compression,
                    size = archive.len(),
                    compressed = compressed.len(),
                    "compressed archive"
                );
                return Ok(compressed);
            }
            warn!(compression = ?self.options.compression, "compression does not shrink the archive, storing it raw");
        }

        Ok(archive)
    }
}

/// Path [`build`] writes the archive for `source` to: `<dirname>.arc` next to
/// the directory, with `.szp` or `.szs` appended for archive compression.
pub fn output_path(source: impl AsRef<Path>, compression: CompressionKind) -> Result<PathBuf> {
    let source = source.as_ref().canonicalize()?;

    let mut file_name = format!("{}.arc", directory_name(&source)?);
    if let Some(extension) = compression.extension() {
        file_name.push('.');
        file_name.push_str(extension);
    }

    Ok(source.parent().unwrap_or(&source).join(file_name))
}

/// Create an archive from the directory `source` at [`output_path`].
///
/// Returns the path of the written archive.
#[instrument(skip_all, fields(source = %source.as_ref().display()), err)]
pub fn build(source: impl AsRef<Path>, options: RarcWriterOptions) -> Result<PathBuf> {
    let source = source.as_ref();
    if !source.is_dir() {
        return Err(Error::NotADirectory(source.to_path_buf()));
    }

    let root = SourceDirectory::load(source)?;
    let archive = RarcWriter::new(options).write(&root)?;

    let output = output_path(source, options.compression)?;
    fs::write(&output, &archive)?;
    info!(path = %output.display(), size = archive.len(), "wrote archive");

    Ok(output)
}

fn directory_name(path: &Path) -> Result<String> {
    path.canonicalize()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::UnsafeName(path.display().to_string()))
}

fn encode_name(name: &str) -> Cow<'_, [u8]> {
    let (encoded, _, unmappable) = SHIFT_JIS.encode(name);
    if unmappable {
        warn!(name, "name has characters without a Shift-JIS mapping");
    }
    encoded
}

fn to_u32(value: usize, what: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::TooLarge(what))
}

#[derive(Debug, Default)]
struct StringTable {
    data: Vec<u8>,
    offsets: IndexMap<Vec<u8>, u32>,
}

impl StringTable {
    fn insert(&mut self, name: &[u8]) -> Result<u32> {
        if let Some(&offset) = self.offsets.get(name) {
            return Ok(offset);
        }

        let offset = self.data.len();
        if offset > 0xFF_FFFF {
            return Err(Error::TooLarge("string table"));
        }

        self.data.extend_from_slice(name);
        self.data.push(0);
        self.offsets.insert(name.to_vec(), offset as u32);

        Ok(offset as u32)
    }
}

#[derive(Debug)]
struct Payload<'a> {
    entry: usize,
    data: Cow<'a, [u8]>,
    compressed: bool,
}

#[derive(Debug)]
struct Layout<'a> {
    policy: TierPolicy,
    strings: StringTable,
    nodes: Vec<RarcNode>,
    entries: Vec<RarcEntry>,
    payloads: Vec<Payload<'a>>,
}

impl<'a> Layout<'a> {
    fn new(policy: TierPolicy) -> Self {
        let mut strings = StringTable::default();
        // `.` and `..` always lead the table
        strings.data.extend_from_slice(b".\0..\0");
        strings.offsets.insert(b".".to_vec(), 0);
        strings.offsets.insert(b"..".to_vec(), 2);

        Self {
            policy,
            strings,
            nodes: Vec::new(),
            entries: Vec::new(),
            payloads: Vec::new(),
        }
    }

    fn node(&mut self, directory: &SourceDirectory) -> Result<RarcNode> {
        let name = encode_name(path_component(&directory.name)?);

        Ok(RarcNode {
            kind: node_kind(&directory.name),
            name_offset: self.strings.insert(&name)?,
            name_hash: name_hash(&name),
            ..Default::default()
        })
    }

    fn link(&mut self, name: &str, target: u32) -> Result<usize> {
        let encoded = encode_name(name);
        self.entries.push(RarcEntry {
            id: DIRECTORY_ID,
            name_hash: name_hash(&encoded),
            flags: EntryFlags::DIRECTORY,
            name_offset: self.strings.insert(&encoded)?,
            data_offset: target,
            data_size: DIRECTORY_DATA_SIZE,
            reserved: 0,
        });

        Ok(self.entries.len() - 1)
    }

    fn add_directory(
        &mut self,
        directory: &'a SourceDirectory,
        index: usize,
        parent: Option<usize>,
    ) -> Result<()> {
        let entry_count = directory.files.len() + directory.directories.len() + 2;
        self.nodes[index].first_entry = to_u32(self.entries.len(), "entry table")?;
        self.nodes[index].entry_count =
            u16::try_from(entry_count).map_err(|_| Error::TooLarge("entries in one directory"))?;

        for file in &directory.files {
            self.add_file(file)?;
        }

        let mut links = Vec::with_capacity(directory.directories.len());
        for child in &directory.directories {
            links.push(self.link(&child.name, 0)?);
        }

        self.link(".", index as u32)?;
        self.link("..", parent.map_or(NO_PARENT, |parent| parent as u32))?;

        for (child, link) in directory.directories.iter().zip(links) {
            let node = self.node(child)?;
            let child_index = self.nodes.len();
            self.nodes.push(node);
            self.entries[link].data_offset = to_u32(child_index, "node table")?;
            self.add_directory(child, child_index, Some(index))?;
        }

        Ok(())
    }

    fn add_file(&mut self, file: &'a SourceFile) -> Result<()> {
        path_component(&file.name)?;
        let index = self.entries.len();
        let id = u16::try_from(index)
            .ok()
            .filter(|&id| id != DIRECTORY_ID)
            .ok_or(Error::TooLarge("file ids"))?;

        let (data, compression) = prepare_payload(file)?;
        let compressed = compression != CompressionKind::None;

        let mut flags = EntryFlags::FILE | self.policy.tier(compressed).into();
        if compressed {
            flags = flags | EntryFlags::COMPRESSED;
        }
        if compression == CompressionKind::Yaz0 {
            flags = flags | EntryFlags::YAZ0;
        }

        let name = encode_name(&file.name);
        self.entries.push(RarcEntry {
            id,
            name_hash: name_hash(&name),
            flags,
            name_offset: self.strings.insert(&name)?,
            data_offset: 0,
            data_size: to_u32(data.len(), "file size")?,
            reserved: 0,
        });
        self.payloads.push(Payload {
            entry: index,
            data,
            compressed,
        });

        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        // Compressed payloads first so the fast tier is one leading run
        let mut order = (0..self.payloads.len()).collect::<Vec<_>>();
        order.sort_by_key(|&i| !self.payloads[i].compressed);

        let mut data = Vec::new();
        let mut compressed_size = 0;
        for i in order {
            let payload = &self.payloads[i];
            self.entries[payload.entry].data_offset = to_u32(data.len(), "payload region")?;
            data.extend_from_slice(&payload.data);
            pad_to(&mut data, BLOCK_ALIGNMENT);
            if payload.compressed {
                compressed_size = data.len();
            }
        }

        let fast_tier_size = match self.policy {
            TierPolicy::Aram => data.len(),
            _ => compressed_size,
        };

        let node_table_size = align(self.nodes.len(), 2) * NODE_SIZE;
        let entry_table_size = align(self.entries.len() * ENTRY_SIZE, BLOCK_ALIGNMENT);
        let string_table_size = align(self.strings.data.len(), BLOCK_ALIGNMENT);

        let node_offset = HEADER_SIZE - HEADER_BLOCK_SIZE as usize;
        let entry_offset = node_offset + node_table_size;
        let string_table_offset = entry_offset + entry_table_size;
        let data_offset = string_table_offset + string_table_size;
        let file_size = HEADER_BLOCK_SIZE as usize + data_offset + data.len();

        let header = RarcHeader {
            file_size: to_u32(file_size, "archive size")?,
            header_size: HEADER_BLOCK_SIZE,
            data_offset: to_u32(data_offset, "archive tables")?,
            data_size: to_u32(data.len(), "payload region")?,
            fast_tier_size: to_u32(fast_tier_size, "payload region")?,
            node_count: to_u32(self.nodes.len(), "node table")?,
            node_offset: node_offset as u32,
            entry_count: to_u32(self.entries.len(), "entry table")?,
            entry_offset: to_u32(entry_offset, "archive tables")?,
            string_table_size: to_u32(string_table_size, "string table")?,
            string_table_offset: to_u32(string_table_offset, "archive tables")?,
            secondary_entry_count: u16::try_from(self.entries.len())
                .map_err(|_| Error::TooLarge("entry table"))?,
            synced_ids: 1,
            ..Default::default()
        };

        debug!(
            nodes = self.nodes.len(),
            entries = self.entries.len(),
            strings = self.strings.data.len(),
            payload = data.len(),
            fast_tier_size,
            "laid out archive"
        );

        let mut writer = Cursor::new(Vec::with_capacity(file_size));
        header.write(&mut writer)?;
        for node in &self.nodes {
            node.write(&mut writer)?;
        }
        if self.nodes.len() % 2 == 1 {
            RarcNode::default().write(&mut writer)?;
        }
        for entry in &self.entries {
            entry.write(&mut writer)?;
        }

        let mut archive = writer.into_inner();
        pad_to(&mut archive, BLOCK_ALIGNMENT);
        archive.extend_from_slice(&self.strings.data);
        pad_to(&mut archive, BLOCK_ALIGNMENT);
        archive.extend_from_slice(&data);

        Ok(archive)
    }
}

/// Compress files named `*.szp` or `*.szs` that are not compressed yet,
/// keeping the result only if it is smaller.
fn prepare_payload(file: &SourceFile) -> Result<(Cow<'_, [u8]>, CompressionKind)> {
    let existing = CompressionKind::detect(&file.data);
    if existing != CompressionKind::None {
        return Ok((Cow::Borrowed(&file.data), existing));
    }

    let wanted = CompressionKind::from_file_name(&file.name);
    if wanted == CompressionKind::None {
        return Ok((Cow::Borrowed(&file.data), CompressionKind::None));
    }

    let compressed = gcn_compression::compress(wanted, &file.data)?;
    if compressed.len() < file.data.len() {
        trace!(name = %file.name, size = file.data.len(), compressed = compressed.len(), "compressed file");
        Ok((Cow::Owned(compressed.into_owned()), wanted))
    } else {
        debug!(name = %file.name, "compression does not shrink file, storing it raw");
        Ok((Cow::Borrowed(&file.data), CompressionKind::None))
    }
}
