//! Types for reading RARC archives
//!

use std::{
    borrow::Cow,
    fmt::{self, Debug},
    fs,
    io::Cursor,
    ops::Range,
    path::{Path, PathBuf},
};

use binrw::BinRead;
use encoding_rs::SHIFT_JIS;
use gcn_compression::{yay0, yaz0, ByteView, CompressionKind};
use tracing::{debug, instrument, trace, warn};

use crate::{
    error::{Error, FileNotFoundError, Result},
    types::{
        EntryFlags, HeaderLayout, RarcEntry, RarcHeader, RarcNode, StorageTier, DIRECTORY_ID,
        ENTRY_SIZE, HEADER_SIZE, NODE_SIZE, NO_PARENT,
    },
    util::path_component,
};

/// A directory of the archive
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Four character type tag
    pub kind: [u8; 4],
    /// Name of the directory
    pub name: Box<str>,
    /// Raw name as stored in the string table
    pub name_raw: Box<[u8]>,
    /// Hash of the name as stored in the archive
    pub name_hash: u16,
    /// Index of the first owned entry
    pub first_entry: usize,
    /// Number of owned entries, `.` and `..` included
    pub entry_count: usize,
}

impl Node {
    /// Range of the entry table owned by this node
    pub fn entries(&self) -> Range<usize> {
        self.first_entry..self.first_entry + self.entry_count
    }

    /// Type tag as text, trailing padding removed
    pub fn kind(&self) -> Cow<'_, str> {
        match String::from_utf8_lossy(&self.kind) {
            Cow::Borrowed(kind) => Cow::Borrowed(kind.trim_end()),
            Cow::Owned(kind) => Cow::Owned(kind.trim_end().to_owned()),
        }
    }
}

/// What an entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A file with its payload located in the archive buffer
    File {
        /// Absolute offset of the payload
        offset: usize,
        /// Size of the payload
        size: usize,
        /// The payload lies in the fast tier region at the start of the payloads
        in_fast_tier: bool,
    },

    /// A link to a node, `None` for the root's parent
    Directory {
        /// Index of the linked node
        node: Option<usize>,
    },
}

/// An entry of the archive
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// File id, `0xFFFF` for directory links
    pub id: u16,
    /// Name of the entry
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain a path separator or break out of the current directory
    /// (`..`). [`RarcArchive::extract`] rejects such names.
    pub name: Box<str>,
    /// Raw name as stored in the string table, Shift-JIS encoded
    pub name_raw: Box<[u8]>,
    /// Hash of the name as stored in the archive
    pub name_hash: u16,
    /// Type and storage flags
    pub flags: EntryFlags,
    /// File payload or directory link
    pub kind: EntryKind,
}

impl Entry {
    /// Whether this entry holds file data
    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File { .. })
    }

    /// Whether this entry links to a node
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    /// Whether this is one of the `.` and `..` links every node carries
    pub fn is_special(&self) -> bool {
        self.is_directory() && matches!(&*self.name, "." | "..")
    }

    /// Whether the flags mark the payload as compressed
    pub fn is_compressed(&self) -> bool {
        self.is_file() && self.flags.contains(EntryFlags::COMPRESSED)
    }

    /// Whether the payload is flagged as Yaz0 compressed
    pub fn is_yaz0(&self) -> bool {
        self.is_compressed() && self.flags.contains(EntryFlags::YAZ0)
    }

    /// Whether the payload is flagged as Yay0 compressed
    pub fn is_yay0(&self) -> bool {
        self.is_compressed() && !self.flags.contains(EntryFlags::YAZ0)
    }

    /// Compression announced by the flags
    pub fn compression(&self) -> CompressionKind {
        if self.is_yaz0() {
            CompressionKind::Yaz0
        } else if self.is_yay0() {
            CompressionKind::Yay0
        } else {
            CompressionKind::None
        }
    }

    /// Storage tier the game loads this entry to
    pub fn tier(&self) -> Option<StorageTier> {
        self.flags.tier()
    }

    /// Size of the stored payload, zero for directory links
    pub fn size(&self) -> usize {
        match self.kind {
            EntryKind::File { size, .. } => size,
            EntryKind::Directory { .. } => 0,
        }
    }

    /// Linked node for directory links
    pub fn node(&self) -> Option<usize> {
        match self.kind {
            EntryKind::Directory { node } => node,
            EntryKind::File { .. } => None,
        }
    }
}

/// RARC archive reader
///
/// The archive owns its (decompressed) buffer; nodes and entries are parsed
/// once and refer to it by index and range.
///
/// ```no_run
/// fn list_rarc_contents(path: &str) -> gcn_rarc::error::Result<()> {
///     let archive = gcn_rarc::RarcArchive::open(path)?;
///
///     for (path, entry) in archive.files() {
///         println!("{path}: {} bytes", entry.size());
///     }
///
///     Ok(())
/// }
/// ```
pub struct RarcArchive {
    name: String,
    compression: CompressionKind,
    data: Vec<u8>,
    header: RarcHeader,
    nodes: Vec<Node>,
    entries: Vec<Entry>,
}

impl Debug for RarcArchive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RarcArchive")
            .field("name", &self.name)
            .field("compression", &self.compression)
            .field("header", &self.header)
            .field("nodes", &self.nodes.len())
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl RarcArchive {
    /// Parse an archive, decompressing it first when it is wrapped in Yay0 or
    /// Yaz0.
    #[instrument(skip(data), fields(size = data.len()), err)]
    pub fn new(data: &[u8], name: &str) -> Result<RarcArchive> {
        let compression = CompressionKind::detect(data);
        let data = gcn_compression::decompress(data)?.into_owned();
        if compression != CompressionKind::None {
            debug!(?compression, size = data.len(), "decompressed archive");
        }

        Self::parse(data, name.to_owned(), compression)
    }

    /// Read and parse an archive from disk, named after its file name
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn open(path: impl AsRef<Path>) -> Result<RarcArchive> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::new(&fs::read(path)?, &name)
    }

    /// Name the archive was opened with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compression the archive was wrapped in
    pub fn compression(&self) -> CompressionKind {
        self.compression
    }

    /// Parsed header
    pub fn header(&self) -> &RarcHeader {
        &self.header
    }

    /// Generation of the header
    pub fn layout(&self) -> HeaderLayout {
        self.header.layout()
    }

    /// All nodes, the root first
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The flat entry table
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The root node
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Entries owned by `node`
    pub fn node_entries(&self, node: &Node) -> &[Entry] {
        &self.entries[node.entries()]
    }

    /// Number of entries in the archive
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by its index in the entry table
    pub fn by_index(&self, index: usize) -> Result<&Entry> {
        self.entries
            .get(index)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(index)))
    }

    /// Search for an entry by its `/` separated path below the root node
    pub fn by_path(&self, path: &str) -> Result<&Entry> {
        let not_found = || Error::FileNotFound(FileNotFoundError::Path(path.to_owned()));

        let mut components = path.split('/').filter(|c| !c.is_empty()).peekable();
        let mut node = 0;

        while let Some(component) = components.next() {
            let entry = self
                .node_entries(&self.nodes[node])
                .iter()
                .find(|entry| !entry.is_special() && &*entry.name == component)
                .ok_or_else(not_found)?;

            if components.peek().is_none() {
                return Ok(entry);
            }

            node = entry.node().ok_or_else(not_found)?;
        }

        Err(not_found())
    }

    /// Every file below the root with its `/` separated path, depth first
    pub fn files(&self) -> Vec<(String, &Entry)> {
        let mut files = Vec::new();
        let mut visited = vec![false; self.nodes.len()];
        let mut pending = vec![(0, String::new())];

        while let Some((index, prefix)) = pending.pop() {
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }

            let mut children = Vec::new();
            for entry in self.node_entries(&self.nodes[index]) {
                match entry.kind {
                    EntryKind::File { .. } => files.push((format!("{prefix}{}", entry.name), entry)),
                    EntryKind::Directory { node: Some(node) } if !entry.is_special() => {
                        children.push((node, format!("{prefix}{}/", entry.name)));
                    }
                    EntryKind::Directory { .. } => {}
                }
            }
            pending.extend(children.into_iter().rev());
        }

        files
    }

    /// Payload of a file entry, decompressed when requested and the entry
    /// is a compressed file in the fast tier carrying the flagged magic.
    pub fn entry_data(&self, entry: &Entry, decompress: bool) -> Result<Cow<'_, [u8]>> {
        let EntryKind::File {
            offset,
            size,
            in_fast_tier,
        } = entry.kind
        else {
            return Err(Error::NotAFile(entry.name.to_string()));
        };

        let data = region(&self.data, "file data", offset, size)?;
        if !decompress || !in_fast_tier {
            return Ok(Cow::Borrowed(data));
        }

        Ok(match entry.compression() {
            CompressionKind::Yay0 if yay0::is_yay0(data) => Cow::Owned(yay0::decompress(data)?),
            CompressionKind::Yaz0 if yaz0::is_yaz0(data) => Cow::Owned(yaz0::decompress(data)?),
            _ => Cow::Borrowed(data),
        })
    }

    /// Extract the archive below `root/<name>_dir`, one directory per node.
    ///
    /// `root` has to exist. Every name is checked and every payload decoded
    /// before the first directory is created, so a failure leaves nothing
    /// behind. Returns the directory the archive was extracted to.
    #[instrument(skip(self, root), fields(archive = %self.name, root = %root.as_ref().display()), err)]
    pub fn extract(&self, root: impl AsRef<Path>, decompress: bool) -> Result<PathBuf> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::NotADirectory(root.to_path_buf()));
        }

        let base = root.join(format!("{}_dir", self.name));
        let mut visited = vec![false; self.nodes.len()];
        let mut outputs = Vec::new();
        self.collect_node(0, &base, decompress, &mut visited, &mut outputs)?;

        for output in outputs {
            match output {
                Output::Directory(path) => {
                    fs::create_dir_all(&path)?;
                    trace!(path = %path.display(), "created directory");
                }
                Output::File(path, data) => {
                    debug!(path = %path.display(), size = data.len(), "writing file");
                    fs::write(path, data)?;
                }
            }
        }

        Ok(base)
    }

    fn collect_node<'a>(
        &'a self,
        index: usize,
        parent: &Path,
        decompress: bool,
        visited: &mut [bool],
        outputs: &mut Vec<Output<'a>>,
    ) -> Result<()> {
        if std::mem::replace(&mut visited[index], true) {
            warn!(node = index, "node is linked more than once, skipping");
            return Ok(());
        }

        let node = &self.nodes[index];
        let directory = parent.join(path_component(&node.name)?);
        outputs.push(Output::Directory(directory.clone()));

        for entry in self.node_entries(node) {
            match entry.kind {
                EntryKind::File { .. } => {
                    let path = directory.join(path_component(&entry.name)?);
                    outputs.push(Output::File(path, self.entry_data(entry, decompress)?));
                }
                EntryKind::Directory { node: Some(child) } if !entry.is_special() => {
                    self.collect_node(child, &directory, decompress, visited, outputs)?;
                }
                EntryKind::Directory { .. } => {}
            }
        }

        Ok(())
    }

    fn parse(data: Vec<u8>, name: String, compression: CompressionKind) -> Result<RarcArchive> {
        if data.len() < HEADER_SIZE || !data.starts_with(b"RARC") {
            return Err(Error::InvalidArchive);
        }

        let header = RarcHeader::read(&mut Cursor::new(&data))?;
        trace!(?header, "read header");

        if header.layout() == HeaderLayout::Extended
            && u32::from(header.secondary_entry_count) != header.entry_count & 0xFFFF
        {
            return Err(Error::EntryCountMismatch {
                entries: header.entry_count,
                secondary: header.secondary_entry_count,
            });
        }

        if header.node_count == 0 {
            return Err(Error::InvalidArchive);
        }

        let strings = region(
            &data,
            "string table",
            header.string_table_start(),
            header.string_table_size as usize,
        )?;

        let raw_nodes = Self::get_nodes(&data, &header)?;
        let raw_entries = Self::get_entries(&data, &header)?;

        let nodes = raw_nodes
            .into_iter()
            .map(|node| {
                let name_raw = name_at(strings, node.name_offset)?;
                let entries = node.first_entry as usize..node.first_entry as usize + node.entry_count as usize;
                if entries.end > raw_entries.len() {
                    return Err(Error::OutOfBounds {
                        region: "entry table",
                        offset: entries.start,
                        len: entries.len(),
                        size: raw_entries.len(),
                    });
                }

                Ok(Node {
                    kind: node.kind,
                    name: decode_name(name_raw),
                    name_raw: name_raw.into(),
                    name_hash: node.name_hash,
                    first_entry: entries.start,
                    entry_count: entries.len(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let entries = raw_entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| Self::resolve_entry(index, entry, &data, &header, strings, nodes.len()))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            nodes = nodes.len(),
            entries = entries.len(),
            layout = ?header.layout(),
            "parsed archive"
        );

        Ok(RarcArchive {
            name,
            compression,
            data,
            header,
            nodes,
            entries,
        })
    }

    fn get_nodes(data: &[u8], header: &RarcHeader) -> Result<Vec<RarcNode>> {
        let table = region(
            data,
            "node table",
            header.node_start(),
            (header.node_count as usize).saturating_mul(NODE_SIZE),
        )?;
        let mut reader = Cursor::new(table);

        (0..header.node_count)
            .map(|_| RarcNode::read(&mut reader).map_err(Error::from))
            .collect()
    }

    fn get_entries(data: &[u8], header: &RarcHeader) -> Result<Vec<RarcEntry>> {
        let table = region(
            data,
            "entry table",
            header.entry_start(),
            (header.entry_count as usize).saturating_mul(ENTRY_SIZE),
        )?;
        let mut reader = Cursor::new(table);

        (0..header.entry_count)
            .map(|_| RarcEntry::read(&mut reader).map_err(Error::from))
            .collect()
    }

    fn resolve_entry(
        index: usize,
        entry: RarcEntry,
        data: &[u8],
        header: &RarcHeader,
        strings: &[u8],
        node_count: usize,
    ) -> Result<Entry> {
        if entry.reserved != 0 {
            return Err(Error::ReservedNotZero(index));
        }

        let name_raw = name_at(strings, entry.name_offset)?;

        let kind = if entry.id == DIRECTORY_ID || entry.flags.contains(EntryFlags::DIRECTORY) {
            let node = match entry.data_offset {
                NO_PARENT => None,
                node if (node as usize) < node_count => Some(node as usize),
                node => {
                    return Err(Error::InvalidNodeIndex {
                        entry: index,
                        node,
                        count: node_count,
                    })
                }
            };
            EntryKind::Directory { node }
        } else {
            let offset = header.data_start().saturating_add(entry.data_offset as usize);
            region(data, "file data", offset, entry.data_size as usize)?;
            EntryKind::File {
                offset,
                size: entry.data_size as usize,
                in_fast_tier: entry.data_offset < header.fast_tier_size,
            }
        };

        Ok(Entry {
            id: entry.id,
            name: decode_name(name_raw),
            name_raw: name_raw.into(),
            name_hash: entry.name_hash,
            flags: entry.flags,
            kind,
        })
    }
}

/// Something `extract` will create once the whole archive has been checked
enum Output<'a> {
    Directory(PathBuf),
    File(PathBuf, Cow<'a, [u8]>),
}

fn region<'d>(data: &'d [u8], region: &'static str, offset: usize, len: usize) -> Result<&'d [u8]> {
    ByteView::new(data)
        .slice(offset, len)
        .map_err(|err| located(region, err))
}

fn name_at(strings: &[u8], offset: u32) -> Result<&[u8]> {
    ByteView::new(strings)
        .c_str_at(offset as usize)
        .map_err(|err| located("string table", err))
}

/// Attach the archive region to a bounds error raised by [`ByteView`]
fn located(region: &'static str, err: gcn_compression::error::Error) -> Error {
    match err {
        gcn_compression::error::Error::OutOfBounds { offset, len, size } => Error::OutOfBounds {
            region,
            offset,
            len,
            size,
        },
        err => err.into(),
    }
}

fn decode_name(raw: &[u8]) -> Box<str> {
    let (name, had_errors) = SHIFT_JIS.decode_without_bom_handling(raw);
    if had_errors {
        warn!(?raw, "name is not valid Shift-JIS");
    }
    name.into()
}

#[cfg(test)]
pub(crate) mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::{
        error::{Error, FileNotFoundError, Result},
        read::{name_at, region, EntryKind, RarcArchive},
        types::{EntryFlags, HeaderLayout, StorageTier},
    };

    /// Root "arc" holding "a.txt" with "hello", memory tier, nothing compressed
    #[rustfmt::skip]
    pub(crate) const SIMPLE_ARCHIVE: [u8; 0xE0] = [
        // Header
        0x52, 0x41, 0x52, 0x43, 0x00, 0x00, 0x00, 0xE0,
        0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00, 0xA0,
        0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x20,
        0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x40,
        0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00, 0x80,
        0x00, 0x03, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
        // Nodes, padded to an even count
        0x52, 0x4F, 0x4F, 0x54, 0x00, 0x00, 0x00, 0x05,
        0x05, 0x22, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // Entries: a.txt, ".", ".."
        0x00, 0x00, 0x29, 0x7B, 0x11, 0x00, 0x00, 0x09,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05,
        0x00, 0x00, 0x00, 0x00,
        0xFF, 0xFF, 0x00, 0x2E, 0x02, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
        0x00, 0x00, 0x00, 0x00,
        0xFF, 0xFF, 0x00, 0xB8, 0x02, 0x00, 0x00, 0x02,
        0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x10,
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        // Strings
        0x2E, 0x00, 0x2E, 0x2E, 0x00, 0x61, 0x72, 0x63,
        0x00, 0x61, 0x2E, 0x74, 0x78, 0x74, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // Data
        0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn read_invalid_magic() {
        let mut input = SIMPLE_ARCHIVE;
        input[0] = b'X';

        assert!(matches!(
            RarcArchive::new(&input, "arc"),
            Err(Error::InvalidArchive)
        ));
    }

    #[test]
    fn read_truncated_header() {
        assert!(matches!(
            RarcArchive::new(&SIMPLE_ARCHIVE[..0x20], "arc"),
            Err(Error::InvalidArchive)
        ));
    }

    #[traced_test]
    #[test]
    fn read_simple_archive() -> Result<()> {
        let archive = RarcArchive::new(&SIMPLE_ARCHIVE, "arc")?;

        assert_eq!(archive.layout(), HeaderLayout::Extended);
        assert_eq!(archive.nodes().len(), 1);
        assert_eq!(archive.len(), 3);

        let root = archive.root();
        assert_eq!(root.kind(), "ROOT");
        assert_eq!(&*root.name, "arc");
        assert_eq!(root.entries(), 0..3);

        let file = archive.by_index(0)?;
        assert_eq!(&*file.name, "a.txt");
        assert_eq!(file.flags, EntryFlags::FILE | EntryFlags::MEMORY);
        assert_eq!(file.tier(), Some(StorageTier::Memory));
        assert!(!file.is_compressed());
        assert_eq!(
            file.kind,
            EntryKind::File {
                offset: 0xC0,
                size: 5,
                in_fast_tier: false
            }
        );
        assert_eq!(archive.entry_data(file, true)?.as_ref(), b"hello");

        let this = archive.by_index(1)?;
        assert!(this.is_special());
        assert_eq!(this.node(), Some(0));

        let parent = archive.by_index(2)?;
        assert!(parent.is_special());
        assert_eq!(parent.kind, EntryKind::Directory { node: None });

        Ok(())
    }

    #[test]
    fn lookups() -> Result<()> {
        let archive = RarcArchive::new(&SIMPLE_ARCHIVE, "arc")?;

        assert_eq!(&*archive.by_path("a.txt")?.name, "a.txt");
        assert_eq!(&*archive.by_path("/a.txt")?.name, "a.txt");
        assert!(matches!(
            archive.by_path("b.txt"),
            Err(Error::FileNotFound(FileNotFoundError::Path(_)))
        ));
        assert!(matches!(
            archive.by_path("a.txt/deeper"),
            Err(Error::FileNotFound(_))
        ));
        assert!(matches!(
            archive.by_index(3),
            Err(Error::FileNotFound(FileNotFoundError::Index(3)))
        ));

        let files = archive.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "a.txt");

        Ok(())
    }

    #[test]
    fn payload_of_directory_fails() -> Result<()> {
        let archive = RarcArchive::new(&SIMPLE_ARCHIVE, "arc")?;

        assert!(matches!(
            archive.entry_data(archive.by_index(1)?, false),
            Err(Error::NotAFile(_))
        ));

        Ok(())
    }

    #[test]
    fn read_legacy_header() -> Result<()> {
        let mut input = SIMPLE_ARCHIVE;
        input[0x38] = 0;
        input[0x39] = 0;

        let archive = RarcArchive::new(&input, "arc")?;
        assert_eq!(archive.layout(), HeaderLayout::Legacy);

        Ok(())
    }

    #[test]
    fn read_entry_count_mismatch() {
        let mut input = SIMPLE_ARCHIVE;
        input[0x39] = 2;

        assert!(matches!(
            RarcArchive::new(&input, "arc"),
            Err(Error::EntryCountMismatch {
                entries: 3,
                secondary: 2
            })
        ));
    }

    #[test]
    fn read_invalid_node_link() {
        let mut input = SIMPLE_ARCHIVE;
        // "." of the root pointing at node 7
        input[0x74 + 0x0B] = 7;

        assert!(matches!(
            RarcArchive::new(&input, "arc"),
            Err(Error::InvalidNodeIndex {
                entry: 1,
                node: 7,
                count: 1
            })
        ));
    }

    #[test]
    fn read_payload_out_of_bounds() {
        let mut input = SIMPLE_ARCHIVE;
        // size of a.txt
        input[0x60 + 0x0E] = 0x01;

        assert!(matches!(
            RarcArchive::new(&input, "arc"),
            Err(Error::OutOfBounds {
                region: "file data",
                ..
            })
        ));
    }

    #[test]
    fn read_truncated_tables() {
        assert!(matches!(
            RarcArchive::new(&SIMPLE_ARCHIVE[..0x70], "arc"),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn read_reserved_not_zero() {
        let mut input = SIMPLE_ARCHIVE;
        input[0x60 + 0x13] = 1;

        assert!(matches!(
            RarcArchive::new(&input, "arc"),
            Err(Error::ReservedNotZero(0))
        ));
    }

    #[test]
    fn read_compressed_container() -> Result<()> {
        let compressed = gcn_compression::yaz0::compress(&SIMPLE_ARCHIVE)?;
        let archive = RarcArchive::new(&compressed, "arc")?;

        assert_eq!(
            archive.compression(),
            gcn_compression::CompressionKind::Yaz0
        );
        assert_eq!(
            archive.entry_data(archive.by_path("a.txt")?, false)?.as_ref(),
            b"hello"
        );

        Ok(())
    }

    #[test]
    fn extract_unsafe_name_leaves_nothing_behind() -> Result<()> {
        let mut input = SIMPLE_ARCHIVE;
        // "a.txt" becomes "a/txt"
        input[0xAA] = b'/';
        let archive = RarcArchive::new(&input, "arc")?;
        let root = tempfile::tempdir()?;

        assert!(matches!(
            archive.extract(root.path(), true),
            Err(Error::UnsafeName(name)) if name == "a/txt"
        ));
        assert!(!root.path().join("arc_dir").exists());

        Ok(())
    }

    #[test]
    fn names_outside_the_string_table_fail() {
        assert_eq!(name_at(b"a\0b", 2).ok(), Some(&b"b"[..]));
        assert!(matches!(
            name_at(b"a\0b", 3),
            Err(Error::OutOfBounds {
                region: "string table",
                offset: 3,
                len: 1,
                size: 3
            })
        ));
        assert!(matches!(
            region(b"abc", "file data", 2, 2),
            Err(Error::OutOfBounds {
                region: "file data",
                offset: 2,
                len: 2,
                size: 3
            })
        ));
    }

    #[test]
    fn extract_requires_existing_root() -> Result<()> {
        let archive = RarcArchive::new(&SIMPLE_ARCHIVE, "arc")?;

        assert!(matches!(
            archive.extract("/nonexistent/gcn_rarc/root", true),
            Err(Error::NotADirectory(_))
        ));

        Ok(())
    }
}
