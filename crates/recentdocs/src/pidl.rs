//! Shell item id lists (PIDLs).
//!
//! A PIDL is a sequence of shell items, each prefixed with its own size as a
//! little-endian `u16`, ended by a zero-sized item. Recent-document values
//! start with a 20-byte root folder item, which is what the structure check
//! looks for.
//!
//! [`BuiltinPidlResolver`] walks the common My Computer → volume → file entry
//! chain without the shell, so lists can be decoded offline.

use std::fmt;
use std::path::PathBuf;

use tracing::trace;

use crate::error::{Error, Result};

/// Declared size of the leading root folder item of a well-formed list.
pub const ROOT_ITEM_SIZE: u8 = 20;

/// `{20D04FE0-3AEA-1069-A2D8-08002B30309D}` in on-disk byte order.
const MY_COMPUTER_CLSID: [u8; 16] = [
    0xE0, 0x4F, 0xD0, 0x20, 0xEA, 0x3A, 0x69, 0x10, 0xA2, 0xD8, 0x08, 0x00, 0x2B, 0x30, 0x30,
    0x9D,
];

/// Signature of the file entry extension block carrying the long name.
const FILE_ENTRY_EXTENSION: u32 = 0xBEEF_0004;

/// Offset of the primary name inside a file entry item.
const PRIMARY_NAME_OFFSET: usize = 14;

/// Structure size declared by the first byte of `data`.
#[must_use]
pub fn declared_size(data: &[u8]) -> Option<u8> {
    data.first().copied()
}

/// The cheap integrity check applied to every recent entry.
///
/// Only the first byte is inspected: a list whose first item claims 20 bytes
/// but is malformed further on still passes.
#[must_use]
pub fn has_valid_structure(data: &[u8]) -> bool {
    declared_size(data) == Some(ROOT_ITEM_SIZE)
}

/// Broad category of a shell item, from its class type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Root folder identified by a CLSID (My Computer, Network, ...).
    RootFolder,
    /// Drive letter.
    Volume,
    /// File or directory.
    FileEntry,
    /// Anything this parser does not interpret.
    Other(u8),
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootFolder => write!(f, "root folder"),
            Self::Volume => write!(f, "volume"),
            Self::FileEntry => write!(f, "file entry"),
            Self::Other(class) => write!(f, "unknown (0x{class:02X})"),
        }
    }
}

/// One item of an id list, borrowed from the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellItem<'a> {
    /// Offset of the item within the list.
    pub offset: usize,
    /// The item bytes, size prefix included.
    pub data: &'a [u8],
}

impl ShellItem<'_> {
    /// Size of the item in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The class type byte, if the item has one.
    #[must_use]
    pub fn class_type(&self) -> Option<u8> {
        self.data.get(2).copied()
    }

    /// Category of this item.
    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self.class_type() {
            Some(0x1F) => ItemKind::RootFolder,
            Some(class) if class & 0x70 == 0x20 => ItemKind::Volume,
            Some(class) if class & 0x70 == 0x30 => ItemKind::FileEntry,
            Some(class) => ItemKind::Other(class),
            None => ItemKind::Other(0),
        }
    }
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Split an id list into its items.
///
/// Stops at the zero-sized terminator (or the end of the buffer if the
/// terminator is missing); trailing bytes are ignored.
///
/// # Errors
///
/// Returns an error if an item declares fewer than two bytes or runs past the
/// end of the buffer.
pub fn items(data: &[u8]) -> Result<Vec<ShellItem<'_>>> {
    let mut items = Vec::new();
    let mut offset = 0;
    while let Some(size) = read_u16(data, offset) {
        let size = usize::from(size);
        if size == 0 {
            break;
        }
        if size < 2 || offset + size > data.len() {
            return Err(Error::pidl(format!(
                "item at offset {offset} declares {size} bytes, {} available",
                data.len() - offset
            )));
        }
        items.push(ShellItem {
            offset,
            data: &data[offset..offset + size],
        });
        offset += size;
    }
    Ok(items)
}

fn format_clsid(bytes: &[u8]) -> String {
    match (read_u32(bytes, 0), read_u16(bytes, 4), read_u16(bytes, 6)) {
        (Some(d1), Some(d2), Some(d3)) if bytes.len() >= 16 => {
            let tail: String = bytes[8..16].iter().map(|b| format!("{b:02X}")).collect();
            format!("{{{d1:08X}-{d2:04X}-{d3:04X}-{}-{}}}", &tail[..4], &tail[4..])
        }
        _ => "<truncated>".to_string(),
    }
}

fn ascii_name(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).into_owned()
}

fn utf16_name(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

fn volume_name(item: &ShellItem<'_>) -> Result<String> {
    let mut name = ascii_name(item.data.get(3..).unwrap_or_default());
    if name.is_empty() {
        return Err(Error::pidl(format!(
            "volume item at offset {} has no drive name",
            item.offset
        )));
    }
    if !name.ends_with('\\') {
        name.push('\\');
    }
    Ok(name)
}

/// Long name from the `0xBEEF0004` extension block, when present.
fn long_name(data: &[u8]) -> Option<String> {
    let ext = usize::from(read_u16(data, data.len().checked_sub(2)?)?);
    if ext < PRIMARY_NAME_OFFSET || read_u32(data, ext + 4)? != FILE_ENTRY_EXTENSION {
        return None;
    }
    let ext_size = usize::from(read_u16(data, ext)?);
    let version = read_u16(data, ext + 2)?;
    let name_offset = match version {
        0..=2 => return None,
        3..=6 => 20,
        7 => 38,
        8 => 42,
        _ => 46,
    };
    let end = (ext + ext_size).min(data.len());
    let name = utf16_name(data.get(ext + name_offset..end)?);
    (!name.is_empty()).then_some(name)
}

fn file_entry_name(item: &ShellItem<'_>) -> Result<String> {
    if let Some(name) = long_name(item.data) {
        return Ok(name);
    }
    let unicode = item.class_type().is_some_and(|class| class & 0x04 != 0);
    let raw = item.data.get(PRIMARY_NAME_OFFSET..).unwrap_or_default();
    let name = if unicode {
        utf16_name(raw)
    } else {
        ascii_name(raw)
    };
    if name.is_empty() {
        return Err(Error::pidl(format!(
            "file entry at offset {} has no name",
            item.offset
        )));
    }
    Ok(name)
}

/// Decode an id list rooted at My Computer into a path, without the shell.
///
/// # Errors
///
/// Returns an error if the list is malformed, is rooted somewhere other than
/// My Computer, or contains items this parser does not understand.
pub fn decode_path(data: &[u8]) -> Result<String> {
    let mut path = String::new();
    for item in items(data)? {
        match item.kind() {
            ItemKind::RootFolder => {
                let clsid = item.data.get(4..20).unwrap_or_default();
                if clsid != MY_COMPUTER_CLSID {
                    return Err(Error::pidl(format!(
                        "unsupported root folder {}",
                        format_clsid(clsid)
                    )));
                }
            }
            ItemKind::Volume => path = volume_name(&item)?,
            ItemKind::FileEntry => {
                if path.is_empty() {
                    return Err(Error::pidl("file entry before any volume"));
                }
                if !path.ends_with('\\') {
                    path.push('\\');
                }
                path.push_str(&file_entry_name(&item)?);
            }
            ItemKind::Other(class) => {
                return Err(Error::pidl(format!(
                    "unsupported item type 0x{class:02X} at offset {}",
                    item.offset
                )));
            }
        }
    }
    if path.is_empty() {
        return Err(Error::pidl("id list does not name a filesystem path"));
    }
    trace!(path = %path, "Decoded id list");
    Ok(path)
}

/// Parse hex text into bytes.
///
/// Accepts plain hex (`14001f50`), `.reg` export style (`hex:14,00,1f,50`)
/// and whitespace or colon separated bytes.
///
/// # Errors
///
/// Returns an error on non-hex characters or an odd number of digits.
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let body = input.trim();
    let body = body.strip_prefix("hex:").unwrap_or(body);
    let body = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
        .unwrap_or(body);
    let digits: Vec<u8> = body
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && !matches!(b, b',' | b':' | b'\\'))
        .collect();

    if digits.len() % 2 != 0 {
        return Err(Error::InvalidHex {
            message: format!("odd number of hex digits ({})", digits.len()),
        });
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).map_err(|_| Error::InvalidHex {
                message: "non-ASCII input".to_string(),
            })?;
            u8::from_str_radix(text, 16).map_err(|_| Error::InvalidHex {
                message: format!("'{text}' is not a hex byte"),
            })
        })
        .collect()
}

/// Turns a validated id list into an absolute filesystem path.
pub trait PidlPathResolver: fmt::Debug {
    /// Resolve the raw list bytes to a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the list does not name a filesystem object.
    fn resolve_path(&self, data: &[u8]) -> Result<PathBuf>;
}

/// Pure-Rust resolver built on [`decode_path`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPidlResolver;

impl PidlPathResolver for BuiltinPidlResolver {
    fn resolve_path(&self, data: &[u8]) -> Result<PathBuf> {
        decode_path(data).map(PathBuf::from)
    }
}

/// Builders for synthetic id lists, shared by the crate's tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::MY_COMPUTER_CLSID;

    fn sized(mut body: Vec<u8>) -> Vec<u8> {
        let size = u16::try_from(body.len() + 2).unwrap();
        let mut item = size.to_le_bytes().to_vec();
        item.append(&mut body);
        item
    }

    pub fn root_item() -> Vec<u8> {
        let mut body = vec![0x1F, 0x50];
        body.extend_from_slice(&MY_COMPUTER_CLSID);
        sized(body)
    }

    pub fn volume_item(drive: &str) -> Vec<u8> {
        let mut body = vec![0x2F];
        body.extend_from_slice(drive.as_bytes());
        body.resize(23, 0);
        sized(body)
    }

    /// File entry with a short primary name and a version 9 extension block
    /// carrying `long_name`.
    pub fn file_item(short_name: &str, long_name: &str, directory: bool) -> Vec<u8> {
        let mut body = vec![if directory { 0x31 } else { 0x32 }, 0x00];
        body.extend_from_slice(&1024u32.to_le_bytes());
        body.extend_from_slice(&[0; 4]); // modification time
        body.extend_from_slice(&[0x20, 0x00]); // attributes
        body.extend_from_slice(short_name.as_bytes());
        body.push(0);
        if (body.len() + 2) % 2 != 0 {
            body.push(0);
        }

        let ext_offset = u16::try_from(body.len() + 2).unwrap();
        let mut ext = Vec::new();
        ext.extend_from_slice(&9u16.to_le_bytes());
        ext.extend_from_slice(&0xBEEF_0004u32.to_le_bytes());
        ext.resize(46 - 2, 0);
        for unit in long_name.encode_utf16() {
            ext.extend_from_slice(&unit.to_le_bytes());
        }
        ext.extend_from_slice(&[0, 0]);
        // Size prefix plus the trailing offset that closes the block.
        let ext_size = u16::try_from(ext.len() + 4).unwrap();

        body.extend_from_slice(&ext_size.to_le_bytes());
        body.extend_from_slice(&ext);
        body.extend_from_slice(&ext_offset.to_le_bytes());
        sized(body)
    }

    /// My Computer → `drive` → each name in `parts`, terminated.
    pub fn id_list(drive: &str, parts: &[&str]) -> Vec<u8> {
        let mut list = root_item();
        list.extend(volume_item(drive));
        for (i, part) in parts.iter().enumerate() {
            let short: String = part.chars().take(8).collect::<String>().to_uppercase();
            list.extend(file_item(&short, part, i + 1 < parts.len()));
        }
        list.extend_from_slice(&[0, 0]);
        list
    }
}
