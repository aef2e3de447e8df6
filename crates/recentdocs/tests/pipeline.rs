//! End-to-end tests of the decode pipeline with in-memory capabilities.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, TimeZone, Utc};
use recentdocs::pidl::parse_hex;
use recentdocs::{
    scan, Account, BuiltinPidlResolver, Error, FileStat, FileStatProvider, MetadataResolver,
    Owner, PidlPathResolver, RecentEntry, RecentEntryDecoder, RegistryReader, ReportOptions,
    Reporter, Resolution, Result, SecurityResolver, Sid, StdFileStat, FILE_DELETED,
};

const SID: &str = "S-1-5-21-3623811015-3361044348-30300820-1013";

/// My Computer root item.
const ROOT: &str = "14 00 1f 50 e0 4f d0 20 ea 3a 69 10 a2 d8 08 00 2b 30 30 9d";

fn item(body: &[u8]) -> Vec<u8> {
    let size = u16::try_from(body.len() + 2).unwrap();
    let mut item = size.to_le_bytes().to_vec();
    item.extend_from_slice(body);
    item
}

/// Id list of ASCII-named file entries under `drive`, no extension blocks.
fn id_list(drive: &str, names: &[&str]) -> Vec<u8> {
    let mut list = parse_hex(ROOT).unwrap();

    let mut volume = vec![0x2F];
    volume.extend_from_slice(drive.as_bytes());
    volume.resize(23, 0);
    list.extend(item(&volume));

    for (i, name) in names.iter().enumerate() {
        let class = if i + 1 < names.len() { 0x31 } else { 0x32 };
        let mut body = vec![class, 0];
        body.extend_from_slice(&[0; 10]);
        body.extend_from_slice(name.as_bytes());
        body.extend_from_slice(&[0, 0]);
        list.extend(item(&body));
    }
    list.extend_from_slice(&[0, 0]);
    list
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

#[derive(Debug, Default)]
struct Files(HashMap<PathBuf, FileStat>);

impl FileStatProvider for Files {
    fn stat(&self, path: &Path) -> Result<FileStat> {
        self.0.get(path).copied().ok_or_else(|| Error::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Every file is owned by [`SID`]; only that SID maps to an account when
/// `known` is set.
#[derive(Debug)]
struct Security {
    known: bool,
}

impl SecurityResolver for Security {
    fn owner_sid(&self, _path: &Path) -> Result<Sid> {
        Ok(Sid::new(SID))
    }

    fn lookup_account(&self, sid: &Sid) -> Result<Account> {
        if self.known && sid.as_str() == SID {
            Ok(Account {
                name: "X".to_string(),
                domain: "WORKSTATION".to_string(),
            })
        } else {
            Err(Error::account_lookup(sid.as_str(), "none mapped"))
        }
    }
}

/// Sends every list to one fixed path.
#[derive(Debug)]
struct FixedPath(PathBuf);

impl PidlPathResolver for FixedPath {
    fn resolve_path(&self, _data: &[u8]) -> Result<PathBuf> {
        Ok(self.0.clone())
    }
}

#[derive(Debug)]
struct Registry(Vec<RecentEntry>);

impl RegistryReader for Registry {
    fn read_entries(&self) -> Result<Vec<RecentEntry>> {
        Ok(self.0.clone())
    }
}

fn doc_stat() -> Files {
    let mut files = Files::default();
    files.0.insert(
        PathBuf::from(r"C:\Users\X\doc.txt"),
        FileStat {
            size: 1024,
            modified: at(2024, 1, 1),
            accessed: at(2024, 3, 1),
            created: at(2023, 6, 1),
        },
    );
    files
}

fn builtin_decoder(files: Files, known: bool) -> RecentEntryDecoder {
    RecentEntryDecoder::new(
        Box::new(BuiltinPidlResolver),
        MetadataResolver::new(Box::new(files), Box::new(Security { known })),
    )
}

fn report(decoder: &RecentEntryDecoder, entries: Vec<RecentEntry>) -> (scan::ScanSummary, String) {
    let registry = Registry(entries);
    let mut reporter = Reporter::new(Vec::new(), ReportOptions::default());
    let summary = scan::run(&registry, decoder, &mut reporter).unwrap();
    let text = String::from_utf8(reporter.into_inner().unwrap()).unwrap();
    (summary, text)
}

#[test]
fn test_existing_document_is_reported_with_metadata() {
    let decoder = builtin_decoder(doc_stat(), true);
    let entry = RecentEntry::new(r"txt\0", id_list(r"C:\", &["Users", "X", "doc.txt"]));

    let (summary, text) = report(&decoder, vec![entry]);

    assert_eq!(summary.resolved, 1);
    assert_eq!(
        text,
        "Value: txt\\0\n\
         \x20   File: C:\\Users\\X\\doc.txt\n\
         \x20   SID: S-1-5-21-3623811015-3361044348-30300820-1013\n\
         \x20   Owner: WORKSTATION\\X\n\
         \x20   File Size: 1024\n\
         \x20   Modified: 2024-01-01T00:00:00\n\
         \x20   Accessed: 2024-03-01T00:00:00\n\
         \x20   Created: 2023-06-01T00:00:00\n\
         \n"
    );
}

#[test]
fn test_wrong_first_byte_is_reported_invalid() {
    let decoder = builtin_decoder(doc_stat(), true);
    let mut data = id_list(r"C:\", &["Users", "X", "doc.txt"]);
    data[0] = 5;

    let (summary, text) = report(&decoder, vec![RecentEntry::new("0", data)]);

    assert_eq!(summary.invalid, 1);
    assert_eq!(text, "Value: 0\n    File: INVALID_FORMAT\n\n");
}

#[test]
fn test_removed_document_is_reported_deleted() {
    let decoder = builtin_decoder(Files::default(), true);
    let entry = RecentEntry::new("0", id_list(r"C:\", &["Users", "X", "doc.txt"]));

    let (summary, text) = report(&decoder, vec![entry]);

    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.failed, 0);
    assert!(text.contains(r"File: C:\Users\X\doc.txt"));
    assert!(text.contains(FILE_DELETED));
}

#[test]
fn test_unknown_owner_falls_back_to_sid() {
    let decoder = builtin_decoder(doc_stat(), false);
    let entry = RecentEntry::new("0", id_list(r"C:\", &["Users", "X", "doc.txt"]));

    let decoded = decoder.decode(&entry).unwrap();
    let meta = decoded.metadata().unwrap();
    assert_eq!(
        meta.owner,
        Owner::Unresolved {
            raw_sid: Sid::new(SID)
        }
    );
    assert!(meta
        .owner
        .to_string()
        .starts_with("No Matching User for SID: S-1-5-21-"));
}

#[test]
fn test_real_file_then_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    let mut file = File::create(&path).unwrap();
    file.write_all(&[b'x'; 1024]).unwrap();
    let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_704_067_200);
    file.set_modified(modified).unwrap();
    drop(file);

    let decoder = RecentEntryDecoder::new(
        Box::new(FixedPath(path.clone())),
        MetadataResolver::new(Box::new(StdFileStat), Box::new(Security { known: true })),
    );
    let entry = RecentEntry::new("0", id_list(r"C:\", &["doc.txt"]));

    let decoded = decoder.decode(&entry).unwrap();
    let meta = decoded.metadata().unwrap();
    assert_eq!(meta.path, path);
    assert_eq!(meta.size_bytes, 1024);
    assert_eq!(meta.modified_at, at(2024, 1, 1));

    std::fs::remove_file(&path).unwrap();
    let decoded = decoder.decode(&entry).unwrap();
    assert_eq!(decoded.resolution, Resolution::Deleted { path });
}

#[test]
fn test_decoding_twice_gives_equal_results() {
    let decoder = builtin_decoder(doc_stat(), true);
    let entry = RecentEntry::new("0", id_list(r"C:\", &["Users", "X", "doc.txt"]));

    let first = decoder.decode(&entry).unwrap();
    assert!(first.metadata().is_some());
    assert_eq!(first, decoder.decode(&entry).unwrap());
}

#[test]
fn test_hex_input_decodes_like_raw_bytes() {
    let data = id_list(r"C:\", &["Users", "X", "doc.txt"]);
    let hex: Vec<String> = data.iter().map(|b| format!("{b:02x}")).collect();
    let parsed = parse_hex(&format!("hex:{}", hex.join(","))).unwrap();

    assert_eq!(parsed, data);
    assert_eq!(
        BuiltinPidlResolver.resolve_path(&parsed).unwrap(),
        PathBuf::from(r"C:\Users\X\doc.txt")
    );
}
