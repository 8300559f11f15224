//! Binary table resources.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! magic   b"NFTB"
//! version u8 (= 1)
//! tag     u8 (resource)
//! count   u32
//! count × { key_len u8, key [u8; key_len], value_len u8, value [u8; value_len] }
//! ```
//!
//! Keys are UTF-8 (one codepoint, two for compositions). Values are UTF-8,
//! except for combining classes where the value is the single class byte.
//! Entries are written in key order so the output is reproducible.

use super::{
    CombiningClassTable, CompositionTable, DataError, DataProvider, DecompositionTable,
    TableResource,
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

const MAGIC: &[u8; 4] = b"NFTB";
const VERSION: u8 = 1;

/// Loads tables from `<root>/<resource>.bin`.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_of(&self, resource: TableResource) -> PathBuf {
        self.root.join(format!("{}.bin", resource.name()))
    }

    fn read(&self, resource: TableResource) -> Result<Vec<u8>, DataError> {
        let path = self.path_of(resource);
        fs::read(&path).map_err(io_error(resource, path.clone()))
    }
}

impl DataProvider for DirectoryProvider {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn canonical_decomposition(&self) -> Result<DecompositionTable, DataError> {
        let resource = TableResource::CanonicalDecomposition;
        decode_decomposition(resource, &self.read(resource)?)
    }

    fn compatibility_decomposition(&self) -> Result<DecompositionTable, DataError> {
        let resource = TableResource::CompatibilityDecomposition;
        decode_decomposition(resource, &self.read(resource)?)
    }

    fn combining_class(&self) -> Result<CombiningClassTable, DataError> {
        decode_combining_class(&self.read(TableResource::CombiningClass)?)
    }

    fn canonical_composition(&self) -> Result<CompositionTable, DataError> {
        decode_composition(&self.read(TableResource::CanonicalComposition)?)
    }
}

/// Export every table of `provider` into `dir`, ready for a [`DirectoryProvider`].
pub fn write_tables(provider: &dyn DataProvider, dir: &Path) -> Result<(), DataError> {
    let target = DirectoryProvider::new(dir);
    for resource in TableResource::ALL {
        let bytes = match resource {
            TableResource::CanonicalDecomposition => {
                encode_decomposition(resource, &provider.canonical_decomposition()?)?
            }
            TableResource::CompatibilityDecomposition => {
                encode_decomposition(resource, &provider.compatibility_decomposition()?)?
            }
            TableResource::CombiningClass => {
                encode_combining_class(&provider.combining_class()?)?
            }
            TableResource::CanonicalComposition => {
                encode_composition(&provider.canonical_composition()?)?
            }
        };
        fs::create_dir_all(dir).map_err(io_error(resource, dir.to_path_buf()))?;
        let path = target.path_of(resource);
        fs::write(&path, bytes).map_err(io_error(resource, path.clone()))?;
    }
    Ok(())
}

fn io_error(resource: TableResource, path: PathBuf) -> impl FnOnce(io::Error) -> DataError {
    move |source| DataError::Io {
        resource,
        path,
        source,
    }
}

// ──────────────────────────────────────────────────────────────
//  Encoding
// ──────────────────────────────────────────────────────────────

/// Longest key or value a length byte can describe.
const MAX_FIELD_LEN: usize = u8::MAX as usize;

fn field_len(resource: TableResource, field: &[u8]) -> Result<u8, DataError> {
    u8::try_from(field.len()).map_err(|_| {
        DataError::corrupt(
            resource,
            format!("entry of {} bytes exceeds {MAX_FIELD_LEN}", field.len()),
        )
    })
}

fn encode_entries(
    resource: TableResource,
    mut entries: Vec<(Vec<u8>, Vec<u8>)>,
) -> Result<Vec<u8>, DataError> {
    entries.sort_unstable();
    let count = u32::try_from(entries.len())
        .map_err(|_| DataError::corrupt(resource, "more than u32::MAX entries"))?;

    let body: usize = entries.iter().map(|(k, v)| 2 + k.len() + v.len()).sum();
    let mut out = Vec::with_capacity(10 + body);
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.push(resource.tag());
    out.extend_from_slice(&count.to_le_bytes());

    for (key, value) in entries {
        out.push(field_len(resource, &key)?);
        out.extend_from_slice(&key);
        out.push(field_len(resource, &value)?);
        out.extend_from_slice(&value);
    }
    Ok(out)
}

fn utf8_of(c: char) -> Vec<u8> {
    let mut buf = [0u8; 4];
    c.encode_utf8(&mut buf).as_bytes().to_vec()
}

/// Fails with [`DataError::Corrupt`] for values over 255 bytes. No Unicode
/// decomposition comes close (the longest is 18 codepoints).
pub fn encode_decomposition(
    resource: TableResource,
    table: &DecompositionTable,
) -> Result<Vec<u8>, DataError> {
    let entries = table
        .iter()
        .map(|(c, d)| (utf8_of(c), d.as_bytes().to_vec()))
        .collect();
    encode_entries(resource, entries)
}

pub fn encode_combining_class(table: &CombiningClassTable) -> Result<Vec<u8>, DataError> {
    let entries = table.iter().map(|(c, class)| (utf8_of(c), vec![class])).collect();
    encode_entries(TableResource::CombiningClass, entries)
}

pub fn encode_composition(table: &CompositionTable) -> Result<Vec<u8>, DataError> {
    let entries = table
        .iter()
        .map(|((starter, mark), c)| {
            let mut key = utf8_of(starter);
            key.extend(utf8_of(mark));
            (key, utf8_of(c))
        })
        .collect();
    encode_entries(TableResource::CanonicalComposition, entries)
}

// ──────────────────────────────────────────────────────────────
//  Decoding
// ──────────────────────────────────────────────────────────────

struct Reader<'a> {
    resource: TableResource,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DataError> {
        let end = self.pos + n;
        let slice = self.bytes.get(self.pos..end).ok_or_else(|| {
            DataError::corrupt(self.resource, format!("truncated at byte {}", self.pos))
        })?;
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, DataError> {
        Ok(self.take(1)?[0])
    }

    fn chunk(&mut self) -> Result<&'a [u8], DataError> {
        let len = self.byte()? as usize;
        self.take(len)
    }

    fn text(&mut self) -> Result<&'a str, DataError> {
        let at = self.pos;
        std::str::from_utf8(self.chunk()?).map_err(|e| {
            DataError::corrupt(self.resource, format!("invalid UTF-8 at byte {at}: {e}"))
        })
    }

    /// Validate the header and return the entry count.
    fn header(&mut self) -> Result<u32, DataError> {
        if self.take(4)? != MAGIC {
            return Err(DataError::corrupt(self.resource, "bad magic"));
        }
        let version = self.byte()?;
        if version != VERSION {
            return Err(DataError::corrupt(
                self.resource,
                format!("unsupported version {version}"),
            ));
        }
        let tag = self.byte()?;
        if tag != self.resource.tag() {
            return Err(DataError::corrupt(
                self.resource,
                format!("resource tag {tag} does not match"),
            ));
        }
        let count = self.take(4)?;
        Ok(u32::from_le_bytes([count[0], count[1], count[2], count[3]]))
    }

    fn finish(&self) -> Result<(), DataError> {
        match self.bytes.len() - self.pos {
            0 => Ok(()),
            extra => Err(DataError::corrupt(
                self.resource,
                format!("{extra} trailing bytes"),
            )),
        }
    }
}

fn single_char(resource: TableResource, s: &str) -> Result<char, DataError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(DataError::corrupt(
            resource,
            format!("key {s:?} is not a single codepoint"),
        )),
    }
}

pub fn decode_decomposition(
    resource: TableResource,
    bytes: &[u8],
) -> Result<DecompositionTable, DataError> {
    let mut reader = Reader { resource, bytes, pos: 0 };
    let count = reader.header()?;
    let mut table = DecompositionTable::default();

    for _ in 0..count {
        let key = single_char(resource, reader.text()?)?;
        let value = reader.text()?;
        if value.is_empty() {
            return Err(DataError::corrupt(resource, format!("empty mapping for {key:?}")));
        }
        table.insert(key, value);
    }
    reader.finish()?;
    Ok(table)
}

pub fn decode_combining_class(bytes: &[u8]) -> Result<CombiningClassTable, DataError> {
    let resource = TableResource::CombiningClass;
    let mut reader = Reader { resource, bytes, pos: 0 };
    let count = reader.header()?;
    let mut table = CombiningClassTable::default();

    for _ in 0..count {
        let key = single_char(resource, reader.text()?)?;
        let class = match reader.chunk()? {
            [class @ 1..=255] => *class,
            other => {
                return Err(DataError::corrupt(
                    resource,
                    format!("bad class {other:?} for {key:?}"),
                ));
            }
        };
        table.insert(key, class);
    }
    reader.finish()?;
    Ok(table)
}

pub fn decode_composition(bytes: &[u8]) -> Result<CompositionTable, DataError> {
    let resource = TableResource::CanonicalComposition;
    let mut reader = Reader { resource, bytes, pos: 0 };
    let count = reader.header()?;
    let mut table = CompositionTable::default();

    for _ in 0..count {
        let key = reader.text()?;
        let mut chars = key.chars();
        let (Some(starter), Some(mark), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(DataError::corrupt(
                resource,
                format!("key {key:?} is not a codepoint pair"),
            ));
        };
        let composed = single_char(resource, reader.text()?)?;
        table.insert(starter, mark, composed);
    }
    reader.finish()?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryProvider;

    fn sample_decompositions() -> DecompositionTable {
        [('é', "e\u{301}"), ('\u{1E69}', "s\u{323}\u{307}"), ('\u{1D15E}', "\u{1D157}\u{1D165}")]
            .into_iter()
            .collect()
    }

    #[test]
    fn decomposition_round_trip() {
        let table = sample_decompositions();
        let resource = TableResource::CanonicalDecomposition;
        let bytes = encode_decomposition(resource, &table).unwrap();
        assert_eq!(decode_decomposition(resource, &bytes).unwrap(), table);
    }

    #[test]
    fn encoding_is_reproducible() {
        let resource = TableResource::CanonicalDecomposition;
        let a = encode_decomposition(resource, &sample_decompositions()).unwrap();
        let b = encode_decomposition(resource, &sample_decompositions()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn classes_and_compositions_round_trip() {
        let classes: CombiningClassTable =
            [('\u{301}', 230), ('\u{334}', 1)].into_iter().collect();
        let bytes = encode_combining_class(&classes).unwrap();
        assert_eq!(decode_combining_class(&bytes).unwrap(), classes);

        let pairs: CompositionTable = [
            (('e', '\u{301}'), 'é'),
            (('\u{1D157}', '\u{1D165}'), '\u{1D15E}'),
        ]
        .into_iter()
        .collect();
        let bytes = encode_composition(&pairs).unwrap();
        assert_eq!(decode_composition(&bytes).unwrap(), pairs);
    }

    #[test]
    fn rejects_corrupt_input() {
        let resource = TableResource::CanonicalDecomposition;
        let good = encode_decomposition(resource, &sample_decompositions()).unwrap();

        let mut bad_magic = good.clone();
        bad_magic[0] = b'X';
        assert!(matches!(
            decode_decomposition(resource, &bad_magic),
            Err(DataError::Corrupt { .. })
        ));

        let truncated = &good[..good.len() - 1];
        assert!(decode_decomposition(resource, truncated).is_err());

        let mut trailing = good.clone();
        trailing.push(0);
        assert!(decode_decomposition(resource, &trailing).is_err());

        // right bytes, wrong resource
        assert!(decode_decomposition(TableResource::CompatibilityDecomposition, &good).is_err());
        assert!(decode_combining_class(&good).is_err());
    }

    #[test]
    fn rejects_class_zero() {
        let mut bytes = encode_combining_class(&[('\u{301}', 230)].into_iter().collect()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 0;
        assert!(decode_combining_class(&bytes).is_err());
    }

    #[test]
    fn oversized_values_are_rejected_not_truncated() {
        let resource = TableResource::CompatibilityDecomposition;

        // 127 marks = 254 bytes + 1 byte of `x` fits exactly
        let fits = format!("x{}", "\u{301}".repeat(127));
        let table: DecompositionTable = [('\u{FDFA}', fits.as_str())].into_iter().collect();
        let bytes = encode_decomposition(resource, &table).unwrap();
        assert_eq!(decode_decomposition(resource, &bytes).unwrap(), table);

        let long = "\u{301}".repeat(200);
        let table: DecompositionTable = [('\u{FDFA}', long.as_str())].into_iter().collect();
        assert!(matches!(
            encode_decomposition(resource, &table),
            Err(DataError::Corrupt { resource: TableResource::CompatibilityDecomposition, .. })
        ));

        let dir = std::env::temp_dir().join(format!("normform-long-{}", std::process::id()));
        let provider = MemoryProvider::new()
            .with_canonical_decomposition(DecompositionTable::default())
            .with_compatibility_decomposition(table);
        assert!(matches!(
            write_tables(&provider, &dir),
            Err(DataError::Corrupt { .. })
        ));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn directory_provider_reads_exported_tables() {
        let dir = std::env::temp_dir().join(format!("normform-codec-{}", std::process::id()));
        let provider = MemoryProvider::new()
            .with_canonical_decomposition(sample_decompositions())
            .with_compatibility_decomposition([('ﬁ', "fi")].into_iter().collect())
            .with_combining_class([('\u{301}', 230)].into_iter().collect())
            .with_canonical_composition([(('e', '\u{301}'), 'é')].into_iter().collect());

        write_tables(&provider, &dir).unwrap();
        let loaded = DirectoryProvider::new(&dir);

        assert_eq!(loaded.canonical_decomposition().unwrap(), sample_decompositions());
        assert_eq!(loaded.compatibility_decomposition().unwrap().get('ﬁ'), Some("fi"));
        assert_eq!(loaded.combining_class().unwrap().get('\u{301}'), 230);
        assert_eq!(loaded.canonical_composition().unwrap().get('e', '\u{301}'), Some('é'));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let provider = DirectoryProvider::new("/nonexistent/normform-tables");
        assert!(matches!(
            provider.combining_class(),
            Err(DataError::Io { resource: TableResource::CombiningClass, .. })
        ));
    }
}
