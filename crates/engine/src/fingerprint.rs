use std::collections::btree_map;
use std::collections::BTreeMap;

use sha1::{Digest, Sha1};

/// Length of a request fingerprint: one leading zero byte followed by the
/// 20-byte SHA-1 sum. The leading byte is an artifact preserved for
/// compatibility with previously recorded fingerprints, not a security
/// boundary.
pub const FINGERPRINT_LEN: usize = 21;

const SEPARATOR: [u8; 1] = [0x00];

/// Opaque lookup key derived from a request's path remainder and query
/// parameters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// Decoded query parameters as an unordered multimap of keys to value
/// lists. Two requests carrying the same pairs in any order build equal
/// maps and therefore equal fingerprints.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, Vec<String>>);

// -- Constructors

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.push(key, value);
        }
        params
    }
}

// -- Accessors

impl QueryParams {
    pub fn push<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.0.iter()
    }
}

fn hash_values(values: &[String], hasher: &mut Sha1) {
    if values.is_empty() {
        return;
    }
    if values.len() == 1 {
        hasher.update(values[0].as_bytes());
        hasher.update(SEPARATOR);
        return;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    for value in &sorted {
        hasher.update(value.as_bytes());
        hasher.update(SEPARATOR);
    }
}

/// Computes the stable lookup key for a request shape.
///
/// The path remainder and every key and value are fed to the digest with a
/// trailing zero byte so that adjacent fields cannot be confused by
/// concatenation (`"ab"+"c"` vs `"a"+"bc"`). Keys arrive sorted from the
/// map's ordering; value lists are sorted here when they hold more than
/// one element. A request with no query parameters hashes the path alone.
#[must_use]
pub fn fingerprint(path_remainder: &str, query: &QueryParams) -> Fingerprint {
    let mut hasher = Sha1::new();
    hasher.update(path_remainder.as_bytes());
    hasher.update(SEPARATOR);
    for (key, values) in query.iter() {
        hasher.update(key.as_bytes());
        hasher.update(SEPARATOR);
        hash_values(values, &mut hasher);
    }
    let digest = hasher.finalize();
    let mut sum = [0u8; FINGERPRINT_LEN];
    sum[1..].copy_from_slice(&digest);
    Fingerprint(sum)
}
