use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::error::{ModelError, ModelResult};

/// Flat string-to-string tag mapping based on [`BTreeMap`].
///
/// Keys are unique and iterate in sorted order, so two maps holding the same
/// pairs always serialize to identical bytes.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct TagMap(pub BTreeMap<String, String>);

impl TagMap {
    /// Create an empty tag map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `true` if no tags are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Insert or overwrite a tag.
    ///
    /// Returns `self` for chaining.
    pub fn insert<K, V>(&mut self, key: K, val: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), val.into());
        self
    }

    /// Builder-style variant of [`TagMap::insert`].
    pub fn with<K, V>(mut self, key: K, val: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.insert(key, val);
        self
    }

    /// Get the value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    /// Returns `true` if the key is present (even with an empty value).
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate through all tags as `(&str, &str)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate through tag keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    /// Parse operator-supplied `key=value` pairs.
    ///
    /// Surrounding whitespace is trimmed from both key and value, so `gpu= ` yields an
    /// empty value (which normalization then ignores). The value may be empty or contain
    /// further `=` characters; the key may not be empty. Later duplicates override earlier ones.
    ///
    /// ```
    /// use provtag_model::TagMap;
    ///
    /// let tags = TagMap::parse_pairs(["region=us", "gpu=a100"]).unwrap();
    /// assert_eq!(tags.get("region"), Some("us"));
    /// assert_eq!(tags.len(), 2);
    /// ```
    pub fn parse_pairs<I, S>(pairs: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = TagMap::new();
        for raw in pairs {
            let raw = raw.as_ref();
            let (key, value) = raw
                .split_once('=')
                .ok_or_else(|| ModelError::InvalidTag(raw.to_string()))?;

            let key = key.trim();
            if key.is_empty() {
                return Err(ModelError::InvalidTag(raw.to_string()));
            }
            out.insert(key, value.trim());
        }
        Ok(out)
    }
}

impl From<BTreeMap<String, String>> for TagMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl AsRef<TagMap> for TagMap {
    fn as_ref(&self) -> &TagMap {
        self
    }
}

impl<K, V> FromIterator<(K, V)> for TagMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for TagMap {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
