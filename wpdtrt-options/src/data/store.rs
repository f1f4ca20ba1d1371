use std::fmt;

use indexmap::{IndexMap, map::Entry};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};
use serde_json::Value;

use crate::data::record::{Attributes, FieldType, OptionRecord};

/// Ordered collection of option records keyed by option name.
///
/// Keys keep their insertion order and are looked up by hash.
///
/// The store is deliberately non-validating: unknown keys, unknown field
/// types and malformed attributes all pass through unchanged, and no
/// operation fails. Absent data degrades to [`OptionStore::default_value`]
/// at read time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionStore {
    records: IndexMap<String, OptionRecord>,
}

impl OptionStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the metadata of every supplied key.
    ///
    /// With `reset` the key's stored value is discarded, without it the value
    /// survives. Keys not supplied are left alone.
    pub fn set_config<K, I>(&mut self, records: I, reset: bool)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Attributes)>,
    {
        for (key, attributes) in records {
            let key = key.into();
            let incoming = OptionRecord::from_attributes(attributes);
            match self.records.entry(key) {
                Entry::Occupied(mut e) => {
                    let record = e.get_mut();
                    record.attributes = incoming.attributes;
                    if reset {
                        record.value = None;
                    }
                }
                Entry::Vacant(e) => {
                    e.insert(incoming);
                }
            }
        }
        debug!("option config applied (reset: {reset}), {} keys", self.len());
    }

    /// Merge only the `value` of every supplied record.
    ///
    /// Attributes in `records` are ignored. A key not yet in the store gets a
    /// minimal record so values arriving before their config are kept.
    pub fn set_values<K, I>(&mut self, records: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, OptionRecord)>,
    {
        for (key, incoming) in records {
            let record = self.records.entry(key.into()).or_insert_with_key(|key| {
                debug!("value for unconfigured option `{key}`");
                OptionRecord::default()
            });
            if let Some(value) = incoming.value {
                record.value = Some(value);
            }
        }
    }

    /// Snapshot of the full store.
    pub fn get_all(&self) -> OptionStore {
        self.clone()
    }

    /// The "nothing entered yet" value for a field type tag.
    pub fn default_value(field_type: &str) -> Option<Value> {
        FieldType::from_tag(field_type).default_value()
    }

    /// `value` when present, otherwise the default for `field_type`.
    pub fn normalise_value(value: Option<&Value>, field_type: &str) -> Option<Value> {
        match value {
            Some(v) => Some(v.clone()),
            None => Self::default_value(field_type),
        }
    }

    /// Look up a record.
    pub fn get(&self, key: &str) -> Option<&OptionRecord> {
        self.records.get(key)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Option names in store order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Iterate `(name, record)` pairs in store order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionRecord)> {
        self.records.iter().map(|(k, r)| (k.as_str(), r))
    }

    /// A new store holding only `keys`, in the order requested.
    pub fn select<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> OptionStore {
        let mut out = OptionStore::new();
        for key in keys {
            match self.get(key) {
                Some(record) => {
                    out.records.insert(key.to_string(), record.clone());
                }
                None => warn!("option `{key}` is not defined, skipped"),
            }
        }
        out
    }

    /// Drop every stored value and keep the metadata.
    pub fn reset_values(&mut self) {
        for record in self.records.values_mut() {
            record.value = None;
        }
    }

    /// Metadata of every record, ready to feed back into [`set_config`].
    ///
    /// [`set_config`]: OptionStore::set_config
    pub fn config(&self) -> Vec<(String, Attributes)> {
        self.records
            .iter()
            .map(|(k, r)| (k.clone(), r.attributes.clone()))
            .collect()
    }
}

impl IntoIterator for OptionStore {
    type Item = (String, OptionRecord);
    type IntoIter = indexmap::map::IntoIter<String, OptionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, OptionRecord)> for OptionStore {
    fn from_iter<I: IntoIterator<Item = (K, OptionRecord)>>(iter: I) -> Self {
        OptionStore {
            records: iter.into_iter().map(|(k, r)| (k.into(), r)).collect(),
        }
    }
}

impl Serialize for OptionStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (key, record) in &self.records {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OptionStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StoreVisitor;

        impl<'de> Visitor<'de> for StoreVisitor {
            type Value = OptionStore;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of option name to option record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OptionStore, A::Error> {
                let mut records = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, record)) = access.next_entry::<String, OptionRecord>()? {
                    records.insert(key, record);
                }
                Ok(OptionStore { records })
            }

            // An empty PHP-style array round-trips as `[]`.
            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<OptionStore, A::Error> {
                if seq.next_element::<serde::de::IgnoredAny>()?.is_some() {
                    return Err(serde::de::Error::custom(
                        "expected a map of option records, found a non-empty list",
                    ));
                }
                Ok(OptionStore::new())
            }
        }

        deserializer.deserialize_any(StoreVisitor)
    }
}
