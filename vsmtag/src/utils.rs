use core::hash::Hash;
use core::ops::{Deref, DerefMut};

use bincode::{
    de::{BorrowDecoder, Decoder},
    enc::Encoder,
    error::{DecodeError, EncodeError},
    BorrowDecode, Decode, Encode,
};
use indexmap::IndexMap;

/// Counts occurrences of keys, remembering the order in which each key was first seen.
#[derive(Clone, Debug)]
pub struct Counter<K> {
    counts: IndexMap<K, usize>,
}

impl<K> Default for Counter<K> {
    fn default() -> Self {
        Self {
            counts: IndexMap::new(),
        }
    }
}

impl<K> Counter<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &usize)> {
        self.counts.iter()
    }

    /// Returns all entries sorted by descending count.
    ///
    /// The sort is stable, so keys with equal counts stay in first-seen order.
    pub fn most_common(self) -> Vec<(K, usize)> {
        let mut entries: Vec<_> = self.counts.into_iter().collect();
        entries.sort_by(|(_, a), (_, b)| b.cmp(a));
        entries
    }
}

impl<K> FromIterator<K> for Counter<K>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut counter = Self::new();
        for key in iter {
            counter.add(key);
        }
        counter
    }
}

impl<K> IntoIterator for Counter<K> {
    type Item = (K, usize);
    type IntoIter = indexmap::map::IntoIter<K, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

/// Insertion-ordered map that is stored as a sequence of pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct SerializableIndexMap<K, V>(pub IndexMap<K, V>)
where
    K: Eq + Hash;

impl<K, V> Default for SerializableIndexMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self(IndexMap::new())
    }
}

impl<K, V> Deref for SerializableIndexMap<K, V>
where
    K: Eq + Hash,
{
    type Target = IndexMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K, V> DerefMut for SerializableIndexMap<K, V>
where
    K: Eq + Hash,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K, V> Decode for SerializableIndexMap<K, V>
where
    K: Decode + Eq + Hash + 'static,
    V: Decode + 'static,
{
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let raw: Vec<(K, V)> = Decode::decode(decoder)?;
        Ok(Self(raw.into_iter().collect()))
    }
}

impl<'de, K, V> BorrowDecode<'de> for SerializableIndexMap<K, V>
where
    K: Decode + Eq + Hash + 'static,
    V: Decode + 'static,
{
    fn borrow_decode<D: BorrowDecoder<'de>>(decoder: &mut D) -> Result<Self, DecodeError> {
        Self::decode(decoder)
    }
}

impl<K, V> Encode for SerializableIndexMap<K, V>
where
    K: Encode + Eq + Hash,
    V: Encode,
{
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        // Same layout as `Vec<(K, V)>`: the length followed by each pair.
        Encode::encode(&(self.0.len() as u64), encoder)?;
        for (k, v) in &self.0 {
            Encode::encode(k, encoder)?;
            Encode::encode(v, encoder)?;
        }
        Ok(())
    }
}
