//! Ordered, mergeable collection returned by every traversal step

/// Accumulated output of a traversal
///
/// The payload type depends on the action map in use: a geometry pass
/// collects [`MeshTask`](crate::task::MeshTask)s, while a helper pass may
/// collect coordinates.
#[derive(Debug)]
pub struct ConversionContext<T> {
    data: Vec<T>,
}

impl<T> Default for ConversionContext<T> {
    fn default() -> Self {
        Self { data: vec![] }
    }
}

impl<T> ConversionContext<T> {
    /// Builds an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single item
    pub fn add(&mut self, item: T) {
        self.data.push(item);
    }

    /// Appends every item of another context, preserving order
    pub fn merge(&mut self, mut other: ConversionContext<T>) {
        self.data.append(&mut other.data);
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks whether the context holds no items
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates over items in order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Unwraps into the underlying items
    pub fn into_inner(self) -> Vec<T> {
        self.data
    }
}

impl<T> From<T> for ConversionContext<T> {
    fn from(item: T) -> Self {
        Self { data: vec![item] }
    }
}

impl<T> FromIterator<T> for ConversionContext<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<T> FromIterator<ConversionContext<T>> for ConversionContext<T> {
    fn from_iter<I: IntoIterator<Item = ConversionContext<T>>>(
        iter: I,
    ) -> Self {
        let mut out = Self::new();
        for c in iter {
            out.merge(c);
        }
        out
    }
}

impl<T> IntoIterator for ConversionContext<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}
