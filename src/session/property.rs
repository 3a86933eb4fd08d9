//! Collected properties and the per-site property set

use std::collections::BTreeMap;

/// One accommodation listing
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Listing name; identity key within one site's set
    pub name: String,
    /// Review score on a 0-10 scale
    pub score: Option<f64>,
    /// Nightly price; `None` means the property is unavailable
    pub price: Option<f64>,
}

impl Property {
    pub fn new(name: impl Into<String>, score: Option<f64>, price: Option<f64>) -> Self {
        Self {
            name: name.into(),
            score,
            price,
        }
    }

    pub fn is_available(&self) -> bool {
        self.price.is_some()
    }
}

/// Properties collected from one site, keyed by name
///
/// A later property with an existing name replaces the earlier one. Iteration
/// is in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    by_name: BTreeMap<String, Property>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a page into the set
    ///
    /// # Returns
    ///
    /// The number of names that were not in the set before the merge. Zero
    /// for a non-empty page means every listing was already known.
    pub fn merge_page(&mut self, page: Vec<Property>) -> usize {
        let before = self.by_name.len();
        for property in page {
            self.by_name.insert(property.name.clone(), property);
        }
        self.by_name.len() - before
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.by_name.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.by_name.values()
    }
}

impl FromIterator<Property> for PropertySet {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        let mut set = Self::new();
        set.merge_page(iter.into_iter().collect());
        set
    }
}
