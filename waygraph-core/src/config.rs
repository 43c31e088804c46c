//! Tag→class configuration resolved against each way's tag pair.

use std::collections::HashMap;

use crate::way::TagConfig;

/// Routing class a tag pair maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagClass {
    /// Class identifier persisted on every edge built from the tag.
    pub id: i64,
    /// Relative priority of the class for the routing consumer.
    pub priority: f64,
}

/// One configuration row: a tag pair and the class it maps to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassEntry {
    /// Classifying tag pair.
    pub tag: TagConfig,
    /// Class the pair maps to.
    pub class: TagClass,
}

/// Immutable mapping from tag pairs to routing classes.
///
/// # Examples
/// ```
/// use waygraph_core::{ClassEntry, Configuration, TagClass, TagConfig};
///
/// let config = Configuration::from_entries([ClassEntry {
///     tag: TagConfig::new("highway", "residential"),
///     class: TagClass { id: 11, priority: 2.5 },
/// }]);
/// let class = config
///     .class_for(&TagConfig::new("highway", "residential"))
///     .expect("mapped tag");
/// assert_eq!(class.id, 11);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    classes: HashMap<TagConfig, TagClass>,
}

impl Configuration {
    /// Build a configuration from entries; a repeated tag pair keeps the
    /// last entry.
    pub fn from_entries(entries: impl IntoIterator<Item = ClassEntry>) -> Self {
        Self {
            classes: entries
                .into_iter()
                .map(|entry| (entry.tag, entry.class))
                .collect(),
        }
    }

    /// Look up the class a tag pair maps to.
    pub fn class_for(&self, tag: &TagConfig) -> Option<&TagClass> {
        self.classes.get(tag)
    }

    /// Iterate over the configuration rows.
    pub fn entries(&self) -> impl Iterator<Item = ClassEntry> + '_ {
        self.classes.iter().map(|(tag, class)| ClassEntry {
            tag: tag.clone(),
            class: *class,
        })
    }

    /// Number of configured tag pairs.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no tag pairs are configured.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
