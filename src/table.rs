use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::segment::LineRecord;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationEntry {
    pub source_text: String,
    pub translation_text: String,
}

/// Reported while building a table; never fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportEvent {
    /// A source line seen twice. The later translation is kept at the first-seen position.
    Duplicate {
        source: String,
        kept: String,
        replaced: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableWarning {
    /// Batched: one warning per validation pass, however many entries are empty.
    MissingTranslation { first_source: String, missing: usize },
}

impl std::fmt::Display for TableWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableWarning::MissingTranslation {
                first_source,
                missing,
            } => write!(
                f,
                "missing translation for {missing} line(s), first: {first_source:?}; they will be replaced by a blank"
            ),
        }
    }
}

/// Source line to translation, iterated in insertion (document) order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: IndexMap<String, String>,
}

impl TranslationTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// One entry per record, translation seeded with the record's placeholder text.
    #[must_use]
    pub fn from_records(lines: &[LineRecord]) -> Self {
        let mut table = Self::new();
        for line in lines {
            table.insert(line.source_text.clone(), line.placeholder_text.clone());
        }
        table
    }

    /// Builds from imported (source, translation) rows in row order.
    pub fn from_external<S, T>(
        pairs: impl IntoIterator<Item = (S, T)>,
    ) -> (Self, Vec<ImportEvent>)
    where
        S: Into<String>,
        T: Into<String>,
    {
        let mut table = Self::new();
        let mut events = Vec::new();
        for (source, translation) in pairs {
            if let Some(ev) = table.insert(source, translation) {
                events.push(ev);
            }
        }
        (table, events)
    }

    /// Ordered upsert: an existing key keeps its position and takes the new translation.
    pub fn insert(
        &mut self,
        source: impl Into<String>,
        translation: impl Into<String>,
    ) -> Option<ImportEvent> {
        let source = source.into();
        let translation = translation.into();
        match self.entries.entry(source) {
            Entry::Vacant(v) => {
                v.insert(translation);
                None
            }
            Entry::Occupied(mut o) => {
                let source = o.key().clone();
                let replaced = o.insert(translation.clone());
                Some(ImportEvent::Duplicate {
                    source,
                    kept: translation,
                    replaced,
                })
            }
        }
    }

    pub fn to_external(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(s, t)| (s.clone(), t.clone()))
            .collect()
    }

    pub fn validate(&self) -> Vec<TableWarning> {
        let mut missing = self.entries.iter().filter(|(_, t)| t.is_empty());
        let Some((first_source, _)) = missing.next() else {
            return Vec::new();
        };
        vec![TableWarning::MissingTranslation {
            first_source: first_source.clone(),
            missing: 1 + missing.count(),
        }]
    }

    #[must_use]
    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    pub fn entries(&self) -> impl Iterator<Item = TranslationEntry> + '_ {
        self.iter().map(|(s, t)| TranslationEntry {
            source_text: s.to_string(),
            translation_text: t.to_string(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
