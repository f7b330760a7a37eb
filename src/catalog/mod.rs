//! Class list and treatment advice shared by training and serving.

mod tables;
mod types;

pub use tables::{DISEASE_CLASSES, FALLBACK_KEY};
pub use types::*;

use crate::{Error, Result};
use std::sync::{Arc, LazyLock};
use tracing::warn;

/// Ordered class list. Index `i` names output unit `i` of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCatalog {
    classes: Vec<DiseaseClass>,
}

impl ClassCatalog {
    pub fn builtin() -> Self {
        // The built-in labels are all well formed
        let classes = DISEASE_CLASSES
            .iter()
            .filter_map(|label| DiseaseClass::parse(*label).ok())
            .collect();
        Self { classes }
    }

    pub fn from_labels<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes = labels
            .into_iter()
            .map(DiseaseClass::parse)
            .collect::<Result<Vec<_>>>()?;

        if classes.is_empty() {
            return Err(Error::config("Class list is empty"));
        }

        Ok(Self { classes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DiseaseClass> {
        self.classes.get(index)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.label() == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiseaseClass> {
        self.classes.iter()
    }

    pub fn labels(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.label().to_string()).collect()
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

static BUILTIN_GUIDE: LazyLock<Arc<TreatmentGuide>> =
    LazyLock::new(|| Arc::new(TreatmentGuide::from_entries(tables::treatment_entries())));

/// Disease token to advice table. Independent of the model.
#[derive(Debug, Clone)]
pub struct TreatmentGuide {
    entries: Vec<(String, TreatmentInfo)>,
    fallback: usize,
}

impl TreatmentGuide {
    pub fn builtin() -> Arc<Self> {
        BUILTIN_GUIDE.clone()
    }

    fn from_entries(entries: Vec<(&'static str, TreatmentInfo)>) -> Self {
        let entries: Vec<(String, TreatmentInfo)> = entries
            .into_iter()
            .map(|(key, info)| (key.to_string(), info))
            .collect();
        let fallback = entries
            .iter()
            .position(|(key, _)| key == FALLBACK_KEY)
            .unwrap_or(0);
        Self { entries, fallback }
    }

    /// Case-insensitive exact match on the disease token. Unknown tokens get
    /// the `healthy` entry.
    pub fn lookup(&self, disease: &str) -> &TreatmentInfo {
        match self
            .entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(disease))
        {
            Some((_, info)) => info,
            None => {
                warn!(
                    "No treatment advice for disease '{}', falling back to '{}'",
                    disease, FALLBACK_KEY
                );
                &self.entries[self.fallback].1
            }
        }
    }

    /// Looks up the advice for a full class label such as `Apple___Black_rot`.
    pub fn lookup_label(&self, label: &str) -> &TreatmentInfo {
        let disease = label.rsplit(LABEL_SEPARATOR).next().unwrap_or(label);
        self.lookup(disease)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}
