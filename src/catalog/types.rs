use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the crop and the disease token in a class label.
pub const LABEL_SEPARATOR: &str = "___";

/// A model output class such as `Tomato___Late_blight`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiseaseClass {
    label: String,
    split_at: usize,
}

impl DiseaseClass {
    pub fn parse(label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let split_at = label.find(LABEL_SEPARATOR).ok_or_else(|| {
            Error::config(format!(
                "Class label '{}' is missing the '{}' separator",
                label, LABEL_SEPARATOR
            ))
        })?;

        if split_at == 0 || split_at + LABEL_SEPARATOR.len() == label.len() {
            return Err(Error::config(format!(
                "Class label '{}' needs both a crop and a disease part",
                label
            )));
        }

        Ok(Self { label, split_at })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn crop(&self) -> &str {
        &self.label[..self.split_at]
    }

    /// Disease token, the part after the separator. Used as the treatment key.
    pub fn disease(&self) -> &str {
        &self.label[self.split_at + LABEL_SEPARATOR.len()..]
    }
}

impl fmt::Display for DiseaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl TryFrom<String> for DiseaseClass {
    type Error = Error;

    fn try_from(label: String) -> Result<Self> {
        Self::parse(label)
    }
}

impl From<DiseaseClass> for String {
    fn from(class: DiseaseClass) -> Self {
        class.label
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    None,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentInfo {
    pub severity: Severity,
    pub description: String,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
}

impl TreatmentInfo {
    pub fn new(
        severity: Severity,
        description: &str,
        treatment: &[&str],
        prevention: &[&str],
    ) -> Self {
        Self {
            severity,
            description: description.to_string(),
            treatment: treatment.iter().map(|s| s.to_string()).collect(),
            prevention: prevention.iter().map(|s| s.to_string()).collect(),
        }
    }
}
