use crate::{
    Error, Result,
    catalog::{ClassCatalog, Severity, TreatmentGuide},
};
use serde::Serialize;

/// Outcome of classifying one image, with the matching treatment advice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub crop: String,
    pub disease: String,
    /// Percentage formatted with two decimals, e.g. `94.23%`.
    pub confidence: String,
    pub confidence_value: f64,
    pub severity: Severity,
    pub description: String,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
}

impl PredictionResult {
    /// Takes the arg-max of `probabilities` as the predicted class.
    pub fn from_probabilities(
        probabilities: &[f32],
        catalog: &ClassCatalog,
        guide: &TreatmentGuide,
    ) -> Result<Self> {
        let (index, probability) = argmax(probabilities)
            .ok_or_else(|| Error::inference("Model returned an empty probability vector"))?;
        Self::from_index(index, probability, catalog, guide)
    }

    pub fn from_index(
        index: usize,
        probability: f32,
        catalog: &ClassCatalog,
        guide: &TreatmentGuide,
    ) -> Result<Self> {
        let class = catalog.get(index).ok_or_else(|| {
            Error::inference(format!(
                "Predicted class index {} is outside the {} known classes",
                index,
                catalog.len()
            ))
        })?;

        let percent = (probability as f64 * 100.0).clamp(0.0, 100.0);
        let info = guide.lookup(class.disease());

        Ok(Self {
            crop: class.crop().to_string(),
            disease: class.disease().to_string(),
            confidence: format!("{:.2}%", percent),
            confidence_value: (percent * 100.0).round() / 100.0,
            severity: info.severity,
            description: info.description.clone(),
            treatment: info.treatment.clone(),
            prevention: info.prevention.clone(),
        })
    }
}

/// Index and value of the largest element; the first one wins on ties.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best, (i, v)| match best {
            Some((_, best_v)) if best_v >= v => best,
            _ => Some((i, v)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
        assert_eq!(argmax(&[0.5, 0.5]), Some((0, 0.5)));
        assert_eq!(argmax(&[f32::NAN, 0.3]), Some((1, 0.3)));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_late_blight_scenario() {
        let catalog = ClassCatalog::builtin();
        let guide = TreatmentGuide::builtin();
        let mut probs = vec![0.0f32; catalog.len()];
        probs[29] = 0.9423;
        probs[3] = 0.0577;

        let result = PredictionResult::from_probabilities(&probs, &catalog, &guide).unwrap();
        assert_eq!(result.crop, "Tomato");
        assert_eq!(result.disease, "Late_blight");
        assert_eq!(result.confidence, "94.23%");
        assert_eq!(result.confidence_value, 94.23);
        assert_eq!(result.severity, Severity::VeryHigh);
        assert_eq!(result.treatment.len(), 4);
        assert_eq!(result.prevention.len(), 4);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["severity"], "Very High");
        assert_eq!(json["confidence"], "94.23%");
    }

    #[test]
    fn test_unknown_disease_gets_healthy_advice() {
        let catalog = ClassCatalog::builtin();
        let guide = TreatmentGuide::builtin();
        let index = catalog.index_of("Tomato___Spider_mites").unwrap();

        let result = PredictionResult::from_index(index, 0.5, &catalog, &guide).unwrap();
        assert_eq!(result.crop, "Tomato");
        assert_eq!(result.disease, "Spider_mites");
        assert_eq!(result.severity, Severity::None);
        assert_eq!(result.confidence, "50.00%");
    }

    #[test]
    fn test_index_outside_catalog() {
        let catalog = ClassCatalog::from_labels(["Apple___healthy"]).unwrap();
        let err = PredictionResult::from_probabilities(&[0.1, 0.9], &catalog, &TreatmentGuide::builtin())
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }
}
