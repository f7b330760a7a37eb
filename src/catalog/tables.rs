use super::types::{Severity, TreatmentInfo};

/// Default output classes. Position `i` is output unit `i` of a model trained
/// with this list, so entries may only be reordered together with retraining.
pub const DISEASE_CLASSES: [&str; 37] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Cherry___Powdery_mildew",
    "Cherry___healthy",
    "Corn___Cercospora_leaf_spot",
    "Corn___Common_rust",
    "Corn___Northern_Leaf_Blight",
    "Corn___healthy",
    "Grape___Black_rot",
    "Grape___Esca",
    "Grape___Leaf_blight",
    "Grape___healthy",
    "Orange___Haunglongbing",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper___Bacterial_spot",
    "Pepper___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

/// Key of the entry returned when a disease token has no advice of its own.
pub const FALLBACK_KEY: &str = "healthy";

pub(super) fn treatment_entries() -> Vec<(&'static str, TreatmentInfo)> {
    vec![
        (
            "Apple_scab",
            TreatmentInfo::new(
                Severity::Medium,
                "Fungal infection causing dark lesions on leaves and fruits",
                &[
                    "Remove infected leaves and branches",
                    "Apply fungicide (Sulfur or Copper-based)",
                    "Improve tree ventilation",
                    "Avoid wetting foliage during irrigation",
                ],
                &[
                    "Use resistant varieties",
                    "Practice good sanitation",
                    "Apply preventive fungicides in spring",
                ],
            ),
        ),
        (
            "Black_rot",
            TreatmentInfo::new(
                Severity::High,
                "Fungal disease causing dark lesions and cankers",
                &[
                    "Remove infected branches and fruit",
                    "Prune to improve air circulation",
                    "Apply copper fungicide",
                    "Burn or destroy infected plant material",
                ],
                &[
                    "Plant resistant varieties",
                    "Maintain proper sanitation",
                    "Avoid injury to trees",
                ],
            ),
        ),
        (
            "Cedar_apple_rust",
            TreatmentInfo::new(
                Severity::Medium,
                "Rust infection causing yellow/orange lesions",
                &[
                    "Apply sulfur or copper fungicide",
                    "Remove rust-infected cedar trees nearby",
                    "Improve tree ventilation",
                    "Remove galls from cedar trees",
                ],
                &[
                    "Keep distance from cedar trees",
                    "Use resistant apple varieties",
                    "Regular inspections",
                ],
            ),
        ),
        (
            "Powdery_mildew",
            TreatmentInfo::new(
                Severity::Medium,
                "White powdery coating on leaves indicating fungal infection",
                &[
                    "Apply sulfur dust or spray",
                    "Use potassium bicarbonate fungicide",
                    "Remove heavily infected leaves",
                    "Improve air circulation",
                ],
                &[
                    "Maintain proper spacing",
                    "Avoid high nitrogen fertilization",
                    "Regular monitoring",
                ],
            ),
        ),
        (
            "Early_blight",
            TreatmentInfo::new(
                Severity::High,
                "Fungal disease causing brown concentric lesions on leaves",
                &[
                    "Remove infected leaves promptly",
                    "Apply copper or chlorothalonil fungicide",
                    "Stake plants for better air circulation",
                    "Water at soil level, not foliage",
                ],
                &[
                    "Use resistant varieties",
                    "Mulch to prevent soil splash",
                    "Rotate crops annually",
                ],
            ),
        ),
        (
            "Late_blight",
            TreatmentInfo::new(
                Severity::VeryHigh,
                "Serious fungal disease causing water-soaked lesions",
                &[
                    "Remove infected leaves and fruits immediately",
                    "Apply metalaxyl-based fungicide",
                    "Improve drainage",
                    "Ensure proper plant spacing",
                ],
                &[
                    "Plant resistant varieties",
                    "Use certified disease-free seeds",
                    "Scout for disease regularly",
                    "Avoid overhead watering",
                ],
            ),
        ),
        (
            FALLBACK_KEY,
            TreatmentInfo::new(
                Severity::None,
                "No disease detected - plant appears healthy",
                &[
                    "Continue regular monitoring",
                    "Maintain proper watering schedule",
                    "Ensure adequate sunlight",
                    "Regular pest inspection",
                ],
                &[
                    "Maintain good garden hygiene",
                    "Provide proper nutrition",
                    "Monitor for early symptoms of disease",
                ],
            ),
        ),
    ]
}
