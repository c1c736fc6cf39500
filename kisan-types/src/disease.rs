use serde::Serialize;

use crate::enums::RiskLevel;

/// One row of the built-in disease reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiseaseRecord {
    pub name: &'static str,
    pub risk: RiskLevel,
    pub symptoms: &'static str,
    pub treatment_organic: &'static str,
    pub treatment_chemical: &'static str,
}

pub const DISEASE_TABLE: &[DiseaseRecord] = &[
    DiseaseRecord {
        name: "Late Blight",
        risk: RiskLevel::High,
        symptoms: "Dark brown blotches on leaves, white fungal growth on the underside in humid weather.",
        treatment_organic: "Remove infected leaves and spray neem oil every 7 days.",
        treatment_chemical: "Apply Mancozeb 75% WP at 2 g per litre of water.",
    },
    DiseaseRecord {
        name: "Powdery Mildew",
        risk: RiskLevel::Medium,
        symptoms: "White powdery patches on leaves and stems.",
        treatment_organic: "Spray a 1:10 milk and water solution in the morning.",
        treatment_chemical: "Use wettable sulphur fungicide at 3 g per litre.",
    },
    DiseaseRecord {
        name: "Leaf Rust",
        risk: RiskLevel::Medium,
        symptoms: "Orange to brown pustules scattered on the leaf surface.",
        treatment_organic: "Destroy crop residue and spray garlic extract.",
        treatment_chemical: "Apply Propiconazole 25% EC at 1 ml per litre.",
    },
    DiseaseRecord {
        name: "Healthy Crop",
        risk: RiskLevel::None,
        symptoms: "Leaves are green and vibrant with no visible lesions.",
        treatment_organic: "Continue regular care and composting.",
        treatment_chemical: "Maintain balanced NPK fertilization.",
    },
];

pub const MIN_CONFIDENCE: u8 = 85;
pub const MAX_CONFIDENCE: u8 = 99;
