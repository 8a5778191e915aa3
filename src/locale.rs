//! User-facing message catalogs.

use serde::{Deserialize, Serialize};

use crate::analyzers::types::Rule;
use crate::severity::PredictionClass;

/// Language of recommendation texts and severity labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    He,
    En,
}

impl Locale {
    /// Fixed warning emitted when the new incident is predicted fatal or severe.
    pub fn prediction_warning(self) -> &'static str {
        match self {
            Self::He => {
                "התנאים שהוזנו מצביעים על פוטנציאל לתאונה חמורה. מומלץ לנקוט באמצעי זהירות מיוחדים ולשקול הצבת תמרורי אזהרה נוספים."
            }
            Self::En => {
                "The entered conditions indicate potential for a serious accident. Take special precautions and consider placing additional warning signs."
            }
        }
    }

    /// Region-specific text for a threshold rule.
    pub fn region_finding(self, rule: Rule, region: &str) -> String {
        match (self, rule) {
            (Self::He, Rule::HighSeverity) => format!(
                "זוהה ריכוז גבוה של תאונות קשות וקטלניות באזור {region}. מומלץ לבצע סקר בטיחות מקיף."
            ),
            (Self::He, Rule::Infrastructure) => format!(
                "נמצאו בעיות תשתית חוזרות באזור {region}. מומלץ לשפר את תחזוקת הכביש והשוליים."
            ),
            (Self::He, Rule::Signage) => format!(
                "זוהו ליקויים בתמרור ובסימון באזור {region}. מומלץ לבצע סקר תמרורים ולהוסיף תמרורי אזהרה."
            ),
            (Self::He, Rule::Lighting) => format!(
                "זוהו בעיות תאורה משמעותיות באזור {region}. מומלץ לשפר את מערך התאורה."
            ),
            (Self::En, Rule::HighSeverity) => format!(
                "A high concentration of severe and fatal accidents was found in {region}. A comprehensive safety survey is recommended."
            ),
            (Self::En, Rule::Infrastructure) => format!(
                "Recurring infrastructure problems were found in {region}. Improving road and shoulder maintenance is recommended."
            ),
            (Self::En, Rule::Signage) => format!(
                "Signage and road marking defects were found in {region}. A signage survey and additional warning signs are recommended."
            ),
            (Self::En, Rule::Lighting) => format!(
                "Significant lighting problems were found in {region}. Improving the lighting system is recommended."
            ),
        }
    }

    /// Shown when the historical dataset could not be loaded or cleaned.
    pub fn dataset_unavailable(self) -> &'static str {
        match self {
            Self::He => "לא ניתן היה לטעון נתוני תאונות היסטוריים. ההמלצות מוגבלות.",
            Self::En => "Historical accident data could not be loaded. Recommendations are limited.",
        }
    }

    /// Shown when aggregation or rule evaluation failed.
    pub fn generation_failed(self) -> &'static str {
        match self {
            Self::He => {
                "לא ניתן היה לייצר המלצות מפורטות בשל בעיה טכנית. אנא נסה שוב מאוחר יותר."
            }
            Self::En => {
                "Detailed recommendations could not be generated due to a technical problem. Please try again later."
            }
        }
    }

    pub fn severity_label(self, class: PredictionClass) -> &'static str {
        match (self, class) {
            (Self::He, PredictionClass::Fatal) => "קטלנית",
            (Self::He, PredictionClass::Severe) => "קשה",
            (Self::He, PredictionClass::Light) => "קלה",
            (Self::En, PredictionClass::Fatal) => "Fatal",
            (Self::En, PredictionClass::Severe) => "Severe",
            (Self::En, PredictionClass::Light) => "Light",
        }
    }
}
