//! Arabic display strings for the failure labels and page messages.

use crate::models::FailureType;

/// Status shown when the machine is predicted healthy
pub const STATUS_STABLE: &str = "الحالة: الماكينة مستقرة ✅";

/// Status shown when any failure is predicted
pub const STATUS_FAULT_DETECTED: &str = "انتباه: تم رصد خلل محتمل! ⚠️";

/// Shown instead of a prediction when a form field is not a number
pub const INVALID_NUMBERS: &str = "يرجى إدخال أرقام صحيحة";

/// Upload request carried no file part
pub const NO_FILE_UPLOADED: &str = "لم يتم رفع أي ملف";

/// Upload file part had an empty filename
pub const EMPTY_FILENAME: &str = "اسم الملف فارغ";

const DIAGNOSIS_PREFIX: &str = "التشخيص";
const FILE_ERROR_PREFIX: &str = "خطأ في معالجة الملف: تأكد من تطابق أسماء الأعمدة. الخطأ";

impl FailureType {
    /// Localized display text
    pub fn localized(&self) -> &'static str {
        match self {
            FailureType::NoFailure => "لا يوجد عطل (الماكينة سليمة)",
            FailureType::HeatDissipation => "عطل بسبب تبديد الحرارة",
            FailureType::Power => "عطل في نظام الطاقة/العزم",
            FailureType::Overstrain => "عطل ناتج عن الإجهاد الميكانيكي",
            FailureType::ToolWear => "عطل بسبب تآكل العدة",
            FailureType::Random => "أعطال عشوائية غير محددة",
        }
    }
}

/// Localized text for an encoder label; unknown labels pass through unchanged
pub fn translate(label: &str) -> &str {
    match label.parse::<FailureType>() {
        Ok(failure) => failure.localized(),
        Err(_) => label,
    }
}

/// Diagnostic line naming a localized failure type
pub fn diagnosis(localized_label: &str) -> String {
    format!("{}: {}", DIAGNOSIS_PREFIX, localized_label)
}

/// Plain-text message for an upload that could not be scored
pub fn file_error(cause: &str) -> String {
    format!("{}: {}", FILE_ERROR_PREFIX, cause)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_known_label_is_translated() {
        for failure in FailureType::iter() {
            let label = failure.to_string();
            let localized = translate(&label);

            assert!(!localized.is_empty(), "{} has no translation", label);
            assert_ne!(localized, label);
        }
    }

    #[test]
    fn test_unknown_label_passes_through() {
        assert_eq!(translate("Bearing Failure"), "Bearing Failure");
        assert_eq!(translate(""), "");
    }

    #[test]
    fn test_translation_is_case_sensitive() {
        assert_eq!(translate("no failure"), "no failure");
        assert_eq!(translate("No Failure"), "لا يوجد عطل (الماكينة سليمة)");
    }

    #[test]
    fn test_messages() {
        assert_eq!(diagnosis("x"), "التشخيص: x");
        assert!(file_error("missing columns: Torque [Nm]").ends_with("Torque [Nm]"));
    }
}
