//! Client-side upload validation
//!
//! Mirrors the server limits so users get feedback before a 50MB request is
//! sent only to be rejected.

use crate::config::UploadConfig;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// The selected file as reported by the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

/// Feedback styling applied to the file name label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTone {
    Error,
    Success,
}

impl FeedbackTone {
    pub const ERROR_CLASS: &'static str = "text-red-600";
    pub const SUCCESS_CLASS: &'static str = "text-green-600";

    /// Classes to remove, then classes to add
    pub fn class_changes(self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            FeedbackTone::Error => (&[], &[Self::ERROR_CLASS]),
            FeedbackTone::Success => (&[Self::ERROR_CLASS], &[Self::SUCCESS_CLASS]),
        }
    }
}

/// Outcome of checking a selection against the policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    TooLarge { max_bytes: u64 },
    InvalidType { mime_type: String },
    Accepted { name: String, size_bytes: u64 },
}

impl Verdict {
    pub fn message(&self) -> String {
        match self {
            Verdict::TooLarge { max_bytes } => format!(
                "File too large! Maximum size is {}MB",
                max_bytes / (1024 * 1024)
            ),
            Verdict::InvalidType { .. } => {
                "Invalid file type! Please upload PDF, DOCX, or PPTX".to_string()
            }
            Verdict::Accepted { name, size_bytes } => {
                format!("Selected: {} ({})", name, format_file_size(*size_bytes))
            }
        }
    }

    pub fn tone(&self) -> FeedbackTone {
        match self {
            Verdict::Accepted { .. } => FeedbackTone::Success,
            _ => FeedbackTone::Error,
        }
    }

    pub fn allows_submit(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    max_file_size: u64,
    allowed_mime_types: Vec<String>,
}

impl UploadPolicy {
    pub fn new(max_file_size: u64, allowed_mime_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_mime_types,
        }
    }

    /// Size is checked before type, so an oversized file always reports "too large"
    pub fn evaluate(&self, file: &FileDescriptor) -> Verdict {
        if file.size_bytes > self.max_file_size {
            return Verdict::TooLarge {
                max_bytes: self.max_file_size,
            };
        }

        if !self.allowed_mime_types.iter().any(|t| *t == file.mime_type) {
            return Verdict::InvalidType {
                mime_type: file.mime_type.clone(),
            };
        }

        Verdict::Accepted {
            name: file.name.clone(),
            size_bytes: file.size_bytes,
        }
    }
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self::new(config.max_file_size, config.allowed_mime_types.clone())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}

/// Index into [`SIZE_UNITS`]: the largest unit the size reaches, capped at GB
fn unit_index(bytes: u64) -> usize {
    let mut index = 0;
    let mut threshold: u64 = 1024;
    while index + 1 < SIZE_UNITS.len() && bytes >= threshold {
        index += 1;
        threshold = threshold.saturating_mul(1024);
    }
    index
}

/// Human readable size, base 1024, two decimals with trailing zeros dropped
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let index = unit_index(bytes);
    let scaled = bytes as f64 / 1024f64.powi(index as i32);
    let rounded = (scaled * 100.0).round() / 100.0;

    format!("{} {}", rounded, SIZE_UNITS[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(size_bytes: u64, mime_type: &str) -> FileDescriptor {
        FileDescriptor {
            name: "deck.pptx".to_string(),
            size_bytes,
            mime_type: mime_type.to_string(),
        }
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1), "1 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(2_621_440), "2.5 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1 GB");
    }

    #[test]
    fn test_format_caps_at_largest_unit() {
        assert_eq!(format_file_size(2 * 1024u64.pow(4)), "2048 GB");
    }

    #[test]
    fn test_oversized_rejected_before_type() {
        let policy = UploadPolicy::default();
        let verdict = policy.evaluate(&file(MAX + 1, "text/plain"));
        assert_eq!(verdict, Verdict::TooLarge { max_bytes: MAX });
        assert_eq!(verdict.message(), "File too large! Maximum size is 50MB");
        assert_eq!(verdict.tone(), FeedbackTone::Error);
        assert!(!verdict.allows_submit());
    }

    #[test]
    fn test_limit_is_inclusive() {
        let policy = UploadPolicy::default();
        assert!(policy.evaluate(&file(MAX, "application/pdf")).allows_submit());
    }

    #[test]
    fn test_invalid_type() {
        let verdict = UploadPolicy::default().evaluate(&file(10, "image/png"));
        assert_eq!(
            verdict.message(),
            "Invalid file type! Please upload PDF, DOCX, or PPTX"
        );
        assert!(!verdict.allows_submit());
    }

    #[test]
    fn test_accepted_message() {
        let verdict = UploadPolicy::default().evaluate(&file(
            1536,
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ));
        assert_eq!(verdict.message(), "Selected: deck.pptx (1.5 KB)");
        assert_eq!(verdict.tone(), FeedbackTone::Success);
        assert!(verdict.allows_submit());
    }

    #[test]
    fn test_tone_class_changes() {
        let (remove, add) = FeedbackTone::Success.class_changes();
        assert_eq!(remove, &["text-red-600"]);
        assert_eq!(add, &["text-green-600"]);
        let (remove, add) = FeedbackTone::Error.class_changes();
        assert!(remove.is_empty());
        assert_eq!(add, &["text-red-600"]);
    }

    const MAX: u64 = 52_428_800;

    #[cfg(not(target_arch = "wasm32"))]
    mod properties {
        use super::*;
        use crate::config::ALLOWED_MIME_TYPES;
        use crate::upload::policy::{unit_index, SIZE_UNITS};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn zero_is_the_only_special_case(bytes in 1u64..u64::MAX) {
                prop_assert_ne!(format_file_size(bytes), "0 Bytes");
            }

            #[test]
            fn unit_is_largest_reached(bytes in 1u64..(1u64 << 40)) {
                let index = unit_index(bytes);
                prop_assert!(bytes >= 1024u64.pow(index as u32));
                if index < 3 {
                    prop_assert!(bytes < 1024u64.pow(index as u32 + 1));
                }
                let scaled = bytes as f64 / 1024f64.powi(index as i32);
                let expected = (scaled * 100.0).round() / 100.0;
                let formatted = format_file_size(bytes);
                let (number, unit) = formatted.split_once(' ').unwrap();
                prop_assert_eq!(number.parse::<f64>().unwrap(), expected);
                prop_assert_eq!(unit, SIZE_UNITS[index]);
            }

            #[test]
            fn oversized_always_too_large(size in (MAX + 1)..u64::MAX, mime in ".*") {
                let verdict = UploadPolicy::default().evaluate(&file(size, &mime));
                prop_assert_eq!(verdict, Verdict::TooLarge { max_bytes: MAX });
            }

            #[test]
            fn allowed_within_limit_accepted(size in 0u64..=MAX, pick in 0usize..3) {
                let descriptor = file(size, ALLOWED_MIME_TYPES[pick]);
                let verdict = UploadPolicy::default().evaluate(&descriptor);
                prop_assert!(verdict.allows_submit());
            }
        }
    }
}
