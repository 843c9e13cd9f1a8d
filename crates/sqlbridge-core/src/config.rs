//! Compiler and marshaller configuration.
//!
//! Options can be built in code or loaded from a JSON document.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Final-pass case folding applied to rendered SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    /// Leave the SQL as rendered
    #[default]
    AsIs,
    /// Lower-case everything outside quotes
    Lower,
    /// Upper-case everything outside quotes
    Upper,
}

/// Decimal rounding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round half away from zero
    #[default]
    HalfUp,
    /// Round half toward zero
    HalfDown,
    /// Round half to the nearest even digit
    HalfEven,
    /// Round away from zero
    Up,
    /// Truncate toward zero
    Down,
    /// Round toward positive infinity
    Ceiling,
    /// Round toward negative infinity
    Floor,
}

/// Global decimal defaults, the lowest-priority tier for DECIMAL binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimalDefaults {
    /// Scale applied when neither the call nor the column gives one
    pub scale: u32,
    /// Rounding mode applied when the call gives none
    pub rounding: RoundingMode,
}

impl Default for DecimalDefaults {
    fn default() -> Self {
        Self {
            scale: 2,
            rounding: RoundingMode::HalfUp,
        }
    }
}

/// Options shared by the query compiler and the parameter marshaller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Case folding of the final SQL text
    pub text_case: TextCase,
    /// Global decimal defaults
    pub decimal: DecimalDefaults,
    /// Bind empty STRING values as NULL
    pub empty_string_as_null: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            text_case: TextCase::AsIs,
            decimal: DecimalDefaults::default(),
            empty_string_as_null: true,
        }
    }
}

impl CompileOptions {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        tracing::debug!(?options, "Loaded compile options");
        Ok(options)
    }

    /// Set the final-pass case folding.
    pub fn text_case(mut self, text_case: TextCase) -> Self {
        self.text_case = text_case;
        self
    }

    /// Set the global decimal scale.
    pub fn decimal_scale(mut self, scale: u32) -> Self {
        self.decimal.scale = scale;
        self
    }

    /// Set the global rounding mode.
    pub fn rounding(mut self, rounding: RoundingMode) -> Self {
        self.decimal.rounding = rounding;
        self
    }

    /// Choose whether empty strings bind as NULL.
    pub fn empty_string_as_null(mut self, enabled: bool) -> Self {
        self.empty_string_as_null = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_defaults() {
        let options = CompileOptions::default();
        assert_eq!(options.text_case, TextCase::AsIs);
        assert_eq!(options.decimal.scale, 2);
        assert_eq!(options.decimal.rounding, RoundingMode::HalfUp);
        assert!(options.empty_string_as_null);
    }

    #[test]
    fn test_from_json_partial_document() {
        let options =
            CompileOptions::from_json(r#"{"text_case":"upper","decimal":{"scale":4}}"#).unwrap();
        assert_eq!(options.text_case, TextCase::Upper);
        assert_eq!(options.decimal.scale, 4);
        assert_eq!(options.decimal.rounding, RoundingMode::HalfUp);
        assert!(options.empty_string_as_null);
    }

    #[test]
    fn test_from_json_rejects_unknown_variant() {
        let err = CompileOptions::from_json(r#"{"text_case":"title"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_setters() {
        let options = CompileOptions::new()
            .text_case(TextCase::Lower)
            .decimal_scale(6)
            .rounding(RoundingMode::HalfEven)
            .empty_string_as_null(false);
        assert_eq!(options.text_case, TextCase::Lower);
        assert_eq!(options.decimal.scale, 6);
        assert_eq!(options.decimal.rounding, RoundingMode::HalfEven);
        assert!(!options.empty_string_as_null);
    }
}
