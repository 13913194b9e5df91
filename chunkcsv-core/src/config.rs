//! Parser configuration, fixed at construction.

use thiserror::Error;

/// Rejected configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("separator {0:?} collides with quoting or line endings")]
    InvalidSeparator(char),
    #[error("radix {0} outside 2..=36")]
    InvalidRadix(u32),
}

/// Tokenizer and record-policy settings.
///
/// ```
/// use chunkcsv_core::ParserConfig;
///
/// let config = ParserConfig::default()
///     .with_separator(b'\t')
///     .with_trim_spaces(true)
///     .with_parse_header(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserConfig {
    pub separator: u8,
    /// Drop whitespace around unquoted fields.
    pub trim_spaces: bool,
    /// Treat a run of separators as one.
    pub collapse_separators: bool,
    /// Fill missing trailing columns with defaults instead of failing.
    pub tolerate_partial: bool,
    /// Read column names from the first record.
    pub parse_header: bool,
    /// Discard the first record. Ignored when `parse_header` is set.
    pub skip_first_record: bool,
    /// Drop fields past the last column instead of failing.
    pub ignore_extra_columns: bool,
    pub radix: u32,
    pub default_int: i64,
    pub default_float: f32,
    pub default_double: f64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            separator: b',',
            trim_spaces: false,
            collapse_separators: false,
            tolerate_partial: false,
            parse_header: false,
            skip_first_record: false,
            ignore_extra_columns: false,
            radix: 10,
            default_int: i64::MAX,
            default_float: f32::NAN,
            default_double: f64::NAN,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_trim_spaces(mut self, yes: bool) -> Self {
        self.trim_spaces = yes;
        self
    }

    pub fn with_collapse_separators(mut self, yes: bool) -> Self {
        self.collapse_separators = yes;
        self
    }

    pub fn with_tolerate_partial(mut self, yes: bool) -> Self {
        self.tolerate_partial = yes;
        self
    }

    pub fn with_parse_header(mut self, yes: bool) -> Self {
        self.parse_header = yes;
        self
    }

    pub fn with_skip_first_record(mut self, yes: bool) -> Self {
        self.skip_first_record = yes;
        self
    }

    pub fn with_ignore_extra_columns(mut self, yes: bool) -> Self {
        self.ignore_extra_columns = yes;
        self
    }

    pub fn with_radix(mut self, radix: u32) -> Self {
        self.radix = radix;
        self
    }

    pub fn with_default_int(mut self, sentinel: i64) -> Self {
        self.default_int = sentinel;
        self
    }

    pub fn with_default_float(mut self, sentinel: f32) -> Self {
        self.default_float = sentinel;
        self
    }

    pub fn with_default_double(mut self, sentinel: f64) -> Self {
        self.default_double = sentinel;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if matches!(self.separator, b'"' | b'\n' | b'\r') {
            return Err(ConfigError::InvalidSeparator(char::from(self.separator)));
        }
        if !(2..=36).contains(&self.radix) {
            return Err(ConfigError::InvalidRadix(self.radix));
        }
        Ok(())
    }

    /// Whitespace around unquoted fields is discarded.
    #[inline]
    pub(crate) fn skips_blanks(&self) -> bool {
        self.trim_spaces || self.collapse_separators
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ParserConfig::default();
        assert_eq!(c.separator, b',');
        assert_eq!(c.radix, 10);
        assert_eq!(c.default_int, i64::MAX);
        assert!(c.default_double.is_nan());
        assert!(c.default_float.is_nan());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_separator() {
        for sep in [b'"', b'\n', b'\r'] {
            let c = ParserConfig::default().with_separator(sep);
            assert_eq!(c.validate(), Err(ConfigError::InvalidSeparator(char::from(sep))));
        }
        assert!(ParserConfig::default().with_separator(b' ').validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_radix() {
        assert_eq!(ParserConfig::default().with_radix(1).validate(), Err(ConfigError::InvalidRadix(1)));
        assert_eq!(ParserConfig::default().with_radix(37).validate(), Err(ConfigError::InvalidRadix(37)));
        assert!(ParserConfig::default().with_radix(36).validate().is_ok());
    }
}
