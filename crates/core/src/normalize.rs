use crate::date_format::CompiledDatePattern;
use crate::month::resolve_month;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_CENTURY_PREFIX: &str = "20";
pub const DEFAULT_OUTPUT_SEPARATOR: &str = "-";

/// How a two-digit year becomes a four-digit one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CenturyRule {
    /// Prepend this literal two-digit string.
    Prefix(String),
    /// Years below the threshold land in the 2000s, the rest in the 1900s.
    Rollover(u32),
}

impl Default for CenturyRule {
    fn default() -> Self {
        Self::Prefix(DEFAULT_CENTURY_PREFIX.to_string())
    }
}

impl CenturyRule {
    pub fn validate(&self) -> Result<(), NormalizeError> {
        match self {
            Self::Prefix(prefix) => {
                if prefix.len() == 2 && prefix.bytes().all(|b| b.is_ascii_digit()) {
                    Ok(())
                } else {
                    Err(NormalizeError::InvalidCentury(prefix.clone()))
                }
            }
            Self::Rollover(threshold) if *threshold > 100 => {
                Err(NormalizeError::InvalidRollover(*threshold))
            }
            Self::Rollover(_) => Ok(()),
        }
    }

    fn expand(&self, short_year: &str) -> String {
        let century = match self {
            Self::Prefix(prefix) => prefix.as_str(),
            Self::Rollover(threshold) => match short_year.parse::<u32>() {
                Ok(year) if year < *threshold => "20",
                _ => "19",
            },
        };
        format!("{century}{short_year}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub century: CenturyRule,
    pub output_separator: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            century: CenturyRule::default(),
            output_separator: DEFAULT_OUTPUT_SEPARATOR.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("unable to normalize month `{month}` in `{file_name}`")]
    UnknownMonth { month: String, file_name: String },
    #[error("century prefix must be two digits, got `{0}`")]
    InvalidCentury(String),
    #[error("century rollover must be between 0 and 100, got {0}")]
    InvalidRollover(u32),
}

/// Rewrites the first date found in `file_name` as `yyyy-mm-dd`.
///
/// Returns `Ok(None)` when the pattern does not match; everything around the
/// date is kept verbatim.
pub fn rewrite_date(
    file_name: &str,
    pattern: &CompiledDatePattern,
    options: &NormalizeOptions,
) -> Result<Option<String>, NormalizeError> {
    let Some(date) = pattern.extract(file_name) else {
        return Ok(None);
    };

    let year = if date.year.len() == 2 {
        options.century.expand(date.year)
    } else {
        date.year.to_string()
    };

    let month = resolve_month(date.month).ok_or_else(|| NormalizeError::UnknownMonth {
        month: date.month.to_string(),
        file_name: file_name.to_string(),
    })?;

    let day = if date.day.len() == 1 {
        format!("0{}", date.day)
    } else {
        date.day.to_string()
    };

    let sep = &options.output_separator;
    Ok(Some(format!(
        "{}{year}{sep}{month}{sep}{day}{}",
        date.prefix, date.suffix
    )))
}

/// Like [`rewrite_date`], but a file name without a recognizable date comes
/// back unchanged with a warning instead of `None`.
pub fn normalize_date(
    file_name: &str,
    pattern: &CompiledDatePattern,
    options: &NormalizeOptions,
) -> Result<String, NormalizeError> {
    match rewrite_date(file_name, pattern, options)? {
        Some(renamed) => Ok(renamed),
        None => {
            warn!(file_name, mode = pattern.mode(), "no date match found");
            Ok(file_name.to_string())
        }
    }
}
