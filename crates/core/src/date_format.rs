use crate::month::month_names;
use regex::{Captures, Regex};
use thiserror::Error;

/// Underscore, period, hyphen and space.
pub const DEFAULT_INPUT_SEPARATORS: &str = "_.- ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Year,
    Month,
    Day,
}

/// One of the eight field codes a mode specifier may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldToken {
    /// `y`: two or four digit year.
    YearAny,
    /// `yy`
    YearShort,
    /// `yyyy`
    YearLong,
    /// `m`: month number, padded or not.
    MonthAny,
    /// `mm`
    MonthPadded,
    /// `mmm`: alphabetic month name.
    MonthName,
    /// `d`: day, padded or not.
    DayAny,
    /// `dd`
    DayPadded,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateFormatError {
    #[error("invalid date format `{mode}`: {reason}")]
    InvalidMode { mode: String, reason: String },
    #[error("input separator set must not be empty")]
    EmptySeparators,
    #[error("date pattern could not be built: {0}")]
    InvalidPattern(String),
}

impl FieldToken {
    fn from_run(letter: char, len: usize) -> Option<Self> {
        match (letter, len) {
            ('y', 1) => Some(Self::YearAny),
            ('y', 2) => Some(Self::YearShort),
            ('y', 4) => Some(Self::YearLong),
            ('m', 1) => Some(Self::MonthAny),
            ('m', 2) => Some(Self::MonthPadded),
            ('m', 3) => Some(Self::MonthName),
            ('d', 1) => Some(Self::DayAny),
            ('d', 2) => Some(Self::DayPadded),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::YearAny => "y",
            Self::YearShort => "yy",
            Self::YearLong => "yyyy",
            Self::MonthAny => "m",
            Self::MonthPadded => "mm",
            Self::MonthName => "mmm",
            Self::DayAny => "d",
            Self::DayPadded => "dd",
        }
    }

    pub fn field(self) -> DateField {
        match self {
            Self::YearAny | Self::YearShort | Self::YearLong => DateField::Year,
            Self::MonthAny | Self::MonthPadded | Self::MonthName => DateField::Month,
            Self::DayAny | Self::DayPadded => DateField::Day,
        }
    }

    /// Variable-width numeric codes have no right boundary of their own, so
    /// the separator after them cannot be optional.
    pub fn requires_separator(self) -> bool {
        matches!(self, Self::YearAny | Self::MonthAny | Self::DayAny)
    }

    fn sub_pattern(self) -> String {
        match self {
            Self::YearAny => r"(?P<year>[0-9]{2,4})".to_string(),
            Self::YearShort => r"(?P<year>[0-9]{2})".to_string(),
            Self::YearLong => r"(?P<year>[0-9]{4})".to_string(),
            Self::MonthAny => r"(?P<month>[0-9]{1,2})".to_string(),
            Self::MonthPadded => r"(?P<month>[0-9]{2})".to_string(),
            Self::MonthName => format!("(?P<month>(?i:{}))", month_names().join("|")),
            Self::DayAny => r"(?P<day>[0-9]{1,2})".to_string(),
            Self::DayPadded => r"(?P<day>[0-9]{2})".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePatternOptions {
    /// Characters accepted between date fields in file names.
    pub separators: String,
    /// Reject commas between fields instead of tolerating one after each.
    pub strict_commas: bool,
}

impl Default for DatePatternOptions {
    fn default() -> Self {
        Self {
            separators: DEFAULT_INPUT_SEPARATORS.to_string(),
            strict_commas: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompiledDatePattern {
    mode: String,
    fields: [FieldToken; 3],
    regex: Regex,
}

/// Raw captures of one match, borrowed from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedDate<'h> {
    pub prefix: &'h str,
    pub year: &'h str,
    pub month: &'h str,
    pub day: &'h str,
    pub suffix: &'h str,
}

impl CompiledDatePattern {
    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn fields(&self) -> [FieldToken; 3] {
        self.fields
    }

    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    pub fn extract<'h>(&self, file_name: &'h str) -> Option<ExtractedDate<'h>> {
        let caps = self.regex.captures(file_name)?;
        Some(ExtractedDate {
            prefix: group(&caps, "prefix"),
            year: group(&caps, "year"),
            month: group(&caps, "month"),
            day: group(&caps, "day"),
            suffix: group(&caps, "suffix"),
        })
    }
}

fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map_or("", |m| m.as_str())
}

/// Splits a mode specifier such as `mmddyyyy` or `d/m/y` into its three
/// field tokens.
pub fn parse_mode(mode: &str) -> Result<[FieldToken; 3], DateFormatError> {
    let invalid = |reason: String| DateFormatError::InvalidMode {
        mode: mode.to_string(),
        reason,
    };

    let normalized = mode.trim().to_ascii_lowercase();
    let mut tokens = Vec::with_capacity(3);
    let mut chars = normalized.chars().peekable();

    while let Some(letter) = chars.next() {
        if !matches!(letter, 'd' | 'm' | 'y') {
            return Err(invalid(format!("unexpected character `{letter}`")));
        }
        let mut len = 1usize;
        while chars.next_if_eq(&letter).is_some() {
            len += 1;
        }
        let token = FieldToken::from_run(letter, len).ok_or_else(|| {
            invalid(format!(
                "unsupported field `{}`",
                letter.to_string().repeat(len)
            ))
        })?;
        tokens.push(token);
        if tokens.len() == 3 {
            break;
        }
        // One grouping character between fields is allowed and ignored.
        chars.next_if(|c| !c.is_alphanumeric());
    }

    if let Some(extra) = chars.next() {
        return Err(invalid(format!("unexpected trailing `{extra}`")));
    }

    let tokens: [FieldToken; 3] = tokens
        .try_into()
        .map_err(|_| invalid("expected exactly three fields".to_string()))?;

    let [a, b, c] = tokens.map(FieldToken::field);
    if a == b || b == c || a == c {
        return Err(invalid(
            "needs exactly one day, one month and one year field".to_string(),
        ));
    }

    Ok(tokens)
}

pub fn compile(
    mode: &str,
    options: &DatePatternOptions,
) -> Result<CompiledDatePattern, DateFormatError> {
    let fields = parse_mode(mode)?;
    let separator = separator_class(&options.separators)?;
    let comma = if options.strict_commas { "" } else { ",?" };

    let mut source = String::from(r"(?s)^(?P<prefix>.*?)");
    for (index, token) in fields.iter().enumerate() {
        source.push_str(&token.sub_pattern());
        if index + 1 < fields.len() {
            source.push_str(comma);
            source.push_str(&separator);
            if !token.requires_separator() {
                source.push('?');
            }
        }
    }
    source.push_str(r"(?P<suffix>.*)$");

    let regex =
        Regex::new(&source).map_err(|err| DateFormatError::InvalidPattern(err.to_string()))?;

    Ok(CompiledDatePattern {
        mode: mode.to_string(),
        fields,
        regex,
    })
}

fn separator_class(separators: &str) -> Result<String, DateFormatError> {
    if separators.is_empty() {
        return Err(DateFormatError::EmptySeparators);
    }
    let mut class = String::from("[");
    for ch in separators.chars() {
        class.push_str(&regex::escape(&ch.to_string()));
    }
    class.push(']');
    Ok(class)
}
