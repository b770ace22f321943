// typegate-core/src/runtime/formats.rs
// ============================================================================
// Module: Typegate String Formats
// Description: Built-in format validators for branded string types.
// Purpose: Provide deterministic, regex-free checks for special strings.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A `string` node may carry a `specialName` naming one of the closed set of
//! built-in formats below. Each format validates deterministically and
//! reports an English reason on failure. The scanners are hand-rolled so the
//! grammar stays exactly as documented rather than drifting with a regex
//! dialect.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Format Names
// ============================================================================

/// Built-in string formats recognised as `specialName` payloads.
///
/// # Invariants
/// - The set is closed; serialized names match the variants verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringFormat {
    /// `YYYY-MM-DD`, a real calendar date.
    IsoDate,
    /// ISO-8601 date and time with at least hours and minutes.
    IsoDatetime,
    /// Non-empty string of at most 100 characters, equal to its trim.
    TrimmedString,
    /// Structurally valid email address, equal to its trim.
    Email,
    /// `+1` followed by exactly 10 digits.
    PhoneNumber,
    /// `###-##-####`.
    SocialSecurityNumber,
    /// 5 digits, optionally `-` and 4 more.
    PostalCode,
    /// 8-4-4-4-12 hexadecimal groups.
    Uuid,
    /// `0`, `-?[1-9][0-9]*`, or `-?[0-9]+.[0-9]+`.
    NumericString,
    /// Non-negative numeric string with at most two fractional digits.
    DollarAmount,
    /// USPS two-letter state and territory codes.
    UsState,
    /// ISO-3166-1 alpha-3 country codes.
    CountryCode,
}

/// All built-in formats, in declaration order.
pub const ALL_FORMATS: [StringFormat; 12] = [
    StringFormat::IsoDate,
    StringFormat::IsoDatetime,
    StringFormat::TrimmedString,
    StringFormat::Email,
    StringFormat::PhoneNumber,
    StringFormat::SocialSecurityNumber,
    StringFormat::PostalCode,
    StringFormat::Uuid,
    StringFormat::NumericString,
    StringFormat::DollarAmount,
    StringFormat::UsState,
    StringFormat::CountryCode,
];

impl StringFormat {
    /// Returns the canonical format name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IsoDate => "IsoDate",
            Self::IsoDatetime => "IsoDatetime",
            Self::TrimmedString => "TrimmedString",
            Self::Email => "Email",
            Self::PhoneNumber => "PhoneNumber",
            Self::SocialSecurityNumber => "SocialSecurityNumber",
            Self::PostalCode => "PostalCode",
            Self::Uuid => "Uuid",
            Self::NumericString => "NumericString",
            Self::DollarAmount => "DollarAmount",
            Self::UsState => "UsState",
            Self::CountryCode => "CountryCode",
        }
    }

    /// Looks a format up by its canonical name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_FORMATS.iter().copied().find(|format| format.as_str() == name)
    }

    /// Validates a string against this format.
    ///
    /// # Errors
    ///
    /// Returns an English reason when the string does not satisfy the
    /// format's grammar.
    pub fn validate(self, value: &str) -> Result<(), String> {
        match self {
            Self::IsoDate => validate_iso_date(value),
            Self::IsoDatetime => validate_iso_datetime(value),
            Self::TrimmedString => validate_trimmed_string(value),
            Self::Email => validate_email(value),
            Self::PhoneNumber => validate_phone_number(value),
            Self::SocialSecurityNumber => validate_social_security_number(value),
            Self::PostalCode => validate_postal_code(value),
            Self::Uuid => validate_uuid(value),
            Self::NumericString => validate_numeric_string(value),
            Self::DollarAmount => validate_dollar_amount(value),
            Self::UsState => validate_us_state(value),
            Self::CountryCode => validate_country_code(value),
        }
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Date and Time Validators
// ============================================================================

/// Days per month, February handled separately.
const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn validate_iso_date(value: &str) -> Result<(), String> {
    parse_calendar_date(value).map(|_| ())
}

fn validate_iso_datetime(value: &str) -> Result<(), String> {
    let Some((date, time)) = value.split_once('T') else {
        return Err("must be an ISO-8601 datetime with a time component".to_string());
    };
    parse_calendar_date(date)?;
    validate_clock_time(time)
}

/// Parses `YYYY-MM-DD` and checks it is a real calendar date.
fn parse_calendar_date(value: &str) -> Result<(u32, u32, u32), String> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && value.char_indices().all(|(index, ch)| {
            index == 4 || index == 7 || ch.is_ascii_digit()
        });
    if !shape_ok {
        return Err("must be a calendar date in YYYY-MM-DD form".to_string());
    }

    let year = parse_digits(&value[0..4]);
    let month = parse_digits(&value[5..7]);
    let day = parse_digits(&value[8..10]);
    if !(1..=12).contains(&month) {
        return Err(format!("month {month} is out of range"));
    }
    let max_day = if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS_IN_MONTH[(month - 1) as usize]
    };
    if day == 0 || day > max_day {
        return Err(format!("day {day} is out of range for month {month}"));
    }
    Ok((year, month, day))
}

/// Validates `HH:MM[:SS[.fff]]` with an optional `Z` or numeric offset.
fn validate_clock_time(value: &str) -> Result<(), String> {
    let core = if let Some(stripped) = value.strip_suffix('Z') {
        stripped
    } else if let Some(position) = value.rfind(['+', '-']) {
        let offset = &value[position + 1..];
        let offset_ok = match offset.len() {
            4 => offset.bytes().all(|byte| byte.is_ascii_digit()),
            5 => {
                offset.as_bytes()[2] == b':'
                    && offset
                        .bytes()
                        .enumerate()
                        .all(|(index, byte)| index == 2 || byte.is_ascii_digit())
            }
            _ => false,
        };
        if !offset_ok {
            return Err("has a malformed timezone offset".to_string());
        }
        &value[..position]
    } else {
        value
    };

    let mut parts = core.split(':');
    let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) else {
        return Err("must include at least hours and minutes".to_string());
    };
    if !is_two_digit_in_range(hours, 23) {
        return Err("has an out-of-range hour".to_string());
    }
    if !is_two_digit_in_range(minutes, 59) {
        return Err("has an out-of-range minute".to_string());
    }
    if let Some(seconds) = parts.next() {
        let (whole, fraction) = match seconds.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (seconds, None),
        };
        if !is_two_digit_in_range(whole, 59) {
            return Err("has an out-of-range second".to_string());
        }
        if let Some(fraction) = fraction {
            if fraction.is_empty() || !fraction.bytes().all(|byte| byte.is_ascii_digit()) {
                return Err("has a malformed fractional second".to_string());
            }
        }
    }
    if parts.next().is_some() {
        return Err("has trailing time components".to_string());
    }
    Ok(())
}

fn is_two_digit_in_range(value: &str, max: u32) -> bool {
    value.len() == 2 && value.bytes().all(|byte| byte.is_ascii_digit()) && parse_digits(value) <= max
}

/// Parses a validated all-digit slice.
fn parse_digits(value: &str) -> u32 {
    value.bytes().fold(0, |total, byte| total * 10 + u32::from(byte - b'0'))
}

const fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

// ============================================================================
// SECTION: Text Validators
// ============================================================================

/// Maximum length of a trimmed string, in characters.
const MAX_TRIMMED_STRING_LENGTH: usize = 100;

fn validate_trimmed_string(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if value != value.trim() {
        return Err("must not carry leading or trailing whitespace".to_string());
    }
    if value.chars().count() > MAX_TRIMMED_STRING_LENGTH {
        return Err(format!("must be at most {MAX_TRIMMED_STRING_LENGTH} characters"));
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if value != value.trim() {
        return Err("must not carry leading or trailing whitespace".to_string());
    }
    if value.chars().any(char::is_whitespace) {
        return Err("must not contain whitespace".to_string());
    }
    let Some((local, domain)) = value.split_once('@') else {
        return Err("must contain an '@'".to_string());
    };
    if local.is_empty() {
        return Err("has an empty local part".to_string());
    }
    if domain.contains('@') {
        return Err("must contain exactly one '@'".to_string());
    }
    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return Err("has a malformed domain".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Numeric and Identifier Validators
// ============================================================================

fn validate_phone_number(value: &str) -> Result<(), String> {
    let Some(digits) = value.strip_prefix("+1") else {
        return Err("must start with '+1'".to_string());
    };
    if digits.len() != 10 || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err("must be '+1' followed by exactly 10 digits".to_string());
    }
    Ok(())
}

fn validate_postal_code(value: &str) -> Result<(), String> {
    let ok = match value.len() {
        5 => value.bytes().all(|byte| byte.is_ascii_digit()),
        10 => {
            value.as_bytes()[5] == b'-'
                && value
                    .bytes()
                    .enumerate()
                    .all(|(index, byte)| index == 5 || byte.is_ascii_digit())
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err("must be 5 digits, optionally followed by '-' and 4 digits".to_string())
    }
}

fn validate_social_security_number(value: &str) -> Result<(), String> {
    let bytes = value.as_bytes();
    let ok = bytes.len() == 11
        && bytes[3] == b'-'
        && bytes[6] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| index == 3 || index == 6 || byte.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err("must match ###-##-####".to_string())
    }
}

/// Expected hexadecimal group lengths of a UUID.
const UUID_GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

fn validate_uuid(value: &str) -> Result<(), String> {
    let groups: Vec<&str> = value.split('-').collect();
    let ok = groups.len() == UUID_GROUPS.len()
        && groups.iter().zip(UUID_GROUPS).all(|(group, length)| {
            group.len() == length && group.bytes().all(|byte| byte.is_ascii_hexdigit())
        });
    if ok {
        Ok(())
    } else {
        Err("must be 8-4-4-4-12 hexadecimal groups".to_string())
    }
}

fn validate_numeric_string(value: &str) -> Result<(), String> {
    if is_numeric_string(value) {
        Ok(())
    } else {
        Err("must be an integer without leading zeros or a decimal".to_string())
    }
}

fn is_numeric_string(value: &str) -> bool {
    if value == "0" {
        return true;
    }
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() {
        return false;
    }
    match digits.split_once('.') {
        Some((whole, fraction)) => {
            !whole.is_empty()
                && !fraction.is_empty()
                && whole.bytes().all(|byte| byte.is_ascii_digit())
                && fraction.bytes().all(|byte| byte.is_ascii_digit())
        }
        None => !digits.starts_with('0') && digits.bytes().all(|byte| byte.is_ascii_digit()),
    }
}

/// Maximum fractional digits of a dollar amount.
const MAX_DOLLAR_FRACTION_DIGITS: usize = 2;

fn validate_dollar_amount(value: &str) -> Result<(), String> {
    if !is_numeric_string(value) {
        return Err("must be a numeric string".to_string());
    }
    if value.starts_with('-') {
        return Err("must not be negative".to_string());
    }
    if let Some((_, fraction)) = value.split_once('.') {
        if fraction.len() > MAX_DOLLAR_FRACTION_DIGITS {
            return Err(format!(
                "must have at most {MAX_DOLLAR_FRACTION_DIGITS} fractional digits"
            ));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Lookup-Table Validators
// ============================================================================

/// USPS two-letter codes: states, DC, territories, and military regions.
const US_STATES: [&str; 59] = [
    "AA", "AE", "AK", "AL", "AP", "AR", "AS", "AZ", "CA", "CO", "CT", "DC", "DE", "FL", "GA",
    "GU", "HI", "IA", "ID", "IL", "IN", "KS", "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO",
    "MP", "MS", "MT", "NC", "ND", "NE", "NH", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA",
    "PR", "RI", "SC", "SD", "TN", "TX", "UT", "VA", "VI", "VT", "WA", "WI", "WV", "WY",
];

/// ISO-3166-1 alpha-3 country codes.
const COUNTRY_CODES: [&str; 249] = [
    "ABW", "AFG", "AGO", "AIA", "ALA", "ALB", "AND", "ARE", "ARG", "ARM", "ASM", "ATA", "ATF",
    "ATG", "AUS", "AUT", "AZE", "BDI", "BEL", "BEN", "BES", "BFA", "BGD", "BGR", "BHR", "BHS",
    "BIH", "BLM", "BLR", "BLZ", "BMU", "BOL", "BRA", "BRB", "BRN", "BTN", "BVT", "BWA", "CAF",
    "CAN", "CCK", "CHE", "CHL", "CHN", "CIV", "CMR", "COD", "COG", "COK", "COL", "COM", "CPV",
    "CRI", "CUB", "CUW", "CXR", "CYM", "CYP", "CZE", "DEU", "DJI", "DMA", "DNK", "DOM", "DZA",
    "ECU", "EGY", "ERI", "ESH", "ESP", "EST", "ETH", "FIN", "FJI", "FLK", "FRA", "FRO", "FSM",
    "GAB", "GBR", "GEO", "GGY", "GHA", "GIB", "GIN", "GLP", "GMB", "GNB", "GNQ", "GRC", "GRD",
    "GRL", "GTM", "GUF", "GUM", "GUY", "HKG", "HMD", "HND", "HRV", "HTI", "HUN", "IDN", "IMN",
    "IND", "IOT", "IRL", "IRN", "IRQ", "ISL", "ISR", "ITA", "JAM", "JEY", "JOR", "JPN", "KAZ",
    "KEN", "KGZ", "KHM", "KIR", "KNA", "KOR", "KWT", "LAO", "LBN", "LBR", "LBY", "LCA", "LIE",
    "LKA", "LSO", "LTU", "LUX", "LVA", "MAC", "MAF", "MAR", "MCO", "MDA", "MDG", "MDV", "MEX",
    "MHL", "MKD", "MLI", "MLT", "MMR", "MNE", "MNG", "MNP", "MOZ", "MRT", "MSR", "MTQ", "MUS",
    "MWI", "MYS", "MYT", "NAM", "NCL", "NER", "NFK", "NGA", "NIC", "NIU", "NLD", "NOR", "NPL",
    "NRU", "NZL", "OMN", "PAK", "PAN", "PCN", "PER", "PHL", "PLW", "PNG", "POL", "PRI", "PRK",
    "PRT", "PRY", "PSE", "PYF", "QAT", "REU", "ROU", "RUS", "RWA", "SAU", "SDN", "SEN", "SGP",
    "SGS", "SHN", "SJM", "SLB", "SLE", "SLV", "SMR", "SOM", "SPM", "SRB", "SSD", "STP", "SUR",
    "SVK", "SVN", "SWE", "SWZ", "SXM", "SYC", "SYR", "TCA", "TCD", "TGO", "THA", "TJK", "TKL",
    "TKM", "TLS", "TON", "TTO", "TUN", "TUR", "TUV", "TWN", "TZA", "UGA", "UKR", "UMI", "URY",
    "USA", "UZB", "VAT", "VCT", "VEN", "VGB", "VIR", "VNM", "VUT", "WLF", "WSM", "YEM", "ZAF",
    "ZMB", "ZWE",
];

fn validate_us_state(value: &str) -> Result<(), String> {
    if US_STATES.contains(&value) {
        Ok(())
    } else {
        Err("is not a USPS state code".to_string())
    }
}

fn validate_country_code(value: &str) -> Result<(), String> {
    if COUNTRY_CODES.contains(&value) {
        Ok(())
    } else {
        Err("is not an ISO-3166-1 alpha-3 country code".to_string())
    }
}
