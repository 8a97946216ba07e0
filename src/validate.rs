// Local input checks run before any request is sent. Each returns the
// message shown next to the offending input.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub type Check = Result<(), String>;

pub const LOGIN_PASSWORD_MIN: usize = 6;
pub const REGISTER_PASSWORD_MIN: usize = 8;
pub const PHONE_DIGITS_MIN: usize = 7;
pub const PHONE_DIGITS_MAX: usize = 15;
pub const MAX_STARS: u8 = 5;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PASSWORD_CHARSET_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn password_charset_regex() -> &'static Regex {
    PASSWORD_CHARSET_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z\d@$!%*#?&]+$")
            .unwrap_or_else(|error| panic!("password regex failed to compile: {error}"))
    })
}

pub fn required(value: &str, message: &str) -> Check {
    if value.trim().is_empty() {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

pub fn email(value: &str) -> Check {
    required(value, "Email is required")?;
    if email_regex().is_match(value.trim()) {
        Ok(())
    } else {
        Err("Invalid email address".to_string())
    }
}

pub fn login_password(value: &str) -> Check {
    if value.is_empty() {
        return Err("Password is required".to_string());
    }
    if value.chars().count() < LOGIN_PASSWORD_MIN {
        return Err(format!(
            "Password must be at least {} characters",
            LOGIN_PASSWORD_MIN
        ));
    }
    Ok(())
}

// At least eight characters from a limited symbol set, with one letter and one digit
pub fn register_password(value: &str) -> Check {
    if value.is_empty() {
        return Err("Password is required".to_string());
    }
    if value.chars().count() < REGISTER_PASSWORD_MIN {
        return Err(format!(
            "Password must be at least {} characters",
            REGISTER_PASSWORD_MIN
        ));
    }
    let has_letter = value.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit || !password_charset_regex().is_match(value) {
        return Err("Password must contain at least one letter and one number".to_string());
    }
    Ok(())
}

pub fn password_confirmation(password: &str, confirmation: &str, message: &str) -> Check {
    if confirmation.is_empty() {
        return Err("Please confirm your password".to_string());
    }
    if password != confirmation {
        return Err(message.to_string());
    }
    Ok(())
}

// Empty is allowed; the profile phone number is optional
pub fn phone_number(value: &str) -> Check {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    if value
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.')))
    {
        return Err("Enter a valid phone number.".to_string());
    }
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if digits < PHONE_DIGITS_MIN {
        return Err("Phone number must contain at least 7 digits.".to_string());
    }
    if digits > PHONE_DIGITS_MAX {
        return Err("Phone number must not exceed 15 digits.".to_string());
    }
    Ok(())
}

// Empty is allowed; otherwise an absolute http(s) URL
pub fn website(value: &str) -> Check {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err("Enter a valid URL.".to_string()),
    }
}

pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(NaiveDate, NaiveDate), String> {
    let (Some(start), Some(end)) = (start, end) else {
        return Err("Please select both a start and end date.".to_string());
    };
    if end <= start {
        return Err("End date must be after start date.".to_string());
    }
    Ok((start, end))
}

pub fn rating(value: u8) -> Check {
    if (1..=MAX_STARS).contains(&value) {
        Ok(())
    } else {
        Err(format!("Rating must be between 1 and {}.", MAX_STARS))
    }
}

pub fn stars(value: u8) -> Check {
    if value <= MAX_STARS {
        Ok(())
    } else {
        Err(format!("Stars must be between 0 and {}.", MAX_STARS))
    }
}

// Optional numeric input: blank is "missing", anything else must parse
pub fn parse_number<T: std::str::FromStr>(value: &str, missing: &str, invalid: &str) -> Result<T, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(missing.to_string());
    }
    value.parse::<T>().map_err(|_| invalid.to_string())
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
