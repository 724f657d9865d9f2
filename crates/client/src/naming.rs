//! Display names for employees
//!
//! One derivation shared by list rows, form pre-fill and avatar initials.

use once_cell::sync::Lazy;
use regex::Regex;

/// Name shown when nothing else identifies the record
pub const UNKNOWN_NAME: &str = "Unknown";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Employee\s+\d+$").expect("placeholder pattern is valid"));

/// Whatever the backend told us about a person's name
#[derive(Debug, Default, Clone, Copy)]
pub struct NameParts<'a> {
    pub id: Option<i64>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub full_name: Option<&'a str>,
    pub email: Option<&'a str>,
}

type Rule = fn(&NameParts<'_>) -> Option<String>;

/// Evaluated in order; the first rule producing a name wins
const RULES: &[Rule] = &[from_parts, from_full_name, from_email, from_id];

fn from_parts(parts: &NameParts<'_>) -> Option<String> {
    let first = parts.first_name.unwrap_or_default().trim();
    let last = parts.last_name.unwrap_or_default().trim();
    let joined = format!("{first} {last}");
    let joined = joined.trim();
    (!joined.is_empty()).then(|| joined.to_string())
}

fn from_full_name(parts: &NameParts<'_>) -> Option<String> {
    let name = parts.full_name?.trim();
    (!name.is_empty() && !is_placeholder(name)).then(|| name.to_string())
}

fn from_email(parts: &NameParts<'_>) -> Option<String> {
    let local = parts.email?.trim().split('@').next()?.trim();
    (!local.is_empty()).then(|| local.to_string())
}

fn from_id(parts: &NameParts<'_>) -> Option<String> {
    parts.id.filter(|id| *id != 0).map(placeholder)
}

/// Human-readable name for an employee record
pub fn display_name(parts: &NameParts<'_>) -> String {
    RULES
        .iter()
        .find_map(|rule| rule(parts))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// `Employee <id>`
pub fn placeholder(id: i64) -> String {
    format!("Employee {id}")
}

/// Whether `name` is a synthetic `Employee <id>` label rather than a name
pub fn is_placeholder(name: &str) -> bool {
    PLACEHOLDER.is_match(name.trim())
}

/// Uppercased first letter for avatars, `?` when there is none
pub fn initial(name: &str) -> char {
    name.trim()
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('?')
}

/// Split a free-form full name into first name and the rest.
///
/// Placeholders are not names and yield nothing.
pub fn split_full_name(name: &str) -> Option<(String, String)> {
    let name = name.trim();
    if name.is_empty() || is_placeholder(name) {
        return None;
    }
    let mut words = name.split_whitespace();
    let first = words.next()?.to_string();
    let rest = words.collect::<Vec<_>>().join(" ");
    Some((first, rest))
}
