//! Backend field extraction
//!
//! The backend is inconsistent about casing (`FirstName`, `firstName`,
//! `first`). Each logical field is declared once as an ordered alias list and
//! an extractor; the first alias holding a non-null value wins.

use serde_json::{Map, Value};

/// One logical field of a backend record
#[derive(Debug, Clone, Copy)]
pub struct Field<T: 'static> {
    pub aliases: &'static [&'static str],
    pub extract: fn(&Value) -> Option<T>,
}

impl<T> Field<T> {
    pub const fn new(aliases: &'static [&'static str], extract: fn(&Value) -> Option<T>) -> Self {
        Self { aliases, extract }
    }

    /// Value of the first non-null alias, if it converts
    pub fn get(&self, record: &Map<String, Value>) -> Option<T> {
        self.aliases
            .iter()
            .find_map(|name| record.get(*name).filter(|value| !value.is_null()))
            .and_then(self.extract)
    }
}

impl Field<String> {
    /// Like [`Field::get`], treating an empty string as absent
    pub fn get_non_empty(&self, record: &Map<String, Value>) -> Option<String> {
        self.get(record).filter(|text| !text.is_empty())
    }
}

/// Strings are trimmed; numbers and booleans are stringified
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Integral numbers, or strings holding one
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0)
                .map(|float| float as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

pub mod employee {
    use super::{Field, as_integer, as_text};

    pub const ID: Field<i64> = Field::new(&["EmployeeId", "employeeId", "id"], as_integer);
    pub const FIRST_NAME: Field<String> = Field::new(&["FirstName", "firstName", "first"], as_text);
    pub const LAST_NAME: Field<String> = Field::new(&["LastName", "lastName", "last"], as_text);
    pub const FULL_NAME: Field<String> =
        Field::new(&["FullName", "fullName", "Name", "name"], as_text);
    pub const EMAIL: Field<String> = Field::new(&["Email", "email"], as_text);
    pub const PHONE: Field<String> = Field::new(&["PhoneNo", "phoneNo", "Phone", "phone"], as_text);
    pub const DEPARTMENT_ID: Field<i64> =
        Field::new(&["DepartmentId", "departmentId"], as_integer);
    pub const DEPARTMENT_NAME: Field<String> =
        Field::new(&["DepartmentName", "departmentName"], as_text);
    pub const JOB_ROLE: Field<String> = Field::new(&["JobRole", "jobRole"], as_text);
    pub const GENDER: Field<String> = Field::new(&["Gender", "gender"], as_text);
}

pub mod department {
    use super::{Field, as_integer, as_text};

    pub const ID: Field<i64> = Field::new(&["DepartmentId", "departmentId", "id"], as_integer);
    pub const NAME: Field<String> = Field::new(&["Name", "name"], as_text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn first_alias_wins() {
        let rec = record(json!({"firstName": "ann", "FirstName": "Ann", "first": "A"}));
        assert_eq!(employee::FIRST_NAME.get(&rec).as_deref(), Some("Ann"));
    }

    #[test]
    fn null_falls_through_but_empty_does_not() {
        let rec = record(json!({"FirstName": null, "firstName": "  Ann "}));
        assert_eq!(employee::FIRST_NAME.get(&rec).as_deref(), Some("Ann"));

        let rec = record(json!({"FirstName": "", "firstName": "Ann"}));
        assert_eq!(employee::FIRST_NAME.get(&rec).as_deref(), Some(""));
        assert_eq!(employee::FIRST_NAME.get_non_empty(&rec), None);
    }

    #[test]
    fn integers_from_numbers_and_strings() {
        assert_eq!(employee::ID.get(&record(json!({"EmployeeId": 7}))), Some(7));
        assert_eq!(employee::ID.get(&record(json!({"id": "12"}))), Some(12));
        assert_eq!(employee::ID.get(&record(json!({"id": 3.0}))), Some(3));
        assert_eq!(employee::ID.get(&record(json!({"id": "x"}))), None);
        assert_eq!(employee::ID.get(&record(json!({}))), None);
    }

    #[test]
    fn phone_aliases() {
        let rec = record(json!({"Phone": 5551234567_i64}));
        assert_eq!(employee::PHONE.get(&rec).as_deref(), Some("5551234567"));
    }

    #[test]
    fn department_fields() {
        let rec = record(json!({"departmentId": 4, "name": "R&D"}));
        assert_eq!(department::ID.get(&rec), Some(4));
        assert_eq!(department::NAME.get(&rec).as_deref(), Some("R&D"));
    }
}
