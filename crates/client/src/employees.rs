//! Employee records

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::fields::employee;
use crate::naming::{self, NameParts};

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"));
static PHONE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern is valid"));

/// Employee as the UI works with it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeView {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Derived display name, never empty
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
    pub job_role: Option<String>,
    pub gender: Option<String>,
    /// Record exactly as the backend sent it
    #[serde(skip)]
    pub raw: Value,
}

impl EmployeeView {
    /// Map a backend record of any casing
    pub fn from_backend(record: &Value) -> Self {
        let empty = Map::new();
        let fields = record.as_object().unwrap_or(&empty);

        let id = employee::ID.get(fields).unwrap_or(0);
        let first_name = employee::FIRST_NAME.get_non_empty(fields);
        let last_name = employee::LAST_NAME.get_non_empty(fields);
        let full_name = employee::FULL_NAME.get_non_empty(fields);
        let email = employee::EMAIL.get_non_empty(fields);

        let name = naming::display_name(&NameParts {
            id: Some(id),
            first_name: first_name.as_deref(),
            last_name: last_name.as_deref(),
            full_name: full_name.as_deref(),
            email: email.as_deref(),
        });

        Self {
            id,
            first_name,
            last_name,
            name,
            email,
            phone: employee::PHONE.get_non_empty(fields),
            department_id: employee::DEPARTMENT_ID.get(fields),
            department_name: employee::DEPARTMENT_NAME.get_non_empty(fields),
            job_role: employee::JOB_ROLE.get_non_empty(fields),
            gender: employee::GENDER.get_non_empty(fields),
            raw: record.clone(),
        }
    }

    /// Avatar letter
    pub fn initial(&self) -> char {
        naming::initial(&self.name)
    }

    /// Case-insensitive search over the visible columns
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.id.to_string().contains(&query)
            || self.name.to_lowercase().contains(&query)
            || [
                &self.email,
                &self.phone,
                &self.department_name,
                &self.job_role,
            ]
            .into_iter()
            .flatten()
            .any(|value| value.to_lowercase().contains(&query))
    }
}

/// Rejected form input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("First name required")]
    FirstNameRequired,

    #[error("Last name required")]
    LastNameRequired,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Phone must be exactly 10 digits")]
    InvalidPhone,

    #[error("Name required")]
    NameRequired,
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || EMAIL_SHAPE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

fn check_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() || PHONE_SHAPE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Body of `POST /api/User/AddEmployee`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "PhoneNo", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// Body of `PUT /api/Employee/{id}`; only present fields are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmployeeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "PhoneNo", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl EmployeeUpdate {
    /// Check the fields that are being changed
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(ValidationError::FirstNameRequired);
        }
        if self.last_name.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(ValidationError::LastNameRequired);
        }
        check_email(self.email.as_deref().unwrap_or_default().trim())?;
        check_phone(self.phone.as_deref().unwrap_or_default().trim())
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl From<NewEmployee> for EmployeeUpdate {
    fn from(employee: NewEmployee) -> Self {
        Self {
            first_name: Some(employee.first_name),
            last_name: Some(employee.last_name),
            email: employee.email,
            phone: employee.phone,
            department_id: employee.department_id,
            job_role: employee.job_role,
            gender: employee.gender,
        }
    }
}

/// Editable employee fields as entered by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department_id: Option<i64>,
    pub job_role: String,
    pub gender: String,
}

impl EmployeeForm {
    /// Pre-fill from an existing record.
    ///
    /// Without explicit name parts, a server-supplied full name is split
    /// into first and last name; `Employee <id>` placeholders are left out.
    pub fn from_view(view: &EmployeeView) -> Self {
        let (mut first_name, mut last_name) = (
            view.first_name.clone().unwrap_or_default(),
            view.last_name.clone().unwrap_or_default(),
        );

        if first_name.is_empty() && last_name.is_empty() {
            let full_name = view
                .raw
                .as_object()
                .and_then(|fields| employee::FULL_NAME.get(fields));
            if let Some((first, rest)) = full_name.as_deref().and_then(naming::split_full_name) {
                first_name = first;
                last_name = rest;
            }
        }

        Self {
            first_name,
            last_name,
            email: view.email.clone().unwrap_or_default(),
            phone: view.phone.clone().unwrap_or_default(),
            department_id: view.department_id,
            job_role: view.job_role.clone().unwrap_or_default(),
            gender: view.gender.clone().unwrap_or_default(),
        }
    }

    /// Validate and trim into a request body
    pub fn validate(&self) -> Result<NewEmployee, ValidationError> {
        let first_name = non_empty(&self.first_name).ok_or(ValidationError::FirstNameRequired)?;
        let last_name = non_empty(&self.last_name).ok_or(ValidationError::LastNameRequired)?;
        check_email(self.email.trim())?;
        check_phone(self.phone.trim())?;

        Ok(NewEmployee {
            first_name,
            last_name,
            email: non_empty(&self.email),
            phone: non_empty(&self.phone),
            department_id: self.department_id,
            job_role: non_empty(&self.job_role),
            gender: non_empty(&self.gender),
        })
    }
}

fn record_or_none(value: Option<Value>) -> Option<EmployeeView> {
    value
        .filter(Value::is_object)
        .map(|record| EmployeeView::from_backend(&record))
}

impl ApiClient {
    /// All employees
    pub async fn list_employees(&self) -> Result<Vec<EmployeeView>, ClientError> {
        let request = self.request(Method::GET, "/api/Employee");
        let records = match self.execute_value(&request).await? {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        };
        Ok(records.iter().map(EmployeeView::from_backend).collect())
    }

    /// One employee
    pub async fn get_employee(&self, id: i64) -> Result<EmployeeView, ClientError> {
        let request = self.request(Method::GET, format!("/api/Employee/{id}"));
        let record = self.execute_value(&request).await?.unwrap_or(Value::Null);
        Ok(EmployeeView::from_backend(&record))
    }

    /// Create an employee; the backend may answer without the record
    pub async fn create_employee(
        &self,
        employee: &NewEmployee,
    ) -> Result<Option<EmployeeView>, ClientError> {
        let request = self
            .request(Method::POST, "/api/User/AddEmployee")
            .json(employee)?;
        Ok(record_or_none(self.execute_value(&request).await?))
    }

    /// Change the present fields of an employee
    pub async fn update_employee(
        &self,
        id: i64,
        update: &EmployeeUpdate,
    ) -> Result<Option<EmployeeView>, ClientError> {
        let request = self
            .request(Method::PUT, format!("/api/Employee/{id}"))
            .json(update)?;
        Ok(record_or_none(self.execute_value(&request).await?))
    }

    pub async fn delete_employee(&self, id: i64) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, format!("/api/Employee/{id}"));
        self.execute_empty(&request).await
    }
}
