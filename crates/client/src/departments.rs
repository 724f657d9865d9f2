//! Department records

use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::employees::ValidationError;
use crate::error::ClientError;
use crate::fields::department;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentView {
    pub id: i64,
    pub name: String,
}

impl DepartmentView {
    pub fn from_backend(record: &Value) -> Self {
        let empty = Map::new();
        let fields = record.as_object().unwrap_or(&empty);
        Self {
            id: department::ID.get(fields).unwrap_or(0),
            name: department::NAME.get(fields).unwrap_or_default(),
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        self.name
            .to_lowercase()
            .contains(&query.trim().to_lowercase())
    }
}

/// Body of department create and update calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DepartmentInput {
    pub name: String,
}

impl DepartmentInput {
    /// Trimmed, non-empty department name
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::NameRequired);
        }
        Ok(Self {
            name: name.to_string(),
        })
    }
}

impl ApiClient {
    pub async fn list_departments(&self) -> Result<Vec<DepartmentView>, ClientError> {
        let request = self.request(Method::GET, "/api/Department");
        let records = match self.execute_value(&request).await? {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        };
        Ok(records.iter().map(DepartmentView::from_backend).collect())
    }

    pub async fn get_department(&self, id: i64) -> Result<DepartmentView, ClientError> {
        let request = self.request(Method::GET, format!("/api/Department/{id}"));
        let record = self.execute_value(&request).await?.unwrap_or(Value::Null);
        Ok(DepartmentView::from_backend(&record))
    }

    pub async fn create_department(
        &self,
        input: &DepartmentInput,
    ) -> Result<DepartmentView, ClientError> {
        let request = self.request(Method::POST, "/api/Department").json(input)?;
        let record = self.execute_value(&request).await?.unwrap_or(Value::Null);
        Ok(DepartmentView::from_backend(&record))
    }

    pub async fn update_department(
        &self,
        id: i64,
        input: &DepartmentInput,
    ) -> Result<DepartmentView, ClientError> {
        let request = self
            .request(Method::PUT, format!("/api/Department/{id}"))
            .json(input)?;
        let record = self.execute_value(&request).await?.unwrap_or(Value::Null);
        Ok(DepartmentView::from_backend(&record))
    }

    pub async fn delete_department(&self, id: i64) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, format!("/api/Department/{id}"));
        self.execute_empty(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_any_casing() {
        assert_eq!(
            DepartmentView::from_backend(&json!({"DepartmentId": 3, "Name": "R&D"})),
            DepartmentView { id: 3, name: "R&D".into() }
        );
        assert_eq!(
            DepartmentView::from_backend(&json!({"id": 4, "name": "Sales"})),
            DepartmentView { id: 4, name: "Sales".into() }
        );
        assert_eq!(
            DepartmentView::from_backend(&json!({})),
            DepartmentView { id: 0, name: String::new() }
        );
    }

    #[test]
    fn input_is_trimmed_and_required() {
        let input = DepartmentInput::new("  R&D ").unwrap();
        assert_eq!(serde_json::to_value(&input).unwrap(), json!({"Name": "R&D"}));
        assert_eq!(DepartmentInput::new("   "), Err(ValidationError::NameRequired));
    }

    #[test]
    fn search_by_name() {
        let dept = DepartmentView { id: 1, name: "Research".into() };
        assert!(dept.matches("SEARCH"));
        assert!(dept.matches(""));
        assert!(!dept.matches("sales"));
    }
}
