//! Login, logout and record endpoints against a mock backend

mod common;

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use staffdir_client::{
    ApiClient, AuthPaths, ClientError, CredentialStore, DepartmentInput, EmployeeUpdate,
    MemoryStore, NewEmployee, Role,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use common::{client, logged_in};

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = ApiClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_client_builder_trims_trailing_slash() {
    let client = ApiClient::new("http://localhost:7240/").unwrap();
    assert_eq!(client.base_url(), "http://localhost:7240");
}

#[tokio::test]
async fn test_login_persists_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/User/Login"))
        .and(body_json(json!({"email": "ann@example.com", "password": "hunter2"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "t1", "role": "Admin"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = client(&server, store.clone());

    let session = client.login("ann@example.com", "hunter2").await.unwrap();
    assert_eq!(session.role, Role::Admin);
    assert_eq!(session.username, "ann@example.com");
    assert_eq!(session.email.as_deref(), Some("ann@example.com"));

    assert_eq!(client.current_session(), Some(session));
    assert_eq!(store.get("token").unwrap().as_deref(), Some("t1"));
    assert_eq!(store.get("role").unwrap().as_deref(), Some("Admin"));
}

#[tokio::test]
async fn test_login_without_role_defaults_to_employee() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t1"})))
        .mount(&server)
        .await;

    let client = ApiClient::builder()
        .base_url(server.uri())
        .auth_paths(AuthPaths::legacy())
        .build()
        .unwrap();

    let session = client.login("bo@example.com", "pw").await.unwrap();
    assert_eq!(session.role, Role::Employee);
}

#[tokio::test]
async fn test_login_without_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/User/Login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Account locked"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let err = client(&server, store.clone())
        .login("ann@example.com", "pw")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::LoginRejected(ref message) if message == "Account locked"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_login_401_does_not_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/User/Login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid credentials"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, Arc::new(MemoryStore::new()))
        .login("ann@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
}

#[tokio::test]
async fn test_logout_revokes_and_clears() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/revoke"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in("t1");
    let client = client(&server, store.clone());
    client.logout().await;

    assert!(store.is_empty());
    assert!(client.current_session().is_none());
}

#[tokio::test]
async fn test_logout_ignores_revoke_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/revoke"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = logged_in("t1");
    client(&server, store.clone()).logout().await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_logout_with_unreachable_backend() {
    let store = logged_in("t1");
    let client = ApiClient::builder()
        .base_url("http://127.0.0.1:9")
        .store(store.clone())
        .build()
        .unwrap();

    client.logout().await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_require_role() {
    let server = MockServer::start().await;
    let admin = client(&server, logged_in("t1"));
    assert!(admin.require_role(Role::Admin).is_ok());

    let nobody = client(&server, Arc::new(MemoryStore::new()));
    assert!(matches!(
        nobody.require_role(Role::Employee),
        Err(ClientError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_create_employee_sends_pascal_case() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/User/AddEmployee"))
        .and(body_json(json!({
            "FirstName": "Ann",
            "LastName": "Lee",
            "Email": "ann@x.com",
            "PhoneNo": "5551234567",
            "DepartmentId": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "employeeId": 12, "firstName": "Ann", "lastName": "Lee", "email": "ann@x.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, logged_in("t1"));
    let created = client
        .create_employee(&NewEmployee {
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            email: Some("ann@x.com".into()),
            phone: Some("5551234567".into()),
            department_id: Some(3),
            job_role: None,
            gender: None,
        })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(created.id, 12);
    assert_eq!(created.name, "Ann Lee");
}

#[tokio::test]
async fn test_update_employee_with_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/Employee/12"))
        .and(body_json(json!({"JobRole": "Lead"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, logged_in("t1"));
    let update = EmployeeUpdate {
        job_role: Some("Lead".into()),
        ..Default::default()
    };
    assert_eq!(client.update_employee(12, &update).await.unwrap(), None);
}

#[tokio::test]
async fn test_list_employees_with_mixed_casing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Employee"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"EmployeeId": 1, "FirstName": "Ann", "LastName": "Lee"},
            {"employeeId": 2, "email": "bo@x.com"},
            {"id": 3, "name": "Employee 3"},
            {"Name": "Cy Twombly", "EmployeeId": 4}
        ])))
        .mount(&server)
        .await;

    let names: Vec<_> = client(&server, logged_in("t1"))
        .list_employees()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, ["Ann Lee", "bo", "Employee 3", "Cy Twombly"]);
}

#[tokio::test]
async fn test_null_list_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Employee"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let employees = client(&server, logged_in("t1")).list_employees().await.unwrap();
    assert!(employees.is_empty());
}

/// Minimal stateful department table
#[derive(Clone, Default)]
struct Departments {
    rows: Arc<Mutex<Vec<(i64, String)>>>,
}

struct CreateDepartment(Departments);
struct ListDepartments(Departments);

impl Respond for CreateDepartment {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = request.body_json().unwrap_or(Value::Null);
        let Some(name) = body["Name"].as_str() else {
            return ResponseTemplate::new(400).set_body_string("Name is required");
        };
        let mut rows = self.0.rows.lock().unwrap();
        let id = i64::try_from(rows.len()).unwrap() + 1;
        rows.push((id, name.to_string()));
        ResponseTemplate::new(201).set_body_json(json!({"DepartmentId": id, "Name": name}))
    }
}

impl Respond for ListDepartments {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let rows = self.0.rows.lock().unwrap();
        let body: Vec<Value> = rows
            .iter()
            .map(|(id, name)| json!({"DepartmentId": id, "Name": name}))
            .collect();
        ResponseTemplate::new(200).set_body_json(body)
    }
}

#[tokio::test]
async fn test_department_round_trip() {
    let server = MockServer::start().await;
    let table = Departments::default();

    Mock::given(method("POST"))
        .and(path("/api/Department"))
        .respond_with(CreateDepartment(table.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/Department"))
        .respond_with(ListDepartments(table.clone()))
        .mount(&server)
        .await;

    let client = client(&server, logged_in("t1"));
    let created = client
        .create_department(&DepartmentInput::new("R&D").unwrap())
        .await
        .unwrap();
    assert_eq!(created.name, "R&D");

    let departments = client.list_departments().await.unwrap();
    let matching: Vec<_> = departments.iter().filter(|d| d.name == "R&D").collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, created.id);
    assert!(created.id > 0);

    // Reloading again yields the same id
    let reloaded = client.list_departments().await.unwrap();
    assert_eq!(reloaded, departments);
}

#[tokio::test]
async fn test_department_update_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/Department/3"))
        .and(body_json(json!({"Name": "Research"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"departmentId": 3, "name": "Research"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/Department/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, logged_in("t1"));
    let updated = client
        .update_department(3, &DepartmentInput::new("Research").unwrap())
        .await
        .unwrap();
    assert_eq!(updated.id, 3);
    assert_eq!(updated.name, "Research");

    client.delete_department(3).await.unwrap();
}
