//! Staff directory client
//!
//! Typed access to the employee and department REST backend. Requests carry
//! the stored bearer token and recover from an expired token through a single
//! shared refresh; see [`ApiClient::send`].

pub mod auth;
pub mod client;
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod cookies;
pub mod departments;
pub mod employees;
pub mod error;
pub mod fields;
pub mod naming;
pub mod refresh;
pub mod session;
pub mod store;

pub use auth::LoginResponse;
pub use client::{ApiClient, ApiClientBuilder, ApiRequest, DEFAULT_REFRESH_TIMEOUT};
pub use config::{AuthPaths, ClientConfig};
pub use departments::{DepartmentInput, DepartmentView};
pub use employees::{EmployeeForm, EmployeeUpdate, EmployeeView, NewEmployee, ValidationError};
pub use error::{ClientError, ErrorKind};
pub use session::{Role, Session, SessionStore};
pub use store::{CredentialStore, MemoryStore, StoreError};

#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorage;
