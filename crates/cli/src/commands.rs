//! CLI commands

use anyhow::{Result, bail};
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use staffdir_client::{
    ApiClient, ApiClientBuilder, DepartmentInput, DepartmentView, EmployeeForm, EmployeeUpdate,
    EmployeeView, FileStore, Role,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{self, CREDENTIALS_FILE, CliConfig};

/// Shown once when a refresh fails and the stored session is dropped
const SESSION_EXPIRED_NOTICE: &str =
    "Your session has expired. Run `staffdir login` to sign in again.";

/// How records are printed
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Everything a command needs besides its own arguments
pub struct Context {
    pub config: CliConfig,
    pub state_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub output: OutputFormat,
}

impl Context {
    /// Client backed by the credential file in the state directory
    fn client(&self) -> Result<ApiClient> {
        let credentials = self.state_dir.join(CREDENTIALS_FILE);
        debug!("Using credentials at {}", credentials.display());

        let client = ApiClientBuilder::from_config(&self.config.api)
            .store(Arc::new(FileStore::new(credentials)))
            .on_session_expired(|| eprintln!("{SESSION_EXPIRED_NOTICE}"))
            .build()?;
        Ok(client)
    }

    fn print<T: Serialize>(&self, value: &T, table: impl FnOnce(&T)) -> Result<()> {
        match self.output {
            OutputFormat::Table => table(value),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email
        email: String,

        /// Account password
        #[arg(long, env = "STAFFDIR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Revoke the session and forget it
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Employee records
    Employees {
        #[command(subcommand)]
        command: EmployeeCommands,
    },

    /// Department records
    Departments {
        #[command(subcommand)]
        command: DepartmentCommands,
    },

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum EmployeeCommands {
    /// List employees
    List {
        /// Only show employees matching this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one employee
    Get { id: i64 },

    /// Add an employee (admin only)
    Create(EmployeeArgs),

    /// Change fields of an employee (admin only)
    Update {
        id: i64,

        #[command(flatten)]
        changes: EmployeeChanges,
    },

    /// Remove an employee (admin only)
    Delete { id: i64 },
}

#[derive(Args)]
pub struct EmployeeArgs {
    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    #[arg(long, default_value = "")]
    email: String,

    /// Ten digits
    #[arg(long, default_value = "")]
    phone: String,

    #[arg(long)]
    department_id: Option<i64>,

    #[arg(long, default_value = "")]
    job_role: String,

    #[arg(long, default_value = "")]
    gender: String,
}

#[derive(Args)]
pub struct EmployeeChanges {
    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    /// Ten digits
    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    department_id: Option<i64>,

    #[arg(long)]
    job_role: Option<String>,

    #[arg(long)]
    gender: Option<String>,
}

impl From<EmployeeArgs> for EmployeeForm {
    fn from(args: EmployeeArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            department_id: args.department_id,
            job_role: args.job_role,
            gender: args.gender,
        }
    }
}

impl From<EmployeeChanges> for EmployeeUpdate {
    fn from(changes: EmployeeChanges) -> Self {
        let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
        Self {
            first_name: trim(changes.first_name),
            last_name: trim(changes.last_name),
            email: trim(changes.email),
            phone: trim(changes.phone),
            department_id: changes.department_id,
            job_role: trim(changes.job_role),
            gender: trim(changes.gender),
        }
    }
}

#[derive(Subcommand)]
pub enum DepartmentCommands {
    /// List departments
    List {
        /// Only show departments whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one department
    Get { id: i64 },

    /// Add a department (admin only)
    Create { name: String },

    /// Rename a department (admin only)
    Update { id: i64, name: String },

    /// Remove a department (admin only)
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Output file path (defaults to <state dir>/staffdir.toml)
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Show,
}

impl Commands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Login { email, password } => {
                let session = ctx.client()?.login(&email, &password).await?;
                println!("Logged in as {} ({})", session.username, session.role);
                Ok(())
            }
            Self::Logout => {
                ctx.client()?.logout().await;
                println!("Logged out");
                Ok(())
            }
            Self::Whoami => {
                let Some(session) = ctx.client()?.current_session() else {
                    bail!("Not logged in");
                };
                let whoami = serde_json::json!({
                    "username": session.username,
                    "role": session.role,
                    "email": session.email,
                });
                ctx.print(&whoami, |_| {
                    println!("{} ({})", session.username, session.role);
                })
            }
            Self::Employees { command } => command.execute(ctx).await,
            Self::Departments { command } => command.execute(ctx).await,
            Self::Config { command } => command.execute(ctx),
        }
    }
}

impl EmployeeCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let client = ctx.client()?;
        authorize(&client, self.is_mutation())?;

        match self {
            Self::List { search } => {
                let mut employees = client.list_employees().await?;
                if let Some(query) = search {
                    employees.retain(|e| e.matches(&query));
                }
                ctx.print(&employees, |rows| print_employees(rows))
            }
            Self::Get { id } => {
                let employee = client.get_employee(id).await?;
                ctx.print(&employee, print_employee)
            }
            Self::Create(args) => {
                let employee = EmployeeForm::from(args).validate()?;
                match client.create_employee(&employee).await? {
                    Some(created) => ctx.print(&created, print_employee),
                    None => {
                        println!("Employee {} {} created", employee.first_name, employee.last_name);
                        Ok(())
                    }
                }
            }
            Self::Update { id, changes } => {
                let update = EmployeeUpdate::from(changes);
                if update.is_empty() {
                    bail!("Nothing to update");
                }
                update.validate()?;
                match client.update_employee(id, &update).await? {
                    Some(updated) => ctx.print(&updated, print_employee),
                    None => {
                        println!("Employee {id} updated");
                        Ok(())
                    }
                }
            }
            Self::Delete { id } => {
                client.delete_employee(id).await?;
                info!(id, "Employee deleted");
                println!("Employee {id} deleted");
                Ok(())
            }
        }
    }

    const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Create(_) | Self::Update { .. } | Self::Delete { .. }
        )
    }
}

impl DepartmentCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let client = ctx.client()?;
        authorize(&client, self.is_mutation())?;

        match self {
            Self::List { search } => {
                let mut departments = client.list_departments().await?;
                if let Some(query) = search {
                    departments.retain(|d| d.matches(&query));
                }
                ctx.print(&departments, |rows| print_departments(rows))
            }
            Self::Get { id } => {
                let department = client.get_department(id).await?;
                ctx.print(&vec![department], |rows| print_departments(rows))
            }
            Self::Create { name } => {
                let created = client.create_department(&DepartmentInput::new(&name)?).await?;
                ctx.print(&vec![created], |rows| print_departments(rows))
            }
            Self::Update { id, name } => {
                let updated = client
                    .update_department(id, &DepartmentInput::new(&name)?)
                    .await?;
                ctx.print(&vec![updated], |rows| print_departments(rows))
            }
            Self::Delete { id } => {
                client.delete_department(id).await?;
                info!(id, "Department deleted");
                println!("Department {id} deleted");
                Ok(())
            }
        }
    }

    const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Create { .. } | Self::Update { .. } | Self::Delete { .. }
        )
    }
}

impl ConfigCommands {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Init { output } => {
                let config_path = output
                    .or_else(|| ctx.config_path.clone())
                    .unwrap_or_else(|| ctx.state_dir.join("staffdir.toml"));

                if config_path.exists() {
                    bail!("{} already exists", config_path.display());
                }

                config::generate_default_config(&config_path)?;
                println!("Generated configuration at: {}", config_path.display());
                Ok(())
            }
            Self::Show => {
                print!("{}", toml::to_string_pretty(&ctx.config)?);
                println!("# state directory: {}", ctx.state_dir.display());
                Ok(())
            }
        }
    }
}

/// Any session may read; changes need an admin
fn authorize(client: &ApiClient, mutation: bool) -> Result<()> {
    if mutation {
        client.require_role(Role::Admin)?;
    } else if client.current_session().is_none() {
        bail!("Not logged in. Run `staffdir login` first.");
    }
    Ok(())
}

fn print_employees(employees: &[EmployeeView]) {
    if employees.is_empty() {
        println!("No employees found");
        return;
    }

    println!(
        "{:>6}  {:<3}{:<28}{:<30}{:<20}",
        "ID", "", "NAME", "EMAIL", "DEPARTMENT"
    );
    for employee in employees {
        println!(
            "{:>6}  {:<3}{:<28}{:<30}{:<20}",
            employee.id,
            employee.initial(),
            employee.name,
            employee.email.as_deref().unwrap_or("-"),
            department_label(employee),
        );
    }
}

fn print_employee(employee: &EmployeeView) {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("[{}] {}", employee.initial(), employee.name);
    println!("  id:         {}", employee.id);
    println!("  email:      {}", field(&employee.email));
    println!("  phone:      {}", field(&employee.phone));
    println!("  department: {}", department_label(employee));
    println!("  job role:   {}", field(&employee.job_role));
    println!("  gender:     {}", field(&employee.gender));
}

fn department_label(employee: &EmployeeView) -> String {
    match (&employee.department_name, employee.department_id) {
        (Some(name), _) => name.clone(),
        (None, Some(id)) => format!("#{id}"),
        (None, None) => "-".to_string(),
    }
}

fn print_departments(departments: &[DepartmentView]) {
    if departments.is_empty() {
        println!("No departments found");
        return;
    }

    println!("{:>6}  {}", "ID", "NAME");
    for department in departments {
        println!("{:>6}  {}", department.id, department.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_are_trimmed_and_absent_fields_skipped() {
        let update = EmployeeUpdate::from(EmployeeChanges {
            first_name: None,
            last_name: None,
            email: Some("  ann@x.com ".to_string()),
            phone: None,
            department_id: Some(2),
            job_role: None,
            gender: None,
        });

        assert_eq!(update.email.as_deref(), Some("ann@x.com"));
        assert_eq!(update.department_id, Some(2));
        assert!(update.first_name.is_none());
        assert!(!update.is_empty());
    }

    #[test]
    fn department_label_prefers_name() {
        let mut employee = EmployeeView::from_backend(&serde_json::json!({
            "EmployeeId": 1, "DepartmentId": 4
        }));
        assert_eq!(department_label(&employee), "#4");

        employee.department_name = Some("R&D".to_string());
        assert_eq!(department_label(&employee), "R&D");
    }
}
