use anyhow::{Context, Result, anyhow};
use products_hr::{
    DepartmentChanges, Directory, EmployeeChanges, NewDepartment, NewEmployee, NewRole,
    RoleChanges,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{AddEmployee, AssignEmployee, EmployeeCommand, GroupCommand, config::AppConfig};

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn department(directory: &Directory, cmd: GroupCommand) -> Result<()> {
    match cmd {
        GroupCommand::Add { name, description } => {
            let created = directory
                .create_department(NewDepartment { name, description })
                .await?;
            print_json(&created)
        }
        GroupCommand::List => print_json(&directory.list_departments().await?),
        GroupCommand::Members { id } => print_json(&directory.employees_of_department(id).await?),
        GroupCommand::Rename { id, name } => {
            let changes = DepartmentChanges {
                name: Some(name),
                ..DepartmentChanges::default()
            };
            print_json(&directory.update_department(id, changes).await?)
        }
        GroupCommand::Delete { id } => {
            directory.delete_department(id).await?;
            Ok(())
        }
    }
}

pub async fn role(directory: &Directory, cmd: GroupCommand) -> Result<()> {
    match cmd {
        GroupCommand::Add { name, description } => {
            let created = directory.create_role(NewRole { name, description }).await?;
            print_json(&created)
        }
        GroupCommand::List => print_json(&directory.list_roles().await?),
        GroupCommand::Members { id } => print_json(&directory.employees_of_role(id).await?),
        GroupCommand::Rename { id, name } => {
            let changes = RoleChanges {
                name: Some(name),
                ..RoleChanges::default()
            };
            print_json(&directory.update_role(id, changes).await?)
        }
        GroupCommand::Delete { id } => {
            directory.delete_role(id).await?;
            Ok(())
        }
    }
}

pub async fn employee(
    directory: &Directory,
    config: &AppConfig,
    cmd: EmployeeCommand,
) -> Result<()> {
    match cmd {
        EmployeeCommand::Add(add) => add_employee(directory, config, add).await,
        EmployeeCommand::Show { key } => {
            let found = match key.parse::<i32>() {
                Ok(id) => directory.get_employee(id).await?,
                Err(_) => directory.find_employee_by_login(&key).await?,
            };
            let employee = found.ok_or_else(|| anyhow!("no employee matches {key:?}"))?;
            print_json(&employee)
        }
        EmployeeCommand::List => print_json(&directory.list_employees().await?),
        EmployeeCommand::Assign(assign) => {
            let changes = assignment_changes(&assign)?;
            print_json(&directory.update_employee(assign.id, changes).await?)
        }
        EmployeeCommand::Admin { id, enabled } => {
            print_json(&directory.set_admin(id, enabled).await?)
        }
        EmployeeCommand::Passwd { id, password } => {
            config.check_password_policy(&password)?;
            directory
                .set_password(id, &password)
                .await
                .with_context(|| format!("failed to update password for employee {id}"))
        }
        EmployeeCommand::Delete { id } => {
            directory.delete_employee(id).await?;
            Ok(())
        }
    }
}

/// Only the references named on the command line are touched.
fn assignment_changes(assign: &AssignEmployee) -> Result<EmployeeChanges> {
    let department_id = match (assign.department, assign.no_department) {
        (Some(id), _) => Some(Some(id)),
        (None, true) => Some(None),
        (None, false) => None,
    };
    let role_id = match (assign.role, assign.no_role) {
        (Some(id), _) => Some(Some(id)),
        (None, true) => Some(None),
        (None, false) => None,
    };
    if department_id.is_none() && role_id.is_none() {
        return Err(anyhow!(
            "nothing to assign; pass --department, --role, --no-department or --no-role"
        ));
    }
    Ok(EmployeeChanges {
        department_id,
        role_id,
        ..EmployeeChanges::default()
    })
}

async fn add_employee(directory: &Directory, config: &AppConfig, add: AddEmployee) -> Result<()> {
    match add.password.as_deref() {
        Some(password) => config.check_password_policy(password)?,
        None => warn!("no password given; the account cannot log in until one is set"),
    }
    let created = directory
        .create_employee(NewEmployee {
            email: add.email,
            username: add.username,
            first_name: add.first_name,
            last_name: add.last_name,
            password: add.password,
            department_id: add.department,
            role_id: add.role,
            is_admin: add.admin,
        })
        .await?;
    print_json(&created)
}

pub async fn check_password(directory: &Directory, login: &str, password: &str) -> Result<()> {
    match directory.authenticate(login, password).await? {
        Some(employee) => {
            info!(employee_id = employee.id, "credentials accepted");
            Ok(())
        }
        None => Err(anyhow!("invalid credentials for {login:?}")),
    }
}
