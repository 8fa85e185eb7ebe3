mod common;

use common::{directory, employee, new_employee};
use products_hr::{
    DepartmentChanges, DirectoryError, EmployeeChanges, NewDepartment, NewEmployee, NewRole,
    RoleChanges,
};

#[tokio::test]
async fn employee_belongs_to_department() {
    let dir = directory().await;
    let engineering = dir
        .create_department(NewDepartment {
            name: "Engineering".into(),
            description: Some("Builds things".into()),
        })
        .await
        .unwrap();
    let alice = dir
        .create_employee(NewEmployee {
            email: "a@x.com".into(),
            username: "alice".into(),
            department_id: Some(engineering.id),
            ..new_employee("alice")
        })
        .await
        .unwrap();

    let department = dir.department_of(&alice).await.unwrap().unwrap();
    assert_eq!(department.name, "Engineering");
    assert_eq!(department.to_string(), "<Department: Engineering>");

    let members = dir.employees_of_department(engineering.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].username, "alice");
}

#[tokio::test]
async fn role_has_many_employees() {
    let dir = directory().await;
    let manager = dir.create_role(NewRole::named("Manager")).await.unwrap();
    for name in ["mia", "max"] {
        dir.create_employee(NewEmployee {
            role_id: Some(manager.id),
            ..new_employee(name)
        })
        .await
        .unwrap();
    }
    employee(&dir, "solo").await;

    let holders = dir.employees_of_role(manager.id).await.unwrap();
    assert_eq!(holders.len(), 2);
    let role = dir.role_of(&holders[0]).await.unwrap().unwrap();
    assert_eq!(role, manager);
}

#[tokio::test]
async fn unassigned_employee_has_no_department_or_role() {
    let dir = directory().await;
    let solo = employee(&dir, "solo").await;
    assert!(dir.department_of(&solo).await.unwrap().is_none());
    assert!(dir.role_of(&solo).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_department_name_is_a_conflict() {
    let dir = directory().await;
    dir.create_department(NewDepartment::named("Engineering"))
        .await
        .unwrap();
    let err = dir
        .create_department(NewDepartment::named("Engineering"))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            DirectoryError::UniqueConstraintViolation {
                entity: "department",
                field: "name"
            }
        ),
        "{err:?}"
    );
    assert_eq!(dir.list_departments().await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_role_name_is_a_conflict() {
    let dir = directory().await;
    dir.create_role(NewRole::named("Manager")).await.unwrap();
    let other = dir.create_role(NewRole::named("Engineer")).await.unwrap();
    let err = dir
        .update_role(
            other.id,
            RoleChanges {
                name: Some("Manager".into()),
                ..RoleChanges::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::UniqueConstraintViolation { entity: "role", .. }
    ));
}

#[tokio::test]
async fn unknown_references_are_foreign_key_violations() {
    let dir = directory().await;
    let err = dir
        .create_employee(NewEmployee {
            department_id: Some(404),
            ..new_employee("ghost")
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::ForeignKeyViolation {
            entity: "department",
            id: 404
        }
    ));

    let alice = employee(&dir, "alice").await;
    let err = dir.assign(alice.id, None, Some(7)).await.unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::ForeignKeyViolation { entity: "role", id: 7 }
    ));
    assert_eq!(err.code(), "FOREIGN_KEY_VIOLATION");
    assert_eq!(dir.require_employee(alice.id).await.unwrap().role_id, None);
}

#[tokio::test]
async fn assignment_can_be_changed_and_cleared() {
    let dir = directory().await;
    let sales = dir.create_department(NewDepartment::named("Sales")).await.unwrap();
    let lead = dir.create_role(NewRole::named("Lead")).await.unwrap();
    let bob = employee(&dir, "bob").await;

    let assigned = dir.assign(bob.id, Some(sales.id), Some(lead.id)).await.unwrap();
    assert_eq!(assigned.department_id, Some(sales.id));
    assert_eq!(assigned.role_id, Some(lead.id));

    let cleared = dir
        .update_employee(
            bob.id,
            EmployeeChanges {
                role_id: Some(None),
                ..EmployeeChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.department_id, Some(sales.id));
    assert_eq!(cleared.role_id, None);
}

#[tokio::test]
async fn moving_department_keeps_the_role() {
    let dir = directory().await;
    let sales = dir.create_department(NewDepartment::named("Sales")).await.unwrap();
    let support = dir.create_department(NewDepartment::named("Support")).await.unwrap();
    let lead = dir.create_role(NewRole::named("Lead")).await.unwrap();
    let erin = employee(&dir, "erin").await;
    dir.assign(erin.id, Some(sales.id), Some(lead.id)).await.unwrap();

    let moved = dir
        .update_employee(
            erin.id,
            EmployeeChanges {
                department_id: Some(Some(support.id)),
                ..EmployeeChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.department_id, Some(support.id));
    assert_eq!(moved.role_id, Some(lead.id));

    let stored = dir.require_employee(erin.id).await.unwrap();
    assert_eq!(stored.role_id, Some(lead.id));
}

#[tokio::test]
async fn referenced_department_cannot_be_deleted() {
    let dir = directory().await;
    let ops = dir.create_department(NewDepartment::named("Ops")).await.unwrap();
    let carol = dir
        .create_employee(NewEmployee {
            department_id: Some(ops.id),
            ..new_employee("carol")
        })
        .await
        .unwrap();

    let err = dir.delete_department(ops.id).await.unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::StillReferenced {
            entity: "department",
            employees: 1,
            ..
        }
    ));
    assert!(dir.get_department(ops.id).await.unwrap().is_some());

    dir.assign(carol.id, None, None).await.unwrap();
    dir.delete_department(ops.id).await.unwrap();
    assert!(dir.get_department(ops.id).await.unwrap().is_none());
}

#[tokio::test]
async fn referenced_role_cannot_be_deleted() {
    let dir = directory().await;
    let lead = dir.create_role(NewRole::named("Lead")).await.unwrap();
    let dana = dir
        .create_employee(NewEmployee {
            role_id: Some(lead.id),
            ..new_employee("dana")
        })
        .await
        .unwrap();

    let err = dir.delete_role(lead.id).await.unwrap_err();
    assert_eq!(err.code(), "STILL_REFERENCED");

    dir.delete_employee(dana.id).await.unwrap();
    dir.delete_role(lead.id).await.unwrap();
    let err = dir.delete_role(lead.id).await.unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { entity: "role", .. }));
}

#[tokio::test]
async fn department_details_can_be_edited() {
    let dir = directory().await;
    let hr = dir
        .create_department(NewDepartment {
            name: "HR".into(),
            description: Some("People".into()),
        })
        .await
        .unwrap();

    let renamed = dir
        .update_department(
            hr.id,
            DepartmentChanges {
                name: Some("People Ops".into()),
                description: Some(None),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "People Ops");
    assert_eq!(renamed.description, None);
    assert_eq!(
        dir.find_department_by_name("People Ops").await.unwrap(),
        Some(renamed)
    );
    assert!(dir.find_department_by_name("HR").await.unwrap().is_none());
}

#[tokio::test]
async fn members_of_missing_department_is_not_found() {
    let dir = directory().await;
    let err = dir.employees_of_department(9).await.unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { entity: "department", .. }));
    let err = dir.employees_of_role(9).await.unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { entity: "role", .. }));
}
