//! Role-based access rules.
//!
//! Every service calls into this module before touching a store. The rules
//! only ever look at one role at a time; ownership is compared by account id.

use crate::db::models::account_models::{Account, Role};
use crate::error::Error;
use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

/// Authenticated caller, resolved from a bearer credential
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    pub name: String,
}

impl From<&Account> for Actor {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            role: account.role,
            email: account.email.clone(),
            name: account.full_name(),
        }
    }
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_officer(&self) -> bool {
        self.role == Role::Officer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Register,
    ExchangeCredentials,
    Create,
    Read,
    List,
    /// Change admin-owned fields (validation status, priority, alarm status)
    Review,
    UpdateProfile,
    ManageAccounts,
    ViewAggregates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Account,
    Attendance,
    IncidentReport,
    EmergencyAlarm,
}

impl RecordKind {
    fn label(&self) -> &'static str {
        match self {
            RecordKind::Account => "account",
            RecordKind::Attendance => "attendance record",
            RecordKind::IncidentReport => "incident report",
            RecordKind::EmergencyAlarm => "emergency alarm",
        }
    }
}

/// Owner filter every listing query must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    All,
    Owner(Uuid),
    Nothing,
}

impl OwnerScope {
    pub fn permits(&self, owner: &Uuid) -> bool {
        match self {
            OwnerScope::All => true,
            OwnerScope::Owner(id) => id == owner,
            OwnerScope::Nothing => false,
        }
    }
}

/// Decide whether `actor` may perform `action` on a record of `kind` owned by `owner`
pub fn can_access(actor: Option<&Actor>, action: Action, kind: RecordKind, owner: Option<Uuid>) -> bool {
    if matches!(action, Action::Register | Action::ExchangeCredentials) {
        return true;
    }

    let actor = match actor {
        Some(actor) => actor,
        None => return false,
    };
    let owns = owner.map_or(false, |owner| owner == actor.id);

    if kind == RecordKind::Account && matches!(action, Action::Read | Action::UpdateProfile) && owns {
        return true;
    }

    match actor.role {
        Role::Admin => match action {
            Action::Read | Action::List => true,
            Action::Review => kind != RecordKind::Account,
            Action::ManageAccounts | Action::ViewAggregates => true,
            Action::Create => kind == RecordKind::Account,
            _ => false,
        },
        Role::Officer => match action {
            Action::Create => kind != RecordKind::Account && owns,
            Action::Read => kind != RecordKind::Account && owns,
            Action::List => kind != RecordKind::Account,
            _ => false,
        },
        Role::Unassigned => action == Action::List && kind != RecordKind::Account,
    }
}

/// Owner scope applied to record listings for this actor
pub fn list_scope(actor: &Actor) -> OwnerScope {
    match actor.role {
        Role::Admin => OwnerScope::All,
        Role::Officer => OwnerScope::Owner(actor.id),
        Role::Unassigned => OwnerScope::Nothing,
    }
}

/// `can_access`, failing with `Forbidden`
pub fn require(actor: &Actor, action: Action, kind: RecordKind, owner: Option<Uuid>) -> Result<()> {
    if can_access(Some(actor), action, kind, owner) {
        return Ok(());
    }

    let message = match action {
        Action::Create if kind != RecordKind::Account => {
            format!("Only officers can create an {}", kind.label())
        }
        Action::Create | Action::Review | Action::ManageAccounts | Action::ViewAggregates => {
            "Admin access required".to_string()
        }
        _ => format!("Not allowed to access this {}", kind.label()),
    };
    Err(Error::Forbidden(message).into())
}

/// Visibility check for a single record; invisible records read as missing
pub fn require_visible(actor: &Actor, kind: RecordKind, owner: Uuid) -> Result<()> {
    if can_access(Some(actor), Action::Read, kind, Some(owner)) {
        Ok(())
    } else {
        Err(not_found(kind).into())
    }
}

/// The one `NotFound` used for both missing and invisible records
pub fn not_found(kind: RecordKind) -> Error {
    Error::NotFound(format!("No {} matches the given id", kind.label()))
}
