//! Registered accounts and their roles.
use serde::{Deserialize, Serialize};

entity_id!(User, "user");

/// Closed set of account roles.
///
/// Permission checks match on this enum exhaustively, so a new role cannot be added without
/// deciding what it may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Vendeur,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Vendeur => "vendeur",
            Role::Admin => "admin",
        }
    }

    /// Staff may create actions and manage the catalog.
    pub fn is_staff(&self) -> bool {
        match self {
            Role::Admin | Role::Vendeur => true,
            Role::Client => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Individual,
    Company,
}

/// Company registration numbers, only meaningful for [`AccountType::Company`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyNumbers {
    pub nif: Option<String>,
    pub stat: Option<String>,
    pub rcs: Option<String>,
}

/// Represents a registered user.
///
/// See [`impl ActorEntity for User`](#impl-ActorEntity-for-User) for creation and update rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub account_type: AccountType,
    pub phone: String,
    pub address: String,
    #[serde(flatten)]
    pub company: CompanyNumbers,
    /// `"{role}-{id}"`, refreshed whenever the role changes.
    pub code: String,
    pub active: bool,
    #[serde(skip)]
    pub password_hash: String,
}

impl User {
    pub fn code_for(role: Role, id: UserId) -> String {
        format!("{}-{}", role.as_str(), id.0)
    }
}

/// Payload for creating a new user. The password arrives already hashed.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub account_type: AccountType,
    pub phone: String,
    pub address: String,
    pub company: CompanyNumbers,
    pub password_hash: String,
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub account_type: Option<AccountType>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company: Option<CompanyNumbers>,
    pub password_hash: Option<String>,
    pub active: Option<bool>,
}

/// Selects users for listing.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub email: Option<String>,
    pub role: Option<Role>,
}
