//! [`ActorEntity`] implementation for [`User`].

use super::{UserAction, UserError};
use crate::model::{User, UserCreate, UserFilter, UserId, UserUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;

fn check_email(email: &str) -> Result<String, UserError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(UserError::ValidationError(format!("invalid email: {email}"))),
    }
}

fn check_name(full_name: &str) -> Result<String, UserError> {
    let name = full_name.trim();
    if name.is_empty() {
        return Err(UserError::ValidationError("full name is required".into()));
    }
    Ok(name.to_string())
}

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Action = UserAction;
    type ActionResult = ();
    type Filter = UserFilter;
    type Context = ();
    type Error = UserError;

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            email: check_email(&params.email)?,
            full_name: check_name(&params.full_name)?,
            role: params.role,
            account_type: params.account_type,
            phone: params.phone,
            address: params.address,
            company: params.company,
            code: User::code_for(params.role, id),
            active: true,
            password_hash: params.password_hash,
        })
    }

    fn matches(&self, filter: &UserFilter) -> bool {
        filter
            .email
            .as_ref()
            .map_or(true, |email| email.eq_ignore_ascii_case(&self.email))
            && filter.role.map_or(true, |role| role == self.role)
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    /// Applies every present field; the code follows the role.
    async fn on_update(
        &mut self,
        update: UserUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if let Some(email) = update.email {
            self.email = check_email(&email)?;
        }
        if let Some(full_name) = update.full_name {
            self.full_name = check_name(&full_name)?;
        }
        if let Some(role) = update.role {
            self.role = role;
            self.code = User::code_for(role, self.id);
        }
        if let Some(account_type) = update.account_type {
            self.account_type = account_type;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(company) = update.company {
            self.company = company;
        }
        if let Some(password_hash) = update.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: UserAction,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        match action {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountType, CompanyNumbers, Role};

    fn params(email: &str) -> UserCreate {
        UserCreate {
            email: email.to_string(),
            full_name: "Rakoto Jean".to_string(),
            role: Role::Vendeur,
            account_type: AccountType::Individual,
            phone: "0340000000".to_string(),
            address: "Antananarivo".to_string(),
            company: CompanyNumbers::default(),
            password_hash: String::new(),
        }
    }

    #[test]
    fn test_code_and_email_normalisation() {
        let user = User::from_create_params(UserId(7), params(" Rakoto@Shop.MG ")).unwrap();
        assert_eq!(user.email, "rakoto@shop.mg");
        assert_eq!(user.code, "vendeur-7");
        assert!(user.active);
    }

    #[test]
    fn test_rejects_malformed_email() {
        let err = User::from_create_params(UserId(1), params("not-an-email")).unwrap_err();
        assert!(matches!(err, UserError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_role_change_refreshes_code() {
        let mut user = User::from_create_params(UserId(3), params("a@b.mg")).unwrap();
        let update = UserUpdate {
            role: Some(Role::Admin),
            ..Default::default()
        };
        user.on_update(update, &()).await.unwrap();
        assert_eq!(user.code, "admin-3");
    }
}
