use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::config::RegistrationConfig;
use crate::database::models::{UserSummary, WorkspaceSummary};
use crate::database::{AccountStore, NewAccount, StoreError};

const MIN_PASSWORD_CHARS: usize = 8;
const WELCOME_CREDIT_DESCRIPTION: &str = "Welcome bonus credits";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Registration is disabled")]
    Disabled,
    #[error("{}", summary(.0))]
    Validation(Vec<FieldError>),
    #[error("Email already registered")]
    EmailTaken,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistrationError {
    /// True when validation rejected `field`
    pub fn rejects(&self, field: &str) -> bool {
        matches!(self, RegistrationError::Validation(errors) if errors.iter().any(|e| e.field == field))
    }
}

fn summary(errors: &[FieldError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("Invalid input")
}

/// Sign-up form as submitted by the client. Missing fields deserialize as
/// empty strings so they are reported through validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Input that passed validation, with name trimmed and email normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredAccount {
    pub user: UserSummary,
    pub workspace: WorkspaceSummary,
}

/// Check the sign-up form. Every violated field is reported, in form order
/// (name, email, password), so a short password is flagged even when the
/// other fields are also wrong.
pub fn validate(request: &RegisterRequest) -> Result<ValidRegistration, RegistrationError> {
    let mut errors = Vec::new();
    let mut reject = |field: &'static str, message: String| errors.push(FieldError { field, message });

    let name = request.name.trim();
    if name.is_empty() {
        reject("name", "Name is required".to_string());
    }

    let email = request.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        reject("email", "Invalid email address".to_string());
    }

    if request.password.chars().count() < MIN_PASSWORD_CHARS {
        reject("password", format!("Password must be at least {} characters", MIN_PASSWORD_CHARS));
    }

    if !errors.is_empty() {
        return Err(RegistrationError::Validation(errors));
    }

    Ok(ValidRegistration {
        name: name.to_string(),
        email,
        password: request.password.clone(),
    })
}

/// `local@domain.tld` with no whitespace and a dotted domain
fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty() && !label.starts_with('-'))
}

/// Lower-case ASCII slug of `name`: runs of anything else collapse to one `-`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "workspace".to_string()
    } else {
        slug.to_string()
    }
}

/// Slug for a user's default workspace, disambiguated by creation time
pub fn workspace_slug(name: &str, created_at: DateTime<Utc>) -> String {
    format!("{}-{}", slugify(name), created_at.timestamp_millis())
}

pub fn workspace_name(name: &str) -> String {
    format!("{}'s Workspace", name)
}

/// Orchestrates sign-up: validation, uniqueness, hashing and the atomic
/// user + ledger + workspace write.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn AccountStore>,
    config: RegistrationConfig,
    bcrypt_cost: u32,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn AccountStore>, config: RegistrationConfig, bcrypt_cost: u32) -> Self {
        Self {
            store,
            config,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<RegisteredAccount, RegistrationError> {
        if !self.config.enabled {
            return Err(RegistrationError::Disabled);
        }

        let valid = validate(&request)?;

        if self.store.find_user_by_email(&valid.email).await?.is_some() {
            tracing::info!(email = %valid.email, "Registration rejected: email already registered");
            return Err(RegistrationError::EmailTaken);
        }

        let password_hash = self.hash(valid.password.clone()).await?;

        let created_at = Utc::now();
        let mut account = NewAccount {
            user_id: Uuid::new_v4(),
            name: valid.name.clone(),
            email: valid.email.clone(),
            password_hash,
            starting_credits: self.config.starting_credits,
            credit_transaction_id: Uuid::new_v4(),
            credit_description: WELCOME_CREDIT_DESCRIPTION.to_string(),
            workspace_id: Uuid::new_v4(),
            workspace_name: workspace_name(&valid.name),
            workspace_slug: workspace_slug(&valid.name, created_at),
            created_at,
        };

        let created = match self.store.create_account(account.clone()).await {
            Err(StoreError::DuplicateSlug(slug)) => {
                // Same name registered within the same millisecond
                tracing::debug!(slug = %slug, "Workspace slug collision, retrying with random suffix");
                account.workspace_slug = format!("{}-{}", slug, &Uuid::new_v4().simple().to_string()[..6]);
                self.store.create_account(account).await
            }
            other => other,
        }
        .map_err(|e| match e {
            // Lost a race with a concurrent sign-up for the same email
            StoreError::DuplicateEmail => RegistrationError::EmailTaken,
            other => RegistrationError::Store(other),
        })?;

        tracing::info!(
            user_id = %created.user.id,
            workspace_id = %created.workspace.id,
            credits = created.user.credits,
            "Registered user with default workspace"
        );

        Ok(RegisteredAccount {
            user: UserSummary::from(&created.user),
            workspace: WorkspaceSummary::from(&created.workspace),
        })
    }

    /// Hash on the blocking pool
    async fn hash(&self, password: String) -> Result<String, RegistrationError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| RegistrationError::Hashing(e.to_string()))?
            .map_err(|e| RegistrationError::Hashing(e.to_string()))
    }
}
