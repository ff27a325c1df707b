//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::password::{PasswordError, PasswordVerifier};
use crate::auth::{SessionAuthority, SessionError};
use crate::config::AppConfig;
use crate::database::AccountStore;
use crate::gate::{PatternError, RouteGate};
use crate::services::RegistrationService;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Invalid route pattern: {0}")]
    Routes(#[from] PatternError),
    #[error("Invalid bcrypt cost: {0}")]
    Password(#[from] PasswordError),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AccountStore>,
    pub sessions: SessionAuthority,
    pub passwords: PasswordVerifier,
    pub gate: Arc<RouteGate>,
    pub registration: RegistrationService,
}

impl AppState {
    /// Build state, compiling the route table, session keys and password
    /// decoy up front so a bad configuration fails at startup rather than on
    /// first request.
    pub fn new(config: AppConfig, store: Arc<dyn AccountStore>) -> Result<Self, StartupError> {
        if config.registration.starting_credits < 0 {
            return Err(StartupError::Config(format!(
                "REGISTRATION_STARTING_CREDITS must not be negative, got {}",
                config.registration.starting_credits
            )));
        }

        let sessions = SessionAuthority::new(&config.security)?;
        let passwords = PasswordVerifier::new(config.security.bcrypt_cost)?;
        let gate = Arc::new(RouteGate::from_config(&config.routes)?);
        let registration = RegistrationService::new(
            store.clone(),
            config.registration.clone(),
            config.security.bcrypt_cost,
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            sessions,
            passwords,
            gate,
            registration,
        })
    }
}
