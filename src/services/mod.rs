pub mod registration;

pub use registration::{FieldError, RegisterRequest, RegisteredAccount, RegistrationError, RegistrationService};
