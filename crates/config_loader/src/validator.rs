//! Configuration validation
//!
//! Rules:
//! - engine name not empty
//! - conduit_capacity >= 1
//! - messages_per_user >= 1
//! - seed emails not blank

use contracts::{ContractError, PipelineSettings};

/// Validate PipelineSettings
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(settings: &PipelineSettings) -> Result<(), ContractError> {
    validate_engine(settings)?;
    validate_stages(settings)?;
    validate_seed(settings)?;
    Ok(())
}

fn validate_engine(settings: &PipelineSettings) -> Result<(), ContractError> {
    let engine = &settings.engine;
    if engine.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "engine.name",
            "engine name cannot be empty",
        ));
    }
    if engine.conduit_capacity == 0 {
        return Err(ContractError::config_validation(
            "engine.conduit_capacity",
            "conduit_capacity must be >= 1, got 0",
        ));
    }
    Ok(())
}

fn validate_stages(settings: &PipelineSettings) -> Result<(), ContractError> {
    if settings.stages.messages_per_user == 0 {
        return Err(ContractError::config_validation(
            "stages.messages_per_user",
            "messages_per_user must be >= 1, got 0",
        ));
    }
    Ok(())
}

fn validate_seed(settings: &PipelineSettings) -> Result<(), ContractError> {
    for (idx, email) in settings.seed.emails.iter().enumerate() {
        if email.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("seed.emails[{idx}]"),
                "email cannot be blank",
            ));
        }
    }
    Ok(())
}
