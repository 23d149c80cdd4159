pub mod database;
pub mod ssm;

use crate::core::parameters::get_optional_parameter;
use crate::domain::ports::ParameterStore;
use crate::utils::error::{HelperError, Result};
use crate::utils::validation::{validate_database_url, validate_parameter_name, Validate};
use std::env;

pub const DEFAULT_DATABASE_URL_PARAMETER: &str = "/face-auth/database-url";

/// Handler configuration read from the Lambda environment.
#[derive(Debug, Clone)]
pub struct HelperConfig {
    /// Direct connection string; takes precedence over the parameter store.
    pub database_url: Option<String>,
    /// SSM parameter holding the connection string when `database_url` is unset.
    pub database_url_parameter: String,
    pub aws_region: Option<String>,
}

impl HelperConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            database_url: non_empty("DATABASE_URL"),
            database_url_parameter: non_empty("DATABASE_URL_PARAMETER")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL_PARAMETER.to_string()),
            aws_region: non_empty("AWS_REGION"),
        }
    }

    /// Returns `database_url`, or reads it from `store` when unset.
    pub async fn resolve_database_url<S>(&self, store: &S) -> Result<String>
    where
        S: ParameterStore + ?Sized,
    {
        if let Some(url) = &self.database_url {
            return Ok(url.clone());
        }

        let url = get_optional_parameter(store, &self.database_url_parameter)
            .await?
            .ok_or_else(|| HelperError::MissingConfigError {
                field: format!("DATABASE_URL or parameter {}", self.database_url_parameter),
            })?;
        validate_database_url(&self.database_url_parameter, &url)?;
        Ok(url)
    }
}

impl Validate for HelperConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.database_url {
            validate_database_url("DATABASE_URL", url)?;
        }
        validate_parameter_name("DATABASE_URL_PARAMETER", &self.database_url_parameter)?;

        tracing::debug!("Helper configuration validation passed");
        Ok(())
    }
}
