use crate::domain::ports::ParameterStore;
use crate::utils::error::{HelperError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ssm::config::Region;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use aws_sdk_ssm::Client as SsmClient;

/// [`ParameterStore`] backed by AWS Systems Manager Parameter Store.
#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    client: SsmClient,
}

impl SsmParameterStore {
    pub fn new(client: SsmClient) -> Self {
        Self { client }
    }

    /// Builds a client from the standard AWS environment (Lambda role, profile, env vars).
    pub async fn from_env(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;
        Self::new(SsmClient::new(&config))
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn fetch(&self, name: &str) -> Result<Option<String>> {
        let result = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await;

        match result {
            Ok(output) => Ok(output
                .parameter()
                .and_then(|parameter| parameter.value())
                .map(str::to_string)),
            Err(err) => {
                let message = DisplayErrorContext(&err).to_string();
                match err.into_service_error() {
                    GetParameterError::ParameterNotFound(_) => Ok(None),
                    _ => {
                        tracing::error!(parameter = name, error = %message, "SSM GetParameter failed");
                        Err(HelperError::ParameterStore {
                            name: name.to_string(),
                            message,
                        })
                    }
                }
            }
        }
    }
}
