use crate::utils::error::Result;
use async_trait::async_trait;

/// A remote key-value store for configuration and secrets.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetches the decrypted value of `name`.
    ///
    /// `Ok(None)` means the store answered and the parameter does not exist.
    /// Every other failure is an `Err`.
    async fn fetch(&self, name: &str) -> Result<Option<String>>;
}
