use crate::domain::ports::ParameterStore;
use crate::utils::error::Result;

/// Fetches `name` from `store`, falling back to `default` only when the
/// parameter does not exist.
///
/// Any other store failure (access denied, throttling, network) is returned
/// as an error and the default is not used.
pub async fn get_parameter<S>(store: &S, name: &str, default: impl Into<String>) -> Result<String>
where
    S: ParameterStore + ?Sized,
{
    match get_optional_parameter(store, name).await? {
        Some(value) => Ok(value),
        None => {
            tracing::warn!(parameter = name, "Parameter not found, using default");
            Ok(default.into())
        }
    }
}

/// Like [`get_parameter`] without a default: a missing parameter is `Ok(None)`.
pub async fn get_optional_parameter<S>(store: &S, name: &str) -> Result<Option<String>>
where
    S: ParameterStore + ?Sized,
{
    let value = store.fetch(name).await?;
    if value.is_none() {
        tracing::debug!(parameter = name, "Parameter not found");
    }
    Ok(value)
}
