use crate::utils::error::Result;
use sqlx::{AnyConnection, Connection};

/// Opens a single connection for the `Any` driver (`mysql://…` or `sqlite:…`).
///
/// The caller owns the connection; nothing here pools or reconnects.
pub async fn connect(database_url: &str) -> Result<AnyConnection> {
    sqlx::any::install_default_drivers();
    let conn = AnyConnection::connect(database_url).await?;
    tracing::debug!(backend = conn.backend_name(), "Opened database connection");
    Ok(conn)
}
