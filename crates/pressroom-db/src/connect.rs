//! PostgreSQL connection handling.

use thiserror::Error;
use tokio_postgres::{Client, Config, NoTls};
use url::Url;

/// A live PostgreSQL connection.
///
/// Wraps a single [`tokio_postgres::Client`]; the driver's connection task is
/// spawned onto the runtime at connect time and lives until the client is
/// dropped. Callers that only read take `&Db`; the migration runner and the
/// seeder take `&mut Db` because transactions require exclusive access to the
/// client.
pub struct Db {
    client: Client,
}

/// Errors that can occur while establishing a connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The connection string is not a URL at all.
    #[error("invalid connection URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The URL parsed but is missing a required part or has the wrong scheme.
    #[error("invalid connection URL: {0}")]
    UrlShape(String),

    /// The database refused or dropped the connection (unreachable host,
    /// bad credentials, missing database).
    #[error("failed to connect to database: {0}")]
    Connect(#[from] tokio_postgres::Error),
}

impl Db {
    /// Connects to a PostgreSQL database using a `postgresql://` URL.
    ///
    /// The URL must carry a host and a database name; user, password and port
    /// are optional. The connection string is never logged.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError`] if the URL is malformed or the database
    /// cannot be reached.
    pub async fn connect(url: &str) -> Result<Self, ConnectError> {
        let url = Url::parse(url)?;

        if url.scheme() != "postgresql" && url.scheme() != "postgres" {
            return Err(ConnectError::UrlShape(format!(
                "expected a postgresql:// scheme, got {}://",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| ConnectError::UrlShape("missing host".to_string()))?;

        let dbname = url.path().trim_start_matches('/');
        if dbname.is_empty() {
            return Err(ConnectError::UrlShape(
                "no database specified in URL path".to_string(),
            ));
        }

        let mut config = Config::new();
        config.host(host);
        config.dbname(dbname);

        if let Some(port) = url.port() {
            config.port(port);
        }

        if !url.username().is_empty() {
            config.user(url.username());
        }

        if let Some(password) = url.password() {
            config.password(password);
        }

        let (client, connection) = config.connect(NoTls).await?;

        // The connection task drives the socket; it ends when the client is
        // dropped, so an error here after shutdown is normal.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "database connection task ended with error");
            }
        });

        Ok(Self { client })
    }

    /// Returns the underlying client for read queries.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the underlying client mutably, as required for transactions.
    pub fn client_mut(&mut self) -> &mut Client {
        &mut self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn connect_err(url: &str) -> ConnectError {
        Db::connect(url)
            .await
            .err()
            .expect("connect should fail without a reachable database")
    }

    #[tokio::test]
    async fn rejects_non_postgres_scheme() {
        let err = connect_err("mysql://localhost/pressroom").await;
        assert!(matches!(err, ConnectError::UrlShape(_)), "got: {err}");
    }

    #[tokio::test]
    async fn rejects_missing_database_name() {
        let err = connect_err("postgresql://localhost:5432").await;
        assert!(matches!(err, ConnectError::UrlShape(_)), "got: {err}");
    }

    #[tokio::test]
    async fn rejects_garbage_url() {
        let err = connect_err("not a url").await;
        assert!(matches!(err, ConnectError::UrlParse(_)), "got: {err}");
    }
}
