//! Authenticated Space-Track client.

use tracing::{debug, info, warn};

use super::error::{CatalogError, CatalogResult};
use super::query::TleQuery;
use super::records::{CatalogResponse, ElementSet};
use super::session::{HttpSession, ReqwestSessionFactory, SessionFactory};
use crate::config::{CatalogConfig, Credentials};

/// Body Space-Track returns with a 200 status when credentials are wrong.
const LOGIN_FAILED_MARKER: &str = r#""Login":"Failed""#;

/// Outcome of a single-object lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The object was found.
    Found(T),
    /// The query succeeded but matched nothing.
    NotFound,
    /// The query failed.
    Failed(String),
}

/// Client for the Space-Track query API.
///
/// Owns at most one session. The session is opened by the first
/// [`login`](Self::login), reused by every later request, and dropped by
/// [`close`](Self::close), after which the next request logs in again.
pub struct CatalogClient {
    credentials: Credentials,
    base_url: String,
    default_limit: u32,
    epoch_window_days: u32,
    factory: Box<dyn SessionFactory>,
    session: Option<Box<dyn HttpSession>>,
    authenticated: bool,
}

impl CatalogClient {
    /// Creates a client that talks HTTP through [`reqwest`].
    #[must_use]
    pub fn new(credentials: Credentials, config: &CatalogConfig) -> Self {
        Self::with_factory(
            credentials,
            config,
            ReqwestSessionFactory::from_config(config),
        )
    }

    /// Creates a client with a custom session factory.
    #[must_use]
    pub fn with_factory(
        credentials: Credentials,
        config: &CatalogConfig,
        factory: impl SessionFactory + 'static,
    ) -> Self {
        Self {
            credentials,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_limit: config.default_limit,
            epoch_window_days: config.default_epoch_window_days,
            factory: Box::new(factory),
            session: None,
            authenticated: false,
        }
    }

    /// Returns `true` after a successful login and until [`close`](Self::close).
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns `true` while a session is open.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the configured result limit for bulk queries.
    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Builds the query path for `query` using the configured epoch window.
    #[must_use]
    pub fn query_path(&self, query: &TleQuery) -> String {
        query.to_path(self.epoch_window_days)
    }

    /// Logs in eagerly so that bad credentials surface at startup.
    ///
    /// Same contract as [`login`](Self::login).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Authentication`] if the login fails.
    pub async fn connect(&mut self) -> CatalogResult<()> {
        self.login().await
    }

    /// Authenticates the session. Does nothing if already authenticated.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Authentication`] if the service rejects the
    /// credentials or cannot be reached.
    pub async fn login(&mut self) -> CatalogResult<()> {
        if self.authenticated {
            return Ok(());
        }

        self.open_session()
            .map_err(|e| CatalogError::Authentication {
                message: e.to_string(),
            })?;
        let session = self.active_session()?;

        let url = format!("{}/ajaxauth/login", self.base_url);
        let form = [
            ("identity", self.credentials.username()),
            ("password", self.credentials.password()),
        ];

        let reply = session
            .post_form(&url, &form)
            .await
            .map_err(|e| CatalogError::Authentication {
                message: format!("failed to connect to Space-Track for authentication: {e}"),
            })?;

        if !reply.is_success() {
            return Err(CatalogError::Authentication {
                message: format!("login returned status {}", reply.status),
            });
        }
        if reply.body.contains(LOGIN_FAILED_MARKER) {
            return Err(CatalogError::Authentication {
                message: "credentials rejected".to_string(),
            });
        }

        self.authenticated = true;
        info!(
            username = %self.credentials.username(),
            "Authenticated with Space-Track"
        );
        Ok(())
    }

    /// Runs a query below `/basicspacedata/query/`, logging in first if needed.
    ///
    /// JSON responses are decoded into records; any other content type is
    /// returned as text.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Authentication`] if the implicit login fails
    /// - [`CatalogError::Transport`] if the request cannot be sent
    /// - [`CatalogError::Request`] on a non-2xx status
    /// - [`CatalogError::Decode`] if a JSON body cannot be decoded
    pub async fn query(&mut self, path: &str) -> CatalogResult<CatalogResponse> {
        self.login().await?;
        let session = self.active_session()?;

        let url = format!("{}/basicspacedata/query/{path}", self.base_url);
        debug!(url = %url, "Querying Space-Track");

        let reply = session.get(&url).await?;
        if !reply.is_success() {
            return Err(CatalogError::Request {
                status: reply.status,
                body: reply.body,
            });
        }

        if reply.is_json() {
            CatalogResponse::from_json(&reply.body)
        } else {
            Ok(CatalogResponse::Text(reply.body))
        }
    }

    /// Fetches element sets matching `query`, newest first.
    ///
    /// Failures are logged and yield an empty result in the requested
    /// format rather than an error.
    pub async fn fetch_element_sets(&mut self, query: &TleQuery) -> CatalogResponse {
        let path = self.query_path(query);
        info!(path = %path, "Space-Track element set query");

        match self.query(&path).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Element set query failed, returning empty result");
                CatalogResponse::empty(query.format)
            }
        }
    }

    /// Fetches the most recent element set for one satellite.
    ///
    /// Unlike [`fetch_element_sets`](Self::fetch_element_sets), request
    /// failures are reported as [`Lookup::Failed`].
    pub async fn latest_element_set(&mut self, norad_cat_id: u64) -> Lookup<ElementSet> {
        let query = TleQuery::for_satellite(norad_cat_id).with_limit(1);
        let path = self.query_path(&query);

        let records = match self.query(&path).await {
            Ok(CatalogResponse::Records(records)) => records,
            Ok(CatalogResponse::Text(_)) => {
                return Lookup::Failed("expected JSON records from Space-Track".to_string());
            }
            Err(e) => {
                warn!(norad_cat_id, error = %e, "Latest element set lookup failed");
                return Lookup::Failed(e.to_string());
            }
        };

        let Some(record) = records.first() else {
            return Lookup::NotFound;
        };

        match ElementSet::from_record(record) {
            Ok(element_set) => Lookup::Found(element_set),
            Err(e) => Lookup::Failed(e.to_string()),
        }
    }

    /// Logs out and drops the session. Safe to call without a session.
    ///
    /// The session is dropped and the client reset even when logout fails.
    ///
    /// # Errors
    ///
    /// Returns the logout failure so the caller can report it.
    pub async fn close(&mut self) -> CatalogResult<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let was_authenticated = std::mem::replace(&mut self.authenticated, false);
        if !was_authenticated {
            return Ok(());
        }

        let url = format!("{}/ajaxauth/logout", self.base_url);
        let reply = session.get(&url).await?;
        if !reply.is_success() {
            return Err(CatalogError::Request {
                status: reply.status,
                body: reply.body,
            });
        }

        debug!("Space-Track session closed");
        Ok(())
    }

    fn open_session(&mut self) -> CatalogResult<()> {
        if self.session.is_none() {
            debug!("Opening Space-Track session");
            self.session = Some(self.factory.open()?);
        }
        Ok(())
    }

    fn active_session(&self) -> CatalogResult<&dyn HttpSession> {
        self.session
            .as_deref()
            .ok_or_else(|| CatalogError::Transport {
                message: "no open session".to_string(),
            })
    }
}
