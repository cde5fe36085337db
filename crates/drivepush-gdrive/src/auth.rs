//! OAuth2 PKCE authentication flow for the Google Drive API
//!
//! Implements the Authorization Code flow with PKCE (RFC 7636) for
//! authenticating a native application with Google's identity platform.
//!
//! ## Components
//!
//! - [`OAuthConfig`] - Configuration for the OAuth2 flow
//! - [`FileTokenStorage`] - Token cache persisted as a JSON file
//! - [`PkceFlow`] - OAuth2 PKCE challenge/exchange logic
//! - [`LocalCallbackServer`] - Minimal HTTP server for the OAuth redirect
//! - [`DriveAuthenticator`] - Orchestrates the full authentication flow

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, RefreshToken,
    Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Google OAuth2 authorization endpoint
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google OAuth2 token endpoint
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Default redirect URI for the local callback server
const REDIRECT_URI: &str = "http://127.0.0.1:8085/callback";

/// Default OAuth2 scope for full Drive access
const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/drive"];

/// Leeway subtracted from the token lifetime so a token is never used in
/// its final seconds
const EXPIRY_LEEWAY_SECONDS: i64 = 60;

// ============================================================================
// Tokens
// ============================================================================

/// OAuth tokens with their expiry time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tokens {
    /// Bearer token for API requests
    pub access_token: String,
    /// Long-lived token for obtaining fresh access tokens
    pub refresh_token: Option<String>,
    /// Instant after which the access token is no longer valid
    pub expires_at: DateTime<Utc>,
}

impl Tokens {
    /// Returns true when the access token is expired or about to expire
    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_LEEWAY_SECONDS) >= self.expires_at
    }
}

// ============================================================================
// OAuthConfig
// ============================================================================

/// Configuration for the OAuth2 PKCE authentication flow
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID from the Google Cloud console
    pub client_id: String,
    /// Client secret; Google issues one even for native apps using PKCE
    pub client_secret: Option<String>,
    /// Redirect URI for receiving the authorization code
    pub redirect_uri: String,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Creates a new OAuthConfig with the given client id and default settings
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: REDIRECT_URI.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Creates a config with a client secret
    pub fn with_client_secret(mut self, secret: Option<String>) -> Self {
        self.client_secret = secret;
        self
    }

    /// Creates a config with custom scopes
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Creates a config with a custom redirect URI
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = uri.into();
        self
    }
}

// ============================================================================
// FileTokenStorage
// ============================================================================

/// Stores and retrieves OAuth tokens from a JSON file
///
/// The cache lives at the path named by the application config (by default
/// `credentials.json` next to the config file). The file is created with
/// the process umask; it contains a refresh token, so the config directory
/// should not be world-readable.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Creates a storage handle for the given cache path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Writes tokens to the cache file, creating parent directories as needed
    pub fn store(&self, tokens: &Tokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create token cache directory {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(tokens).context("Failed to serialize tokens")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write token cache {}", self.path.display()))?;

        debug!(path = %self.path.display(), "Stored tokens in cache file");
        Ok(())
    }

    /// Loads tokens from the cache file
    ///
    /// # Returns
    /// `Some(Tokens)` if the cache exists and parses, `None` if there is no
    /// cache file yet
    pub fn load(&self) -> Result<Option<Tokens>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No token cache file");
                return Ok(None);
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to read token cache {}", self.path.display())))
            }
        };

        let tokens: Tokens =
            serde_json::from_str(&json).context("Failed to deserialize cached tokens")?;
        debug!(path = %self.path.display(), "Loaded tokens from cache file");
        Ok(Some(tokens))
    }

    /// Deletes the cache file
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Cleared token cache");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No token cache to clear");
                Ok(())
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to delete token cache {}", self.path.display()))),
        }
    }

    /// Returns the cache file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

// ============================================================================
// PkceFlow
// ============================================================================

/// OAuth2 PKCE flow implementation using the `oauth2` crate
///
/// Handles generating authorization URLs with PKCE challenges, exchanging
/// authorization codes for tokens, and refreshing tokens.
pub struct PkceFlow {
    client: BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>,
    scopes: Vec<String>,
}

impl PkceFlow {
    /// Creates a new PkceFlow with the given configuration
    pub fn new(config: &OAuthConfig) -> Result<Self> {
        let mut client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_auth_uri(AuthUrl::new(AUTH_URL.to_string()).context("Invalid authorization URL")?)
            .set_token_uri(TokenUrl::new(TOKEN_URL.to_string()).context("Invalid token URL")?)
            .set_redirect_uri(
                RedirectUrl::new(config.redirect_uri.clone()).context("Invalid redirect URI")?,
            );

        // Google's token endpoint requires the client secret even with PKCE
        // for clients registered as "Desktop app".
        if let Some(secret) = &config.client_secret {
            client = client.set_client_secret(ClientSecret::new(secret.clone()));
        }

        Ok(Self {
            client,
            scopes: config.scopes.clone(),
        })
    }

    /// Generates an authorization URL with a PKCE challenge
    ///
    /// # Returns
    /// A tuple of `(authorization_url, csrf_token, pkce_verifier)`.
    /// The `pkce_verifier` must be kept until the code exchange step.
    pub fn generate_auth_url(&self) -> (String, CsrfToken, PkceCodeVerifier) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = self.client.authorize_url(CsrfToken::new_random);

        for scope in &self.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        // access_type=offline is what makes Google issue a refresh token.
        let (auth_url, csrf_token) = auth_request
            .add_extra_param("access_type", "offline")
            .set_pkce_challenge(pkce_challenge)
            .url();

        debug!("Generated authorization URL");
        (auth_url.to_string(), csrf_token, pkce_verifier)
    }

    /// Exchanges an authorization code for OAuth tokens
    ///
    /// # Arguments
    /// * `code` - The authorization code received from the callback
    /// * `pkce_verifier` - The PKCE verifier generated alongside the auth URL
    pub async fn exchange_code(
        &self,
        code: String,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<Tokens> {
        info!("Exchanging authorization code for tokens");

        let http_client = reqwest::Client::new();
        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client)
            .await
            .context("Failed to exchange authorization code")?;

        let expires_at = token_result
            .expires_in()
            .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
            .unwrap_or_else(|| Utc::now() + Duration::hours(1));

        let tokens = Tokens {
            access_token: token_result.access_token().secret().to_string(),
            refresh_token: token_result.refresh_token().map(|t| t.secret().to_string()),
            expires_at,
        };

        info!("Successfully obtained OAuth tokens");
        Ok(tokens)
    }

    /// Refreshes an expired access token using a refresh token
    ///
    /// Google does not rotate refresh tokens on refresh, so the original
    /// one is carried forward when the response omits it.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Tokens> {
        info!("Refreshing access token");

        let http_client = reqwest::Client::new();
        let token_result = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&http_client)
            .await
            .context("Failed to refresh token")?;

        let expires_at = token_result
            .expires_in()
            .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
            .unwrap_or_else(|| Utc::now() + Duration::hours(1));

        let tokens = Tokens {
            access_token: token_result.access_token().secret().to_string(),
            refresh_token: token_result
                .refresh_token()
                .map(|t| t.secret().to_string())
                .or_else(|| Some(refresh_token.to_string())),
            expires_at,
        };

        info!("Successfully refreshed access token");
        Ok(tokens)
    }
}

// ============================================================================
// LocalCallbackServer
// ============================================================================

/// Minimal HTTP server that listens on localhost for the OAuth2 redirect.
///
/// Starts an HTTP server on `127.0.0.1:8085` that waits for Google to
/// redirect the user's browser back with an authorization code. Once the
/// code is received, it responds with a success HTML page and shuts down.
pub struct LocalCallbackServer;

/// Parameters extracted from the OAuth2 callback
#[derive(Debug)]
pub struct CallbackParams {
    /// The authorization code
    pub code: String,
    /// The CSRF state parameter
    pub state: String,
}

impl LocalCallbackServer {
    /// Starts the local callback server and waits for the OAuth redirect
    pub async fn start() -> Result<CallbackParams> {
        use http_body_util::Full;
        use hyper::body::Bytes;
        use hyper::server::conn::http1;
        use hyper::service::service_fn;
        use hyper::{Request, Response, StatusCode};
        use hyper_util::rt::TokioIo;
        use tokio::net::TcpListener;
        use tokio::sync::oneshot;

        info!("Starting local OAuth callback server on 127.0.0.1:8085");

        let listener = TcpListener::bind("127.0.0.1:8085")
            .await
            .context("Failed to bind callback server to 127.0.0.1:8085")?;

        let (tx, rx) = oneshot::channel::<CallbackParams>();
        let tx = std::sync::Arc::new(tokio::sync::Mutex::new(Some(tx)));

        // Accept a single connection
        let (stream, _addr) = listener
            .accept()
            .await
            .context("Failed to accept connection on callback server")?;

        let io = TokioIo::new(stream);
        let tx_clone = tx.clone();

        let service = service_fn(move |req: Request<hyper::body::Incoming>| {
            let tx_inner = tx_clone.clone();
            async move {
                let uri = req.uri().to_string();
                debug!("Callback server received request: {}", uri);

                let params = parse_callback_params(&uri);

                match params {
                    Some(callback_params) => {
                        if let Some(sender) = tx_inner.lock().await.take() {
                            let _ = sender.send(callback_params);
                        }

                        let html = success_html();
                        Ok::<_, hyper::Error>(
                            Response::builder()
                                .status(StatusCode::OK)
                                .header("Content-Type", "text/html; charset=utf-8")
                                .body(Full::new(Bytes::from(html)))
                                .unwrap(),
                        )
                    }
                    None => {
                        let html = error_html("Missing authorization code in callback");
                        Ok(Response::builder()
                            .status(StatusCode::BAD_REQUEST)
                            .header("Content-Type", "text/html; charset=utf-8")
                            .body(Full::new(Bytes::from(html)))
                            .unwrap())
                    }
                }
            }
        });

        // Serve the single connection
        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                warn!("Callback server connection error: {}", e);
            }
        });

        let params = rx
            .await
            .context("Callback server channel closed without receiving parameters")?;

        info!("Received OAuth callback with authorization code");
        Ok(params)
    }
}

/// Parses the authorization code and state from a callback URI
fn parse_callback_params(uri: &str) -> Option<CallbackParams> {
    let url = url::Url::parse(&format!("http://localhost{}", uri)).ok()?;
    let mut code = None;
    let mut state = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.to_string()),
            "state" => state = Some(value.to_string()),
            _ => {}
        }
    }

    Some(CallbackParams {
        code: code?,
        state: state.unwrap_or_default(),
    })
}

/// Returns the HTML for a successful authentication page
fn success_html() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>DrivePush - Authentication Successful</title></head>
<body style="font-family: sans-serif; text-align: center; padding-top: 50px;">
    <h1>Authentication Successful</h1>
    <p>You have been authenticated with Google Drive.</p>
    <p>You can close this window and return to DrivePush.</p>
    <script>setTimeout(function() { window.close(); }, 3000);</script>
</body>
</html>"#
        .to_string()
}

/// Returns the HTML for an authentication error page
fn error_html(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>DrivePush - Authentication Error</title></head>
<body style="font-family: sans-serif; text-align: center; padding-top: 50px;">
    <h1>Authentication Error</h1>
    <p>{}</p>
    <p>Please close this window and try again.</p>
</body>
</html>"#,
        message
    )
}

// ============================================================================
// DriveAuthenticator
// ============================================================================

/// High-level authenticator that orchestrates the full OAuth2 PKCE flow.
///
/// Combines [`PkceFlow`], [`LocalCallbackServer`], the browser, and the
/// file-backed token cache:
///
/// 1. Loads cached tokens and reuses them while they are valid
/// 2. Refreshes via the cached refresh token when the access token expired
/// 3. Falls back to the interactive browser login otherwise
/// 4. Persists whatever tokens the flow ends with
pub struct DriveAuthenticator {
    config: OAuthConfig,
    storage: FileTokenStorage,
}

impl DriveAuthenticator {
    /// Creates a new DriveAuthenticator with the given configuration
    pub fn new(config: OAuthConfig, storage: FileTokenStorage) -> Self {
        Self { config, storage }
    }

    /// Performs the full interactive OAuth2 PKCE login flow
    ///
    /// This will:
    /// 1. Generate a PKCE-secured authorization URL
    /// 2. Open the user's default browser to the Google consent page
    /// 3. Start a local HTTP server to receive the callback
    /// 4. Exchange the authorization code for tokens and cache them
    pub async fn login(&self) -> Result<Tokens> {
        info!("Starting OAuth2 PKCE login flow");

        let flow = PkceFlow::new(&self.config)?;

        let (auth_url, _csrf_token, pkce_verifier) = flow.generate_auth_url();

        info!("Opening browser for authentication");
        webbrowser::open(&auth_url).context("Failed to open browser for authentication")?;

        let callback = LocalCallbackServer::start().await?;

        let tokens = flow.exchange_code(callback.code, pkce_verifier).await?;
        self.storage.store(&tokens)?;

        info!("OAuth2 PKCE login completed successfully");
        Ok(tokens)
    }

    /// Refreshes an expired access token and updates the cache
    pub async fn refresh(&self, refresh_token: &str) -> Result<Tokens> {
        let flow = PkceFlow::new(&self.config)?;
        let tokens = flow.refresh_token(refresh_token).await?;
        self.storage.store(&tokens)?;
        Ok(tokens)
    }

    /// Returns valid tokens, going interactive only when it has to
    ///
    /// Order of preference: cached and unexpired tokens, a silent refresh,
    /// then the browser login.
    pub async fn obtain(&self) -> Result<Tokens> {
        if let Some(tokens) = self.storage.load()? {
            if !tokens.is_expired() {
                debug!("Using cached access token");
                return Ok(tokens);
            }
            if let Some(refresh_token) = &tokens.refresh_token {
                match self.refresh(refresh_token).await {
                    Ok(fresh) => return Ok(fresh),
                    Err(e) => warn!("Token refresh failed, falling back to login: {e:#}"),
                }
            }
        }
        self.login().await
    }

    /// Removes cached tokens
    pub fn logout(&self) -> Result<()> {
        self.storage.clear()
    }

    /// Returns cached tokens without contacting the network
    pub fn cached(&self) -> Result<Option<Tokens>> {
        self.storage.load()
    }

    /// Returns a reference to the current configuration
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }
}
