//! Minimal Google Drive v3 client: service-account auth, folder listing,
//! file download.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use futures_util::StreamExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Read-only access to file metadata and content.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const PAGE_SIZE: &str = "1000";

/// Errors talking to Drive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("failed to read credentials {path}: {source}")]
    Credentials {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid service-account key {path}: {source}")]
    InvalidCredentials {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Drive API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The fields of a service-account key file that signing needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, DriveError> {
        let content = std::fs::read_to_string(path).map_err(|source| DriveError::Credentials {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| DriveError::InvalidCredentials {
            path: path.display().to_string(),
            source,
        })
    }

    fn claims(&self, issued_at: i64) -> Claims<'_> {
        Claims {
            iss: &self.client_email,
            scope: DRIVE_READONLY_SCOPE,
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + TOKEN_LIFETIME_SECS,
        }
    }

    /// RS256-signed assertion for the OAuth2 JWT-bearer grant.
    pub fn assertion(&self, issued_at: i64) -> Result<String, DriveError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        let token = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &self.claims(issued_at), &key)?;
        Ok(token)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A PDF listed in a Drive folder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Query selecting the non-trashed PDFs directly inside `folder_id`.
pub fn folder_query(folder_id: &str) -> String {
    let escaped = folder_id.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "'{}' in parents and mimeType='application/pdf' and trashed=false",
        escaped
    )
}

/// Authenticated Drive client.
pub struct DriveClient {
    http: reqwest::Client,
    token: String,
}

impl DriveClient {
    /// Exchange a signed service-account assertion for an access token.
    pub async fn connect(credentials: &Path) -> Result<Self, DriveError> {
        let key = ServiceAccountKey::from_file(credentials)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("shiwake-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let assertion = key.assertion(Utc::now().timestamp())?;
        let response = http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;

        info!("Authenticated to Drive as {}", key.client_email);
        Ok(Self {
            http,
            token: token.access_token,
        })
    }

    /// Every PDF in the folder, in the order the API returns them.
    pub async fn list_pdfs(&self, folder_id: &str) -> Result<Vec<DriveFile>, DriveError> {
        let query = folder_query(folder_id);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/files", DRIVE_API))
                .bearer_auth(&self.token)
                .query(&[
                    ("q", query.as_str()),
                    ("fields", "nextPageToken, files(id, name)"),
                    ("pageSize", PAGE_SIZE),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: FileList = check(request.send().await?).await?.json().await?;
            debug!("Listed {} files", page.files.len());
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!("Found {} PDFs in folder {}", files.len(), folder_id);
        Ok(files)
    }

    /// Stream a file's content into a temporary `.pdf` file, removed on drop.
    pub async fn download(&self, file: &DriveFile) -> Result<NamedTempFile, DriveError> {
        let response = self
            .http
            .get(format!("{}/files/{}", DRIVE_API, file.id))
            .bearer_auth(&self.token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let response = check(response).await?;

        let mut temp = tempfile::Builder::new()
            .prefix("shiwake-")
            .suffix(".pdf")
            .tempfile()?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            temp.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
        }
        temp.flush()?;

        debug!("Downloaded {} ({} bytes) to {}", file.name, downloaded, temp.path().display());
        Ok(temp)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DriveError::Api {
        status: status.as_u16(),
        body,
    })
}
