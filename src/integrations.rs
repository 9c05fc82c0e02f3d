use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Host used when no integrations file is found, or the file lists none.
pub const DEFAULT_HOST: &str = "gitlab.com";

#[derive(Debug, Error)]
pub enum IntegrationsError {
    #[error("reading {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing TOML from {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    pub gitlab: Vec<GitLabIntegration>,
}

/// Settings for one GitLab instance.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct GitLabIntegration {
    pub host: String,
    #[serde(default)]
    pub token: Option<String>,
    /// REST API root. Defaults to `https://{host}/api/v4`.
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl fmt::Debug for GitLabIntegration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabIntegration")
            .field("host", &self.host)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl GitLabIntegration {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: None,
            api_base_url: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn api_base_url(&self) -> String {
        self.api_base_url.as_deref().map_or_else(
            || format!("https://{}/api/v4", self.host),
            |url| url.trim_end_matches('/').to_owned(),
        )
    }
}

impl IntegrationsConfig {
    /// Find the integration configured for `host`.
    pub fn gitlab_by_host(&self, host: &str) -> Option<&GitLabIntegration> {
        self.gitlab.iter().find(|i| i.host.eq_ignore_ascii_case(host))
    }

    /// Fill missing tokens from `token`, typically `$GITLAB_TOKEN`.
    fn apply_fallback_token(&mut self, token: Option<String>) {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return;
        };
        for integration in &mut self.gitlab {
            if integration.token.is_none() {
                integration.token = Some(token.clone());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Discover and load the integrations config.
///
/// Priority:
/// 1. `--integrations` flag (explicit path)
/// 2. `$SCAFFOLD_KIT_INTEGRATIONS` environment variable
/// 3. `$XDG_CONFIG_HOME/scaffold-kit/integrations.toml`
/// 4. `~/.config/scaffold-kit/integrations.toml`
///
/// Without a file, or with a file that lists no `[[gitlab]]` entries, a
/// single token-less `gitlab.com` entry is used. Entries without a token pick
/// up `$GITLAB_TOKEN` when it is set.
pub fn load_integrations(
    explicit_path: Option<&Path>,
) -> Result<IntegrationsConfig, IntegrationsError> {
    let path = explicit_path
        .map(Path::to_path_buf)
        .or_else(find_integrations_file);

    let mut config = match path {
        Some(path) => {
            tracing::debug!("integrations: reading {}", path.display());
            let contents = std::fs::read_to_string(&path).map_err(|source| {
                IntegrationsError::Read {
                    path: path.clone(),
                    source,
                }
            })?;
            parse_integrations(&path, &contents)?
        }
        None => IntegrationsConfig::default(),
    };
    if config.gitlab.is_empty() {
        tracing::debug!("integrations: no gitlab entries, using {DEFAULT_HOST}");
        config.gitlab.push(GitLabIntegration::new(DEFAULT_HOST));
    }

    config.apply_fallback_token(std::env::var("GITLAB_TOKEN").ok());
    Ok(config)
}

fn parse_integrations(
    path: &Path,
    contents: &str,
) -> Result<IntegrationsConfig, IntegrationsError> {
    toml::from_str(contents).map_err(|source| IntegrationsError::Parse {
        path: path.to_owned(),
        source,
    })
}

fn find_integrations_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SCAFFOLD_KIT_INTEGRATIONS") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("scaffold-kit/integrations.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let p = PathBuf::from(home).join(".config/scaffold-kit/integrations.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}
