use thiserror::Error;
use url::Url;

/// Target repository parsed from a `host?owner=<owner>&repo=<repo>` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoUrl {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoUrlError {
    #[error("invalid repo URL {url:?}: {reason}")]
    Malformed { url: String, reason: String },
    #[error("invalid repo URL {url:?}: missing {param}")]
    MissingParam { url: String, param: &'static str },
}

/// Parse a repo URL of the form `host?owner=<owner>&repo=<repo>`.
///
/// The host carries no scheme. `owner` may contain slashes for nested
/// groups (`owner=group/subgroup`). Both parameters are required and must be
/// non-empty.
pub fn parse_repo_url(repo_url: &str) -> Result<RepoUrl, RepoUrlError> {
    let malformed = |reason: &str| RepoUrlError::Malformed {
        url: repo_url.to_owned(),
        reason: reason.to_owned(),
    };

    if repo_url.contains("://") {
        return Err(malformed("expected host without scheme"));
    }

    let parsed =
        Url::parse(&format!("https://{repo_url}")).map_err(|e| malformed(&e.to_string()))?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| malformed("missing host"))?;
    if parsed.path() != "/" {
        return Err(malformed("unexpected path after host"));
    }

    let param = |name: &'static str| {
        parsed
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| RepoUrlError::MissingParam {
                url: repo_url.to_owned(),
                param: name,
            })
    };

    let host = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    };

    Ok(RepoUrl {
        host,
        owner: param("owner")?,
        repo: param("repo")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_repo_url() {
        assert_eq!(
            parse_repo_url("gitlab.com?repo=repo&owner=owner"),
            Ok(RepoUrl {
                host: "gitlab.com".to_owned(),
                owner: "owner".to_owned(),
                repo: "repo".to_owned(),
            })
        );
    }

    #[test]
    fn parse_nested_group_owner() {
        let parsed = parse_repo_url("gitlab.example.com?owner=group%2Fsub&repo=app").unwrap();
        assert_eq!(parsed.host, "gitlab.example.com");
        assert_eq!(parsed.owner, "group/sub");
    }

    #[test]
    fn parse_host_with_port() {
        let parsed = parse_repo_url("git.internal:8443?owner=o&repo=r").unwrap();
        assert_eq!(parsed.host, "git.internal:8443");
    }

    #[test]
    fn missing_params_are_reported() {
        assert_eq!(
            parse_repo_url("gitlab.com?repo=repo"),
            Err(RepoUrlError::MissingParam {
                url: "gitlab.com?repo=repo".to_owned(),
                param: "owner",
            })
        );
        assert!(matches!(
            parse_repo_url("gitlab.com?owner=o&repo="),
            Err(RepoUrlError::MissingParam { param: "repo", .. })
        ));
    }

    #[test]
    fn malformed_repo_urls() {
        assert!(matches!(
            parse_repo_url("https://gitlab.com?owner=o&repo=r"),
            Err(RepoUrlError::Malformed { .. })
        ));
        assert!(matches!(
            parse_repo_url("?owner=o&repo=r"),
            Err(RepoUrlError::Malformed { .. })
        ));
        assert!(matches!(
            parse_repo_url("gitlab.com/owner/repo"),
            Err(RepoUrlError::Malformed { .. })
        ));
    }
}
