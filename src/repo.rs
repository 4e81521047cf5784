//! Repository identifiers

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error("Invalid repository format {0:?}. Expected 'owner/repo' or full URL")]
    InvalidFormat(String),
}

const HUB_PREFIXES: [&str; 2] = ["https://huggingface.co/", "http://huggingface.co/"];

/// Normalize `owner/repo` or a hub URL to `owner/repo`
pub fn parse_repo_id(repo: &str) -> Result<String, RepoError> {
    let repo = repo.trim();

    if let Some(path) = HUB_PREFIXES.iter().find_map(|p| repo.strip_prefix(p)) {
        let mut parts = path.split('/').filter(|p| !p.is_empty());
        if let (Some(owner), Some(name)) = (parts.next(), parts.next()) {
            return Ok(format!("{}/{}", owner, name));
        }
        return Err(RepoError::InvalidFormat(repo.to_string()));
    }

    if !repo.contains("://") {
        let parts: Vec<&str> = repo.split('/').collect();
        if parts.len() == 2 && parts.iter().all(|p| !p.is_empty()) {
            return Ok(repo.to_string());
        }
    }

    Err(RepoError::InvalidFormat(repo.to_string()))
}
