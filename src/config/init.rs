// ABOUTME: Config scaffolding for new setups.
// ABOUTME: Writes a commented tagtrim.yml template.

use std::path::Path;

use crate::error::{Error, Result};
use crate::registry::DEFAULT_REGISTRY_URL;
use crate::types::RepositoryName;

use super::CONFIG_FILENAME;

pub fn init_config(dir: &Path, repository: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let repository = RepositoryName::parse(repository.unwrap_or("my-org/my-app"))
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;

    std::fs::write(&config_path, generate_template_yaml(&repository))?;

    Ok(())
}

fn generate_template_yaml(repository: &RepositoryName) -> String {
    format!(
        r#"repository: {repository}
username: {namespace}
password:
  env: DOCKER_PASSWORD

retention:
  # Keep at most this many of the most recently updated tags
  keep_count: 20
  # Delete oldest tags until the repository fits (0 or less disables)
  # max_size_mb: 2048

# One tag name per line; listed tags are never deleted
# protect_file: protected-tags.txt

registry:
  url: {url}
  page_size: 100
  timeout: 30s
  retries: 2
"#,
        namespace = repository.namespace(),
        url = DEFAULT_REGISTRY_URL,
    )
}
