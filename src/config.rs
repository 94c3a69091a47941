use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of `buildorder.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildorderConfig {
    /// Glob patterns, relative to the project root, selecting source files
    pub files: Vec<String>,
    /// Gitignore-style patterns excluded on top of the built-in defaults
    pub exclude: Vec<String>,
    /// Fail on node kinds the scanner does not know
    pub strict: bool,
    /// Scan workers; 0 picks the available parallelism
    pub workers: usize,
    /// Interpreter used to produce ASTs for `.rb` files
    pub ruby: String,
}

impl Default for BuildorderConfig {
    fn default() -> Self {
        Self {
            files: vec!["**/*.rb".to_string()],
            exclude: Vec::new(),
            strict: false,
            workers: 0,
            ruby: "ruby".to_string(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("buildorder.toml")
}

pub fn default_config_path_in(base: &Path) -> PathBuf {
    base.join(default_config_path())
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<BuildorderConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: BuildorderConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &BuildorderConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded = load_config(Some(&dir.path().join("buildorder.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("buildorder.toml");
        std::fs::write(&path, "strict = true\nexclude = [\"spec/\"]\n").unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert!(config.strict);
        assert_eq!(config.exclude, vec!["spec/"]);
        assert_eq!(config.files, vec!["**/*.rb"]);
        assert_eq!(config.ruby, "ruby");
        assert_eq!(config.workers, 0);
    }

    #[test]
    fn test_write_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = default_config_path_in(dir.path());
        let config = BuildorderConfig::default();

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        assert_eq!(load_config(Some(&path)).unwrap(), Some(config));
    }

    #[test]
    fn test_invalid_config_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("buildorder.toml");
        std::fs::write(&path, "workers = \"many\"").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("buildorder.toml"));
    }
}
