//! Project root resolution and configuration loading.

use std::path::{Path, PathBuf};

use quickcov_cache::CacheStore;
use quickcov_config::{QuickCovConfig, CONFIG_FILE};

use crate::GlobalArgs;

/// Files whose presence marks a project root.
const ROOT_MARKERS: [&str; 2] = [CONFIG_FILE, "package.json"];

/// A resolved project: its root directory and validated configuration.
#[derive(Debug)]
pub struct Project {
    /// Directory the runner is spawned in and all relative paths start from.
    pub root: PathBuf,
    /// Loaded configuration.
    pub config: QuickCovConfig,
}

impl Project {
    /// Resolves the project from global CLI args.
    ///
    /// `--config <file>` makes the file's directory the root; `--config <dir>`
    /// uses the directory itself. Otherwise the root is the nearest directory
    /// at or above the current one holding `quickcov.toml` or `package.json`,
    /// or the current directory when there is none.
    pub fn load(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(ref config_path) = global.config {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                let root = match p.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => PathBuf::from("."),
                };
                let config = quickcov_config::load_config_file(&p)?;
                return Ok(Self { root, config });
            }
            if !p.is_dir() {
                return Err(format!("config path {} does not exist", p.display()).into());
            }
            let config = quickcov_config::load_config(&p)?;
            return Ok(Self { root: p, config });
        }

        let cwd = std::env::current_dir()?;
        let root = find_project_root(&cwd).unwrap_or(cwd);
        let config = quickcov_config::load_config(&root)?;
        Ok(Self { root, config })
    }

    /// The snapshot store configured for this project.
    pub fn cache_store(&self) -> CacheStore {
        CacheStore::new(self.root.join(&self.config.cache.file))
    }

    /// Where the runner writes its coverage report.
    pub fn report_path(&self) -> PathBuf {
        self.root.join(&self.config.runner.coverage_report)
    }
}

/// Walks up from `start` looking for the nearest directory containing a root marker.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if ROOT_MARKERS
            .iter()
            .any(|marker| current.join(marker).is_file())
        {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn global(config: Option<&Path>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: config.map(|p| p.to_str().unwrap().to_string()),
            reset: false,
            dry_run: false,
        }
    }

    #[test]
    fn find_project_root_by_package_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), "{}").unwrap();
        let root = find_project_root(tmp.path()).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "").unwrap();
        let sub = tmp.path().join("src/deep");
        fs::create_dir_all(&sub).unwrap();
        let root = find_project_root(&sub).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn load_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("ci.toml");
        fs::write(&config_path, "[cache]\nfile = \"ci/cache.json\"\n").unwrap();

        let project = Project::load(&global(Some(&config_path))).unwrap();
        assert_eq!(project.root, tmp.path());
        assert_eq!(
            project.cache_store().path(),
            tmp.path().join("ci/cache.json")
        );
    }

    #[test]
    fn load_from_config_dir() {
        let tmp = TempDir::new().unwrap();
        let project = Project::load(&global(Some(tmp.path()))).unwrap();
        assert_eq!(project.root, tmp.path());
        assert_eq!(
            project.report_path(),
            tmp.path().join("coverage/coverage-final.json")
        );
    }

    #[test]
    fn missing_config_path_errors() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        let err = Project::load(&global(Some(&missing))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
