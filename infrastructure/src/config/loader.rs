//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["parley.toml", ".parley.toml"];
const ENV_PREFIX: &str = "PARLEY_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `PARLEY_*` environment variables, `__` separating section and key
    ///    (`PARLEY_PROVIDER__MODEL=gpt-4.1`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./parley.toml` or `./.parley.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/parley/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path.map(PathBuf::as_path),
            ENV_PREFIX,
        )
        .extract()
        .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
        env_prefix: &str,
    ) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }

        // An explicit path must exist; figment reports a missing file as an error
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }

        figment.merge(Env::prefixed(env_prefix).split("__"))
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/parley/config.toml if set,
    /// otherwise falls back to ~/.config/parley/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("parley").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Env:     {}*", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./parley.toml or ./.parley.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_domain::Model;
    use std::fs;

    const NO_ENV: &str = "PARLEY_TEST_UNSET_";

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.provider.model, Model::Gpt4o);
        assert!(config.repl.show_progress);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("parley"));
    }

    #[test]
    fn test_project_file_overrides_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        fs::write(&global, "[server]\nport = 4000\n[chat]\ntarget_language = \"Italian\"\n")
            .unwrap();
        fs::write(dir.path().join(".parley.toml"), "[server]\nport = 5000\n").unwrap();

        let project = ConfigLoader::project_config_in(dir.path());
        let config: FileConfig =
            ConfigLoader::figment(Some(&global), project.as_deref(), None, NO_ENV)
                .extract()
                .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.chat.target_language, "Italian");
        assert_eq!(config.chat.native_language, "English");
    }

    #[test]
    fn test_explicit_file_has_highest_file_priority() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("parley.toml"), "[provider]\nmodel = \"gpt-4o-mini\"\n")
            .unwrap();
        let explicit = dir.path().join("custom.toml");
        fs::write(&explicit, "[provider]\nmodel = \"gpt-4.1\"\n").unwrap();

        let project = ConfigLoader::project_config_in(dir.path());
        let config: FileConfig =
            ConfigLoader::figment(None, project.as_deref(), Some(&explicit), NO_ENV)
                .extract()
                .unwrap();

        assert_eq!(config.provider.model, Model::Gpt41);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let result: Result<FileConfig, _> =
            ConfigLoader::figment(None, None, Some(&missing), NO_ENV).extract();
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("custom.toml");
        fs::write(&explicit, "[server]\nport = 4000\n").unwrap();

        // Unique prefix so no other test observes these variables
        unsafe {
            std::env::set_var("PARLEY_LOADER_TEST_SERVER__PORT", "9090");
            std::env::set_var("PARLEY_LOADER_TEST_PROVIDER__MODEL", "gpt-4.1-mini");
        }
        let config: FileConfig =
            ConfigLoader::figment(None, None, Some(&explicit), "PARLEY_LOADER_TEST_")
                .extract()
                .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.provider.model, Model::Gpt41Mini);
    }

    #[test]
    fn test_project_config_in_prefers_plain_name() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigLoader::project_config_in(dir.path()).is_none());
        fs::write(dir.path().join(".parley.toml"), "").unwrap();
        fs::write(dir.path().join("parley.toml"), "").unwrap();
        let found = ConfigLoader::project_config_in(dir.path()).unwrap();
        assert!(found.ends_with("parley.toml"));
        assert!(!found.to_string_lossy().ends_with(".parley.toml"));
    }
}
