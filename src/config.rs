use clap::ValueEnum;
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "cospend";

/// Supported config file formats, in search order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
  #[default]
  Json,
  Yaml,
  Toml,
}

impl ConfigFormat {
  fn extension(self) -> &'static str {
    match self {
      Self::Json => "json",
      Self::Yaml => "yaml",
      Self::Toml => "toml",
    }
  }

  fn from_path(path: &Path) -> Result<Self> {
    match path.extension().and_then(|e| e.to_str()) {
      Some("json") => Ok(Self::Json),
      Some("yaml") | Some("yml") => Ok(Self::Yaml),
      Some("toml") => Ok(Self::Toml),
      _ => Err(eyre!("Unsupported config format: {}", path.display())),
    }
  }
}

/// Nextcloud connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub domain: String,
  #[serde(default)]
  pub user: String,
  /// Account password or app token
  #[serde(default)]
  pub password: String,
}

impl Config {
  /// Load configuration from file and environment.
  ///
  /// The first `cospend.{json,yaml,yml,toml}` found is read from:
  /// 1. $XDG_CONFIG_HOME/cospend
  /// 2. the platform config directory
  /// 3. ~/.config/cospend
  ///
  /// NEXTCLOUD_DOMAIN, NEXTCLOUD_USER and NEXTCLOUD_PASSWORD override file
  /// values. All three settings are required.
  pub fn load() -> Result<Self> {
    Self::load_from(&search_dirs(), |name| std::env::var(name).ok())
  }

  fn load_from(dirs: &[PathBuf], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let mut config = match find_config_file(dirs) {
      Some(path) => {
        tracing::debug!(path = %path.display(), "Loading config file");
        Self::load_from_path(&path)?
      }
      None => Self::default(),
    };

    let var = |name: &str| env(name).filter(|v| !v.is_empty());
    if let Some(domain) = var("NEXTCLOUD_DOMAIN") {
      config.domain = domain;
    }
    if let Some(user) = var("NEXTCLOUD_USER") {
      config.user = user;
    }
    if let Some(password) = var("NEXTCLOUD_PASSWORD") {
      config.password = password;
    }

    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    let required = [
      ("domain", &self.domain, "NEXTCLOUD_DOMAIN"),
      ("user", &self.user, "NEXTCLOUD_USER"),
      ("password", &self.password, "NEXTCLOUD_PASSWORD"),
    ];

    for (field, value, var) in required {
      if value.is_empty() {
        return Err(eyre!(
          "{} is required (set in config file or {} env var)",
          field,
          var
        ));
      }
    }
    Ok(())
  }

  pub fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config = match ConfigFormat::from_path(path)? {
      ConfigFormat::Json => serde_json::from_str(&contents).map_err(|e| e.to_string()),
      ConfigFormat::Yaml => serde_yaml::from_str(&contents).map_err(|e| e.to_string()),
      ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| e.to_string()),
    };

    config.map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  /// Write to `cospend.<ext>` in the primary config directory.
  pub fn save(&self, format: ConfigFormat) -> Result<PathBuf> {
    let dir = config_dir().ok_or_else(|| eyre!("Could not determine config directory"))?;
    let path = dir.join(format!("{}.{}", APP_NAME, format.extension()));
    self.save_to_path(&path)?;
    Ok(path)
  }

  /// Write to `path`, format chosen by extension. The file is only readable
  /// by its owner.
  pub fn save_to_path(&self, path: &Path) -> Result<()> {
    let contents = match ConfigFormat::from_path(path)? {
      ConfigFormat::Json => serde_json::to_string_pretty(self)
        .map(|s| s + "\n")
        .map_err(|e| e.to_string()),
      ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| e.to_string()),
      ConfigFormat::Toml => toml::to_string(self).map_err(|e| e.to_string()),
    }
    .map_err(|e| eyre!("Failed to encode config: {}", e))?;

    if let Some(dir) = path.parent() {
      create_private_dir(dir)?;
    }

    write_private_file(path, contents.as_bytes())
      .map_err(|e| eyre!("Failed to write config file {}: {}", path.display(), e))
  }
}

/// Directory new config files are written to.
pub fn config_dir() -> Option<PathBuf> {
  non_empty_env("XDG_CONFIG_HOME")
    .map(PathBuf::from)
    .or_else(dirs::config_dir)
    .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
    .map(|dir| dir.join(APP_NAME))
}

fn search_dirs() -> Vec<PathBuf> {
  let mut dirs: Vec<PathBuf> = Vec::new();
  let candidates = [
    non_empty_env("XDG_CONFIG_HOME").map(|dir| PathBuf::from(dir).join(APP_NAME)),
    dirs::config_dir().map(|dir| dir.join(APP_NAME)),
    dirs::home_dir().map(|home| home.join(".config").join(APP_NAME)),
  ];

  for dir in candidates.into_iter().flatten() {
    if !dirs.contains(&dir) {
      dirs.push(dir);
    }
  }
  dirs
}

/// An existing config file in `dirs`, or `None`.
pub fn find_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
  dirs.iter().find_map(|dir| {
    ["json", "yaml", "yml", "toml"]
      .iter()
      .map(|ext| dir.join(format!("{}.{}", APP_NAME, ext)))
      .find(|path| path.is_file())
  })
}

/// Path of the config file `load` would read, if any.
pub fn existing_config_file() -> Option<PathBuf> {
  find_config_file(&search_dirs())
}

/// Strip trailing slashes and default the scheme to https.
pub fn normalize_url(url: &str) -> String {
  let url = url.trim().trim_end_matches('/');
  let lower = url.to_lowercase();
  if lower.starts_with("http://") || lower.starts_with("https://") {
    url.to_string()
  } else {
    format!("https://{}", url)
  }
}

fn non_empty_env(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn create_private_dir(dir: &Path) -> Result<()> {
  std::fs::create_dir_all(dir)
    .map_err(|e| eyre!("Failed to create config directory {}: {}", dir.display(), e))?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))
      .map_err(|e| eyre!("Failed to set permissions on {}: {}", dir.display(), e))?;
  }

  Ok(())
}

fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
  use std::io::Write;

  let mut options = std::fs::OpenOptions::new();
  options.write(true).create(true).truncate(true);
  #[cfg(unix)]
  {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o600);
  }

  let mut file = options.open(path)?;
  file.write_all(contents)?;

  // Mode only applies on creation
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
  }

  file.sync_all()
}
