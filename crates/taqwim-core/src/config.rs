use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::datastore::DEFAULT_STORE_KEY;
use crate::occasions::{
  OccasionEntry,
  OccasionTable
};
use crate::task::MAX_RECURRENCE_COUNT;

const CONFIG_FILE: &str = "taqwim.toml";
const CONFIG_ENV_VAR: &str =
  "TAQWIM_CONFIG";
const DATA_DIR_ENV_VAR: &str =
  "TAQWIM_DATA_DIR";

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
  data_dir:           Option<String>,
  store_key:          Option<String>,
  max_recurrence:     Option<i64>,
  log_filter:         Option<String>,
  national_occasions:
    Option<Vec<OccasionEntry>>
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  pub data_dir:       Option<PathBuf>,
  pub store_key:      String,
  pub max_recurrence: i32,
  pub log_filter:     Option<String>,
  pub occasions:      OccasionTable,
  pub loaded_file:    Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      data_dir:       None,
      store_key:
        DEFAULT_STORE_KEY.to_string(),
      max_recurrence:
        MAX_RECURRENCE_COUNT,
      log_filter:     None,
      occasions:
        OccasionTable::default(),
      loaded_file:    None
    }
  }
}

impl Config {
  /// Load from `override_path`, `$TAQWIM_CONFIG`, or
  /// `<config dir>/taqwim/taqwim.toml`, in that order. A missing file
  /// gives the defaults.
  #[tracing::instrument(skip(
    override_path
  ))]
  pub fn load(
    override_path: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    match resolve_config_path(
      override_path
    ) {
      | Some(path) if path.exists() => {
        info!(file = %path.display(), "loading config");
        let text =
          fs::read_to_string(&path)
            .with_context(|| {
              format!(
                "failed to read {}",
                path.display()
              )
            })?;
        cfg.merge_toml(&text).with_context(
          || {
            format!(
              "failed to parse {}",
              path.display()
            )
          }
        )?;
        cfg.loaded_file = Some(path);
      }
      | Some(path) => {
        warn!(file = %path.display(), "config file not found; using defaults");
      }
      | None => {
        warn!(
          "no config location; using \
           defaults"
        );
      }
    }

    if let Ok(dir) =
      std::env::var(DATA_DIR_ENV_VAR)
      && !dir.trim().is_empty()
    {
      debug!(dir = %dir, "data dir from environment");
      cfg.data_dir =
        Some(expand_tilde(Path::new(
          dir.trim()
        )));
    }

    Ok(cfg)
  }

  pub fn from_toml(
    text: &str
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();
    cfg.merge_toml(text)?;
    Ok(cfg)
  }

  fn merge_toml(
    &mut self,
    text: &str
  ) -> anyhow::Result<()> {
    let raw: RawConfig =
      toml::from_str(text)?;

    if let Some(dir) = raw.data_dir {
      self.data_dir =
        Some(expand_tilde(Path::new(&dir)));
    }
    if let Some(key) = raw.store_key {
      self.set_store_key(&key)?;
    }
    if let Some(max) = raw.max_recurrence {
      self.max_recurrence =
        clamp_recurrence(max);
    }
    if let Some(filter) = raw.log_filter {
      self.log_filter = Some(filter);
    }
    if let Some(entries) =
      raw.national_occasions
    {
      let valid: Vec<OccasionEntry> =
        entries
          .into_iter()
          .filter(|entry| {
            let ok = (1..=12)
              .contains(&entry.month)
              && (1..=31)
                .contains(&entry.day);
            if !ok {
              warn!(
                month = entry.month,
                day = entry.day,
                label = %entry.label,
                "dropping invalid national occasion"
              );
            }
            ok
          })
          .collect();
      self.occasions = self
        .occasions
        .clone()
        .with_national(valid);
    }
    Ok(())
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let value = v.trim();
      debug!(key = %k, value = %value, "applying override");
      match k.trim() {
        | "data_dir" => {
          self.data_dir =
            Some(expand_tilde(Path::new(
              value
            )));
        }
        | "store_key" => {
          self.set_store_key(value)?;
        }
        | "max_recurrence" => {
          let max: i64 =
            value.parse().with_context(
              || {
                format!(
                  "invalid \
                   max_recurrence: \
                   {value}"
                )
              }
            )?;
          self.max_recurrence =
            clamp_recurrence(max);
        }
        | "log_filter" => {
          self.log_filter =
            Some(value.to_string());
        }
        | other => {
          return Err(anyhow!(
            "unknown config key: {other}"
          ));
        }
      }
    }
    Ok(())
  }

  fn set_store_key(
    &mut self,
    key: &str
  ) -> anyhow::Result<()> {
    let key = key.trim();
    if key.is_empty() {
      return Err(anyhow!(
        "store_key cannot be empty"
      ));
    }
    self.store_key = key.to_string();
    Ok(())
  }
}

/// Directory holding the task record, created if missing.
#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = if let Some(path) =
    override_dir
  {
    path.to_path_buf()
  } else if let Some(path) = &cfg.data_dir
  {
    path.clone()
  } else {
    default_data_dir()?
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(dir)
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(expand_tilde(path));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if trimmed == "/dev/null" {
      return None;
    }
    if !trimmed.is_empty() {
      return Some(expand_tilde(
        Path::new(trimmed)
      ));
    }
  }

  dirs::config_dir().map(|dir| {
    dir.join("taqwim").join(CONFIG_FILE)
  })
}

fn default_data_dir()
-> anyhow::Result<PathBuf> {
  let base = dirs::data_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine data \
         directory"
      )
    })?;
  Ok(base.join("taqwim"))
}

fn clamp_recurrence(max: i64) -> i32 {
  max.clamp(
    1,
    i64::from(MAX_RECURRENCE_COUNT)
  ) as i32
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
