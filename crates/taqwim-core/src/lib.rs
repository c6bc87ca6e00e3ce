pub mod config;
pub mod datastore;
pub mod datetime;
pub mod error;
pub mod event;
pub mod filter;
pub mod grid;
pub mod hijri;
pub mod logging;
pub mod occasions;
pub mod projection;
pub mod recurrence;
pub mod task;
pub mod view;

use std::path::Path;

use anyhow::Context;
use tracing::{
  debug,
  info
};

pub use error::{
  CalendarError,
  CalendarResult
};

/// Open the file-backed task store described by `cfg`.
#[tracing::instrument(skip_all)]
pub fn open_store(
  cfg: &config::Config,
  data_override: Option<&Path>
) -> anyhow::Result<
  datastore::TaskStore<
    datastore::FileKvStore
  >
> {
  let data_dir =
    config::resolve_data_dir(
      cfg,
      data_override
    )
    .context(
      "failed to resolve data \
       directory"
    )?;
  debug!(data_dir = %data_dir.display(), "resolved data directory");

  let backend =
    datastore::FileKvStore::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open store at {}",
        data_dir.display()
      )
    })?;

  let store = datastore::TaskStore::load(
    backend,
    cfg.store_key.clone()
  )?
  .with_max_recurrence(
    cfg.max_recurrence
  );

  info!(
    key = store.key(),
    tasks = store.all().len(),
    "task store ready"
  );
  Ok(store)
}
