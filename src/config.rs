use std::path::PathBuf;

use serde::Deserialize;

/// Id reservation strategy.
///
/// Offline assumes no concurrent writers: sequence values are fetched once at
/// open time and the emitted ids are final.  Online writes the script with
/// ids local to this run, then reserves a sequence range and rewrites the
/// script against it during finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    Offline,
    Online,
}

/// Writer configuration, captured immutably when the writer is constructed.
/// Reconfiguration requires close and a new writer.
///
/// All numeric tunables must be positive.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub mode: WriteMode,
    /// Owner of the emitted changesets.  Must be configured to a
    /// non-negative id before the first changeset is flushed.
    pub user_id: i64,
    pub max_changes_per_changeset: u64,
    /// Flush granularity, in lines, for section and script output.
    pub file_output_line_buffer_size: usize,
    /// Progress log cadence, in elements or lines.
    pub status_update_interval: u64,
    /// If set, the finished script is copied here.
    pub sql_file_copy_location: Option<PathBuf>,
    /// If true, the finished script is executed through the driver.
    pub execute_sql: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            mode: WriteMode::Offline,
            user_id: -1,
            max_changes_per_changeset: 50_000,
            file_output_line_buffer_size: 500,
            status_update_interval: 10_000,
            sql_file_copy_location: None,
            execute_sql: false,
        }
    }
}
