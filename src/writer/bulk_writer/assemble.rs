// Concatenation of the section files into one transactional script
use std::io::{BufWriter, Write};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::config::WriteMode;
use crate::copy::section;
use crate::error::ApiDbError;

use super::BulkWriter;

impl BulkWriter {
    /// Drains every section into a fresh temp file, wrapped in a single
    /// transaction.  In online mode the sequence updates are executed against
    /// the database separately and stay out of the script.
    pub(super) fn assemble_script(&mut self) -> Result<NamedTempFile, ApiDbError> {
        let total_passes = if self.config.mode == WriteMode::Online { 2 } else { 1 };
        info!("writing SQL output file, data pass #1 of {total_passes}");

        let script = NamedTempFile::new()?;
        {
            let mut out = BufWriter::new(script.as_file());
            out.write_all(b"BEGIN TRANSACTION;\n")?;
            let skip: &[&str] = if self.config.mode == WriteMode::Online {
                &[section::SEQUENCE_UPDATES]
            } else {
                &[]
            };
            let total =
                self.sections.drain_into(&mut out, skip, self.config.status_update_interval)?;
            out.write_all(b"COMMIT;")?;
            out.flush()?;
            debug!("parsed {total} total SQL lines for the output file, data pass #1 of {total_passes}");
        }
        Ok(script)
    }
}
