//! On-disk copies of rendered digests.
//!
//! ```text
//! html_output_dir/
//! ├── 2025-05-06_morning.html
//! ├── 2025-05-06_afternoon.html
//! └── 2025-05-06_evening.html
//! ```
//!
//! A second run in the same edition window overwrites the earlier file.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::Digest;
use crate::utils::edition_stamp;

/// Write `html` to `{dir}/{date}_{time_of_day}.html` and return the path.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn write_digest(dir: &Path, digest: &Digest, html: &str) -> Result<PathBuf> {
    if let Err(e) = fs::create_dir_all(dir).await {
        error!(error = %e, "Failed to create archive dir");
        return Err(e.into());
    }

    let path = dir.join(format!("{}.html", edition_stamp(&digest.generated_at)));
    fs::write(&path, html).await?;
    info!(path = %path.display(), "Wrote digest HTML");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[tokio::test]
    async fn test_write_digest_names_file_by_edition() {
        let dir = tempfile::tempdir().unwrap();
        let digest = Digest::assemble(
            Vec::new(),
            Local.with_ymd_and_hms(2025, 5, 6, 7, 0, 0).unwrap(),
        );

        let path = write_digest(&dir.path().join("archive"), &digest, "<html></html>")
            .await
            .unwrap();

        assert!(path.ends_with("archive/2025-05-06_morning.html"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
