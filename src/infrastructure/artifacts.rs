#[cfg(test)]
#[path = "artifacts_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use tokio::fs;

use crate::domain::models::slugify;
use crate::domain::models::ArtifactFile;
use crate::domain::models::ExportTarget;

/// Writes exported files under `<out>/<app-slug>/<target>/`.
pub struct ArtifactWriter {
    out_dir: path::PathBuf,
}

impl ArtifactWriter {
    pub fn new(out_dir: &str) -> ArtifactWriter {
        return ArtifactWriter {
            out_dir: path::PathBuf::from(out_dir),
        };
    }

    pub fn target_dir(&self, app_name: &str, target: ExportTarget) -> path::PathBuf {
        return self
            .out_dir
            .join(slugify(app_name))
            .join(target.to_string());
    }

    pub async fn write(
        &self,
        app_name: &str,
        target: ExportTarget,
        files: &[ArtifactFile],
    ) -> Result<path::PathBuf> {
        let root = self.target_dir(app_name, target);

        for file in files {
            let relative = path::Path::new(&file.path);
            if relative.is_absolute()
                || relative
                    .components()
                    .any(|part| return matches!(part, path::Component::ParentDir))
            {
                bail!(format!("Refusing to write outside the export folder: {}", file.path));
            }

            let dest = root.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&dest, &file.contents).await?;
        }

        tracing::info!(dir = %root.display(), files = files.len(), "Wrote export");
        return Ok(root);
    }
}
