#[cfg(test)]
#[path = "pwa_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;

use super::shell;
use super::shell::ShellOptions;
use super::templates;
use super::Exporter;
use crate::domain::models::slugify;
use crate::domain::models::Artifact;
use crate::domain::models::ArtifactFile;
use crate::domain::models::ExportInput;
use crate::domain::models::ExportTarget;

const USAGE: &str = "Serve the folder over HTTPS (or localhost) so the service worker can register, then use the browser's install option.";

const REGISTER_WORKER: &str = r#"<script>
if ('serviceWorker' in navigator) {
  window.addEventListener('load', function () {
    navigator.serviceWorker.register('./sw.js').catch(function () {});
  });
}
</script>"#;

pub fn cache_name(input: &ExportInput) -> String {
    return format!("{}-shell-v1", slugify(&input.display_name()));
}

fn head_extra(input: &ExportInput) -> String {
    let title = shell::escape_html(&input.display_name());
    let icon = shell::icon_path(shell::ICON_SIZES[0]);

    return [
        "<link rel=\"manifest\" href=\"./manifest.webmanifest\">".to_string(),
        format!("<link rel=\"icon\" type=\"image/svg+xml\" href=\"./{icon}\">"),
        format!("<link rel=\"apple-touch-icon\" href=\"./{icon}\">"),
        "<meta name=\"apple-mobile-web-app-capable\" content=\"yes\">".to_string(),
        format!("<meta name=\"apple-mobile-web-app-title\" content=\"{title}\">"),
    ]
    .join("\n");
}

fn render_worker(input: &ExportInput, files: &[ArtifactFile]) -> Result<String> {
    let mut assets = vec!["./".to_string(), "./manifest.webmanifest".to_string()];
    for file in files {
        assets.push(format!("./{}", file.path));
    }

    return templates::render(
        "sw.js",
        &[
            ("TITLE", &input.display_name()),
            ("CACHE_NAME", &cache_name(input)),
            ("ASSETS", &serde_json::to_string(&assets)?),
        ],
    );
}

#[derive(Default)]
pub struct PwaExporter {}

#[async_trait]
impl Exporter for PwaExporter {
    fn target(&self) -> ExportTarget {
        return ExportTarget::Pwa;
    }

    #[allow(clippy::implicit_return)]
    async fn export<'a>(&self, input: &ExportInput<'a>) -> Result<Artifact> {
        let options = ShellOptions {
            head_extra: head_extra(input),
            body_extra: REGISTER_WORKER.to_string(),
            ..ShellOptions::default()
        };

        let mut files = shell::web_assets(input, &options)?;
        let worker = render_worker(input, &files)?;
        files.push(ArtifactFile::new(
            "manifest.webmanifest",
            shell::render_manifest(input)?,
        ));
        files.push(ArtifactFile::new("sw.js", worker));

        let readme = shell::usage_note(input, "pwa", &files, USAGE)?;
        files.push(ArtifactFile::new("README.txt", readme));

        return Ok(Artifact::Files {
            target: ExportTarget::Pwa,
            files,
        });
    }
}
