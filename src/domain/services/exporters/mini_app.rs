#[cfg(test)]
#[path = "mini_app_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;

use super::shell;
use super::shell::Chrome;
use super::shell::ShellOptions;
use super::Exporter;
use crate::domain::models::Artifact;
use crate::domain::models::ArtifactFile;
use crate::domain::models::ExportInput;
use crate::domain::models::ExportTarget;

pub const MINI_APP_FILE: &str = "mini-app.html";

const USAGE: &str = "Upload mini-app.html to the chat platform as the mini-app entry page. Everything it needs is inlined.";

// Signals readiness to the host when it exposes a ready hook.
const HOST_BRIDGE: &str = r#"<script>
(function () {
  var host = window.Telegram && window.Telegram.WebApp;
  if (host && host.ready) { host.ready(); }
  if (host && host.expand) { host.expand(); }
})();
</script>"#;

#[derive(Default)]
pub struct MiniAppExporter {}

#[async_trait]
impl Exporter for MiniAppExporter {
    fn target(&self) -> ExportTarget {
        return ExportTarget::MiniApp;
    }

    #[allow(clippy::implicit_return)]
    async fn export<'a>(&self, input: &ExportInput<'a>) -> Result<Artifact> {
        let icon = shell::icon_data_uri(input, shell::ICON_SIZES[0])?;
        let options = ShellOptions {
            chrome: Chrome::Reduced,
            head_extra: format!("<link rel=\"icon\" type=\"image/svg+xml\" href=\"{icon}\">"),
            body_extra: HOST_BRIDGE.to_string(),
        };

        let mut files = vec![ArtifactFile::new(
            MINI_APP_FILE,
            shell::render_shell(input, &options)?,
        )];
        let readme = shell::usage_note(input, "mini-app", &files, USAGE)?;
        files.push(ArtifactFile::new("README.txt", readme));

        return Ok(Artifact::Files {
            target: ExportTarget::MiniApp,
            files,
        });
    }
}
