use test_utils::fitness_screens_fixture;

use super::MiniAppExporter;
use super::MINI_APP_FILE;
use crate::domain::models::Artifact;
use crate::domain::models::ExportInput;
use crate::domain::models::Screen;
use crate::domain::services::exporters::Exporter;

#[tokio::test]
async fn it_exports_a_single_reduced_document() {
    let screens = fitness_screens_fixture()
        .into_iter()
        .map(|(name, content)| return Screen::new(name, &content))
        .collect::<Vec<Screen>>();
    let input = ExportInput {
        name: "FitTrack",
        description: "",
        screens: &screens,
        theme_color: "#4f46e5",
    };

    let artifact = MiniAppExporter::default().export(&input).await.unwrap();
    if let Artifact::Files { files, .. } = &artifact {
        assert_eq!(files.len(), 2);
    } else {
        panic!("Expected files");
    }

    let page = &artifact.file(MINI_APP_FILE).unwrap().contents;
    assert!(page.contains("<body class=\"chrome-reduced\">"));
    assert!(page.contains("<div class=\"dots\">"));
    assert!(page.contains("href=\"data:image/svg+xml;base64,"));
    assert!(page.contains("host.ready()"));
    assert_eq!(page.matches("<iframe class=\"screen\"").count(), 5);
}
