use anyhow::Result;
use tokio::fs;

use super::FileStore;
use crate::domain::models::AppModel;
use crate::domain::models::AppStatus;
use crate::domain::models::AppStore;
use crate::domain::models::ChatMessage;
use crate::domain::models::Role;
use crate::domain::models::Screen;

fn store(dir: &tempfile::TempDir) -> FileStore {
    return FileStore::new(&dir.path().join("apps").to_string_lossy());
}

#[tokio::test]
async fn it_returns_none_for_unknown_apps() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = store(&dir);

    assert_eq!(store.load_app("missing").await?, None);
    assert!(store.load_messages("missing").await?.is_empty());
    return Ok(());
}

#[tokio::test]
async fn it_saves_and_loads_apps() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = store(&dir);

    let mut model = AppModel::new("fit");
    model.name = "FitTrack".to_string();
    model.screens.push(Screen::new("Home", "<h1>Home</h1>\n<p>Welcome</p>"));
    model.version = 3;

    store.save_app(&model.to_stored()).await?;
    let loaded = store.load_app("fit").await?.unwrap();

    assert_eq!(loaded.name, "FitTrack");
    assert_eq!(loaded.status, AppStatus::Ready);
    assert_eq!(loaded.version, 3);
    assert_eq!(loaded.screens, model.screens);
    assert!(store.dir.join("fit.yaml").exists());
    assert!(!store.dir.join("fit.yaml.tmp").exists());

    model.screens.clear();
    store.save_app(&model.to_stored()).await?;
    let loaded = store.load_app("fit").await?.unwrap();
    assert_eq!(loaded.status, AppStatus::Draft);
    assert!(loaded.screens.is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_appends_messages() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = store(&dir);

    store
        .append_message("fit", &ChatMessage::new(Role::User, "Build a fitness app", 0))
        .await?;
    store
        .append_message("fit", &ChatMessage::new(Role::Assistant, "Created 5 screens.", 1))
        .await?;

    let messages = store.load_messages("fit").await?;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "Build a fitness app");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].version, 1);

    let raw = fs::read_to_string(store.dir.join("fit.messages.jsonl")).await?;
    assert_eq!(raw.lines().count(), 2);

    return Ok(());
}

#[tokio::test]
async fn it_skips_unreadable_message_lines() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = store(&dir);

    store
        .append_message("fit", &ChatMessage::new(Role::User, "first", 0))
        .await?;
    let path = store.dir.join("fit.messages.jsonl");
    let mut raw = fs::read_to_string(&path).await?;
    raw.push_str("{not json\n");
    fs::write(&path, raw).await?;

    let messages = store.load_messages("fit").await?;
    assert_eq!(messages.len(), 1);
    return Ok(());
}
