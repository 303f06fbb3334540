use super::slugify;
use super::AppModel;
use super::AppStatus;
use super::Screen;

fn model_with_screens(count: usize) -> AppModel {
    let mut model = AppModel::new("abc");
    for idx in 0..count {
        model
            .screens
            .push(Screen::new(&format!("Screen {idx}"), "<p>hi</p>"));
    }

    return model;
}

#[test]
fn it_starts_as_draft() {
    let model = AppModel::new("abc");
    assert!(model.is_empty());
    assert_eq!(model.status(), AppStatus::Draft);
    assert_eq!(model.current_index(), 0);
    assert!(model.current_screen().is_none());
}

#[test]
fn it_clamps_navigation() {
    let mut model = model_with_screens(3);
    model.navigate(-1);
    assert_eq!(model.current_index(), 0);

    model.navigate(1);
    model.navigate(1);
    model.navigate(1);
    assert_eq!(model.current_index(), 2);

    model.set_current_index(99);
    assert_eq!(model.current_index(), 2);
}

#[test]
fn it_settles_changes() {
    let mut model = model_with_screens(3);
    model.screens[1].recently_changed = true;
    assert_eq!(model.changed_indices(), vec![1]);

    model.settle_changes();
    assert!(model.changed_indices().is_empty());
}

#[test]
fn it_round_trips_through_stored_app() {
    let mut model = model_with_screens(2);
    model.name = "Fit".to_string();
    model.version = 3;
    model.set_current_index(1);

    let stored = model.to_stored();
    assert_eq!(stored.status, AppStatus::Ready);

    let restored = AppModel::from_stored(stored);
    assert_eq!(restored.screens, model.screens);
    assert_eq!(restored.version, 3);
    assert_eq!(restored.current_index(), 0);
}

#[test]
fn it_does_not_persist_changed_flags() {
    let mut model = model_with_screens(1);
    model.screens[0].recently_changed = true;

    let yaml = serde_yaml::to_string(&model.to_stored()).unwrap();
    assert!(!yaml.contains("recently_changed"));
}

#[test]
fn it_slugifies() {
    assert_eq!(slugify("My Fitness App!"), "my-fitness-app");
    assert_eq!(slugify("  --Hello__World--  "), "hello-world");
    assert_eq!(slugify("???"), "app");
    assert_eq!(slugify("Café 2"), "caf-2");
}

#[test]
fn it_defaults_display_name() {
    let mut model = AppModel::new("abc");
    assert_eq!(model.display_name(), "Untitled App");

    model.name = " Fit ".to_string();
    assert_eq!(model.display_name(), "Fit");
}
