use test_utils::fitness_screens_fixture;

use super::application_id;
use super::argb_literal;
use super::package_name;
use super::NativeExporter;
use super::NativeFlavor;
use crate::domain::models::Artifact;
use crate::domain::models::ExportInput;
use crate::domain::models::ExportTarget;
use crate::domain::models::Screen;
use crate::domain::services::exporters::Exporter;

fn fitness_screens() -> Vec<Screen> {
    return fitness_screens_fixture()
        .into_iter()
        .map(|(name, content)| return Screen::new(name, &content))
        .collect();
}

fn input<'a>(name: &'a str, screens: &'a [Screen]) -> ExportInput<'a> {
    return ExportInput {
        name,
        description: "Track \"every\" workout",
        screens,
        theme_color: "#4f46e5",
    };
}

#[test]
fn it_builds_package_names() {
    assert_eq!(package_name("Fit Track"), "fit_track");
    assert_eq!(package_name("  Fit -- Track!  "), "fit_track");
    assert_eq!(package_name("24/7 Gym"), "app_24_7_gym");
    assert_eq!(package_name("!!!"), "app");
    assert_eq!(application_id("Fit Track"), "com.screenforge.fit_track");
}

#[test]
fn it_converts_theme_colors() {
    assert_eq!(argb_literal("#4f46e5"), "0xFF4F46E5");
    assert_eq!(argb_literal("#abc"), "0xFFAABBCC");
    assert_eq!(argb_literal("indigo"), "0xFF4F46E5");
    assert_eq!(argb_literal("#zzzzzz"), "0xFF4F46E5");
}

#[tokio::test]
async fn it_exports_a_flutter_project() {
    let screens = fitness_screens();
    let exporter = NativeExporter::new(NativeFlavor::Flutter);
    assert_eq!(exporter.target(), ExportTarget::Flutter);

    let artifact = exporter.export(&input("Joe's $Gym", &screens)).await.unwrap();

    let pubspec = &artifact.file("pubspec.yaml").unwrap().contents;
    assert!(pubspec.starts_with("name: joe_s_gym\n"));
    assert!(pubspec.contains("description: \"Track \\\"every\\\" workout\""));

    let main = &artifact.file("lib/main.dart").unwrap().contents;
    assert!(main.contains("title: 'Joe\\'s \\$Gym',"));
    assert!(main.contains("Color(0xFF4F46E5)"));

    assert!(artifact.file("assets/www/index.html").is_some());
    assert!(artifact.file("assets/www/screens/01-home.html").is_some());
    assert!(artifact.file("assets/www/icons/icon-192.svg").is_some());
    assert!(artifact.file("README.txt").is_some());
}

#[tokio::test]
async fn it_exports_an_android_project() {
    let screens = fitness_screens();
    let exporter = NativeExporter::new(NativeFlavor::Android);
    let artifact = exporter.export(&input("Fit & Track", &screens)).await.unwrap();

    if let Artifact::Files { target, .. } = &artifact {
        assert_eq!(*target, ExportTarget::Android);
    } else {
        panic!("Expected files");
    }

    let gradle = &artifact.file("app/build.gradle").unwrap().contents;
    assert!(gradle.contains("applicationId 'com.screenforge.fit_track'"));

    let activity = artifact
        .file("app/src/main/java/com/screenforge/fit_track/MainActivity.kt")
        .unwrap();
    assert!(activity.contents.starts_with("package com.screenforge.fit_track\n"));

    let strings = &artifact.file("app/src/main/res/values/strings.xml").unwrap().contents;
    assert!(strings.contains("<string name=\"app_name\">Fit &amp; Track</string>"));

    assert!(artifact.file("app/src/main/assets/www/index.html").is_some());
    assert!(artifact.file("settings.gradle").unwrap().contents.contains("rootProject.name = \"Fit & Track\""));
}
