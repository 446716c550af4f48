//! Integration tests for installing, loading and running addons.

mod helpers;

use std::sync::Arc;

use serde_json::json;

use pagehub_addon::builtin::{ActivityLogAddon, WatermarkAddon};
use pagehub_addon::installer::ENABLED_MARKER;
use pagehub_addon::{Addon, HookEvent, HookKind, InstallError};

#[tokio::test]
async fn test_installed_addon_loads_and_honours_marker() {
    let site = helpers::TestSite::new();
    let installer = site.installer();

    let installed = installer
        .install(&helpers::addon_package("com.acme.seo", "1.0.0"), "seo.zip")
        .await
        .unwrap();
    assert_eq!(installed.identity.id, "com.acme.seo");
    assert!(!installed.enabled);
    installer.enable("com.acme.seo").await.unwrap();

    let manager = site.manager();
    assert_eq!(manager.load().await.unwrap(), 1);
    assert!(!manager.is_enabled("com.acme.seo").await);

    for descriptor in manager.list_all().await {
        if installer.is_enabled(descriptor.id()).await {
            manager.mark_enabled(descriptor.id()).await.unwrap();
        }
    }
    let report = manager.initialize_all().await;
    assert!(report.is_clean());
    assert_eq!(manager.enabled_ids().await, vec!["com.acme.seo".to_string()]);

    let descriptor = manager.get("com.acme.seo").await.unwrap();
    assert_eq!(descriptor.identity.version, "1.0.0");
    assert!(descriptor.supported_hooks.is_empty());
}

#[tokio::test]
async fn test_builtin_addons_handle_media_save() {
    let site = helpers::TestSite::new();
    let manager = site.manager();
    let activity = Arc::new(ActivityLogAddon::new());
    let watermark = Arc::new(WatermarkAddon::with_text("(c) Test"));

    assert!(manager.register(activity.clone()).await);
    assert!(manager.register(watermark.clone()).await);
    manager.enable(activity.identity().id.as_str()).await.unwrap();
    manager.enable(watermark.identity().id.as_str()).await.unwrap();

    let mut event = HookEvent::new(HookKind::BeforeMediaSave)
        .with_user("editor-7")
        .with_value("media", json!({ "filename": "sunset.JPG", "size": 2048 }));
    let report = manager.dispatch(&mut event).await;

    assert_eq!(report.invoked, 2);
    assert!(report.is_clean());
    assert_eq!(event.get_bool("watermarked"), Some(true));
    assert_eq!(event.get_string("watermark_text"), Some("(c) Test"));

    let entries = activity.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].hook, HookKind::BeforeMediaSave);
    assert_eq!(entries[0].user_id.as_deref(), Some("editor-7"));
    assert_eq!(entries[0].subject.as_deref(), Some("sunset.JPG"));
}

#[tokio::test]
async fn test_disabled_builtin_is_skipped() {
    let site = helpers::TestSite::new();
    let manager = site.manager();
    let activity = Arc::new(ActivityLogAddon::new());
    manager.register(activity.clone()).await;
    manager.register(Arc::new(WatermarkAddon::new())).await;
    manager.enable(activity.identity().id.as_str()).await.unwrap();

    let mut event = HookEvent::new(HookKind::BeforeMediaSave)
        .with_value("media", json!({ "filename": "logo.png" }));
    let report = manager.dispatch(&mut event).await;

    assert_eq!(report.invoked, 1);
    assert!(!event.contains("watermarked"));
    assert_eq!(activity.entries().await.len(), 1);
}

#[tokio::test]
async fn test_failed_update_restores_previous_version_and_marker() {
    let site = helpers::TestSite::new();
    let installer = site.installer();
    installer
        .install(&helpers::addon_package("com.acme.gallery", "1.0.0"), "gallery.zip")
        .await
        .unwrap();
    installer.enable("com.acme.gallery").await.unwrap();

    let broken = helpers::zip_package(&[("gallery/readme.txt", "no descriptor here")]);
    let err = installer
        .update("com.acme.gallery", &broken, "gallery-2.zip")
        .await
        .unwrap_err();
    assert!(matches!(err, InstallError::DescriptorMissing(_)));

    let wrong_id = helpers::addon_package("com.acme.other", "2.0.0");
    let err = installer
        .update("com.acme.gallery", &wrong_id, "gallery-2.zip")
        .await
        .unwrap_err();
    assert!(matches!(err, InstallError::DescriptorInvalid(_)));

    assert_eq!(
        site.installed_version("com.acme.gallery").as_deref(),
        Some("1.0.0")
    );
    assert!(installer.is_enabled("com.acme.gallery").await);
    assert!(!site.addons_dir.join("com.acme.other").exists());

    let installed = installer.list_installed().await.unwrap();
    assert_eq!(installed.len(), 1);
}

#[tokio::test]
async fn test_successful_update_replaces_files_and_keeps_marker() {
    let site = helpers::TestSite::new();
    let installer = site.installer();
    installer
        .install(&helpers::addon_package("com.acme.forms", "1.0.0"), "forms.zip")
        .await
        .unwrap();
    installer.enable("com.acme.forms").await.unwrap();

    let updated = installer
        .update(
            "com.acme.forms",
            &helpers::addon_package("com.acme.forms", "2.0.0"),
            "forms-2.zip",
        )
        .await
        .unwrap();

    assert_eq!(updated.identity.version, "2.0.0");
    assert!(updated.enabled);
    assert!(updated.directory.join(ENABLED_MARKER).is_file());
    let readme = std::fs::read_to_string(updated.directory.join("assets/readme.txt")).unwrap();
    assert_eq!(readme, "2.0.0");

    let leftovers: Vec<_> = std::fs::read_dir(&site.scratch_dir)
        .unwrap()
        .filter_map(Result::ok)
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_uninstalled_addon_is_gone_after_reload() {
    let site = helpers::TestSite::new();
    let installer = site.installer();
    installer
        .install(&helpers::addon_package("com.acme.maps", "1.0.0"), "maps.zip")
        .await
        .unwrap();
    installer
        .install(&helpers::addon_package("com.acme.chat", "1.0.0"), "chat.zip")
        .await
        .unwrap();

    assert!(installer.uninstall("com.acme.maps").await.unwrap());
    assert!(!installer.uninstall("com.acme.maps").await.unwrap());

    let manager = site.manager();
    assert_eq!(manager.load().await.unwrap(), 1);
    assert!(manager.get("com.acme.maps").await.is_none());
    assert!(manager.get("com.acme.chat").await.is_some());
}

#[tokio::test]
async fn test_second_install_of_same_id_is_rejected() {
    let site = helpers::TestSite::new();
    let installer = site.installer();
    let package = helpers::addon_package("com.acme.seo", "1.0.0");

    installer.install(&package, "seo.zip").await.unwrap();
    let err = installer.install(&package, "seo.zip").await.unwrap_err();
    assert!(matches!(err, InstallError::AlreadyInstalled(_)));
}
