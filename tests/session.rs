// ../tests/session.rs
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use woin_sheet::controller::{
    ERROR_LOADING, ERROR_SAVING, NO_TOKEN_SELECTED, SAVED_LOCAL, SAVED_SCENE, SAVED_TOKEN,
};
use woin_sheet::*;

const TIMEOUT: Duration = Duration::from_millis(1200);

type Integrated = SheetController<RemoteBackend<InMemoryHost>, MemoryView>;
type Standalone = SheetController<LocalBackend<MemorySlotStore>, MemoryView>;

fn integrated(host: &InMemoryHost) -> (Integrated, UnboundedReceiver<SheetEvent>) {
    let schema = FieldSchema::integrated();
    let view = MemoryView::for_schema(&schema);
    SheetController::new(
        schema,
        view,
        RemoteBackend::new(host.clone()),
        Variant::Integrated,
        TIMEOUT,
    )
}

fn standalone() -> (Standalone, UnboundedReceiver<SheetEvent>) {
    let schema = FieldSchema::standalone();
    let view = MemoryView::for_schema(&schema);
    SheetController::new(
        schema,
        view,
        LocalBackend::new(MemorySlotStore::new()),
        Variant::Standalone,
        TIMEOUT,
    )
}

fn input(field: &str, value: &str) -> SheetEvent {
    SheetEvent::Input {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn seed_token(host: &InMemoryHost, id: &str, name: &str) -> ItemId {
    let id = ItemId::from(id);
    host.insert_item(
        id.clone(),
        "Token",
        json!({ META_KEY: { "name": name, "agi": "2", "log": "2" } })
            .as_object()
            .cloned()
            .expect("Expected a JSON object"),
    );
    id
}

#[tokio::test]
async fn test_handlers_ignored_until_ready() {
    let host = InMemoryHost::new();
    let (mut sheet, _events) = integrated(&host);

    sheet.dispatch(input("name", "Early")).await;
    sheet.dispatch(SheetEvent::Save).await;
    assert_eq!(sheet.collect().get("name"), "");
    assert_eq!(sheet.status(), None);
    assert_eq!(host.write_count(), 0);

    sheet.ready(Vec::new()).await;
    assert!(sheet.session().is_ready());
    sheet.dispatch(input("name", "Late")).await;
    assert_eq!(sheet.collect().get("name"), "Late");
}

#[tokio::test]
async fn test_input_event_updates_initiative() {
    let (mut sheet, _events) = standalone();
    sheet.ready(Vec::new()).await;

    sheet.dispatch(input("agi", "3")).await;
    sheet.dispatch(input("log", "2")).await;
    assert_eq!(sheet.collect().get("initiative"), "5");
    assert_eq!(sheet.form().view().read("initiative").as_deref(), Some("5"));

    sheet.dispatch(input("agi", "")).await;
    sheet.dispatch(input("log", "4")).await;
    assert_eq!(sheet.collect().get("initiative"), "4");
}

#[tokio::test]
async fn test_local_round_trip() {
    let (mut sheet, _events) = standalone();
    sheet.ready(Vec::new()).await;
    sheet.dispatch(input("name", "Oren")).await;
    sheet.dispatch(input("agi", "2")).await;
    sheet.dispatch(input("gear-text", "Rope")).await;

    sheet.dispatch(SheetEvent::Save).await;
    assert_eq!(sheet.status(), Some(SAVED_LOCAL));

    sheet.dispatch(SheetEvent::Reload).await;
    let data1 = sheet.collect();
    sheet.dispatch(SheetEvent::Save).await;
    sheet.dispatch(SheetEvent::Reload).await;
    let data2 = sheet.collect();
    assert_eq!(data1, data2);
    assert_eq!(data2.get("name"), "Oren");
    assert_eq!(data2.get("gear-text"), "Rope");
}

#[tokio::test]
async fn test_standalone_ignores_mode_and_selection() {
    let (mut sheet, _events) = standalone();
    sheet.ready(Vec::new()).await;
    sheet.dispatch(SheetEvent::ToggleMode).await;
    sheet
        .dispatch(SheetEvent::SelectionChanged(vec![ItemId::from("t1")]))
        .await;
    assert_eq!(sheet.session().mode(), StorageMode::Scene);
    assert_eq!(sheet.session().selected(), None);
    assert!(!sheet.session().warning_visible());
    assert_eq!(sheet.session().active_slot(), Some(Slot::Local));
}

#[tokio::test]
async fn test_scene_save_and_reload() {
    let host = InMemoryHost::new();
    let (mut sheet, _events) = integrated(&host);
    sheet.ready(Vec::new()).await;

    sheet.dispatch(input("name", "Kara")).await;
    sheet.dispatch(SheetEvent::Save).await;
    assert_eq!(sheet.status(), Some(SAVED_SCENE));
    assert_eq!(host.write_count(), 1);

    sheet.dispatch(input("name", "Unsaved")).await;
    sheet.dispatch(SheetEvent::Reload).await;
    assert_eq!(sheet.collect().get("name"), "Kara");
}

#[tokio::test]
async fn test_switching_to_token_discards_unsaved_edits() {
    let host = InMemoryHost::new();
    let token = seed_token(&host, "token-1", "Token Sheet");
    let (mut sheet, _events) = integrated(&host);
    sheet.ready(vec![token.clone()]).await;

    // Scene mode, nothing saved: edits stay local to the form.
    sheet.dispatch(input("name", "Scene Draft")).await;
    sheet.dispatch(SheetEvent::ToggleMode).await;

    assert_eq!(sheet.session().mode(), StorageMode::Token);
    assert_eq!(sheet.collect().get("name"), "Token Sheet");
    assert_eq!(sheet.collect().get("initiative"), "4");
    assert_eq!(host.write_count(), 0);

    // Back to the scene: it was never saved, so it is empty.
    sheet.dispatch(SheetEvent::SetMode(StorageMode::Scene)).await;
    assert!(sheet.collect().get("name").is_empty());
}

#[tokio::test]
async fn test_token_mode_without_selection() {
    let host = InMemoryHost::new();
    let (mut sheet, _events) = integrated(&host);
    sheet.ready(Vec::new()).await;
    sheet.dispatch(input("name", "Draft")).await;

    sheet.dispatch(SheetEvent::SetMode(StorageMode::Token)).await;
    assert!(sheet.session().warning_visible());
    assert!(sheet.collect().get("name").is_empty());

    sheet.dispatch(input("name", "Nobody")).await;
    sheet.dispatch(SheetEvent::Save).await;
    assert_eq!(sheet.status(), Some(NO_TOKEN_SELECTED));
    assert_eq!(host.write_count(), 0);
    assert!(
        host.scene_metadata()
            .await
            .expect("Failed to read scene")
            .is_empty()
    );
}

#[tokio::test]
async fn test_selection_change_in_scene_mode_is_bookkeeping() {
    let host = InMemoryHost::new();
    let token = seed_token(&host, "token-1", "Token Sheet");
    let (mut sheet, _events) = integrated(&host);
    sheet.ready(Vec::new()).await;
    sheet.dispatch(input("name", "Scene Draft")).await;

    sheet
        .dispatch(SheetEvent::SelectionChanged(vec![token.clone()]))
        .await;
    assert_eq!(sheet.session().selected(), Some(&token));
    assert_eq!(sheet.collect().get("name"), "Scene Draft");
}

#[tokio::test]
async fn test_selection_change_in_token_mode_reloads() {
    let host = InMemoryHost::new();
    let first = seed_token(&host, "token-1", "First");
    let second = seed_token(&host, "token-2", "Second");
    let (mut sheet, _events) = integrated(&host);
    sheet.ready(vec![first.clone()]).await;
    sheet.dispatch(SheetEvent::SetMode(StorageMode::Token)).await;
    assert_eq!(sheet.collect().get("name"), "First");

    sheet
        .dispatch(SheetEvent::SelectionChanged(vec![second.clone(), first.clone()]))
        .await;
    assert_eq!(sheet.session().selected(), Some(&second));
    assert_eq!(sheet.collect().get("name"), "Second");

    sheet.dispatch(SheetEvent::SelectionChanged(Vec::new())).await;
    assert_eq!(sheet.session().selected(), None);
    assert!(sheet.session().warning_visible());
    assert!(sheet.collect().get("name").is_empty());
}

#[tokio::test]
async fn test_token_save_writes_selected_token() {
    let host = InMemoryHost::new();
    let token = seed_token(&host, "token-1", "Before");
    let (mut sheet, _events) = integrated(&host);
    sheet.ready(vec![token.clone()]).await;
    sheet.dispatch(SheetEvent::SetMode(StorageMode::Token)).await;

    sheet.dispatch(input("name", "After")).await;
    sheet.dispatch(SheetEvent::Save).await;
    assert_eq!(sheet.status(), Some(SAVED_TOKEN));

    let stored = host
        .item_metadata(&token)
        .await
        .expect("Failed to read token")
        .expect("Token should exist");
    assert_eq!(stored[META_KEY]["name"], json!("After"));
    assert!(
        host.scene_metadata()
            .await
            .expect("Failed to read scene")
            .is_empty()
    );
}

#[tokio::test]
async fn test_deleted_token_clears_selection() {
    let host = InMemoryHost::new();
    let token = seed_token(&host, "token-1", "Doomed");
    let other = seed_token(&host, "token-2", "Survivor");
    let (mut sheet, _events) = integrated(&host);
    sheet.ready(vec![token.clone()]).await;
    sheet.dispatch(SheetEvent::SetMode(StorageMode::Token)).await;
    assert_eq!(sheet.collect().get("name"), "Doomed");

    // Unrelated item changes keep the tracked token.
    sheet
        .dispatch(SheetEvent::ItemsChanged(vec![token.clone(), other.clone()]))
        .await;
    assert_eq!(sheet.session().selected(), Some(&token));

    host.remove_item(&token);
    sheet
        .dispatch(SheetEvent::ItemsChanged(host.item_ids()))
        .await;
    assert_eq!(sheet.session().selected(), None);
    assert!(sheet.session().warning_visible());
    assert!(sheet.collect().get("name").is_empty());
    assert_eq!(sheet.collect().get("agi"), "");
}

#[tokio::test]
async fn test_host_events_drive_the_sheet() {
    let host = InMemoryHost::new();
    let mut host_events = host.subscribe();
    let token = seed_token(&host, "token-1", "Picked");
    let (mut sheet, _events) = integrated(&host);
    sheet.ready(Vec::new()).await;
    sheet.dispatch(SheetEvent::SetMode(StorageMode::Token)).await;

    host.select(vec![token.clone()]);
    while let Ok(event) = host_events.try_recv() {
        sheet.dispatch(event.into()).await;
    }
    assert_eq!(sheet.collect().get("name"), "Picked");
    assert!(!sheet.session().warning_visible());
}

#[tokio::test]
async fn test_host_failure_shows_error_and_keeps_form() {
    let host = InMemoryHost::new();
    let (mut sheet, _events) = integrated(&host);
    sheet.ready(Vec::new()).await;
    sheet.dispatch(input("name", "Kept")).await;

    host.set_unavailable(Some("connection lost"));
    sheet.dispatch(SheetEvent::Save).await;
    assert_eq!(sheet.status(), Some(ERROR_SAVING));
    assert_eq!(sheet.collect().get("name"), "Kept");

    sheet.dispatch(SheetEvent::Reload).await;
    assert_eq!(sheet.status(), Some(ERROR_LOADING));
    assert_eq!(sheet.collect().get("name"), "Kept");

    // The form stays usable once the host is back.
    host.set_unavailable(None);
    sheet.dispatch(SheetEvent::Save).await;
    assert_eq!(sheet.status(), Some(SAVED_SCENE));
}

#[tokio::test]
async fn test_stale_status_expiry_keeps_newer_message() {
    let host = InMemoryHost::new();
    let (mut sheet, mut events) = integrated(&host);
    sheet.ready(Vec::new()).await;

    tokio::time::pause();
    sheet.dispatch(SheetEvent::Save).await;
    assert_eq!(sheet.status(), Some(SAVED_SCENE));

    tokio::time::advance(Duration::from_millis(600)).await;
    sheet.dispatch(SheetEvent::SetMode(StorageMode::Token)).await;
    sheet.dispatch(SheetEvent::Save).await;
    assert_eq!(sheet.status(), Some(NO_TOKEN_SELECTED));

    // The first timer fires while the second message is still on screen.
    let first_expiry = events.recv().await.expect("Expected a status expiry");
    sheet.dispatch(first_expiry).await;
    assert_eq!(sheet.status(), Some(NO_TOKEN_SELECTED));

    let second_expiry = events.recv().await.expect("Expected a status expiry");
    sheet.dispatch(second_expiry).await;
    assert_eq!(sheet.status(), None);
}

#[tokio::test]
async fn test_integrated_sheet_keeps_stored_dice_badges() {
    let host = InMemoryHost::new();
    host.set_scene_metadata(
        json!({ META_KEY: { "name": "Kara", "str": "3", "str_dice": "2d8" } })
            .as_object()
            .cloned()
            .expect("Expected a JSON object"),
    )
    .await
    .expect("Failed to seed scene metadata");

    let settings = Settings {
        variant: Variant::Integrated,
        ..Settings::default()
    };
    let schema = settings.schema();
    let view = MemoryView::for_schema(&schema);
    let (mut sheet, _events) = SheetController::new(
        schema,
        view,
        RemoteBackend::new(host.clone()),
        settings.variant,
        settings.status_timeout(),
    );
    sheet.ready(Vec::new()).await;
    assert_eq!(sheet.collect().get("str_dice"), "2d8");

    // Editing the score leaves the badge alone.
    sheet.dispatch(input("str", "4")).await;
    sheet.dispatch(SheetEvent::Save).await;
    assert_eq!(sheet.status(), Some(SAVED_SCENE));

    let scene = host.scene_metadata().await.expect("Failed to read scene");
    assert_eq!(scene[META_KEY]["str_dice"], json!("2d8"));
    assert_eq!(scene[META_KEY]["str"], json!("4"));
}

#[tokio::test]
async fn test_standalone_sheet_derives_dice_badges() {
    let store = MemorySlotStore::new();
    store
        .set_item(
            META_KEY,
            &json!({ "str": "3", "str_dice": "2d8" }).to_string(),
        )
        .expect("Failed to seed store");

    let settings = Settings::default();
    let schema = settings.schema();
    let view = MemoryView::for_schema(&schema);
    let (mut sheet, _events) = SheetController::new(
        schema,
        view,
        LocalBackend::new(store),
        settings.variant,
        settings.status_timeout(),
    );
    sheet.ready(Vec::new()).await;
    assert_eq!(sheet.collect().get("str_dice"), "3d6");

    sheet.dispatch(input("str", "5")).await;
    assert_eq!(sheet.collect().get("str_dice"), "5d6");
}

#[tokio::test]
async fn test_back_to_back_saves_settle_in_order() {
    let host = InMemoryHost::new();
    let (mut sheet, _events) = integrated(&host);
    sheet.ready(Vec::new()).await;

    sheet.dispatch(input("name", "First")).await;
    sheet.dispatch(SheetEvent::Save).await;
    sheet.dispatch(input("name", "Second")).await;
    sheet.dispatch(SheetEvent::Save).await;
    sheet.dispatch(SheetEvent::Reload).await;

    assert_eq!(host.write_count(), 2);
    assert_eq!(sheet.collect().get("name"), "Second");
    let scene = host.scene_metadata().await.expect("Failed to read scene");
    assert_eq!(scene[META_KEY]["name"], json!("Second"));
}
