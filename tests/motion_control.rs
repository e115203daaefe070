// tests/motion_control.rs
use pretty_assertions::assert_eq;
use scene_driver::{
    ControlGroup, ControlPanel, ControlState, Cursor, CursorTarget, MemoryStore, Method, Nudge,
    SceneConfig, SceneError, SceneStore, path, reset_camera,
};
use serde_json::{Value, json};
use std::sync::Arc;

fn scene() -> Value {
    json!({
        "root": {
            "camera": {"orbitDistance": 12.0, "orbitAngle": 0.25, "worldPosition": [1.0, 2.0, 3.0]},
            "cursors": [{
                "offset": 0.5,
                "length": 2.0,
                "radius": 1.0,
                "rotation": 0.0,
                "subjectPath": ["root", "gameObjects", 0]
            }],
            "gameObjects": [{}, {}, {}],
            "floor": {},
        }
    })
}

fn setup() -> (Arc<MemoryStore>, Arc<dyn SceneStore>, Arc<SceneConfig>) {
    let memory = Arc::new(MemoryStore::with_root(scene()));
    let store: Arc<dyn SceneStore> = memory.clone();
    (memory, store, Arc::new(SceneConfig::default()))
}

#[tokio::test]
async fn stopping_one_control_never_cancels_another() {
    let (memory, store, config) = setup();
    for group in [
        ControlGroup::camera(store.clone(), &config),
        ControlGroup::cursor(store.clone(), &config),
    ] {
        for a in group.controls() {
            memory.clear_requests();
            a.move_at(1.0).await.unwrap();
            a.stop().await.unwrap();

            let deleted: Vec<_> = memory
                .requests_of(Method::Delete)
                .into_iter()
                .map(|r| r.path)
                .collect();
            assert!(deleted.contains(a.slot().path()));
            for b in group.controls().iter().filter(|b| b.name() != a.name()) {
                assert_ne!(a.slot(), b.slot());
                assert!(
                    !deleted.contains(b.slot().path()),
                    "{} stopped {}",
                    a.name(),
                    b.name()
                );
            }
        }
    }
}

#[tokio::test]
async fn two_controls_move_at_once() {
    let (memory, store, config) = setup();
    let cursor = ControlGroup::cursor(store, &config);
    let length = cursor.control("Length").unwrap();
    let radius = cursor.control("Radius").unwrap();

    length.nudge(Nudge::Up).await.unwrap();
    radius.nudge(Nudge::Down).await.unwrap();
    length.stop().await.unwrap();

    let slots = path!["animations", "user_interface", "cursor"];
    assert_eq!(
        memory.value_at(&slots),
        Some(json!({
            "radius": {"valuePath": ["root", "cursors", 0, "radius"], "speed": -1.0}
        }))
    );
}

#[tokio::test]
async fn move_set_and_get_write_the_expected_animations() {
    let (memory, store, config) = setup();
    let camera = ControlGroup::camera(store, &config);
    let zoom = camera.control("zoom").unwrap();
    let slot = path!["animations", "user_interface", "camera", "zoom"];

    zoom.nudge(Nudge::FastUp).await.unwrap();
    assert_eq!(
        memory.value_at(&slot),
        Some(json!({"valuePath": ["root", "camera", "orbitDistance"], "speed": -20.0}))
    );

    // Replacing the slot changes direction.
    zoom.move_at(2.5).await.unwrap();
    assert_eq!(memory.value_at(&slot).unwrap()["speed"], json!(2.5));

    zoom.set_value(30.0).await.unwrap();
    assert_eq!(
        memory.value_at(&slot),
        Some(json!({
            "valuePath": ["root", "camera", "orbitDistance"],
            "speed": -80.0,
            "targetValue": 30.0
        }))
    );

    assert_eq!(zoom.get().await.unwrap(), 12.0);

    zoom.stop().await.unwrap();
    assert_eq!(memory.value_at(&slot), None);
    zoom.stop().await.unwrap();
}

#[tokio::test]
async fn get_needs_a_number() {
    let (_, store, config) = setup();
    let camera = ControlGroup::camera(store.clone(), &config);
    assert_eq!(camera.control("X").unwrap().get().await.unwrap(), 1.0);
    assert!(matches!(
        camera.control("nope"),
        Err(SceneError::UnknownControl(_))
    ));

    store
        .put(&path!["root", "camera", "orbitAngle"], json!("sideways"))
        .await
        .unwrap();
    let err = camera.control("Orbit").unwrap().get().await.unwrap_err();
    assert!(matches!(err, SceneError::Store(_)), "{err}");
}

#[tokio::test]
async fn panel_gates_hover_and_input() {
    let (memory, store, config) = setup();
    let mut panel = ControlPanel::new(ControlGroup::camera(store, &config));
    assert!(panel.activation().states().iter().all(|s| s.hover_active()));

    assert!(panel.hover_enter("Orbit", Nudge::Up).await.unwrap());
    assert!(panel.hover_leave("Orbit").await.unwrap());

    assert_eq!(panel.activate_input("Orbit").await.unwrap(), 0.25);
    assert_eq!(panel.state("Orbit").unwrap(), ControlState::InputActive);
    assert_eq!(panel.state("Zoom").unwrap(), ControlState::HoverActive);

    memory.clear_requests();
    assert!(!panel.hover_enter("Orbit", Nudge::Up).await.unwrap());
    assert!(!panel.input_value("Zoom", 3.0).await.unwrap());
    assert!(memory.requests().is_empty());

    assert!(panel.input_value("Orbit", 1.0).await.unwrap());
    assert_eq!(
        memory.value_at(&path!["animations", "user_interface", "camera", "orbit"]),
        Some(json!({
            "valuePath": ["root", "camera", "orbitAngle"],
            "speed": 8.0,
            "targetValue": 1.0
        }))
    );

    panel.click_nudge("Orbit", Nudge::Down).await.unwrap();
    assert_eq!(panel.state("Orbit").unwrap(), ControlState::HoverActive);
    assert_eq!(panel.activation().input_control(), None);

    assert_eq!(panel.toggle_input("Zoom").await.unwrap(), Some(12.0));
    assert_eq!(panel.toggle_input("Zoom").await.unwrap(), None);
    assert_eq!(panel.activation().input_control(), None);
}

#[tokio::test]
async fn camera_reset_heads_home() {
    let (memory, store, config) = setup();
    let camera = ControlGroup::camera(store.clone(), &config);
    let cursor = Cursor::new(store.clone(), config.clone());

    camera.control("X").unwrap().nudge(Nudge::Up).await.unwrap();
    reset_camera(store.as_ref(), &camera, &cursor, &config)
        .await
        .unwrap();

    assert_eq!(
        memory.value_at(&path!["animations", "user_interface", "camera"]),
        Some(json!({}))
    );
    assert_eq!(cursor.subject().await.unwrap(), CursorTarget::Floor);
    assert_eq!(
        memory.value_at(&path!["animations", "reset_camera"]),
        Some(json!([
            {"valuePath": ["root", "camera", "worldPosition", 0], "speed": 15.0, "targetValue": 20.0},
            {"valuePath": ["root", "camera", "worldPosition", 1], "speed": 15.0, "targetValue": 1.0},
            {"valuePath": ["root", "camera", "worldPosition", 2], "speed": 15.0, "targetValue": 7.0},
        ]))
    );

    // Any camera control halts the reset.
    camera.control("Zoom").unwrap().stop().await.unwrap();
    assert_eq!(memory.value_at(&path!["animations", "reset_camera"]), None);
}

#[tokio::test]
async fn cursor_steps_through_the_floor() {
    let (memory, store, config) = setup();
    let cursor = Cursor::new(store, config);

    assert_eq!(cursor.step(-1).await.unwrap(), CursorTarget::Floor);
    assert_eq!(
        memory.value_at(&path!["root", "cursors", 0, "subjectPath"]),
        Some(json!(["root", "floor"]))
    );
    assert_eq!(cursor.step(1).await.unwrap(), CursorTarget::Object(0));
    assert_eq!(cursor.step(5).await.unwrap(), CursorTarget::Object(1));
    assert_eq!(cursor.jump(-1).await.unwrap(), CursorTarget::Floor);
    assert_eq!(cursor.jump(2).await.unwrap(), CursorTarget::Object(2));
}
