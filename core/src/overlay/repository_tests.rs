//! Tests for OverlayRepository
//!
//! Verifies registration, visibility updates and exactly-once release.

use std::sync::Arc;
use std::thread;

use super::OverlayRepository;
use crate::client::{ClientId, Frame, Visibility};
use crate::test_support::{RenderCall, RecordingService};

fn id(name: &str) -> ClientId {
    ClientId::from(name)
}

#[test]
fn test_register_starts_visible() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();

    repository.register(id("c1"), service.handle("c1"));

    let instance = repository.find(&id("c1")).expect("overlay should be registered");
    assert_eq!(instance.visibility(), Visibility::Visible);
    assert_eq!(instance.id(), &id("c1"));
    assert_eq!(repository.len(), 1);
}

#[test]
fn test_find_missing_client() {
    let repository = OverlayRepository::new();
    assert!(repository.find(&id("ghost")).is_none());
    assert!(repository.is_empty());
}

#[test]
fn test_double_register_releases_previous_handle() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();

    let first = repository.register(id("c1"), service.handle("c1"));
    let second = repository.register(id("c1"), service.handle("c1"));

    assert!(first.is_released(), "replaced overlay must be released");
    assert!(!second.is_released());
    assert_eq!(service.log.releases("c1"), 1);
    assert_eq!(repository.len(), 1);
    assert!(Arc::ptr_eq(&repository.find(&id("c1")).unwrap(), &second));
}

#[test]
fn test_set_visibility_detaches_and_attaches() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();
    repository.register(id("c1"), service.handle("c1"));

    assert_eq!(
        repository.set_visibility(&id("c1"), Visibility::Hidden),
        Some(Visibility::Hidden)
    );
    assert_eq!(service.log.detaches("c1"), 1);

    // Same state again is a plain no-op on the renderer
    repository.set_visibility(&id("c1"), Visibility::Hidden);
    assert_eq!(service.log.detaches("c1"), 1);

    repository.set_visibility(&id("c1"), Visibility::Visible);
    assert_eq!(service.log.attaches("c1"), 1);
    assert_eq!(
        repository.find(&id("c1")).unwrap().visibility(),
        Visibility::Visible
    );
}

#[test]
fn test_set_visibility_on_absent_client_is_noop() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();

    assert_eq!(repository.set_visibility(&id("ghost"), Visibility::Hidden), None);
    assert!(service.log.calls().is_empty());
}

#[test]
fn test_unregister_releases_exactly_once() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();
    repository.register(id("c1"), service.handle("c1"));

    assert!(repository.unregister(&id("c1")));
    assert!(!repository.unregister(&id("c1")), "second unregister must be a no-op");
    assert_eq!(service.log.releases("c1"), 1);
    assert!(repository.find(&id("c1")).is_none());
}

#[test]
fn test_unregister_hidden_overlay_skips_detach() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();
    repository.register(id("c1"), service.handle("c1"));
    repository.set_visibility(&id("c1"), Visibility::Hidden);
    service.log.clear();

    assert!(repository.unregister(&id("c1")));
    assert_eq!(service.log.calls(), vec![RenderCall::Release(id("c1"))]);
}

#[test]
fn test_unregister_externally_closed_handle_reports_failure() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();
    repository.register(id("c1"), service.handle("c1"));
    service.close_externally("c1");

    assert!(!repository.unregister(&id("c1")));
    assert_eq!(service.log.releases("c1"), 0);
    assert!(repository.is_empty(), "entry is removed even if release failed");
}

#[test]
fn test_clear_releases_everything() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();
    for name in ["c1", "c2", "c3"] {
        repository.register(id(name), service.handle(name));
    }

    assert_eq!(repository.clear(), 3);
    assert!(repository.is_empty());
    for name in ["c1", "c2", "c3"] {
        assert_eq!(service.log.releases(name), 1);
    }
    assert_eq!(repository.clear(), 0);
}

#[test]
fn test_snapshot_is_stable_across_mutation() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();
    repository.register(id("c1"), service.handle("c1"));
    repository.register(id("c2"), service.handle("c2"));

    let snapshot = repository.all();
    repository.unregister(&id("c1"));
    repository.register(id("c3"), service.handle("c3"));

    assert_eq!(snapshot.len(), 2);
    let released: Vec<_> = snapshot.iter().filter(|i| i.is_released()).collect();
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].id(), &id("c1"));
}

#[test]
fn test_released_instance_rejects_pushes() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();
    let instance = repository.register(id("c1"), service.handle("c1"));
    repository.unregister(&id("c1"));
    service.log.clear();

    let pushed = instance.push_if_visible(|renderer| renderer.set_line(0, &Frame::from("late")));

    assert!(!pushed);
    assert!(service.log.calls().is_empty());
}

#[test]
fn test_toggle_from_stale_state_is_refused() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();
    let instance = repository.register(id("c1"), service.handle("c1"));

    assert_eq!(instance.toggle_from(Visibility::Visible), Some(Visibility::Hidden));
    // A second caller that also read VISIBLE loses
    assert_eq!(instance.toggle_from(Visibility::Visible), None);

    assert_eq!(instance.visibility(), Visibility::Hidden);
    assert_eq!(service.log.detaches("c1"), 1);
    assert_eq!(instance.toggle_from(Visibility::Hidden), Some(Visibility::Visible));
}

#[test]
fn test_retitle_waits_for_hidden_overlay_to_show() {
    let service = RecordingService::new();
    let repository = OverlayRepository::new();
    let shown = repository.register(id("c1"), service.handle("c1"));
    let hidden = repository.register(id("c2"), service.handle("c2"));
    hidden.set_visibility(Visibility::Hidden);

    assert!(shown.retitle(&Frame::from("New")));
    assert!(hidden.retitle(&Frame::from("New")));

    assert_eq!(service.log.titles_for("c1"), vec!["New"]);
    assert!(service.log.titles_for("c2").is_empty());

    hidden.set_visibility(Visibility::Visible);
    assert_eq!(service.log.titles_for("c2"), vec!["New"]);
    // Applied once only
    hidden.set_visibility(Visibility::Hidden);
    hidden.set_visibility(Visibility::Visible);
    assert_eq!(service.log.titles_for("c2"), vec!["New"]);

    repository.unregister(&id("c1"));
    assert!(!shown.retitle(&Frame::from("Late")));
}

#[test]
fn test_concurrent_register_and_unregister() {
    let service = RecordingService::new();
    let repository = Arc::new(OverlayRepository::new());

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let repository = Arc::clone(&repository);
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for round in 0..50 {
                    let name = format!("w{worker}-{round}");
                    repository.register(ClientId::from(name.as_str()), service.handle(&name));
                    let _ = repository.all();
                    assert!(repository.unregister(&ClientId::from(name.as_str())));
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert!(repository.is_empty());
    assert_eq!(service.log.count(|c| matches!(c, RenderCall::Release(_))), 200);
}
