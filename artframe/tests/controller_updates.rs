mod support;

use std::cell::Cell;
use std::rc::Rc;

use artframe::prelude::*;
use support::{CountingLayout, id, mount, recording_controller};

fn code_update(raw_id: &str, code: &str) -> Message {
    Message::CodeUpdate {
        id: id(raw_id),
        code: code.to_string(),
    }
}

fn animate_update(raw_id: &str, animate: bool) -> Message {
    Message::AnimateUpdate {
        id: id(raw_id),
        animate,
    }
}

#[test]
fn register_opens_an_embedded_frame() {
    let mut page = recording_controller();
    let (mount, _) = mount();

    let handle = page.register(id("42"), "draw();", mount).unwrap();

    assert_eq!(handle.id(), &id("42"));
    assert_eq!(
        page.host().opened[0].url,
        "artframe://render?pk=42&embedded=1"
    );
    assert_eq!(page.host().sent_count(), 0);
}

#[test]
fn duplicate_registration_fails() {
    let mut page = recording_controller();
    page.register(id("1"), "", mount().0).unwrap();

    let err = page.register(id("1"), "", mount().0).unwrap_err();

    assert!(err.contains("duplicate artwork registration"));
    assert_eq!(page.host().opened.len(), 1);
}

#[test]
fn refused_frame_leaves_nothing_registered() {
    let mut page = recording_controller();
    page.host_mut().refuse_open = true;

    assert!(page.register(id("1"), "", mount().0).is_err());
    assert!(page.ids().is_empty());
}

#[test]
fn first_play_delivers_initial_code() {
    let mut page = recording_controller();
    let handle = page.register(id("42"), "draw();", mount().0).unwrap();

    let dispatched = page.update(&handle, UpdateOptions::animate(true));

    assert_eq!(dispatched, Dispatched::Code);
    assert_eq!(
        page.host().sent_to(&id("42")),
        [code_update("42", "draw();")]
    );
}

#[test]
fn repeated_code_is_sent_at_most_once() {
    let mut page = recording_controller();
    let handle = page.register(id("7"), "a();", mount().0).unwrap();
    page.update(&handle, UpdateOptions::animate(true));
    page.host().clear();

    page.update(&handle, UpdateOptions::code("b();"));
    page.update(&handle, UpdateOptions::code("b();"));

    assert_eq!(page.host().sent_to(&id("7")), [code_update("7", "b();")]);
}

#[test]
fn code_while_paused_waits_for_play() {
    let mut page = recording_controller();
    let handle = page.register(id("7"), "a();", mount().0).unwrap();

    assert_eq!(
        page.update(&handle, UpdateOptions::code("b();")),
        Dispatched::Nothing
    );
    assert_eq!(page.host().sent_count(), 0);

    page.update(&handle, UpdateOptions::animate(true));

    assert_eq!(page.host().sent_to(&id("7")), [code_update("7", "b();")]);
}

#[test]
fn pause_and_resume_send_animate_only() {
    let mut page = recording_controller();
    let handle = page.register(id("7"), "a();", mount().0).unwrap();
    page.update(&handle, UpdateOptions::animate(true));
    page.host().clear();

    page.update(&handle, UpdateOptions::animate(false));
    page.update(&handle, UpdateOptions::animate(true));
    page.update(&handle, UpdateOptions::animate(true));

    assert_eq!(
        page.host().sent_to(&id("7")),
        [animate_update("7", false), animate_update("7", true)]
    );
}

#[test]
fn scenario_paused_edit_then_play() {
    let mut page = recording_controller();
    let (mount_42, seen_42) = mount();
    let (mount_43, seen_43) = mount();
    let handle = page.register(id("42"), "draw();", mount_42).unwrap();
    page.register(id("43"), "other();", mount_43).unwrap();

    page.update(&handle, UpdateOptions::code("draw2();"));
    assert_eq!(page.host().sent_count(), 0);

    page.update(&handle, UpdateOptions::animate(true));
    assert_eq!(
        page.host().sent_to(&id("42")),
        [code_update("42", "draw2();")]
    );

    page.host()
        .post_from_frame(r#"{"pk":42,"error":"syntax error"}"#);
    page.pump();

    assert_eq!(seen_42.error().as_deref(), Some("syntax error"));
    assert_eq!(seen_43.error(), None);
}

#[test]
fn sending_new_code_hides_the_error() {
    let mut page = recording_controller();
    let (mount, seen) = mount();
    let handle = page.register(id("5"), "a();", mount).unwrap();
    page.update(&handle, UpdateOptions::animate(true));

    page.host().post_from_frame(r#"{"pk":"5","error":"boom"}"#);
    page.pump();
    assert_eq!(seen.error().as_deref(), Some("boom"));

    page.update(&handle, UpdateOptions::code("b();"));
    assert_eq!(seen.error(), None);
}

#[test]
fn foreign_and_malformed_messages_are_ignored() {
    let mut page = recording_controller();
    let (mount, seen) = mount();
    page.register(id("1"), "", mount).unwrap();

    for payload in [
        r#"{"pk":2,"error":"not yours"}"#,
        r#"{"pk":2,"resize":{"width":10,"height":10}}"#,
        r#"{"error":"no pk"}"#,
        r#"{"pk":1}"#,
        r#"{"pk":1,"code":"wrong way"}"#,
        r#"{"pk":1,"resize":{"width":-1,"height":5}}"#,
        "not json",
    ] {
        page.host().post_from_frame(payload);
    }

    assert_eq!(page.pump(), 7);
    assert!(seen.boxes.borrow().is_empty());
    assert_eq!(seen.slot.borrow().shows, 0);
}

#[test]
fn resize_sets_the_box_and_reflows() {
    let reflows = Rc::new(Cell::new(0));
    let mut page = recording_controller().with_layout(Box::new(CountingLayout {
        reflows: reflows.clone(),
    }));
    let (mount, seen) = mount();
    page.register(id("3"), "", mount).unwrap();

    page.host()
        .post_from_frame(r#"{"pk":3,"resize":{"width":640,"height":480}}"#);
    page.pump();

    assert_eq!(seen.last_box(), Some(Size::new(640.0, 480.0)));
    assert_eq!(reflows.get(), 1);
}

#[test]
fn resize_is_ignored_without_autosize() {
    let mut page = recording_controller();
    let (mount, seen) = mount();
    page.register(id("3"), "", mount.with_autosize(false)).unwrap();

    page.host()
        .post_from_frame(r#"{"pk":3,"resize":{"width":640,"height":480}}"#);
    page.pump();

    assert_eq!(seen.last_box(), None);
}

#[test]
fn disposed_artwork_stops_listening() {
    let mut page = recording_controller();
    let (mount, seen) = mount();
    page.register(id("9"), "", mount).unwrap();

    page.dispose(&id("9"));
    page.host().post_from_frame(r#"{"pk":9,"error":"late"}"#);
    page.pump();

    assert_eq!(page.host().closed, [id("9")]);
    assert_eq!(seen.error(), None);
    assert_eq!(
        page.dispatch(&id("9"), UpdateOptions::animate(true)),
        Dispatched::Nothing
    );
}

#[test]
fn editor_change_becomes_desired_code() {
    let mut page = recording_controller();
    let handle = page.register(id("4"), "a();", mount().0).unwrap();
    page.update(&handle, UpdateOptions::animate(true));
    page.host().clear();

    page.editor_changed(&id("4"), "typed();");

    assert_eq!(page.host().sent_to(&id("4")), [code_update("4", "typed();")]);
    assert_eq!(page.instance(&id("4")).unwrap().desired_code(), "typed();");
}

#[test]
fn animation_notices_reach_subscribers() {
    let mut page = recording_controller();
    let notices = page.subscribe();
    let handle = page.register(id("4"), "a();", mount().0).unwrap();

    page.update(&handle, UpdateOptions::animate(true));
    page.update(&handle, UpdateOptions::code("b();"));

    let received: Vec<bool> = notices.try_iter().map(|n| n.animate).collect();
    assert_eq!(received, [true, true]);
}

#[test]
fn controls_follow_the_animation_state() {
    let mut page = recording_controller();
    let (mount, _) = mount();
    page.register(id("8"), "a();", mount.with_controls(true)).unwrap();

    assert_eq!(
        page.controls(&id("8")),
        Some(PlayPauseState::for_animating(false))
    );
    assert_eq!(page.click_pause(&id("8")), Dispatched::Nothing);

    assert_eq!(page.click_play(&id("8")), Dispatched::Code);
    assert_eq!(
        page.controls(&id("8")),
        Some(PlayPauseState::for_animating(true))
    );
    assert_eq!(page.click_play(&id("8")), Dispatched::Nothing);

    assert_eq!(page.click_pause(&id("8")), Dispatched::Animate(false));
    assert_eq!(
        page.controls(&id("8")),
        Some(PlayPauseState::for_animating(false))
    );
}

#[test]
fn artwork_without_controls_ignores_clicks() {
    let mut page = recording_controller();
    page.register(id("8"), "a();", mount().0).unwrap();

    assert_eq!(page.controls(&id("8")), None);
    assert_eq!(page.click_play(&id("8")), Dispatched::Nothing);
    assert_eq!(page.host().sent_count(), 0);
}

#[test]
fn overlay_click_starts_the_artwork() {
    let mut page = recording_controller();
    let (mount, _) = mount();
    page.register(id("2"), "a();", mount.with_overlay(true)).unwrap();

    assert!(!page.instance(&id("2")).unwrap().overlay_dismissed());

    assert_eq!(page.click_overlay(&id("2")), Dispatched::Code);
    assert!(page.instance(&id("2")).unwrap().overlay_dismissed());
    assert_eq!(page.click_overlay(&id("2")), Dispatched::Nothing);
    assert_eq!(page.host().sent_count(), 1);
}

#[test]
fn playing_by_other_means_dismisses_the_overlay() {
    let mut page = recording_controller();
    let (mount, _) = mount();
    let handle =
        page.register(id("2"), "a();", mount.with_overlay(true)).unwrap();

    page.update(&handle, UpdateOptions::animate(true));

    assert!(page.instance(&id("2")).unwrap().overlay_dismissed());
    assert_eq!(page.host().sent_count(), 1);
}

#[test]
fn play_all_clicks_remaining_overlays_once() {
    let mut page = recording_controller();
    let handle_a = page
        .register(id("a"), "a();", mount().0.with_overlay(true))
        .unwrap();
    page.register(id("b"), "b();", mount().0.with_overlay(true))
        .unwrap();
    page.register(id("c"), "c();", mount().0).unwrap();

    page.update(&handle_a, UpdateOptions::animate(true));
    page.host().clear();

    page.click_play_all();

    assert!(!page.play_all_enabled());
    assert!(page.host().sent_to(&id("a")).is_empty());
    assert_eq!(page.host().sent_to(&id("b")), [code_update("b", "b();")]);
    assert!(page.host().sent_to(&id("c")).is_empty());

    page.host().clear();
    page.click_play_all();
    assert_eq!(page.host().sent_count(), 0);
}
