//! Integration tests for recording, playback and equality.

mod common;

use std::sync::Arc;
use std::thread;

use common::{OpLog, rect};
use tessera_display_list::{
    ClipOp, Color, Dispatcher, DisplayList, DisplayListBuilder, OpKind, PAGE_SIZE, Path, Point,
    RRect,
};

fn scenario(second_as_oval: bool) -> DisplayList {
    let mut builder = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 200.0, 200.0));
    builder.set_color(Color::BLUE);
    builder.draw_rect(&rect(10.0, 10.0, 50.0, 50.0));
    builder.save();
    builder.clip_rect(&rect(0.0, 0.0, 25.0, 25.0), ClipOp::Intersect, false);
    if second_as_oval {
        builder.draw_oval(&rect(10.0, 10.0, 50.0, 50.0));
    } else {
        builder.draw_rect(&rect(10.0, 10.0, 50.0, 50.0));
    }
    builder.restore();
    builder.build()
}

#[test]
fn test_scenario_op_count_and_playback() {
    let list = scenario(false);
    assert_eq!(list.op_count(), 6);

    let r = rect(10.0, 10.0, 50.0, 50.0);
    let expected = vec![
        format!("set_color({:?})", Color::BLUE),
        format!("draw_rect({r:?})"),
        "save()".to_string(),
        format!(
            "clip_rect({:?}, {:?}, false)",
            rect(0.0, 0.0, 25.0, 25.0),
            ClipOp::Intersect
        ),
        format!("draw_rect({r:?})"),
        "restore()".to_string(),
    ];
    assert_eq!(OpLog::of(&list), expected);
}

#[test]
fn test_scenario_equality() {
    let first = scenario(false);
    let second = scenario(false);
    assert_ne!(first.unique_id(), second.unique_id());
    assert!(first.equals(&second));
    assert!(second.equals(&first));
    assert!(!first.equals(&scenario(true)));
}

#[test]
fn test_scenario_bounds() {
    let list = scenario(false);
    assert_eq!(list.bounds(), rect(10.0, 10.0, 50.0, 50.0));
    assert_eq!(list.bounds(), list.bounds());
    assert_eq!(*list.cull_rect(), rect(0.0, 0.0, 200.0, 200.0));
}

#[test]
fn test_kinds_follow_recording_order() {
    let kinds: Vec<OpKind> = scenario(false).kinds().collect();
    assert_eq!(
        kinds,
        vec![
            OpKind::SetColor,
            OpKind::DrawRect,
            OpKind::Save,
            OpKind::ClipIntersectRect,
            OpKind::DrawRect,
            OpKind::Restore,
        ]
    );
}

#[test]
fn test_zero_radius_rrect_matches_rect() {
    let r = rect(5.0, 5.0, 40.0, 30.0);

    let mut a = DisplayListBuilder::new();
    a.draw_rrect(&RRect::from_rect_xy(r, 0.0, 0.0));
    let a = a.build();

    let mut b = DisplayListBuilder::new();
    b.draw_rect(&r);
    let b = b.build();

    assert_eq!(OpLog::of(&a), OpLog::of(&b));
    assert!(a.equals(&b));
}

#[test]
fn test_rect_path_clip_matches_clip_rect() {
    let r = rect(0.0, 0.0, 25.0, 25.0);

    let mut a = DisplayListBuilder::new();
    a.clip_path(&Arc::new(Path::from_rect(&r)), ClipOp::Difference, true);
    let a = a.build();

    let mut b = DisplayListBuilder::new();
    b.clip_rect(&r, ClipOp::Difference, true);
    let b = b.build();

    assert_eq!(OpLog::of(&a), OpLog::of(&b));
    assert!(a.equals(&b));
}

#[test]
fn test_build_closes_open_saves() {
    let mut builder = DisplayListBuilder::new();
    builder.save();
    builder.save_layer(None, false, None);
    builder.draw_paint();
    let list = builder.build();

    let calls = OpLog::of(&list);
    let saves = calls
        .iter()
        .filter(|c| c.starts_with("save"))
        .count();
    let restores = calls.iter().filter(|c| *c == "restore()").count();
    assert_eq!(saves, 2);
    assert_eq!(restores, 2);
    assert_eq!(builder.save_level(), 0);
}

#[test]
fn test_over_restore_is_ignored() {
    let mut builder = DisplayListBuilder::new();
    builder.restore();
    builder.draw_paint();
    let list = builder.build();
    assert_eq!(OpLog::of(&list), vec!["draw_paint()".to_string()]);
}

#[test]
fn test_growth_across_pages() {
    let mut builder = DisplayListBuilder::new();
    let count: u16 = 1000;
    for i in 0..count {
        let x = f32::from(i);
        builder.draw_rect(&rect(x, 0.0, x + 1.0, 1.0));
    }
    assert!(builder.bytes_used() > PAGE_SIZE * 2);
    assert_eq!(builder.bytes_allocated() % PAGE_SIZE, 0);
    let list = builder.build();

    assert_eq!(list.op_count(), usize::from(count));
    let calls = OpLog::of(&list);
    assert_eq!(calls.len(), usize::from(count));
    assert_eq!(calls[0], format!("draw_rect({:?})", rect(0.0, 0.0, 1.0, 1.0)));
    assert_eq!(
        calls[999],
        format!("draw_rect({:?})", rect(999.0, 0.0, 1000.0, 1.0))
    );
    assert_eq!(list.bounds(), rect(0.0, 0.0, 1000.0, 1.0));
}

#[test]
fn test_dispatch_range() {
    let list = scenario(false);
    let mut log = OpLog::default();
    list.dispatch_range(&mut log, 1..3);
    assert_eq!(log.calls.len(), 2);
    assert!(log.calls[0].starts_with("draw_rect"));
    assert_eq!(log.calls[1], "save()");

    let mut tail = OpLog::default();
    list.dispatch_range(&mut tail, 4..100);
    assert_eq!(tail.calls.len(), 2);
    assert_eq!(tail.calls[1], "restore()");
}

#[test]
fn test_rerecording_produces_equal_list() {
    let original = scenario(false);
    let mut builder = DisplayListBuilder::with_cull_rect(*original.cull_rect());
    original.dispatch(&mut builder);
    let copy = builder.build();
    assert!(copy.equals(&original));
    assert_ne!(copy.unique_id(), original.unique_id());
}

#[test]
fn test_nested_counts() {
    let mut inner = DisplayListBuilder::new();
    inner.draw_circle(Point::new(5.0, 5.0), 5.0);
    inner.draw_line(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
    let inner = Arc::new(inner.build());

    let mut outer = DisplayListBuilder::new();
    outer.draw_display_list(&inner);
    outer.translate(20.0, 0.0);
    outer.draw_display_list(&inner);
    let outer = outer.build();

    assert_eq!(outer.op_count(), 3);
    assert_eq!(outer.op_count_nested(), 3 + 2 * inner.op_count());
    assert_eq!(
        outer.byte_count_nested(),
        outer.byte_count() + 2 * inner.byte_count()
    );
}

#[test]
fn test_nested_lists_compare_by_content() {
    let make_inner = || {
        let mut b = DisplayListBuilder::new();
        b.draw_oval(&rect(0.0, 0.0, 4.0, 4.0));
        Arc::new(b.build())
    };
    let make_outer = |inner: &Arc<DisplayList>| {
        let mut b = DisplayListBuilder::new();
        b.draw_display_list(inner);
        b.build()
    };
    assert!(make_outer(&make_inner()).equals(&make_outer(&make_inner())));
}

fn triangle() -> Path {
    let mut path = Path::new();
    let _ = path
        .move_to(Point::new(0.0, 0.0))
        .line_to(Point::new(30.0, 0.0))
        .line_to(Point::new(15.0, 20.0))
        .close();
    path
}

/// `draw_rect(first); draw_path(path); draw_rect(40, 40, 50, 50)`.
fn rects_around_path(first: f32, path: &Arc<Path>) -> DisplayList {
    let mut builder = DisplayListBuilder::new();
    builder.draw_rect(&rect(first, 0.0, first + 10.0, 10.0));
    builder.draw_path(path);
    builder.draw_rect(&rect(40.0, 40.0, 50.0, 50.0));
    builder.build()
}

#[test]
fn test_changed_rect_before_path_is_unequal() {
    let path = Arc::new(triangle());
    let a = rects_around_path(0.0, &path);
    assert_eq!(
        a.kinds().collect::<Vec<_>>(),
        [OpKind::DrawRect, OpKind::DrawPath, OpKind::DrawRect]
    );
    assert!(a.equals(&rects_around_path(0.0, &path)));
    assert!(!a.equals(&rects_around_path(5.0, &path)));
    assert!(!rects_around_path(5.0, &path).equals(&a));
}

#[test]
fn test_equal_paths_in_separate_arcs_compare_equal() {
    let path = Arc::new(triangle());
    let copy = Arc::new((*path).clone());
    assert!(!Arc::ptr_eq(&path, &copy));
    assert!(rects_around_path(0.0, &path).equals(&rects_around_path(0.0, &copy)));
    assert!(!rects_around_path(0.0, &path).equals(&rects_around_path(5.0, &copy)));
}

#[test]
fn test_concurrent_playback() {
    let list = Arc::new(scenario(false));
    let expected = OpLog::of(&list);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let list = Arc::clone(&list);
            thread::spawn(move || (OpLog::of(&list), list.bounds()))
        })
        .collect();
    for handle in handles {
        let (calls, bounds) = handle.join().unwrap();
        assert_eq!(calls, expected);
        assert_eq!(bounds, rect(10.0, 10.0, 50.0, 50.0));
    }
}
