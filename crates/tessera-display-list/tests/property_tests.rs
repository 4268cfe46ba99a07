//! Property tests for equality, nesting and playback.

mod common;

use std::sync::Arc;

use common::{OpLog, rect};
use quickcheck_macros::quickcheck;
use tessera_display_list::{Dispatcher, DisplayList, DisplayListBuilder, Path, Point};

/// One recordable step. Every variant with arguments always records an op,
/// so changing an argument always changes the list.
#[derive(Debug, Clone, Copy)]
enum Step {
    Rect(i16, i16),
    Oval(i16, i16),
    Circle(i16, i16),
    Line(i16, i16),
    /// A triangle, recorded as a path resource between bulk ops.
    Triangle(i16, i16),
    Translate(i16, i16),
    Save,
    Restore,
}

impl Step {
    fn from_raw((selector, a, b): (u8, i16, i16)) -> Self {
        match selector % 8 {
            0 => Self::Rect(a, b),
            1 => Self::Oval(a, b),
            2 => Self::Circle(a, b),
            3 => Self::Line(a, b),
            4 => Self::Triangle(a, b),
            5 => Self::Translate(a, b),
            6 => Self::Save,
            _ => Self::Restore,
        }
    }

    const fn has_arguments(self) -> bool {
        !matches!(self, Self::Save | Self::Restore)
    }

    fn shifted(self) -> Self {
        let shift = |v: i16| v.wrapping_add(1000);
        match self {
            Self::Rect(a, b) => Self::Rect(shift(a), b),
            Self::Oval(a, b) => Self::Oval(shift(a), b),
            Self::Circle(a, b) => Self::Circle(shift(a), b),
            Self::Line(a, b) => Self::Line(shift(a), b),
            Self::Triangle(a, b) => Self::Triangle(shift(a), b),
            Self::Translate(a, b) => Self::Translate(shift(a), b),
            other => other,
        }
    }

    fn record(self, builder: &mut DisplayListBuilder) {
        let f = f32::from;
        match self {
            Self::Rect(a, b) => builder.draw_rect(&rect(f(a), f(b), f(a) + 10.0, f(b) + 10.0)),
            Self::Oval(a, b) => builder.draw_oval(&rect(f(a), f(b), f(a) + 8.0, f(b) + 4.0)),
            Self::Circle(a, b) => builder.draw_circle(Point::new(f(a), f(b)), 5.0),
            Self::Line(a, b) => builder.draw_line(Point::ZERO, Point::new(f(a), f(b))),
            Self::Triangle(a, b) => {
                let mut path = Path::new();
                let _ = path
                    .move_to(Point::new(f(a), f(b)))
                    .line_to(Point::new(f(a) + 12.0, f(b)))
                    .line_to(Point::new(f(a) + 6.0, f(b) + 9.0))
                    .close();
                builder.draw_path(&Arc::new(path));
            }
            Self::Translate(a, b) => builder.translate(f(a) + 0.5, f(b)),
            Self::Save => builder.save(),
            Self::Restore => builder.restore(),
        }
    }
}

fn build(steps: &[Step]) -> DisplayList {
    let mut builder = DisplayListBuilder::new();
    for step in steps {
        step.record(&mut builder);
    }
    builder.build()
}

fn steps(raw: Vec<(u8, i16, i16)>) -> Vec<Step> {
    raw.into_iter().map(Step::from_raw).collect()
}

#[quickcheck]
fn prop_identical_recordings_are_equal(raw: Vec<(u8, i16, i16)>) -> bool {
    let steps = steps(raw);
    let a = build(&steps);
    let b = build(&steps);
    a.equals(&a) && a.equals(&b) && b.equals(&a)
}

#[quickcheck]
fn prop_changed_argument_is_unequal(raw: Vec<(u8, i16, i16)>, pick: usize) -> bool {
    let mut steps = steps(raw);
    let candidates: Vec<usize> = (0..steps.len())
        .filter(|&i| steps[i].has_arguments())
        .collect();
    if candidates.is_empty() {
        return true;
    }
    let original = build(&steps);
    let index = candidates[pick % candidates.len()];
    steps[index] = steps[index].shifted();
    !original.equals(&build(&steps))
}

#[quickcheck]
fn prop_nesting_is_balanced(raw: Vec<(u8, i16, i16)>) -> bool {
    let list = build(&steps(raw));
    let mut depth: i64 = 0;
    for call in OpLog::of(&list) {
        if call.starts_with("save") {
            depth += 1;
        } else if call == "restore()" {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

#[quickcheck]
fn prop_playback_matches_op_count(raw: Vec<(u8, i16, i16)>) -> bool {
    let list = build(&steps(raw));
    OpLog::of(&list).len() == list.op_count() && list.kinds().count() == list.op_count()
}

#[quickcheck]
fn prop_rerecording_is_equal(raw: Vec<(u8, i16, i16)>) -> bool {
    let list = build(&steps(raw));
    let mut builder = DisplayListBuilder::new();
    list.dispatch(&mut builder);
    builder.build().equals(&list)
}
