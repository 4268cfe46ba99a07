//! Structural comparison of display lists.
//!
//! Both buffers are walked in lockstep. Records that are equal exactly when
//! their bytes are equal accumulate into a pending window; the window is
//! compared with one slice comparison when a record needing value
//! comparison interrupts it, and once more at the end. Because every step
//! requires matching record sizes, a window covers the same offsets in
//! both buffers.

use std::ops::Range;
use std::ptr;

use crate::display_list::DisplayList;
use crate::op::CompareResult;
use crate::record::DisplayOp;

/// Byte range of records awaiting bulk comparison.
struct PendingWindow<'a> {
    a: &'a [u8],
    b: &'a [u8],
    range: Option<Range<usize>>,
}

impl PendingWindow<'_> {
    fn extend(&mut self, record: Range<usize>) {
        self.range = Some(match self.range.take() {
            Some(range) => range.start..record.end,
            None => record,
        });
    }

    fn flush(&mut self) -> bool {
        self.range
            .take()
            .is_none_or(|range| self.a[range.clone()] == self.b[range])
    }
}

pub(crate) fn lists_equal(a: &DisplayList, b: &DisplayList) -> bool {
    if ptr::eq(a, b) {
        return true;
    }
    if a.byte_count() != b.byte_count() || a.op_count() != b.op_count() {
        return false;
    }

    let mut window = PendingWindow {
        a: a.storage().bytes(),
        b: b.storage().bytes(),
        range: None,
    };
    for (ra, rb) in a.storage().records().zip(b.storage().records()) {
        if ra.header != rb.header {
            return false;
        }
        let result = if ra.header.kind.compares_by_value() {
            let op_a = DisplayOp::decode(ra.header.kind, ra.body, a.resources());
            let op_b = DisplayOp::decode(rb.header.kind, rb.body, b.resources());
            op_a.compare(&op_b)
        } else {
            CompareResult::UseBulkCompare
        };
        match result {
            CompareResult::UseBulkCompare => window.extend(ra.offset..ra.offset + ra.header.size),
            CompareResult::Equal => {
                if !window.flush() {
                    return false;
                }
            }
            CompareResult::NotEqual => return false,
        }
    }
    window.flush()
}
