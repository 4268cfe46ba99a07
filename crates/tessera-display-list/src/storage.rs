//! The byte arena backing a display list.
//!
//! Records are appended through a [`RecordWriter`] that mutably borrows the
//! arena for the duration of one record, so trailing data can only be
//! written to the record most recently begun. Capacity grows in whole
//! pages.

use crate::color::Color;
use crate::geometry::{IRect, Matrix, Point, RRect, RSTransform, Rect};
use crate::op::{HEADER_SIZE, OpHeader, OpKind, RECORD_ALIGN, align_record};

/// Growth granularity of the arena.
pub const PAGE_SIZE: usize = 4096;

/// Append-only record buffer.
#[derive(Debug, Clone, Default)]
pub(crate) struct OpStorage {
    bytes: Vec<u8>,
    allocated: usize,
}

impl OpStorage {
    /// Bytes holding records.
    pub(crate) fn used(&self) -> usize {
        self.bytes.len()
    }

    /// Bytes reserved for records.
    pub(crate) const fn allocated(&self) -> usize {
        self.allocated
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Append one record of `kind`, letting `write` fill its fields.
    /// Returns the record's padded size.
    pub(crate) fn push(&mut self, kind: OpKind, write: impl FnOnce(&mut RecordWriter<'_>)) -> usize {
        let start = self.bytes.len();
        self.reserve(HEADER_SIZE);
        self.bytes.extend_from_slice(&[0; HEADER_SIZE]);

        let mut writer = RecordWriter { storage: self };
        write(&mut writer);

        let size = align_record(self.bytes.len() - start);
        self.reserve(size - (self.bytes.len() - start));
        self.bytes.resize(start + size, 0);
        let header = OpHeader { kind, size }.encode();
        self.bytes[start..start + HEADER_SIZE].copy_from_slice(&header);
        size
    }

    /// Release capacity beyond the used bytes.
    pub(crate) fn shrink_to_fit(&mut self) {
        self.bytes.shrink_to_fit();
        self.allocated = self.bytes.len();
    }

    /// Iterate records as `(header, body)` where `body` excludes the
    /// header but includes padding.
    pub(crate) fn records(&self) -> Records<'_> {
        Records {
            bytes: &self.bytes,
            offset: 0,
        }
    }

    fn reserve(&mut self, additional: usize) {
        let needed = self.bytes.len() + additional;
        if needed > self.allocated {
            self.allocated = needed.div_ceil(PAGE_SIZE) * PAGE_SIZE;
            self.bytes.reserve_exact(self.allocated - self.bytes.len());
        }
    }

    fn extend(&mut self, data: &[u8]) {
        self.reserve(data.len());
        self.bytes.extend_from_slice(data);
    }
}

/// Iterator over the records of an [`OpStorage`].
pub(crate) struct Records<'a> {
    bytes: &'a [u8],
    offset: usize,
}

/// One record located in the buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawRecord<'a> {
    pub(crate) header: OpHeader,
    pub(crate) offset: usize,
    pub(crate) body: &'a [u8],
}

impl<'a> Iterator for Records<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.bytes.get(self.offset..)?;
        let (header, _) = rest.split_first_chunk::<HEADER_SIZE>()?;
        let header = OpHeader::decode(*header);
        assert!(
            header.size >= HEADER_SIZE && header.size % RECORD_ALIGN == 0 && header.size <= rest.len(),
            "corrupt display list record at byte {}: {:?}",
            self.offset,
            header
        );
        let record = RawRecord {
            header,
            offset: self.offset,
            body: &rest[HEADER_SIZE..header.size],
        };
        self.offset += header.size;
        Some(record)
    }
}

/// Writes the fields of the record being pushed.
pub(crate) struct RecordWriter<'s> {
    storage: &'s mut OpStorage,
}

impl RecordWriter<'_> {
    pub(crate) fn u8(&mut self, value: u8) {
        self.storage.extend(&[value]);
    }

    pub(crate) fn bool(&mut self, value: bool) {
        self.u8(u8::from(value));
    }

    pub(crate) fn u32(&mut self, value: u32) {
        self.storage.extend(&value.to_le_bytes());
    }

    pub(crate) fn i32(&mut self, value: i32) {
        self.storage.extend(&value.to_le_bytes());
    }

    pub(crate) fn f32(&mut self, value: f32) {
        self.storage.extend(&value.to_le_bytes());
    }

    /// Element count of a trailing array.
    pub(crate) fn count(&mut self, len: usize) {
        let Ok(len) = u32::try_from(len) else {
            unreachable!("trailing array of {len} elements exceeds u32");
        };
        self.u32(len);
    }

    pub(crate) fn point(&mut self, p: Point) {
        self.f32(p.x);
        self.f32(p.y);
    }

    pub(crate) fn rect(&mut self, r: &Rect) {
        self.f32(r.left);
        self.f32(r.top);
        self.f32(r.right);
        self.f32(r.bottom);
    }

    pub(crate) fn irect(&mut self, r: &IRect) {
        self.i32(r.left);
        self.i32(r.top);
        self.i32(r.right);
        self.i32(r.bottom);
    }

    pub(crate) fn rrect(&mut self, rr: &RRect) {
        self.rect(rr.rect());
        for radius in rr.radii() {
            self.point(*radius);
        }
    }

    pub(crate) fn color(&mut self, c: Color) {
        self.u32(c.argb());
    }

    pub(crate) fn matrix(&mut self, m: &Matrix) {
        for v in m.values() {
            self.f32(*v);
        }
    }

    pub(crate) fn rstransform(&mut self, t: &RSTransform) {
        self.f32(t.scos);
        self.f32(t.ssin);
        self.f32(t.tx);
        self.f32(t.ty);
    }
}

/// Reads the fields of one record body in the order they were written.
///
/// # Panics
/// Every read panics if the body is shorter than the field; a well-formed
/// buffer never triggers this.
pub(crate) struct RecordReader<'a> {
    rest: &'a [u8],
}

impl<'a> RecordReader<'a> {
    pub(crate) const fn new(body: &'a [u8]) -> Self {
        Self { rest: body }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let Some((chunk, rest)) = self.rest.split_first_chunk::<N>() else {
            unreachable!("truncated display list record");
        };
        self.rest = rest;
        *chunk
    }

    pub(crate) fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    pub(crate) fn bool(&mut self) -> bool {
        self.u8() != 0
    }

    pub(crate) fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    pub(crate) fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }

    pub(crate) fn f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take())
    }

    pub(crate) fn count(&mut self) -> usize {
        self.u32() as usize
    }

    pub(crate) fn point(&mut self) -> Point {
        let x = self.f32();
        Point::new(x, self.f32())
    }

    pub(crate) fn rect(&mut self) -> Rect {
        let left = self.f32();
        let top = self.f32();
        let right = self.f32();
        Rect::from_ltrb(left, top, right, self.f32())
    }

    pub(crate) fn irect(&mut self) -> IRect {
        let left = self.i32();
        let top = self.i32();
        let right = self.i32();
        IRect::from_ltrb(left, top, right, self.i32())
    }

    pub(crate) fn rrect(&mut self) -> RRect {
        let rect = self.rect();
        let radii = [self.point(), self.point(), self.point(), self.point()];
        RRect::from_normalized(rect, radii)
    }

    pub(crate) fn color(&mut self) -> Color {
        Color::from_argb(self.u32())
    }

    pub(crate) fn matrix(&mut self) -> Matrix {
        let mut m = [0.0; 16];
        for v in &mut m {
            *v = self.f32();
        }
        Matrix::from_row_major(m)
    }

    pub(crate) fn rstransform(&mut self) -> RSTransform {
        let scos = self.f32();
        let ssin = self.f32();
        let tx = self.f32();
        RSTransform::new(scos, ssin, tx, self.f32())
    }

    /// Read `count` trailing elements with `read`.
    pub(crate) fn array<T>(&mut self, count: usize, mut read: impl FnMut(&mut Self) -> T) -> Vec<T> {
        (0..count).map(|_| read(self)).collect()
    }

    /// Check that only zero padding remains.
    pub(crate) fn finish(self) {
        debug_assert!(
            self.rest.len() < RECORD_ALIGN && self.rest.iter().all(|b| *b == 0),
            "display list record has {} unread bytes",
            self.rest.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_are_aligned_and_zero_padded() {
        let mut storage = OpStorage::default();
        let size = storage.push(OpKind::SetAntiAlias, |w| w.bool(true));
        assert_eq!(size, RECORD_ALIGN);
        assert_eq!(storage.used(), RECORD_ALIGN);
        assert!(storage.bytes()[HEADER_SIZE + 1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_growth_is_paged() {
        let mut storage = OpStorage::default();
        let _ = storage.push(OpKind::Save, |_| {});
        assert_eq!(storage.allocated(), PAGE_SIZE);
        while storage.used() <= PAGE_SIZE {
            let _ = storage.push(OpKind::DrawRect, |w| w.rect(&Rect::from_ltrb(1.0, 2.0, 3.0, 4.0)));
        }
        assert_eq!(storage.allocated(), PAGE_SIZE * 2);
        for record in storage.records() {
            let mut reader = RecordReader::new(record.body);
            if record.header.kind == OpKind::DrawRect {
                assert_eq!(reader.rect(), Rect::from_ltrb(1.0, 2.0, 3.0, 4.0));
            }
            reader.finish();
        }
    }

    #[test]
    fn test_shrink_to_fit() {
        let mut storage = OpStorage::default();
        let _ = storage.push(OpKind::Translate, |w| {
            w.f32(1.0);
            w.f32(2.0);
        });
        storage.shrink_to_fit();
        assert_eq!(storage.allocated(), storage.used());
    }

    #[test]
    #[should_panic(expected = "truncated display list record")]
    fn test_truncated_read_panics() {
        let mut reader = RecordReader::new(&[0, 0]);
        let _ = reader.f32();
    }
}
