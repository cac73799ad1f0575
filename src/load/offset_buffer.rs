//! A [`LinearBuffer`] view shifted by a fixed offset — used by the rank >= 3
//! recursion to hand each outer-axis slice its own sub-range of the parent
//! buffer without copying indices through every recursive call by hand.

use crate::buffer::LinearBuffer;

pub struct OffsetBuffer<'b, B> {
    inner: &'b B,
    offset: usize,
}

impl<'b, B> OffsetBuffer<'b, B> {
    pub fn new(inner: &'b B, offset: usize) -> Self {
        OffsetBuffer { inner, offset }
    }
}

impl<'b, B> Clone for OffsetBuffer<'b, B> {
    fn clone(&self) -> Self {
        OffsetBuffer {
            inner: self.inner,
            offset: self.offset,
        }
    }
}
impl<'b, B> Copy for OffsetBuffer<'b, B> {}

impl<'b, B, E> LinearBuffer<E> for OffsetBuffer<'b, B>
where
    B: LinearBuffer<E>,
{
    fn write(&self, k: usize, v: E) {
        self.inner.write(self.offset + k, v)
    }
}
