/// Round `pos` up to the next multiple of `word`.
///
/// `word` must be a nonzero power of two; callers validate before reaching
/// here.
#[inline]
pub(crate) fn align_up(pos: usize, word: usize) -> usize {
    debug_assert!(word.is_power_of_two());
    (pos + word - 1) & !(word - 1)
}

#[inline]
pub(crate) fn le_u32(data: &[u8]) -> u32 {
    debug_assert!(data.len() >= 4);
    u32::from_le_bytes([data[0], data[1], data[2], data[3]])
}
