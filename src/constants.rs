pub(crate) const MIN_BITS_PER_CHUNK: usize = 2;
pub(crate) const MAX_BITS_PER_CHUNK: usize = 16;
pub(crate) const SMALL_MSM_BITS_PER_CHUNK: usize = 3;
pub(crate) const SMALL_MSM_THRESHOLD: usize = 32;
/// Headroom above the scalar width so the top chunk never emits a carry
pub(crate) const CARRY_HEADROOM_BITS: usize = 2;
