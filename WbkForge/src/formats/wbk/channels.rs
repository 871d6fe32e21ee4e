//! Channel count encoded as the population count of an entry's flag byte

/// Number of channels described by a flag byte.
///
/// A zero flag byte means mono with no pattern specified, not zero channels.
#[must_use]
pub fn channel_count(flags: u8) -> u32 {
    if flags == 0 { 1 } else { flags.count_ones() }
}

/// Flag byte describing `count` channels.
///
/// The low `count` bits are set and everything above is cleared, whatever
/// pattern `flags` held before. Existing banks were written with this exact
/// policy, so non-contiguous patterns are not preserved.
#[must_use]
pub fn set_channel_count(_flags: u8, count: u32) -> u8 {
    if count >= 8 {
        0xFF
    } else {
        ((1u16 << count) - 1) as u8
    }
}
