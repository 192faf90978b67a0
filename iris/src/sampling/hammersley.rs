//! Base-2 Hammersley point set.
//!
//! Reference: Holger Dammertz, "Hammersley Points on the Hemisphere".

/// Reverses the bit order of a 32-bit integer.
#[inline]
pub fn reverse_bits32(bits: u32) -> u32 {
    let bits = bits.rotate_left(16);
    let bits = ((bits & 0x00ff_00ff) << 8) | ((bits & 0xff00_ff00) >> 8);
    let bits = ((bits & 0x0f0f_0f0f) << 4) | ((bits & 0xf0f0_f0f0) >> 4);
    let bits = ((bits & 0x3333_3333) << 2) | ((bits & 0xcccc_cccc) >> 2);
    ((bits & 0x5555_5555) << 1) | ((bits & 0xaaaa_aaaa) >> 1)
}

/// Van der Corput radical inverse in base 2, in `[0, 1)`.
#[inline]
pub fn radical_inverse_base2(i: u32) -> f64 {
    reverse_bits32(i) as f64 / 4_294_967_296.0
}

/// The `i`-th point of an `n`-point Hammersley set, both coordinates in `[0, 1)`.
///
/// The x coordinate is `i / n`, so a point depends on the set size and
/// sets of different sizes do not share a prefix.
#[inline]
pub fn hammersley(i: u32, n: u32) -> (f64, f64) {
    debug_assert!(n > 0, "Hammersley set size must be positive");
    (i as f64 / n as f64, radical_inverse_base2(i))
}
