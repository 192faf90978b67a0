//! Aperture sample generation.

mod aperture;
mod hammersley;

pub use aperture::{
    square_to_disk, unit_square_to_centered, ApertureSampler, DiskSample, SampleOutcome,
    SamplingMode,
};
pub use hammersley::{hammersley, radical_inverse_base2, reverse_bits32};
