//! Randomness and surface sampling for the scatter pipeline.
//!
//! [`SampleStream`] is the seeded, cursor-indexed number source every scattering pass
//! draws from. [`SampleSource`] is the narrow interface the selectors and samplers
//! consume; it is implemented for the stream and for any [`rand::RngCore`], so tests and
//! benches can substitute `StdRng` or a fixed-value double.
use rand::RngCore;

pub mod stream;
pub mod surface;

pub use stream::SampleStream;
pub use surface::{sample_surface, GroundMesh, SampleRounding, SurfaceSample, Triangle};

/// A source of uniform samples in `[0, 1)` with an explicit "consume without using" step.
pub trait SampleSource {
    /// Draws the next value in `[0, 1)`.
    fn next_sample(&mut self) -> f32;

    /// Consumes one draw without producing a value.
    ///
    /// Branches that do not need a random value call this so every path advances the
    /// source by the same number of steps.
    fn skip(&mut self);
}

impl<R: RngCore + ?Sized> SampleSource for R {
    #[inline]
    fn next_sample(&mut self) -> f32 {
        rand01(self.next_u32())
    }

    #[inline]
    fn skip(&mut self) {
        let _ = self.next_u32();
    }
}

/// Maps a raw 32-bit draw to `[0, 1)` using its top 24 bits.
#[inline]
pub(crate) fn rand01(bits: u32) -> f32 {
    (bits >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// Test double replaying a fixed script of `[0, 1)` samples, cycling when exhausted.
#[cfg(test)]
pub(crate) struct ScriptedRng {
    values: Vec<u32>,
    next: usize,
    pub(crate) calls: usize,
}

#[cfg(test)]
impl ScriptedRng {
    pub(crate) fn new(samples: &[f32]) -> Self {
        assert!(!samples.is_empty());
        Self {
            values: samples
                .iter()
                .map(|s| ((s * (1u32 << 24) as f32) as u32) << 8)
                .collect(),
            next: 0,
            calls: 0,
        }
    }
}

#[cfg(test)]
impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        self.calls += 1;
        v
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u32() as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
