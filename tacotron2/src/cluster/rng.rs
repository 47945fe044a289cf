//! MT19937 random source for centroid initialization.
//!
//! Every clustering run owns one `ClusterRng`. Seeding it with the same value
//! reproduces the same initial centroids, which is what makes `random_state`
//! meaningful across restarts and repeated calls.
//!
//! Normal samples use Box-Muller in two flavours:
//! - **Scalar path (count < 16)**: 53-bit double uniforms, second value cached
//! - **Vectorized path (count >= 16)**: 24-bit float uniforms, 16 at a time

use candle_core::{DType, Device, Result, Tensor};
use rand_mt::Mt;

/// Seedable MT19937 generator with Box-Muller normals.
#[derive(Debug, Clone)]
pub struct ClusterRng {
    rng: Mt,
    /// Cached second value from the scalar Box-Muller transform
    cached_normal: Option<f32>,
}

impl ClusterRng {
    /// Create a generator from a seed.
    ///
    /// MT19937 is a 32-bit generator; only the lower 32 bits of `seed` are used.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mt::new(seed as u32),
            cached_normal: None,
        }
    }

    /// Convert two MT19937 u32 values to a 53-bit uniform double [0, 1).
    #[inline]
    fn mt_to_uniform_double(lo: u32, hi: u32) -> f64 {
        let combined = ((lo as u64) << 32) | (hi as u64);
        const MASK_53BIT: u64 = 0x001F_FFFF_FFFF_FFFF;
        const DIVISOR: f64 = 9_007_199_254_740_992.0; // 2^53
        (combined & MASK_53BIT) as f64 / DIVISOR
    }

    /// Convert a single MT19937 u32 to a 24-bit uniform float [0, 1).
    #[inline]
    fn mt_to_uniform_float(val: u32) -> f32 {
        const MASK_24BIT: u32 = 0x00FF_FFFF;
        const DIVISOR: f32 = 16_777_216.0; // 2^24
        (val & MASK_24BIT) as f32 / DIVISOR
    }

    /// Sample a single uniform value in [0, 1) with 24-bit precision.
    #[inline]
    pub fn uniform(&mut self) -> f32 {
        Self::mt_to_uniform_float(self.rng.next_u32())
    }

    /// Sample a single uniform value in [0, 1) with 53-bit precision.
    #[inline]
    pub fn uniform_f64(&mut self) -> f64 {
        let lo = self.rng.next_u32();
        let hi = self.rng.next_u32();
        Self::mt_to_uniform_double(lo, hi)
    }

    /// Sample an index uniformly from `0..n`.
    ///
    /// Returns 0 when `n` is 0 so callers indexing into non-empty sets never
    /// need a separate branch.
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.uniform_f64() * n as f64) as usize).min(n - 1)
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }

    /// Sample a single value from N(0, 1) using the scalar Box-Muller path.
    ///
    /// Odd calls consume 4 u32 values, even calls return the cached sample.
    pub fn sample_scalar(&mut self) -> f32 {
        if let Some(cached) = self.cached_normal.take() {
            return cached;
        }

        let u1 = self.uniform_f64();
        let u2 = self.uniform_f64();

        // log(1 - u2) keeps the argument strictly positive
        let r = (-2.0_f64 * (1.0_f64 - u2).ln()).sqrt();
        let theta = 2.0_f64 * std::f64::consts::PI * u1;

        self.cached_normal = Some((r * theta.sin()) as f32);
        (r * theta.cos()) as f32
    }

    /// Generate `count` normal values, 16 at a time.
    fn sample_vectorized(&mut self, count: usize) -> Vec<f32> {
        let mut output = Vec::with_capacity(count);
        let num_full_chunks = count / 16;
        let remainder = count % 16;

        // u1 comes from positions 0-7 (as 1 - u), u2 from positions 8-15;
        // the chunk is emitted as all cos values followed by all sin values.
        for _ in 0..num_full_chunks {
            let mut uniforms = [0.0_f32; 16];
            for u in uniforms.iter_mut() {
                *u = Self::mt_to_uniform_float(self.rng.next_u32());
            }

            let mut cos_vals = [0.0_f32; 8];
            let mut sin_vals = [0.0_f32; 8];

            for i in 0..8 {
                let u1 = 1.0_f32 - uniforms[i];
                let u2 = uniforms[8 + i];

                let r = (-2.0_f32 * u1.ln()).sqrt();
                let theta = 2.0_f32 * std::f32::consts::PI * u2;

                cos_vals[i] = r * theta.cos();
                sin_vals[i] = r * theta.sin();
            }

            output.extend_from_slice(&cos_vals);
            output.extend_from_slice(&sin_vals);
        }

        for _ in 0..remainder {
            output.push(self.sample_scalar());
        }

        output
    }

    /// Generate a tensor of standard normal values.
    pub fn randn(&mut self, shape: &[usize], device: &Device) -> Result<Tensor> {
        let elem_count: usize = shape.iter().product();

        let data = if elem_count >= 16 {
            self.sample_vectorized(elem_count)
        } else {
            (0..elem_count).map(|_| self.sample_scalar()).collect()
        };

        host_tensor(data, shape, device)
    }

    /// Generate a tensor of values uniform in `[lo, hi)`.
    pub fn rand_uniform(
        &mut self,
        shape: &[usize],
        lo: f32,
        hi: f32,
        device: &Device,
    ) -> Result<Tensor> {
        let elem_count: usize = shape.iter().product();
        let span = hi - lo;
        let data = (0..elem_count)
            .map(|_| lo + self.uniform() * span)
            .collect();

        host_tensor(data, shape, device)
    }
}

/// Build an F32 tensor on the CPU, then move it to `device`.
fn host_tensor(data: Vec<f32>, shape: &[usize], device: &Device) -> Result<Tensor> {
    let cpu_tensor = Tensor::from_vec(data, shape, &Device::Cpu)?;

    let tensor = if matches!(device, Device::Cpu) {
        cpu_tensor
    } else {
        cpu_tensor.to_device(device)?
    };

    tensor.to_dtype(DType::F32)
}

/// Seed derived from the system clock.
pub fn entropy_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}
