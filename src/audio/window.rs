use std::collections::HashMap;
use std::sync::Arc;

/// Blackman window with α = 0.16 (a0 = 0.42, a1 = 0.5, a2 = 0.08).
pub fn blackman_window(size: usize) -> Vec<f32> {
    const ALPHA: f64 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;

    (0..size)
        .map(|i| {
            let x = i as f64 / size as f64;
            let tau = std::f64::consts::TAU;
            (a0 - a1 * (tau * x).cos() + a2 * (2.0 * tau * x).cos()) as f32
        })
        .collect()
}

/// Frame length analysed at a given resolution: `2^(resolution + 1)`
/// samples, which yields `2^resolution` bins up to Nyquist.
pub fn frame_len(resolution: u32) -> usize {
    1usize << (resolution + 1)
}

/// Window tables keyed by resolution, built on first use and kept for the
/// lifetime of the owner.
#[derive(Debug, Default)]
pub struct WindowCache {
    tables: HashMap<u32, Arc<[f32]>>,
}

impl WindowCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, resolution: u32) -> Arc<[f32]> {
        self.tables
            .entry(resolution)
            .or_insert_with(|| {
                log::debug!("Building window table for resolution {}", resolution);
                blackman_window(frame_len(resolution)).into()
            })
            .clone()
    }

    /// Number of resolutions with a built table.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

pub fn apply_window(buffer: &mut [f32], window: &[f32]) {
    debug_assert_eq!(buffer.len(), window.len());
    for (sample, coeff) in buffer.iter_mut().zip(window.iter()) {
        *sample *= *coeff;
    }
}
