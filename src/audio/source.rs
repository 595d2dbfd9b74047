//! Sample source: a decoded buffer flattened lazily to one channel, plus
//! zero-padded window extraction around a playback time.

use once_cell::unsync::OnceCell;

use super::decode::DecodedAudio;

/// Length of the silent placeholder returned while a buffer is loading.
pub const PLACEHOLDER_LEN: usize = 2 << 14;

static PLACEHOLDER: [f32; PLACEHOLDER_LEN] = [0.0; PLACEHOLDER_LEN];

/// Capability the spectral analyzer pulls sample windows from.
pub trait SampleSource {
    /// Exactly `2 * half_width` samples centred on `time` seconds.
    fn get_data(&self, time: f64, half_width: usize) -> Vec<f32>;

    fn sample_rate(&self) -> u32;

    fn is_loaded(&self) -> bool;
}

#[derive(Debug)]
enum BufferState {
    Loading { sample_rate: u32 },
    Ready(DecodedAudio),
}

#[derive(Debug)]
pub struct AudioFile {
    buffer: BufferState,
    samples: OnceCell<Vec<f32>>,
}

impl AudioFile {
    pub fn new(decoded: DecodedAudio) -> Self {
        Self {
            buffer: BufferState::Ready(decoded),
            samples: OnceCell::new(),
        }
    }

    /// A source whose buffer has not arrived yet.
    pub fn loading(sample_rate: u32) -> Self {
        Self {
            buffer: BufferState::Loading { sample_rate },
            samples: OnceCell::new(),
        }
    }

    /// Installs a freshly decoded buffer. Any previously materialized
    /// samples are dropped, never mutated.
    pub fn finish_loading(&mut self, decoded: DecodedAudio) {
        self.buffer = BufferState::Ready(decoded);
        self.samples = OnceCell::new();
    }

    /// First channel of the buffer, or silence while still loading.
    pub fn samples(&self) -> &[f32] {
        match &self.buffer {
            BufferState::Loading { .. } => &PLACEHOLDER[..],
            BufferState::Ready(decoded) => self
                .samples
                .get_or_init(|| decoded.channels.first().cloned().unwrap_or_default())
                .as_slice(),
        }
    }

    pub fn duration(&self) -> f64 {
        match &self.buffer {
            BufferState::Loading { .. } => 0.0,
            BufferState::Ready(decoded) => decoded.duration(),
        }
    }
}

impl SampleSource for AudioFile {
    fn get_data(&self, time: f64, half_width: usize) -> Vec<f32> {
        let samples = self.samples();
        let center = (time * self.sample_rate() as f64).trunc() as i64;
        window_around(samples, center, half_width)
    }

    fn sample_rate(&self) -> u32 {
        match &self.buffer {
            BufferState::Loading { sample_rate } => *sample_rate,
            BufferState::Ready(decoded) => decoded.sample_rate,
        }
    }

    fn is_loaded(&self) -> bool {
        matches!(self.buffer, BufferState::Ready(_))
    }
}

/// A borrowed, already-flattened buffer. Unlike [`AudioFile`] it can be
/// shared between worker threads.
#[derive(Debug, Clone, Copy)]
pub struct SampleSlice<'a> {
    samples: &'a [f32],
    sample_rate: u32,
}

impl<'a> SampleSlice<'a> {
    pub fn new(samples: &'a [f32], sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.samples.len() as f64 / self.sample_rate as f64
        }
    }
}

impl SampleSource for SampleSlice<'_> {
    fn get_data(&self, time: f64, half_width: usize) -> Vec<f32> {
        let center = (time * self.sample_rate as f64).trunc() as i64;
        window_around(self.samples, center, half_width)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_loaded(&self) -> bool {
        true
    }
}

/// `samples[center - half_width .. center + half_width]`, zero-padded
/// wherever that span leaves the buffer.
fn window_around(samples: &[f32], center: i64, half_width: usize) -> Vec<f32> {
    let width = 2 * half_width;
    let mut window = vec![0.0f32; width];

    let start = center.saturating_sub(half_width as i64);
    let end = start.saturating_add(width as i64);
    let copy_start = start.clamp(0, samples.len() as i64);
    let copy_end = end.clamp(0, samples.len() as i64);

    if copy_start < copy_end {
        let padding_before = (copy_start - start) as usize;
        let src = &samples[copy_start as usize..copy_end as usize];
        window[padding_before..padding_before + src.len()].copy_from_slice(src);
    }

    window
}
