pub mod analyzer;
pub mod decode;
pub mod features;
pub mod fft;
pub mod notes;
pub mod peaks;
pub mod playhead;
pub mod scale;
pub mod source;
pub mod timeline;
pub mod window;
