//! Audio interface used by a conversation, plus PCM helpers.
//!
//! Wire audio is signed 16-bit little-endian mono PCM at 16 kHz in both directions.

use thiserror::Error;
use tokio::sync::mpsc;

/// Sample rate of audio exchanged with the conversation server.
pub const SAMPLE_RATE: u32 = 16_000;
/// Samples per microphone chunk (250 ms).
pub const INPUT_CHUNK_SAMPLES: usize = 4_000;

/// Receives PCM16 chunks captured from the microphone.
pub type InputSender = mpsc::UnboundedSender<Vec<u8>>;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No {0} device available")]
    NoDevice(&'static str),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio device error: {0}")]
    Device(String),
}

/// Local audio I/O driven by a conversation.
///
/// `start` is called once the connection is up; captured audio goes to `input`.
/// `output` queues agent speech for playback and `interrupt` drops whatever is
/// still queued. `stop` releases the devices and may be called more than once.
pub trait AudioInterface: Send {
    fn start(&mut self, input: InputSender) -> Result<(), AudioError>;
    fn output(&mut self, audio: &[u8]);
    fn interrupt(&mut self);
    fn stop(&mut self);

    /// Whether real devices back this interface.
    fn is_live(&self) -> bool {
        true
    }
}

/// Interface with no devices: captures nothing, discards playback.
#[derive(Debug, Default)]
pub struct SilentAudio {
    input: Option<InputSender>,
}

impl AudioInterface for SilentAudio {
    fn start(&mut self, input: InputSender) -> Result<(), AudioError> {
        // Hold the sender so the session's input channel stays open.
        self.input = Some(input);
        Ok(())
    }

    fn output(&mut self, _audio: &[u8]) {}

    fn interrupt(&mut self) {}

    fn stop(&mut self) {
        self.input = None;
    }

    fn is_live(&self) -> bool {
        false
    }
}

/// The local microphone and speakers when built with the `audio` feature,
/// otherwise [`SilentAudio`].
#[must_use]
pub fn default_audio_interface() -> Box<dyn AudioInterface> {
    #[cfg(feature = "audio")]
    {
        Box::new(super::device::DeviceAudio::new())
    }
    #[cfg(not(feature = "audio"))]
    {
        tracing::warn!("Built without the `audio` feature; microphone and speakers are disabled");
        Box::new(SilentAudio::default())
    }
}

/// Decode PCM16 LE bytes to samples in `[-1.0, 1.0]`. A trailing odd byte is ignored.
#[must_use]
pub fn pcm16_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32_768.0)
        .collect()
}

/// Encode samples as PCM16 LE bytes, clamping out-of-range values.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn f32_to_pcm16(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|s| {
            let clamped = s.clamp(-1.0, 1.0);
            ((clamped * 32_767.0).round() as i16).to_le_bytes()
        })
        .collect()
}

/// Average interleaved frames down to one channel.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear-interpolation resampling of a mono signal.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }

    let ratio = f64::from(from_rate) / f64::from(to_rate);
    let out_len = ((samples.len() as f64) / ratio).round().max(1.0) as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            samples[idx] + (samples[next] - samples[idx]) * frac
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_conversion() {
        let bytes = f32_to_pcm16(&[0.0, 1.0, -1.0, 2.0]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), 32_767);
        assert_eq!(i16::from_le_bytes([bytes[6], bytes[7]]), 32_767);

        let samples = pcm16_to_f32(&bytes);
        assert_eq!(samples.len(), 4);
        assert!(samples[0].abs() < f32::EPSILON);
        assert!((samples[1] - 1.0).abs() < 0.001);
        assert!((samples[2] + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_pcm_odd_byte_ignored() {
        assert_eq!(pcm16_to_f32(&[0, 0, 7]).len(), 1);
        assert!(pcm16_to_f32(&[]).is_empty());
    }

    #[test]
    fn test_downmix_stereo() {
        let mono = downmix(&[0.2, 0.4, -1.0, 1.0], 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
        assert_eq!(downmix(&[0.5], 1), vec![0.5]);
    }

    #[test]
    fn test_resample_lengths() {
        let one_second_48k = vec![0.25; 48_000];
        let down = resample(&one_second_48k, 48_000, SAMPLE_RATE);
        assert_eq!(down.len(), 16_000);
        assert!(down.iter().all(|s| (s - 0.25).abs() < 1e-6));

        let up = resample(&down, SAMPLE_RATE, 44_100);
        assert_eq!(up.len(), 44_100);
    }

    #[test]
    fn test_resample_interpolates() {
        let up = resample(&[0.0, 1.0], 1, 2);
        assert_eq!(up.len(), 4);
        assert!((up[1] - 0.5).abs() < 1e-6);
        assert!((up[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_resample_identity() {
        assert_eq!(resample(&[0.1, 0.2], 16_000, 16_000), vec![0.1, 0.2]);
        assert!(resample(&[], 48_000, 16_000).is_empty());
    }

    #[test]
    fn test_silent_audio_is_not_live() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut audio = SilentAudio::default();
        audio.start(tx).unwrap();
        audio.output(&[1, 2, 3, 4]);
        audio.interrupt();
        assert!(!audio.is_live());
        assert!(rx.try_recv().is_err());
        audio.stop();
        audio.stop();
    }
}
