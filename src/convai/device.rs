//! Microphone and speaker audio through cpal.
//!
//! cpal streams are not `Send` on every platform, so both streams live on a
//! dedicated thread that parks until `stop`. Playback reads from a shared queue.

use crate::convai::audio::{
    AudioError, AudioInterface, INPUT_CHUNK_SAMPLES, InputSender, SAMPLE_RATE, downmix,
    f32_to_pcm16, pcm16_to_f32, resample,
};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, mpsc as std_mpsc};
use std::thread::JoinHandle;

type PlaybackQueue = Arc<Mutex<VecDeque<f32>>>;

/// Default host input and output devices.
pub struct DeviceAudio {
    playback: PlaybackQueue,
    output_rate: u32,
    shutdown: Option<std_mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl DeviceAudio {
    #[must_use]
    pub fn new() -> Self {
        Self {
            playback: Arc::new(Mutex::new(VecDeque::new())),
            output_rate: SAMPLE_RATE,
            shutdown: None,
            worker: None,
        }
    }
}

impl Default for DeviceAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioInterface for DeviceAudio {
    fn start(&mut self, input: InputSender) -> Result<(), AudioError> {
        if self.worker.is_some() {
            return Ok(());
        }

        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<u32, AudioError>>();
        let (shutdown_tx, shutdown_rx) = std_mpsc::channel::<()>();
        let playback = self.playback.clone();

        let worker = std::thread::Builder::new()
            .name("matrix-audio".into())
            .spawn(move || match open_streams(input, playback) {
                Ok((input_stream, output_stream, output_rate)) => {
                    let _ = ready_tx.send(Ok(output_rate));
                    // Block until stop() or the sender is dropped.
                    let _ = shutdown_rx.recv();
                    drop(input_stream);
                    drop(output_stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| AudioError::Device(e.to_string()))?;

        let output_rate = ready_rx
            .recv()
            .map_err(|_| AudioError::Device("audio thread exited during setup".into()))??;

        tracing::debug!(output_rate, "Audio devices started");
        self.output_rate = output_rate;
        self.shutdown = Some(shutdown_tx);
        self.worker = Some(worker);
        Ok(())
    }

    fn output(&mut self, audio: &[u8]) {
        let samples = resample(&pcm16_to_f32(audio), SAMPLE_RATE, self.output_rate);
        if let Ok(mut queue) = self.playback.lock() {
            queue.extend(samples);
        }
    }

    fn interrupt(&mut self) {
        if let Ok(mut queue) = self.playback.lock() {
            queue.clear();
        }
    }

    fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.interrupt();
    }
}

impl Drop for DeviceAudio {
    fn drop(&mut self) {
        self.stop();
    }
}

fn open_streams(
    input: InputSender,
    playback: PlaybackQueue,
) -> Result<(cpal::Stream, cpal::Stream, u32), AudioError> {
    let host = cpal::default_host();
    let mic = host
        .default_input_device()
        .ok_or(AudioError::NoDevice("input"))?;
    let speaker = host
        .default_output_device()
        .ok_or(AudioError::NoDevice("output"))?;

    let in_config = mic
        .default_input_config()
        .map_err(|e| AudioError::Device(e.to_string()))?;
    let out_config = speaker
        .default_output_config()
        .map_err(|e| AudioError::Device(e.to_string()))?;

    let input_stream = match in_config.sample_format() {
        SampleFormat::F32 => build_input::<f32>(&mic, &in_config.config(), input)?,
        SampleFormat::I16 => build_input::<i16>(&mic, &in_config.config(), input)?,
        SampleFormat::U16 => build_input::<u16>(&mic, &in_config.config(), input)?,
        other => return Err(AudioError::UnsupportedFormat(other.to_string())),
    };
    let output_rate = out_config.sample_rate().0;
    let output_stream = match out_config.sample_format() {
        SampleFormat::F32 => build_output::<f32>(&speaker, &out_config.config(), playback)?,
        SampleFormat::I16 => build_output::<i16>(&speaker, &out_config.config(), playback)?,
        SampleFormat::U16 => build_output::<u16>(&speaker, &out_config.config(), playback)?,
        other => return Err(AudioError::UnsupportedFormat(other.to_string())),
    };

    input_stream
        .play()
        .map_err(|e| AudioError::Device(e.to_string()))?;
    output_stream
        .play()
        .map_err(|e| AudioError::Device(e.to_string()))?;

    Ok((input_stream, output_stream, output_rate))
}

fn build_input<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    input: InputSender,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels);
    let rate = config.sample_rate.0;
    let mut pending: Vec<f32> = Vec::with_capacity(INPUT_CHUNK_SAMPLES * 2);

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let samples: Vec<f32> = data.iter().map(|s| f32::from_sample(*s)).collect();
                pending.extend(resample(&downmix(&samples, channels), rate, SAMPLE_RATE));
                while pending.len() >= INPUT_CHUNK_SAMPLES {
                    let chunk: Vec<f32> = pending.drain(..INPUT_CHUNK_SAMPLES).collect();
                    let _ = input.send(f32_to_pcm16(&chunk));
                }
            },
            |e| tracing::warn!("Microphone stream error: {e}"),
            None,
        )
        .map_err(|e| AudioError::Device(e.to_string()))
}

fn build_output<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    playback: PlaybackQueue,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = usize::from(config.channels);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut queue = match playback.lock() {
                    Ok(q) => q,
                    Err(poisoned) => poisoned.into_inner(),
                };
                for frame in data.chunks_mut(channels.max(1)) {
                    let value = queue.pop_front().unwrap_or(0.0);
                    for slot in frame.iter_mut() {
                        *slot = T::from_sample(value);
                    }
                }
            },
            |e| tracing::warn!("Speaker stream error: {e}"),
            None,
        )
        .map_err(|e| AudioError::Device(e.to_string()))
}
