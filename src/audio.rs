//! Preview playback: download, decode and play 30-second track snippets
//!
//! The cpal stream is not `Send`, so it lives on a dedicated output thread
//! that drains a shared sample queue. The async side only decodes and hands
//! finished sample buffers over a channel.

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

const OUTPUT_THREAD_NAME: &str = "preview-output";

type SampleQueue = Arc<Mutex<VecDeque<f32>>>;

/// Interleaved PCM decoded from a preview file
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedPreview {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OutputFormat {
    sample_rate: u32,
    channels: u16,
}

pub(crate) enum OutputCommand {
    Play(Vec<f32>),
    Stop,
}

#[derive(Clone)]
pub struct AudioBackend {
    http: reqwest::Client,
    commands: mpsc::Sender<OutputCommand>,
    format: OutputFormat,
    generation: Arc<AtomicU64>,
}

impl AudioBackend {
    /// Open the default output device. Blocks until the output thread is ready.
    pub fn new() -> Result<Self> {
        let (commands, receiver) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        thread::Builder::new()
            .name(OUTPUT_THREAD_NAME.to_string())
            .spawn(move || run_output(receiver, ready_tx))
            .context("Failed to spawn audio output thread")?;

        let format = ready_rx
            .recv()
            .context("Audio output thread exited during startup")??;

        tracing::info!(
            sample_rate = format.sample_rate,
            channels = format.channels,
            "Audio backend initialized"
        );

        Ok(Self {
            http: reqwest::Client::new(),
            commands,
            format,
            generation: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Play the preview at `url` if `generation` is still the latest one.
    ///
    /// `generation` comes from [`AudioBackend::silence`], taken when the
    /// snippet was requested. A later `silence` or `stop` makes this call a
    /// no-op, even if the download is already in flight.
    pub async fn play_preview(&self, generation: u64, url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(anyhow!("No preview available for this track"));
        }
        if !self.is_current(generation) {
            tracing::debug!(generation, "Preview superseded before download");
            return Ok(());
        }

        tracing::debug!(url, generation, "Downloading preview");

        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let format = self.format;
        let samples = tokio::task::spawn_blocking(move || -> Result<Vec<f32>> {
            let preview = decode_preview(bytes.to_vec())?;
            tracing::debug!(
                source_rate = preview.sample_rate,
                source_channels = preview.channels,
                "Preview decoded"
            );
            adapt_samples(&preview, format.sample_rate, format.channels)
        })
        .await??;

        if !self.is_current(generation) {
            tracing::debug!(generation, "Preview superseded before playback");
            return Ok(());
        }

        tracing::debug!(samples = samples.len(), "Starting preview");
        self.commands
            .send(OutputCommand::Play(samples))
            .map_err(|_| anyhow!("Audio output thread is gone"))
    }

    pub fn stop(&self) {
        self.silence();
    }

    /// Stop whatever is playing and return the generation for the next preview.
    pub fn silence(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if self.commands.send(OutputCommand::Stop).is_err() {
            tracing::warn!("Audio output thread is gone");
        }
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Backend wired to a plain channel instead of an output device
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::Receiver<OutputCommand>) {
        let (commands, receiver) = mpsc::channel();
        let backend = Self {
            http: reqwest::Client::new(),
            commands,
            format: OutputFormat {
                sample_rate: 44_100,
                channels: 2,
            },
            generation: Arc::new(AtomicU64::new(0)),
        };
        (backend, receiver)
    }
}

fn run_output(commands: mpsc::Receiver<OutputCommand>, ready: mpsc::Sender<Result<OutputFormat>>) {
    let queue: SampleQueue = Arc::new(Mutex::new(VecDeque::new()));

    let stream = match open_stream(queue.clone()) {
        Ok((stream, format)) => {
            let _ = ready.send(Ok(format));
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    // Runs until every AudioBackend handle is dropped
    while let Ok(command) = commands.recv() {
        let Ok(mut queued) = queue.lock() else {
            tracing::error!("Sample queue poisoned, stopping audio output");
            break;
        };
        queued.clear();
        if let OutputCommand::Play(samples) = command {
            queued.extend(samples);
        }
    }

    drop(stream);
    tracing::debug!("Audio output thread stopped");
}

fn open_stream(queue: SampleQueue) -> Result<(cpal::Stream, OutputFormat)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No audio output device available"))?;

    tracing::info!(
        device_name = ?device.name().unwrap_or_else(|_| "Unknown".to_string()),
        "Selected audio device"
    );

    let config = device
        .default_output_config()
        .context("Failed to get default output config")?;

    let format = OutputFormat {
        sample_rate: config.sample_rate().0,
        channels: config.channels(),
    };

    let sample_format = config.sample_format();
    let stream_config: cpal::StreamConfig = config.into();

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, queue)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, queue)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, queue)?,
        other => return Err(anyhow!("Unsupported sample format: {other:?}")),
    };

    stream.play().context("Failed to start audio stream")?;
    Ok((stream, format))
}

fn build_stream<T>(device: &cpal::Device, config: &cpal::StreamConfig, queue: SampleQueue) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if let Ok(mut queued) = queue.try_lock() {
                for sample in data.iter_mut() {
                    *sample = T::from_sample(queued.pop_front().unwrap_or(0.0));
                }
            } else {
                for sample in data.iter_mut() {
                    *sample = T::EQUILIBRIUM;
                }
            }
        },
        |err| tracing::error!("Audio stream error: {}", err),
        None,
    )?;
    Ok(stream)
}

/// Decode a whole preview file into interleaved f32 samples.
pub fn decode_preview(bytes: Vec<u8>) -> Result<DecodedPreview> {
    let source = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(&hint, source, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe preview")?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| anyhow!("Preview has no audio track"))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
    let mut channels = track.codec_params.channels.map(|c| c.count() as u16).unwrap_or(2);
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create preview decoder")?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e).context("Failed to read preview packet"),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count() as u16;

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::trace!(error = e, "Skipping undecodable packet");
            }
            Err(e) => return Err(e).context("Failed to decode preview"),
        }
    }

    if samples.is_empty() {
        return Err(anyhow!("Preview contained no audio"));
    }

    Ok(DecodedPreview {
        samples,
        sample_rate,
        channels,
    })
}

/// Convert decoded audio to the output device's channel layout and rate.
///
/// Extra output channels repeat the last source channel and surplus source
/// channels are dropped. Rate conversion goes through a windowed sinc
/// resampler, which also low-passes content above the new Nyquist limit.
pub fn adapt_samples(preview: &DecodedPreview, out_rate: u32, out_channels: u16) -> Result<Vec<f32>> {
    let in_channels = preview.channels.max(1) as usize;
    let out_channels = out_channels.max(1);
    let frames = preview.samples.len() / in_channels;

    if frames == 0 || preview.sample_rate == 0 || out_rate == 0 {
        return Ok(Vec::new());
    }

    let mut planar = vec![Vec::with_capacity(frames); out_channels as usize];
    for frame in preview.samples.chunks_exact(in_channels) {
        for (channel, samples) in planar.iter_mut().enumerate() {
            samples.push(frame[channel.min(in_channels - 1)]);
        }
    }

    if preview.sample_rate != out_rate {
        planar = resample(planar, preview.sample_rate, out_rate)?;
    }

    Ok(interleave(&planar))
}

fn resample(planar: Vec<Vec<f32>>, in_rate: u32, out_rate: u32) -> Result<Vec<Vec<f32>>> {
    let frames = planar.first().map(Vec::len).unwrap_or(0);
    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        out_rate as f64 / in_rate as f64,
        1.0,
        params,
        frames,
        planar.len(),
    )
    .context("Failed to create resampler")?;

    let output = resampler
        .process(&planar, None)
        .context("Failed to resample preview")?;

    tracing::trace!(in_rate, out_rate, frames, "Preview resampled");
    Ok(output)
}

fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    let frames = planar.first().map(Vec::len).unwrap_or(0);
    let mut interleaved = Vec::with_capacity(frames * planar.len());
    for frame in 0..frames {
        for channel in planar {
            interleaved.push(channel[frame]);
        }
    }
    interleaved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(samples: Vec<f32>, sample_rate: u32, channels: u16) -> DecodedPreview {
        DecodedPreview {
            samples,
            sample_rate,
            channels,
        }
    }

    #[test]
    fn matching_format_is_unchanged() {
        let source = preview(vec![0.1, -0.1, 0.2, -0.2], 44_100, 2);
        assert_eq!(adapt_samples(&source, 44_100, 2).unwrap(), source.samples);
    }

    #[test]
    fn mono_is_duplicated_to_stereo() {
        let source = preview(vec![0.1, 0.2, 0.3], 48_000, 1);
        assert_eq!(
            adapt_samples(&source, 48_000, 2).unwrap(),
            vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3]
        );
    }

    #[test]
    fn stereo_to_mono_keeps_first_channel() {
        let source = preview(vec![0.1, 0.9, 0.2, 0.8], 48_000, 2);
        assert_eq!(adapt_samples(&source, 48_000, 1).unwrap(), vec![0.1, 0.2]);
    }

    #[test]
    fn upsampling_scales_length_and_keeps_level() {
        let source = preview(vec![0.5; 2 * 22_050], 22_050, 2);
        let out = adapt_samples(&source, 44_100, 2).unwrap();

        let frames = out.len() / 2;
        assert!(frames.abs_diff(44_100) <= 4, "got {frames} frames");

        // Away from the filter's lead-in the constant level survives
        let middle = &out[out.len() / 4..3 * out.len() / 4];
        assert!(middle.iter().all(|s| (s - 0.5).abs() < 0.02));
    }

    #[test]
    fn upsampling_interpolates_between_samples() {
        let tone: Vec<f32> = (0..4_410)
            .map(|i| (2.0 * std::f32::consts::PI * 441.0 * i as f32 / 44_100.0).sin())
            .collect();
        let source = preview(tone, 44_100, 1);
        let out = adapt_samples(&source, 48_000, 1).unwrap();

        // A sample-and-hold resampler repeats neighbours exactly
        let middle = &out[out.len() / 4..3 * out.len() / 4];
        let repeats = middle.windows(2).filter(|pair| pair[0] == pair[1]).count();
        assert_eq!(repeats, 0);
    }

    #[test]
    fn downsampling_filters_content_above_new_nyquist() {
        let nyquist_tone: Vec<f32> = (0..4_096).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let source = preview(nyquist_tone, 48_000, 1);
        let out = adapt_samples(&source, 24_000, 1).unwrap();

        let frames = out.len();
        assert!(frames.abs_diff(2_048) <= 4, "got {frames} frames");

        let middle = &out[frames / 4..3 * frames / 4];
        assert!(middle.iter().all(|s| s.abs() < 0.05));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let source = preview(Vec::new(), 44_100, 2);
        assert!(adapt_samples(&source, 48_000, 2).unwrap().is_empty());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_preview(vec![0u8; 64]).is_err());
    }

    #[tokio::test]
    async fn stopped_request_never_reaches_output() {
        let (backend, commands) = AudioBackend::detached();

        let generation = backend.silence();
        backend.stop();

        // Superseded before download, so the URL is never fetched
        backend
            .play_preview(generation, "http://127.0.0.1:9/preview.mp3")
            .await
            .unwrap();

        let sent: Vec<OutputCommand> = commands.try_iter().collect();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|command| matches!(command, OutputCommand::Stop)));
    }

    #[tokio::test]
    async fn empty_preview_url_is_an_error() {
        let (backend, _commands) = AudioBackend::detached();
        let generation = backend.silence();

        let err = backend.play_preview(generation, "").await.unwrap_err();
        assert!(err.to_string().contains("No preview available"));
    }
}
