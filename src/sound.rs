use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use tracing::warn;

use crate::error::SoundError;

const TONE_HZ: f32 = 440.0;

/// A sine tone that plays while the sound timer is running.
///
/// The output stream is opened once and stays open; `set_active` only flips
/// whether the callback writes the tone or silence.
pub struct Sound {
    active: Arc<AtomicBool>,
    _stream: cpal::Stream,
}

impl Sound {
    pub fn new() -> Result<Self, SoundError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(SoundError::NoDevice)?;
        let supported_config = device.default_output_config()?;
        let format = supported_config.sample_format();
        let config: cpal::StreamConfig = supported_config.into();
        let active = Arc::new(AtomicBool::new(false));

        let stream = match format {
            cpal::SampleFormat::I8 => Self::run::<i8>(&device, &config, active.clone()),
            cpal::SampleFormat::I16 => Self::run::<i16>(&device, &config, active.clone()),
            cpal::SampleFormat::I32 => Self::run::<i32>(&device, &config, active.clone()),
            cpal::SampleFormat::I64 => Self::run::<i64>(&device, &config, active.clone()),
            cpal::SampleFormat::U8 => Self::run::<u8>(&device, &config, active.clone()),
            cpal::SampleFormat::U16 => Self::run::<u16>(&device, &config, active.clone()),
            cpal::SampleFormat::U32 => Self::run::<u32>(&device, &config, active.clone()),
            cpal::SampleFormat::U64 => Self::run::<u64>(&device, &config, active.clone()),
            cpal::SampleFormat::F32 => Self::run::<f32>(&device, &config, active.clone()),
            cpal::SampleFormat::F64 => Self::run::<f64>(&device, &config, active.clone()),
            sample_format => Err(SoundError::UnsupportedFormat(sample_format)),
        }?;

        Ok(Self {
            active,
            _stream: stream,
        })
    }

    pub fn set_active(&self, on: bool) {
        self.active.store(on, Ordering::Relaxed);
    }

    fn run<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        active: Arc<AtomicBool>,
    ) -> Result<cpal::Stream, SoundError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let sample_rate = config.sample_rate.0 as f32;
        let channels = config.channels as usize;

        let mut sample_clock = 0f32;
        let mut next_value = move || {
            if !active.load(Ordering::Relaxed) {
                return 0.0;
            }
            sample_clock = (sample_clock + 1.0) % sample_rate;
            (sample_clock * TONE_HZ * 2.0 * std::f32::consts::PI / sample_rate).sin()
        };

        let err_fn = |err: cpal::StreamError| warn!("an error occurred on stream: {err}");

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                write_data(data, channels, &mut next_value)
            },
            err_fn,
            None,
        )?;
        stream.play()?;
        Ok(stream)
    }
}

fn write_data<T>(output: &mut [T], channels: usize, next_sample: &mut dyn FnMut() -> f32)
where
    T: Sample + FromSample<f32>,
{
    for frame in output.chunks_mut(channels) {
        let value: T = T::from_sample(next_sample());
        for sample in frame.iter_mut() {
            *sample = value;
        }
    }
}
