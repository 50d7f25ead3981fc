//! Audio file decoding.
//!
//! Decodes a compressed or PCM audio file to mono f32 samples. The pipeline
//! runs this under `spawn_blocking`; nothing here is async.

use std::path::Path;
use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("failed to open audio file: {0}")]
    Open(#[from] std::io::Error),

    #[error("unreadable or corrupt audio: {0}")]
    Decode(String),

    #[error("no decodable audio track in file")]
    NoTrack,

    #[error("sample rate missing from stream")]
    UnknownSampleRate,
}

pub type Result<T> = std::result::Result<T, AudioError>;

/// Decoded waveform, mono, normalized to [-1.0, 1.0].
#[derive(Clone, Debug, Default)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// Decode an audio file to mono f32 samples plus its sample rate.
pub fn decode_audio(path: &Path) -> Result<AudioData> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoTrack)?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(AudioError::UnknownSampleRate)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(AudioError::Decode(err.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let capacity = decoded.capacity() as u64;
        let buf = sample_buf.get_or_insert_with(|| SampleBuffer::new(capacity, spec));
        buf.copy_interleaved_ref(decoded);

        for frame in buf.samples().chunks_exact(channels) {
            samples.push(frame.iter().sum::<f32>() / channels as f32);
        }
    }

    Ok(AudioData {
        samples,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_open_error() {
        let err = decode_audio(Path::new("/nonexistent/clip.wav")).unwrap_err();
        assert!(matches!(err, AudioError::Open(_)));
    }

    #[test]
    fn garbage_bytes_report_decode_error() {
        let path = std::env::temp_dir().join("speakeval-garbage-audio.wav");
        std::fs::write(&path, b"definitely not audio").expect("write temp file");
        let err = decode_audio(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, AudioError::Decode(_)));
    }

    #[test]
    fn duration_of_empty_audio_is_zero() {
        assert_eq!(AudioData::default().duration(), Duration::ZERO);
        let data = AudioData {
            samples: vec![0.0; 16_000],
            sample_rate: 16_000,
        };
        assert_eq!(data.duration(), Duration::from_secs(1));
    }
}
