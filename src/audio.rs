//! Audio playback for the session completion chime.

use log::warn;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("Failed to play audio: {0}")]
    Play(#[from] rodio::PlayError),
}

pub struct AudioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioPlayer {
    /// Creates a new audio player.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Plays the completion chime.
    pub fn play_chime(&self) {
        if let Err(e) = self.play_generated_tone() {
            warn!("failed to play chime: {}", e);
        }
    }

    /// Synthesizes a rising two-tone chime on a detached sink.
    fn play_generated_tone(&self) -> Result<(), AudioError> {
        use rodio::source::{SineWave, Source};
        use std::time::Duration;

        let sink = Sink::try_new(&self.handle)?;

        // E5 for 150ms, short gap, then A5 for 250ms
        let tone1 = SineWave::new(659.25)
            .take_duration(Duration::from_millis(150))
            .amplify(0.25);

        let silence =
            rodio::source::Zero::<f32>::new(1, 44100).take_duration(Duration::from_millis(60));

        let tone2 = SineWave::new(880.0)
            .take_duration(Duration::from_millis(250))
            .amplify(0.25);

        sink.append(tone1);
        sink.append(silence);
        sink.append(tone2);
        sink.detach(); // Play in background

        Ok(())
    }
}
