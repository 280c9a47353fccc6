//! Audible cues. Two generated tones (urgent is higher and longer) with a
//! terminal-bell fallback when no audio device is usable.

use std::time::Duration;

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, Sink};

use guardian_core::alert::SinkError;

const URGENT_TONE_HZ: f32 = 880.0;
const URGENT_TONE_MS: u64 = 600;
const NORMAL_TONE_HZ: f32 = 523.0;
const NORMAL_TONE_MS: u64 = 300;
const TONE_AMPLITUDE: f32 = 0.25;

/// Play the cue for an alert. Falls back to the terminal bell when tone
/// generation fails; only a failure of both paths is reported.
pub fn play(urgent: bool) -> Result<(), SinkError> {
    match play_tone(urgent) {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(error = %e, "tone playback failed, falling back to terminal bell");
            bell()
        }
    }
}

fn play_tone(urgent: bool) -> anyhow::Result<()> {
    let (freq, millis) = if urgent {
        (URGENT_TONE_HZ, URGENT_TONE_MS)
    } else {
        (NORMAL_TONE_HZ, NORMAL_TONE_MS)
    };

    let (_stream, handle) = OutputStream::try_default()?;
    let sink = Sink::try_new(&handle)?;
    sink.append(
        SineWave::new(freq)
            .take_duration(Duration::from_millis(millis))
            .amplify(TONE_AMPLITUDE),
    );
    // Keep the stream alive until the tone finishes.
    sink.sleep_until_end();
    Ok(())
}

fn bell() -> Result<(), SinkError> {
    use std::io::Write;
    let mut out = std::io::stdout();
    out.write_all(b"\x07")
        .and_then(|_| out.flush())
        .map_err(|e| SinkError::Sound(e.to_string()))
}
