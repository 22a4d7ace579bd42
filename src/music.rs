//! Background music toggle.

use std::path::{Path, PathBuf};

use crate::error::{GreetingError, Result};

pub const MUSIC_VOLUME: f64 = 0.4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Track { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Whatever actually makes sound.
pub trait AudioOutput {
    /// `AudioUnavailable` means the track cannot be loaded at all;
    /// `PlaybackBlocked` means the platform refused to start it this time.
    fn play(&mut self, track: &Track, volume: f64) -> Result<()>;
    fn pause(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MusicState {
    Playing,
    Paused,
    /// No playable track; the toggle must be hidden.
    Unavailable,
}

#[derive(Debug)]
pub struct MusicControl {
    primary: Option<Track>,
    fallback: Option<Track>,
    current: Option<Track>,
    tried_fallback: bool,
    playing: bool,
    available: bool,
}

impl MusicControl {
    pub fn new(primary: Option<Track>, fallback: Option<Track>) -> Self {
        let available = primary.is_some() || fallback.is_some();
        MusicControl {
            current: primary.clone().or_else(|| fallback.clone()),
            tried_fallback: primary.is_none(),
            primary,
            fallback,
            playing: false,
            available,
        }
    }

    pub fn state(&self) -> MusicState {
        if !self.available {
            MusicState::Unavailable
        } else if self.playing {
            MusicState::Playing
        } else {
            MusicState::Paused
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn primary(&self) -> Option<&Track> {
        self.primary.as_ref()
    }

    /// Autoplay attempt when the greeting starts.
    pub fn start(&mut self, out: &mut dyn AudioOutput) -> MusicState {
        self.try_play(out)
    }

    /// Music toggle click.
    pub fn toggle(&mut self, out: &mut dyn AudioOutput) -> MusicState {
        if !self.available {
            return MusicState::Unavailable;
        }
        if self.playing {
            out.pause();
            self.playing = false;
            return MusicState::Paused;
        }
        self.try_play(out)
    }

    /// The output reported a load error after playback began.
    pub fn media_failed(&mut self, out: &mut dyn AudioOutput) -> MusicState {
        self.playing = false;
        if self.switch_to_fallback() {
            return self.try_play(out);
        }
        self.disable();
        MusicState::Unavailable
    }

    fn try_play(&mut self, out: &mut dyn AudioOutput) -> MusicState {
        loop {
            let Some(track) = self.current.clone() else {
                self.disable();
                return MusicState::Unavailable;
            };
            match out.play(&track, MUSIC_VOLUME) {
                Ok(()) => {
                    self.playing = true;
                    tracing::info!(track = %track.path.display(), "music playing");
                    return MusicState::Playing;
                }
                Err(GreetingError::PlaybackBlocked(reason)) => {
                    // Next click retries.
                    tracing::info!(%reason, "music playback prevented");
                    self.playing = false;
                    return MusicState::Paused;
                }
                Err(err) => {
                    tracing::warn!(%err, track = %track.path.display(), "music track failed");
                    if !self.switch_to_fallback() {
                        self.disable();
                        return MusicState::Unavailable;
                    }
                }
            }
        }
    }

    fn switch_to_fallback(&mut self) -> bool {
        if self.tried_fallback {
            return false;
        }
        self.tried_fallback = true;
        match &self.fallback {
            Some(fallback) => {
                tracing::info!("primary music failed, trying fallback");
                self.current = Some(fallback.clone());
                true
            }
            None => false,
        }
    }

    fn disable(&mut self) {
        if self.available {
            tracing::warn!("no playable music, disabling toggle");
        }
        self.available = false;
        self.playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeOutput {
        results: HashMap<PathBuf, fn() -> Result<()>>,
        played: Vec<PathBuf>,
        paused: usize,
    }

    impl FakeOutput {
        fn with(mut self, path: &str, result: fn() -> Result<()>) -> Self {
            self.results.insert(PathBuf::from(path), result);
            self
        }
    }

    impl AudioOutput for FakeOutput {
        fn play(&mut self, track: &Track, volume: f64) -> Result<()> {
            assert_eq!(volume, MUSIC_VOLUME);
            self.played.push(track.path.clone());
            match self.results.get(&track.path) {
                Some(result) => result(),
                None => Err(GreetingError::AudioUnavailable(track.path.display().to_string())),
            }
        }

        fn pause(&mut self) {
            self.paused += 1;
        }
    }

    fn ok() -> Result<()> {
        Ok(())
    }

    fn blocked() -> Result<()> {
        Err(GreetingError::PlaybackBlocked("autoplay".into()))
    }

    #[test]
    fn plays_primary_and_toggles() {
        let mut out = FakeOutput::default().with("song.mp3", ok);
        let mut music = MusicControl::new(Some(Track::new("song.mp3")), None);
        assert_eq!(music.start(&mut out), MusicState::Playing);
        assert_eq!(music.toggle(&mut out), MusicState::Paused);
        assert_eq!(out.paused, 1);
        assert_eq!(music.toggle(&mut out), MusicState::Playing);
    }

    #[test]
    fn falls_back_when_primary_missing() {
        let mut out = FakeOutput::default().with("fallback.mp3", ok);
        let mut music = MusicControl::new(
            Some(Track::new("missing.mp3")),
            Some(Track::new("fallback.mp3")),
        );
        assert_eq!(music.start(&mut out), MusicState::Playing);
        assert_eq!(music.current_track(), Some(&Track::new("fallback.mp3")));
    }

    #[test]
    fn disables_toggle_when_nothing_plays() {
        let mut out = FakeOutput::default();
        let mut music = MusicControl::new(
            Some(Track::new("missing.mp3")),
            Some(Track::new("also-missing.mp3")),
        );
        assert_eq!(music.start(&mut out), MusicState::Unavailable);
        let attempts = out.played.len();
        assert_eq!(music.toggle(&mut out), MusicState::Unavailable);
        assert_eq!(out.played.len(), attempts);
    }

    #[test]
    fn blocked_autoplay_retries_on_next_click() {
        let mut out = FakeOutput::default().with("song.mp3", blocked);
        let mut music = MusicControl::new(Some(Track::new("song.mp3")), None);
        assert_eq!(music.start(&mut out), MusicState::Paused);
        out.results.insert(PathBuf::from("song.mp3"), ok);
        assert_eq!(music.toggle(&mut out), MusicState::Playing);
    }

    #[test]
    fn late_media_error_uses_fallback_once() {
        let mut out = FakeOutput::default()
            .with("song.mp3", ok)
            .with("fallback.mp3", ok);
        let mut music = MusicControl::new(
            Some(Track::new("song.mp3")),
            Some(Track::new("fallback.mp3")),
        );
        music.start(&mut out);
        assert_eq!(music.media_failed(&mut out), MusicState::Playing);
        assert_eq!(music.media_failed(&mut out), MusicState::Unavailable);
    }

    #[test]
    fn no_tracks_configured_is_unavailable() {
        let music = MusicControl::new(None, None);
        assert_eq!(music.state(), MusicState::Unavailable);
    }
}
