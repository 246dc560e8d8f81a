use std::path::Path;

use super::WaveformPlayer;
use crate::player::LoadedTrack;

impl WaveformPlayer {
    /// Hand `track` to the engine and show it from position 0.
    pub(super) fn install_track(&mut self, track: LoadedTrack) {
        self.audio.set_samples(&track.samples, track.sample_rate);
        self.state.set_track(track);
        self.slider_ms = 0;
        self.last_pos_ms = Some(0);
    }

    pub(super) fn load_audio_path(&mut self, path: &Path) {
        if self.state.load_audio_file(path).is_err() {
            return;
        }
        if let Some(track) = self.state.track.as_ref() {
            self.audio.set_samples(&track.samples, track.sample_rate);
        }
        self.slider_ms = 0;
        self.last_pos_ms = Some(0);
    }

    pub(super) fn open_audio_dialog(&mut self) {
        if let Some(path) = self.pick_audio_dialog() {
            self.load_audio_path(&path);
        }
    }

    pub(super) fn toggle_playback(&mut self) {
        if self.state.track.is_some() {
            self.audio.toggle_play();
        }
    }

    pub(super) fn seek_to(&mut self, ms: u64) {
        self.audio.seek_ms(ms);
        self.sync_position();
    }

    /// Follow the engine position. The slider is written here, never read back into a seek.
    pub(super) fn sync_position(&mut self) {
        if self.state.track.is_none() {
            return;
        }
        let pos = self.audio.position_ms();
        if self.last_pos_ms == Some(pos) {
            return;
        }
        self.last_pos_ms = Some(pos);
        self.slider_ms = pos;
        self.state.update_plot(pos);
    }
}
