use std::sync::mpsc::{self, TryRecvError};

use super::types::ExportState;
use super::WaveformPlayer;
use crate::export::export_video;
use crate::player::STATUS_EXPORTING;

impl WaveformPlayer {
    pub(super) fn is_exporting(&self) -> bool {
        self.export_state.is_some()
    }

    pub(super) fn spawn_export_video(&mut self) {
        if self.is_exporting() {
            return;
        }
        let Some(audio_path) = self.state.track.as_ref().map(|t| t.path.clone()) else {
            return;
        };
        let Some(out_path) = self.pick_export_dialog(&audio_path) else {
            return;
        };
        let Some(job) = self.state.export_job(&out_path) else {
            return;
        };
        self.state.status = STATUS_EXPORTING.to_string();
        tracing::info!(out = %out_path.display(), "export started");
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(export_video(&job));
        });
        self.export_state = Some(ExportState { out_path, rx });
    }

    pub(super) fn drain_export_result(&mut self) {
        let Some(state) = &self.export_state else {
            return;
        };
        let out_path = state.out_path.clone();
        match state.rx.try_recv() {
            Ok(Ok(summary)) => {
                self.state.status = format!("Exported: {}", summary.out_path.display());
            }
            Ok(Err(e)) => {
                tracing::error!(out = %out_path.display(), "export failed: {e}");
                self.state.status = format!("Export failed: {e}");
            }
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                tracing::error!(out = %out_path.display(), "export worker exited without a result");
                self.state.status = "Export failed: worker stopped".to_string();
            }
        }
        self.export_state = None;
    }
}
