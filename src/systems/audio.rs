//! Audio backend thread and the `Sound2D` event handler.
//!
//! - [`sound_event_handler`] turns `Sound2D` events (`OnPlay`, `OnPause`,
//!   `OnResume`, `OnStop` with the cue name as first parameter) into
//!   [`SoundCmd`]s sent through the [`SoundBridge`].
//! - [`audio_thread`] runs on its own OS thread, applies commands to a
//!   [`CueBoard`] and emits [`SoundMessage`]s for every real state change.
//!
//! Mixing and decoding are not part of this crate; the board only tracks which
//! cues are playing or paused so that repeated requests are harmless.

use bevy_ecs::prelude::World;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::events::audio::{SoundCmd, SoundMessage};
use crate::events::gameevent::{EventAction, GameEvent};
use crate::resources::audio::SoundBridge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueState {
    Playing,
    Paused,
}

/// Playback state of every cue the backend has seen.
#[derive(Debug, Default)]
pub struct CueBoard {
    cues: FxHashMap<String, CueState>,
}

impl CueBoard {
    pub fn state(&self, id: &str) -> Option<CueState> {
        self.cues.get(id).copied()
    }

    /// Apply one command. Returns the resulting message, or `None` when the
    /// cue was already in the requested state.
    pub fn apply(&mut self, cmd: SoundCmd) -> Option<SoundMessage> {
        match cmd {
            SoundCmd::PlayCue { id } => match self.cues.get(&id).copied() {
                Some(CueState::Playing) => None,
                Some(CueState::Paused) => {
                    self.cues.insert(id.clone(), CueState::Playing);
                    Some(SoundMessage::CueResumed { id })
                }
                None => {
                    self.cues.insert(id.clone(), CueState::Playing);
                    Some(SoundMessage::CueStarted { id })
                }
            },
            SoundCmd::PauseCue { id } => match self.cues.get(&id).copied() {
                Some(CueState::Playing) => {
                    self.cues.insert(id.clone(), CueState::Paused);
                    Some(SoundMessage::CuePaused { id })
                }
                _ => None,
            },
            SoundCmd::StopCue { id } => self
                .cues
                .remove(&id)
                .map(|_| SoundMessage::CueStopped { id }),
            SoundCmd::Shutdown => None,
        }
    }
}

/// Entry point of the audio thread.
///
/// Blocks on the command channel until [`SoundCmd::Shutdown`] arrives or every
/// sender is dropped.
pub fn audio_thread(rx_cmd: Receiver<SoundCmd>, tx_msg: Sender<SoundMessage>) {
    info!(target: "audio", "thread starting (id={:?})", std::thread::current().id());

    let mut board = CueBoard::default();
    for cmd in rx_cmd.iter() {
        if cmd == SoundCmd::Shutdown {
            info!(target: "audio", "shutdown requested");
            break;
        }
        debug!(target: "audio", "{:?}", cmd);
        if let Some(msg) = board.apply(cmd) {
            // Nobody listening is fine; messages are informational.
            let _ = tx_msg.send(msg);
        }
    }

    info!(target: "audio", "thread exiting (id={:?})", std::thread::current().id());
}

/// `Sound2D` handler forwarding cue requests to the audio thread.
pub fn sound_event_handler(event: &GameEvent, world: &mut World) {
    let Some(cue) = event.text() else {
        warn!(target: "audio", "sound event without cue name: {}", event);
        return;
    };
    let Some(bridge) = world.get_resource::<SoundBridge>() else {
        warn!(target: "audio", "SoundBridge missing, dropping {}", event);
        return;
    };
    let id = cue.to_string();
    match event.action {
        EventAction::OnPlay | EventAction::OnResume => bridge.send(SoundCmd::PlayCue { id }),
        EventAction::OnPause => bridge.send(SoundCmd::PauseCue { id }),
        EventAction::OnStop => bridge.send(SoundCmd::StopCue { id }),
        _ => debug!(target: "audio", "ignoring {}", event),
    }
}
