//! Resources that bridge the simulation with the background audio thread.
//!
//! Use [`setup_audio`] once during initialization to spawn the audio thread
//! and insert the [`SoundBridge`] and [`AudioThread`] resources. Call
//! [`shutdown_audio`] during teardown to stop the thread.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::warn;

use crate::events::audio::{SoundCmd, SoundMessage};
use crate::resources::services::SoundService;
use crate::systems::audio::audio_thread;

/// Sending side of the audio channel.
///
/// Cheap to clone: the grid manager keeps one copy as its
/// [`SoundService`] and the `Sound2D` event handler uses the world resource.
#[derive(Resource, Clone, Debug)]
pub struct SoundBridge {
    tx_cmd: Sender<SoundCmd>,
}

impl SoundBridge {
    /// Create a bridge and the receiver the audio backend reads from.
    pub fn channel() -> (Self, Receiver<SoundCmd>) {
        let (tx_cmd, rx_cmd) = unbounded();
        (Self { tx_cmd }, rx_cmd)
    }

    pub fn send(&self, cmd: SoundCmd) {
        // The backend may already be gone during shutdown.
        if self.tx_cmd.send(cmd).is_err() {
            warn!(target: "audio", "audio thread is not listening");
        }
    }
}

impl SoundService for SoundBridge {
    fn play_cue(&mut self, name: &str) {
        self.send(SoundCmd::PlayCue { id: name.to_string() });
    }

    fn pause_cue(&mut self, name: &str) {
        self.send(SoundCmd::PauseCue { id: name.to_string() });
    }

    fn stop_cue(&mut self, name: &str) {
        self.send(SoundCmd::StopCue { id: name.to_string() });
    }
}

/// Handle of the running audio thread.
#[derive(Resource)]
pub struct AudioThread {
    /// Receiver for [`SoundMessage`]s (audio thread -> simulation).
    pub rx_msg: Receiver<SoundMessage>,
    pub handle: std::thread::JoinHandle<()>,
}

/// Spawn the audio thread and register the bridge resources.
///
/// Returns a clone of the bridge for collaborators that hold their own copy.
pub fn setup_audio(world: &mut World) -> SoundBridge {
    let (bridge, rx_cmd) = SoundBridge::channel();
    let (tx_msg, rx_msg) = unbounded::<SoundMessage>();

    let handle = std::thread::spawn(move || audio_thread(rx_cmd, tx_msg));

    world.insert_resource(bridge.clone());
    world.insert_resource(AudioThread { rx_msg, handle });
    bridge
}

/// Gracefully request shutdown of the audio thread and join it.
pub fn shutdown_audio(world: &mut World) {
    if let Some(bridge) = world.get_resource::<SoundBridge>() {
        bridge.send(SoundCmd::Shutdown);
    }
    if let Some(thread) = world.remove_resource::<AudioThread>() {
        let _ = thread.handle.join();
    }
}
