/// Commands sent *to* the audio thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundCmd {
    PlayCue { id: String },
    PauseCue { id: String },
    StopCue { id: String },
    Shutdown,
}

/// Messages sent *back* from the audio thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundMessage {
    CueStarted { id: String },
    CueResumed { id: String },
    CuePaused { id: String },
    CueStopped { id: String },
}
