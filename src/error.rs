use std::{io, path::PathBuf};

use crate::memory::{TypeAddr, MAX_ROM_SIZE};

/// Failures while placing a program image into memory.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unable to read rom {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("short read on {path}: expected {expected} bytes, got {actual}")]
    ShortRead {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("rom is too large ({size} bytes), max size is {} bytes", MAX_ROM_SIZE)]
    TooLarge { size: usize },
}

/// Faults raised while executing an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("call stack overflow: call to {target:#05x} from {pc:#05x}, stack is full")]
    StackOverflow { pc: TypeAddr, target: TypeAddr },
}

/// Audio output could not be brought up.
#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("unsupported sample format '{0}'")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error(transparent)]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error(transparent)]
    Build(#[from] cpal::BuildStreamError),

    #[error(transparent)]
    Play(#[from] cpal::PlayStreamError),
}
