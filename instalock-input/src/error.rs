use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to create uinput device: {0}")]
    DeviceCreation(#[from] std::io::Error),

    #[error("failed to emit input event: {0}")]
    EmitFailed(std::io::Error),

    #[error("pointer area {width}x{height} is empty")]
    EmptyArea { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
