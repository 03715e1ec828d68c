use thiserror::Error;

/// Runtime-checked failures.
///
/// Most misuse of the video hardware has no runtime signal at all (the wrong
/// pixels simply show up). These are the few entry points that can cheaply
/// reject bad input before it reaches memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("screen base block {0} is out of range (0-31)")]
    ScreenBlockOutOfRange(u8),

    #[error("tile resolves to screen block {block}, past the end of tile map memory")]
    TileMapOverflow { block: usize },

    #[error("{len} words of tile data do not fit from bank {bank}")]
    TileDataOverflow { bank: u8, len: usize },
}
