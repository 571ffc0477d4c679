use std::fmt;
use std::io;

/// Everything that can go wrong decoding or encoding a `.TGR` file.
#[derive(Debug)]
pub enum TgrError {
    /// The first four bytes of the stream were not `FORM`.
    NotIff,
    /// A chunk type tag was not four printable ASCII bytes.
    InvalidChunkType,
    /// A chunk's declared length ran past the end of the available data.
    Truncated,
    /// The `FORM`'s type tag was not `TGAR`.
    InvalidFormType,
    /// `bits_per_px` was something other than 8 or 16.
    UnsupportedBitDepth(u8),
    /// No colour is registered for the requested `(player, shade)` pair.
    UnknownPlayerColor { player: u8, shade: u8 },
    /// A run length, pixel count, offset or body size overflowed its on-disk field width.
    EncodeOverflow(&'static str),
    /// A caller-supplied raster's dimensions didn't match the frame metadata it was paired with.
    FrameSizeMismatch { expected: (u16, u16), got: (u16, u16) },
    /// A caller violated this crate's API contract (wrong buffer length, wrong accessor for the
    /// colour mode, etc) rather than the data itself being malformed.
    InvalidArgument(&'static str),
    /// An underlying I/O operation failed.
    Io(io::Error),
}

impl fmt::Display for TgrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TgrError::NotIff => write!(f, "not an IFF file (missing FORM magic)"),
            TgrError::InvalidChunkType => write!(f, "chunk type is not four ASCII bytes"),
            TgrError::Truncated => write!(f, "chunk payload runs past the end of the data"),
            TgrError::InvalidFormType => write!(f, "FORM type is not TGAR"),
            TgrError::UnsupportedBitDepth(bits) => {
                write!(f, "unsupported bits_per_px: {bits} (expected 8 or 16)")
            }
            TgrError::UnknownPlayerColor { player, shade } => {
                write!(f, "no color registered for player {player} shade {shade}")
            }
            TgrError::EncodeOverflow(what) => write!(f, "encode overflow: {what}"),
            TgrError::FrameSizeMismatch { expected, got } => write!(
                f,
                "frame size mismatch: expected {:?}, got {:?}",
                expected, got
            ),
            TgrError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            TgrError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for TgrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TgrError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TgrError {
    fn from(err: io::Error) -> TgrError {
        TgrError::Io(err)
    }
}

/// Raise an [`TgrError::InvalidArgument`] as a `Result`, for caller-contract violations that
/// are distinct from malformed on-disk data.
pub(crate) fn user_error<T>(msg: &'static str) -> Result<T, TgrError> {
    Err(TgrError::InvalidArgument(msg))
}

pub type Result<T> = std::result::Result<T, TgrError>;
