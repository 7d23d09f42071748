//! Newline-delimited framing for the quiniela client.
//!
//! This crate turns an ordered, reliable byte stream into a message-oriented
//! channel: one frame is a payload followed by a single `\n`. It knows nothing
//! about bets or control messages, only where one frame ends and the next
//! begins.
//!
//! # Design Principles
//!
//! - **Exact framing** - Short reads and short writes are absorbed; a
//!   delimiter split across reads is still found exactly once.
//! - **Bounded reads** - Buffered bytes are checked against [`FrameLimits`].
//! - **No domain knowledge** - Payload encoding belongs to the `message` crate.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use frame::FrameCodec;
//!
//! let mut codec = FrameCodec::new(Cursor::new(b"RESULT=success,MESSAGE=4\n".to_vec()));
//! assert_eq!(codec.receive().unwrap(), "RESULT=success,MESSAGE=4");
//! ```

mod codec;
mod error;
mod limits;

pub use codec::{FrameCodec, DELIMITER};
pub use error::{FrameError, FrameResult};
pub use limits::FrameLimits;
