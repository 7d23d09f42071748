//! Text message encoding for the quiniela protocol.
//!
//! Maps bets and control messages to frame payloads and decodes server
//! responses. Every payload is a run of `KEY=value` pairs:
//!
//! | Message | Payload |
//! |---|---|
//! | Bet | `AGENCY=..,FIRST_NAME=..,LAST_NAME=..,DOCUMENT=..,BIRTHDATE=..,NUMBER=..` |
//! | Batch | `BETS=<n>;<bet>;<bet>...` (`BETS=0` when empty) |
//! | No more bets | `END,AGENCY=<id>` |
//! | Winners query | `WINNERS,AGENCY=<id>` |
//! | Response | `RESULT=<code>,MESSAGE=<text>` |
//!
//! # Design Principles
//!
//! - **No escaping** - Field values must not contain `,`, `;` or newlines.
//! - **Lenient decoding** - Malformed responses degrade to empty fields.
//! - **No framing** - The delimiter is appended by the `frame` crate.
//!
//! # Example
//!
//! ```
//! use message::{ControlMessage, Encode, ServerResponse};
//!
//! let query = ControlMessage::get_winners("1").unwrap();
//! assert_eq!(query.encode(), "WINNERS,AGENCY=1");
//!
//! let reply = ServerResponse::decode("RESULT=success,MESSAGE=2");
//! assert!(reply.is_success());
//! ```

mod bet;
mod control;
mod encode;
mod error;
mod limits;
mod response;

pub use bet::{BetBatch, BetRecord};
pub use control::ControlMessage;
pub use encode::{keys, Encode, FORBIDDEN_CHARACTERS};
pub use error::{MessageError, MessageResult};
pub use limits::{BatchLimits, PROTOCOL_MAX_BATCH_SIZE};
pub use response::{ServerResponse, SUCCESS_RESULT};
