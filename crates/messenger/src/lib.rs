//! # Messenger
//!
//! Bot API clients implementing the [`Messenger`](contracts::Messenger)
//! contract: the real Telegram client and a scriptable mock for tests.

mod mock;
mod telegram;

pub use contracts::{ChannelId, Messenger, SendError, SendOptions};
pub use mock::{MockMessenger, SentMessage};
pub use telegram::TelegramClient;
