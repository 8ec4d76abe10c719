pub mod app;
pub mod cli;
pub mod constants;
pub mod runtime;
pub mod session;
pub mod transport;
pub mod utils;

pub use app::{load_config, Config};
pub use session::{ChatResult, ChatSettings, ConversationSessionManager, Message, SendError};
pub use transport::{ChatModule, ChatTransport, HttpTransport, TransportError};
pub use utils::NativeAiError;
