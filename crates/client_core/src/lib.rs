//! Client-side core of the AirGuard dashboard: the AQI source, the shared
//! location store, the chat assistant and the eco-wallet.

pub mod advisory;
pub mod chat;
pub mod dispatcher;
pub mod error;
pub mod knowledge;
pub mod settings;
pub mod simulation;
pub mod source;
pub mod store;
pub mod wallet;

pub use advisory::ProfileStore;
pub use chat::ChatSession;
pub use dispatcher::{Dispatcher, Intent, Reply};
pub use error::{SourceError, WalletError};
pub use settings::ClientSettings;
pub use source::{AqiSource, HttpAqiSource};
pub use store::{DataOrigin, LoadStatus, LocationSnapshot, LocationStore, StoreCommand};
pub use wallet::EcoWallet;
