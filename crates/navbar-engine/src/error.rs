use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the navbar engine.
#[derive(Debug, Error)]
pub enum Error {
    /// An open-popup action was requested on an item without popup entries.
    #[error("no popup items found for route {route}")]
    NoPopupItems {
        /// Index of the route.
        route: usize,
    },

    /// Building the template context or running custom action code failed.
    #[error("template error: {0}")]
    Template(#[from] template::TemplateError),

    /// The host event channel has been closed by the receiver.
    #[error("host channel closed")]
    ChannelClosed,

    /// A gesture referenced a route or popup item that no longer exists.
    #[error("unknown item: {0}")]
    UnknownItem(String),
}
