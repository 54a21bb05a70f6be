//! Configuration types for the navbar widget: routes, popup items, actions,
//! haptics and layout, plus loading and validation.
#![allow(missing_docs)]

mod action;
pub mod defaults;
mod error;
mod loader;
mod merge;
mod types;
mod validate;

#[cfg(test)]
mod test_merge;
#[cfg(test)]
mod test_parse;

pub use action::{ActionDescriptor, CustomAction, QuickbarMode};
pub use error::{Error, excerpt_at};
pub use loader::{from_value, load_from_path, load_from_str, load_with_templates};
pub use merge::deep_merge_keep_arrays;
pub use types::{
    BadgeConfig, DesktopConfig, DesktopPosition, DisplayMode, HapticActions, HapticConfig,
    ItemBase, LabelMode, LabelVisibility, MediaPlayerConfig, MobileConfig, NavbarConfig,
    PopupItem, RouteItem, WidgetPosition,
};
