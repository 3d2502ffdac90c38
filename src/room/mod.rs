//! Room coordinator.
//!
//! Every live match is owned by one actor task that processes its events
//! strictly in order and pushes per-recipient views to the connected
//! sessions. The registry maps match ids to the actors' command channels.

mod actor;
mod events;
mod registry;

pub use actor::SessionId;
pub use events::{ClientEvent, ServerEvent};
pub use registry::{RoomHandle, RoomRegistry, RoomSettings};
