//! Panel components - the floating output window and focus save/restore

mod memento;
mod panel;

pub use memento::{FocusMemento, restore_focus};
pub use panel::Panel;
