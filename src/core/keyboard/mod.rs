pub mod bindings;
pub mod layout;
pub mod router;

pub use bindings::{Binding, KeyBindings};
pub use layout::KeyboardLayout;
pub use router::{Effect, EventRouter};
