pub mod focus;
pub mod registry;
pub mod scheduler;

pub use focus::FocusRing;
pub use registry::ElementRegistry;
pub use scheduler::{Scheduler, TaskHandle};
