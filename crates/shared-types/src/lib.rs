pub mod error;
pub mod feature_flags;
pub mod models;

// Complaint domain modules
pub mod complaint;
pub mod deadline;
pub mod notification;
pub mod workflow;

pub use error::*;
pub use feature_flags::*;
pub use models::*;

pub use complaint::*;
pub use deadline::*;
pub use notification::*;
pub use workflow::*;
