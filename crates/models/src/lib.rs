pub mod alerts;
pub mod authorizations;
pub mod devices;
pub mod farms;
mod id;
pub mod users;

pub use alerts::{AlertSeverity, AlertStatus};
pub use devices::DeviceStatus;
pub use id::Id;
pub use users::Role;
