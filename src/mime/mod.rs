/// Content-Type / Content-Disposition representation
pub mod r#type;

pub use r#type::{resolve, MediaType};
