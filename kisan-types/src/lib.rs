pub mod disease;
pub mod enums;
pub mod forms;
pub mod models;

pub use disease::*;
pub use enums::*;
pub use forms::*;
pub use models::*;
