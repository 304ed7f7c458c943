pub mod bot;
pub mod market;
pub mod news;
pub mod response;

pub use bot::*;
pub use market::*;
pub use news::*;
pub use response::*;
