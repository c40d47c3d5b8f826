pub mod chat;
pub mod farm;
pub mod region;
pub mod request;
pub mod response;
pub mod weather;

pub use chat::*;
pub use farm::*;
pub use region::*;
pub use request::*;
pub use response::*;
pub use weather::*;
