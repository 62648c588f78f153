mod input_message;
mod request;
mod response;
mod response_content;
mod sse;
mod tool;

pub use input_message::*;
pub use request::*;
pub use response::*;
pub use response_content::*;
pub use sse::*;
pub use tool::*;
