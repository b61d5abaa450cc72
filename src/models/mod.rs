mod movie;
mod session;

pub use movie::{MediaClient, Movie, Recommendation};
pub use session::{ChatMessage, ChatRole, Session};
