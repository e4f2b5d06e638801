pub mod applications;
pub mod chats;
pub mod jobs;
pub mod negotiation_sessions;
pub mod offers;
pub mod users;
