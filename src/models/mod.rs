pub mod audit;
pub mod checkin;
pub mod conversation;
pub mod enums;
pub mod observation;
pub mod patient;
pub mod risk;
pub mod triage;

pub use audit::AuditEvent;
pub use checkin::CheckinScheduleEntry;
pub use conversation::{Conversation, Message, MessageMetadata};
pub use observation::Observation;
pub use patient::Patient;
pub use risk::RiskScore;
pub use triage::{RiskLevel, Triage};
