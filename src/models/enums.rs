use crate::store::StoreError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StoreError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(PatientStatus {
    Active => "active",
    Paused => "paused",
    Completed => "completed",
});

str_enum!(ConversationStatus {
    Active => "active",
    Resolved => "resolved",
    Escalated => "escalated",
});

str_enum!(MessageDirection {
    Inbound => "inbound",
    Outbound => "outbound",
});

str_enum!(MessageType {
    DailyCheckin => "daily_checkin",
    CheckinResponse => "checkin_response",
    AutoReply => "auto_reply",
    StaffReply => "staff_reply",
    Followup => "followup",
    Escalation => "escalation",
});

str_enum!(Actor {
    System => "system",
    Staff => "staff",
});
