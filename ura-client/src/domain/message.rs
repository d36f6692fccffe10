//! Flex messages.

use serde::Serialize;

use super::Stop;

/// Priority the server assigns when a message is published without one.
pub const DEFAULT_PRIORITY: i32 = 3;

/// How a message should be presented on street displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageType {
    Normal,
    Special,
    /// Stop temporarily out of service; predictions should be hidden.
    FullMatrix,
    Other(i32),
}

impl MessageType {
    /// Map a wire code to a message type.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => MessageType::Normal,
            1 => MessageType::Special,
            2 => MessageType::FullMatrix,
            other => MessageType::Other(other),
        }
    }

    /// The wire code for this type.
    pub fn code(&self) -> i32 {
        match self {
            MessageType::Normal => 0,
            MessageType::Special => 1,
            MessageType::FullMatrix => 2,
            MessageType::Other(code) => *code,
        }
    }
}

/// A free-text message targeted at a stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// The stop the message is shown at.
    pub stop: Stop,

    /// Unique per message and stop (`MessageUUID`).
    pub uuid: String,

    /// Display type (`MessageType`).
    pub message_type: MessageType,

    /// Rank among messages at the same stop, 1 is highest (`MessagePriority`).
    pub priority: i32,

    /// Text for the public (`MessageText`).
    pub text: String,
}

impl Message {
    /// Returns true if the message suppresses predictions at its stop.
    pub fn hides_predictions(&self) -> bool {
        self.message_type == MessageType::FullMatrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_roundtrip() {
        for code in 0..=2 {
            assert_eq!(MessageType::from_code(code).code(), code);
        }
        assert_eq!(MessageType::from_code(5), MessageType::Other(5));
    }

    #[test]
    fn full_matrix_hides_predictions() {
        let stop = Stop {
            id: "100000".to_string(),
            name: "Bushof".to_string(),
            indicator: None,
            state: crate::domain::StopState::Open,
            latitude: 50.7775,
            longitude: 6.0894,
        };
        let mut message = Message {
            stop,
            uuid: "016e1231d4e30014_100000".to_string(),
            message_type: MessageType::FullMatrix,
            priority: DEFAULT_PRIORITY,
            text: "Stop closed".to_string(),
        };
        assert!(message.hides_predictions());

        message.message_type = MessageType::Normal;
        assert!(!message.hides_predictions());
    }
}
