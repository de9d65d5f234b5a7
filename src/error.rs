use std::fmt;

use thiserror::Error;

use crate::gate::{message::StatusMessage, status::OperatingStatus};

/// Raised while building a gate. All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("minute of day out of range: {0} (expected 0..1440)")]
    MinuteOutOfRange(u32),
    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("night window start and end are equal ({0}); wrap direction is ambiguous")]
    EmptyNightWindow(String),
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("could not deserialize config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error("store hours gate has not been initialized")]
    NotInitialized,
    #[error("{}", closed_prompt(.operation, .message))]
    Closed {
        operation: GatedOperation,
        status: OperatingStatus,
        message: StatusMessage,
    },
}

/// State-changing operations that must pass the store hours gate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GatedOperation {
    AddToCart,
    Checkout,
}

impl GatedOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatedOperation::AddToCart => "add_to_cart",
            GatedOperation::Checkout => "checkout",
        }
    }
}

impl fmt::Display for GatedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prompt shown when an operation is refused. Adding to the cart gets a generic
/// heading, checkout gets the status title.
fn closed_prompt(operation: &GatedOperation, message: &StatusMessage) -> String {
    match operation {
        GatedOperation::AddToCart => {
            format!("🔒 Operação não permitida\n\n{}", message.description)
        }
        GatedOperation::Checkout => format!("🔒 {}\n\n{}", message.title, message.description),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::message::status_message;

    fn closed(operation: GatedOperation) -> GateError {
        let status = OperatingStatus::NightClosed;
        GateError::Closed {
            operation,
            status,
            message: status_message(status),
        }
    }

    #[test]
    fn add_to_cart_and_checkout_get_different_prompts() {
        let message = status_message(OperatingStatus::NightClosed);
        assert_eq!(
            closed(GatedOperation::AddToCart).to_string(),
            format!("🔒 Operação não permitida\n\n{}", message.description)
        );
        assert_eq!(
            closed(GatedOperation::Checkout).to_string(),
            format!("🔒 {}\n\n{}", message.title, message.description)
        );
    }
}
