//! Shared validation rules

use std::borrow::Cow;

use agentmarket_types::{parse_amount, AgentType, TransactionStatus};
use validator::ValidationError;

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// One of `code`, `seo`, `content`, `data`
pub fn validate_agent_type(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<AgentType>()
        .map(|_| ())
        .map_err(|_| rule("agent_type", "must be one of: code, seo, content, data"))
}

/// Non-negative decimal string
pub fn validate_amount(value: &str) -> Result<(), ValidationError> {
    parse_amount(value)
        .map(|_| ())
        .map_err(|_| rule("amount", "must be a non-negative decimal number"))
}

/// One of `pending`, `completed`, `failed`
pub fn validate_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<TransactionStatus>()
        .map(|_| ())
        .map_err(|_| rule("status", "must be one of: pending, completed, failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules() {
        assert!(validate_agent_type("seo").is_ok());
        assert!(validate_agent_type("SEO").is_err());
        assert!(validate_amount("0.01").is_ok());
        assert!(validate_amount("-1").is_err());
        assert!(validate_amount("ten").is_err());
        assert!(validate_status("failed").is_ok());
        assert!(validate_status("refunded").is_err());
    }
}
