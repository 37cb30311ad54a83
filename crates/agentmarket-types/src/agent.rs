//! Agent types and owner addresses

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{TypesError, TypesResult};

/// The fixed set of agent offerings.
///
/// Each variant selects one system-prompt template in the execution service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    /// Code review and software engineering analysis
    Code,
    /// Technical and on-page SEO audit
    Seo,
    /// Copywriting and content creation
    Content,
    /// Data analysis and statistics
    Data,
}

impl AgentType {
    /// Every agent type, in catalog order
    pub const ALL: [AgentType; 4] = [Self::Code, Self::Seo, Self::Content, Self::Data];

    /// Wire / storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Seo => "seo",
            Self::Content => "content",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = TypesError;

    fn from_str(s: &str) -> TypesResult<Self> {
        match s {
            "code" => Ok(Self::Code),
            "seo" => Ok(Self::Seo),
            "content" => Ok(Self::Content),
            "data" => Ok(Self::Data),
            other => Err(TypesError::InvalidAgentType(other.to_string())),
        }
    }
}

/// Normalise a wallet address for storage and lookup.
///
/// Owner and buyer addresses are always compared in lower case.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_type_parsing() {
        for agent_type in AgentType::ALL {
            assert_eq!(agent_type.as_str().parse::<AgentType>(), Ok(agent_type));
        }
        assert_eq!(
            "legal".parse::<AgentType>(),
            Err(TypesError::InvalidAgentType("legal".to_string()))
        );
        // Case matters on the wire
        assert!("Code".parse::<AgentType>().is_err());
    }

    #[test]
    fn test_agent_type_serde() {
        let json = serde_json::to_string(&AgentType::Seo).unwrap();
        assert_eq!(json, "\"seo\"");
        let parsed: AgentType = serde_json::from_str("\"data\"").unwrap();
        assert_eq!(parsed, AgentType::Data);
    }

    #[test]
    fn test_normalize_address() {
        assert_eq!(
            normalize_address("  0xAbCdEF0123456789abcdef0123456789ABCDEF01 "),
            "0xabcdef0123456789abcdef0123456789abcdef01"
        );
        assert_eq!(normalize_address("0xabc"), "0xabc");
    }
}
