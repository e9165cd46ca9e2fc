use serde::{Deserialize, Serialize};

use crate::task::TaskOutput;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    #[serde(alias = "buy", alias = "BUY")]
    Buy,
    #[serde(alias = "sell", alias = "SELL")]
    Sell,
    #[serde(alias = "hold", alias = "HOLD")]
    Hold,
}

/// The advisory shape of a pipeline's terminal payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub ticker: String,
    pub action: Action,
    pub explanation: String,
    #[serde(default)]
    pub references: Vec<String>,
}

impl Recommendation {
    /// Read a terminal output as a recommendation. Returns `None` when the
    /// payload is free text or does not match the expected shape.
    pub fn from_output(output: &TaskOutput) -> Option<Self> {
        output
            .as_json()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_structured_recommendation() {
        let output = TaskOutput::Structured(serde_json::json!({
            "ticker": "AAPL",
            "action": "buy",
            "explanation": "Uptrend with positive coverage",
            "references": ["https://example.com/a"]
        }));

        let rec = Recommendation::from_output(&output).unwrap();
        assert_eq!(rec.action, Action::Buy);
        assert_eq!(rec.references.len(), 1);
    }

    #[test]
    fn missing_references_default_to_empty() {
        let output = TaskOutput::Structured(serde_json::json!({
            "ticker": "MSFT",
            "action": "Hold",
            "explanation": "Mixed signals"
        }));
        let rec = Recommendation::from_output(&output).unwrap();
        assert!(rec.references.is_empty());
    }

    #[test]
    fn free_text_is_not_a_recommendation() {
        let output = TaskOutput::Text("Buy it".to_string());
        assert!(Recommendation::from_output(&output).is_none());
    }

    #[test]
    fn unknown_action_is_rejected() {
        let output = TaskOutput::Structured(serde_json::json!({
            "ticker": "AAPL",
            "action": "Short",
            "explanation": "x"
        }));
        assert!(Recommendation::from_output(&output).is_none());
    }
}
