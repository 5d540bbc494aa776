//! Catalogue of available strategies and their parameter schemas.
//!
//! The registry is the single place where a string id plus raw parameters
//! become a typed [`StrategyConfig`].

use serde::Serialize;

use super::{
    BuyAndHoldConfig, DcaConfig, MaCrossoverConfig, StrategyConfig, StrategyId, StrategyParams,
};
use crate::domain::error::StrategyLabError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Integer,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub default_value: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInfo {
    pub id: StrategyId,
    pub display_name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterDescriptor>,
}

type ConfigFactory = fn(&StrategyParams) -> Result<StrategyConfig, StrategyLabError>;

struct Entry {
    info: StrategyInfo,
    factory: ConfigFactory,
}

/// Strategies in registration order.
#[derive(Default)]
pub struct StrategyRegistry {
    entries: Vec<Entry>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering an id twice replaces the earlier entry in place.
    pub fn register(&mut self, info: StrategyInfo, factory: ConfigFactory) {
        match self.entries.iter_mut().find(|e| e.info.id == info.id) {
            Some(existing) => *existing = Entry { info, factory },
            None => self.entries.push(Entry { info, factory }),
        }
    }

    /// Buy & Hold, DCA and MA Crossover.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(
            StrategyInfo {
                id: StrategyId::BuyAndHold,
                display_name: "Buy & Hold",
                description: "Invest all initial capital at the start date and hold until end. \
                              No additional contributions.",
                parameters: Vec::new(),
            },
            |_| Ok(StrategyConfig::BuyAndHold(BuyAndHoldConfig)),
        );
        registry.register(
            StrategyInfo {
                id: StrategyId::Dca,
                display_name: "Dollar Cost Averaging (DCA)",
                description: "Buy a fixed dollar amount every N trading days. No selling. \
                              Fractional shares allowed.",
                parameters: vec![
                    ParameterDescriptor {
                        name: "contributionAmount",
                        description: "Dollar amount to invest each period",
                        param_type: ParameterType::Number,
                        default_value: "500",
                    },
                    ParameterDescriptor {
                        name: "frequencyDays",
                        description: "Trading days between contributions (5=weekly, 21=monthly)",
                        param_type: ParameterType::Integer,
                        default_value: "21",
                    },
                ],
            },
            |params| DcaConfig::from_params(params).map(StrategyConfig::Dca),
        );
        registry.register(
            StrategyInfo {
                id: StrategyId::MaCrossover,
                display_name: "Moving Average Crossover",
                description: "Fully invested when short SMA > long SMA; fully in cash otherwise. \
                              Trades only on signal changes.",
                parameters: vec![
                    ParameterDescriptor {
                        name: "shortWindow",
                        description: "Short SMA window (trading days)",
                        param_type: ParameterType::Integer,
                        default_value: "20",
                    },
                    ParameterDescriptor {
                        name: "longWindow",
                        description: "Long SMA window (trading days)",
                        param_type: ParameterType::Integer,
                        default_value: "50",
                    },
                ],
            },
            |params| MaCrossoverConfig::from_params(params).map(StrategyConfig::MaCrossover),
        );
        registry
    }

    pub fn strategies(&self) -> Vec<&StrategyInfo> {
        self.entries.iter().map(|e| &e.info).collect()
    }

    pub fn info(&self, id: StrategyId) -> Option<&StrategyInfo> {
        self.entries.iter().map(|e| &e.info).find(|i| i.id == id)
    }

    /// Parses `id` and validates `params` into a typed config.
    ///
    /// Unrecognised ids (or ids not registered here) yield
    /// [`StrategyLabError::UnknownStrategy`]; bad parameters yield
    /// [`StrategyLabError::Validation`].
    pub fn resolve(
        &self,
        id: &str,
        params: &StrategyParams,
    ) -> Result<StrategyConfig, StrategyLabError> {
        let unknown = || StrategyLabError::UnknownStrategy { id: id.to_string() };
        let parsed: StrategyId = id.parse().map_err(|_| unknown())?;
        let entry = self
            .entries
            .iter()
            .find(|e| e.info.id == parsed)
            .ok_or_else(unknown)?;
        (entry.factory)(params)
    }

    /// Parameters with every missing key filled from its descriptor default.
    pub fn with_defaults(&self, id: StrategyId, params: &StrategyParams) -> StrategyParams {
        let mut merged = params.clone();
        if let Some(info) = self.info(id) {
            for p in &info.parameters {
                merged
                    .entry(p.name.to_string())
                    .or_insert_with(|| p.default_value.to_string());
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params(pairs: &[(&str, &str)]) -> StrategyParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn standard_lists_three_strategies_in_order() {
        let registry = StrategyRegistry::standard();
        let ids: Vec<StrategyId> = registry.strategies().iter().map(|i| i.id).collect();
        assert_eq!(
            ids,
            vec![StrategyId::BuyAndHold, StrategyId::Dca, StrategyId::MaCrossover]
        );
    }

    #[test]
    fn parameter_schemas() {
        let registry = StrategyRegistry::standard();
        assert!(registry.info(StrategyId::BuyAndHold).unwrap().parameters.is_empty());

        let dca = registry.info(StrategyId::Dca).unwrap();
        let names: Vec<&str> = dca.parameters.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["contributionAmount", "frequencyDays"]);
        assert_eq!(dca.parameters[0].param_type, ParameterType::Number);
        assert_eq!(dca.parameters[1].default_value, "21");

        let ma = registry.info(StrategyId::MaCrossover).unwrap();
        assert_eq!(ma.parameters[0].default_value, "20");
        assert_eq!(ma.parameters[1].default_value, "50");
    }

    #[test]
    fn resolve_buy_and_hold_ignores_params() {
        let registry = StrategyRegistry::standard();
        let config = registry
            .resolve("BUY_AND_HOLD", &params(&[("junk", "1")]))
            .unwrap();
        assert_eq!(config, StrategyConfig::BuyAndHold(BuyAndHoldConfig));
    }

    #[test]
    fn resolve_dca() {
        let registry = StrategyRegistry::standard();
        let config = registry
            .resolve(
                "DCA",
                &params(&[("contributionAmount", "250.50"), ("frequencyDays", "5")]),
            )
            .unwrap();
        match config {
            StrategyConfig::Dca(c) => {
                assert_eq!(c.contribution_amount, dec!(250.50));
                assert_eq!(c.frequency_days, 5);
            }
            other => panic!("expected DCA config, got {other:?}"),
        }
    }

    #[test]
    fn resolve_unknown_id() {
        let registry = StrategyRegistry::standard();
        let err = registry.resolve("MOMENTUM", &StrategyParams::new()).unwrap_err();
        assert!(matches!(err, StrategyLabError::UnknownStrategy { ref id } if id == "MOMENTUM"));
    }

    #[test]
    fn resolve_id_missing_from_registry() {
        let registry = StrategyRegistry::new();
        let err = registry.resolve("DCA", &StrategyParams::new()).unwrap_err();
        assert!(matches!(err, StrategyLabError::UnknownStrategy { .. }));
    }

    #[test]
    fn resolve_missing_param_is_validation_error() {
        let registry = StrategyRegistry::standard();
        let err = registry
            .resolve("MA_CROSSOVER", &params(&[("shortWindow", "5")]))
            .unwrap_err();
        assert!(matches!(err, StrategyLabError::Validation { .. }));
    }

    #[test]
    fn with_defaults_fills_only_missing() {
        let registry = StrategyRegistry::standard();
        let merged = registry.with_defaults(StrategyId::Dca, &params(&[("frequencyDays", "5")]));
        assert_eq!(merged["contributionAmount"], "500");
        assert_eq!(merged["frequencyDays"], "5");
    }

    #[test]
    fn info_serializes_camel_case() {
        let registry = StrategyRegistry::standard();
        let json = serde_json::to_value(registry.info(StrategyId::Dca).unwrap()).unwrap();
        assert_eq!(json["id"], "DCA");
        assert_eq!(json["displayName"], "Dollar Cost Averaging (DCA)");
        assert_eq!(json["parameters"][0]["type"], "number");
        assert_eq!(json["parameters"][0]["defaultValue"], "500");
    }

    #[test]
    fn register_replaces_existing_id() {
        let mut registry = StrategyRegistry::standard();
        registry.register(
            StrategyInfo {
                id: StrategyId::BuyAndHold,
                display_name: "Hold",
                description: "",
                parameters: Vec::new(),
            },
            |_| Ok(StrategyConfig::BuyAndHold(BuyAndHoldConfig)),
        );
        assert_eq!(registry.strategies().len(), 3);
        assert_eq!(
            registry.info(StrategyId::BuyAndHold).unwrap().display_name,
            "Hold"
        );
    }
}
