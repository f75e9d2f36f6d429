//! Tool host backed by the lookup clients.

use crate::model::{ToolCall, ToolSpec};
use crate::tools::{ToolError, ToolHost};
use lookup::{StocksClient, WeatherClient};
use serde::Deserialize;
use serde_json::{json, Value};

const WEATHER_TOOL: &str = "get_weather";
const STOCK_TOOL: &str = "get_stock_price";

/// The closed set of tools this host can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolTag {
    Weather,
    PreviousClose,
}

impl ToolTag {
    /// Resolve a requested tool name. Matching is case-insensitive exact.
    fn resolve(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case(WEATHER_TOOL) {
            Some(Self::Weather)
        } else if name.eq_ignore_ascii_case(STOCK_TOOL) {
            Some(Self::PreviousClose)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    city: String,
    country_code: String,
}

#[derive(Debug, Deserialize)]
struct StockArgs {
    stock_ticker: String,
}

/// Tool host exposing the weather and previous-close lookups.
pub struct LookupToolHost {
    weather: WeatherClient,
    stocks: StocksClient,
    specs: Vec<ToolSpec>,
}

impl LookupToolHost {
    /// Create a host over the two lookup clients.
    pub fn new(weather: WeatherClient, stocks: StocksClient) -> Self {
        Self {
            weather,
            stocks,
            specs: vec![weather_spec(), stock_spec()],
        }
    }

    async fn run_weather(&self, input: &Value) -> Result<Value, ToolError> {
        let args: WeatherArgs = decode_args(input)?;
        require_non_empty("city", &args.city)?;
        require_non_empty("country_code", &args.country_code)?;

        let sentence = self
            .weather
            .current(&args.city, &args.country_code)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        Ok(Value::String(sentence))
    }

    async fn run_stock(&self, input: &Value) -> Result<Value, ToolError> {
        let args: StockArgs = decode_args(input)?;
        require_non_empty("stock_ticker", &args.stock_ticker)?;

        let close = self
            .stocks
            .previous_close(&args.stock_ticker)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        Ok(json!(close))
    }
}

impl ToolHost for LookupToolHost {
    fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let tag = ToolTag::resolve(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;

        let result = match tag {
            ToolTag::Weather => self.run_weather(&call.input).await,
            ToolTag::PreviousClose => self.run_stock(&call.input).await,
        };

        if let Err(err) = &result {
            tracing::warn!(tool = %call.name, %err, "tool execution failed");
        }
        result
    }
}

fn decode_args<T: for<'de> Deserialize<'de>>(input: &Value) -> Result<T, ToolError> {
    serde_json::from_value(input.clone()).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

fn weather_spec() -> ToolSpec {
    ToolSpec {
        name: WEATHER_TOOL.to_string(),
        description: "Fetches the weather information for a given city and country code."
            .to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The name of the city."
                },
                "country_code": {
                    "type": "string",
                    "description": "The country code of the city."
                }
            },
            "required": ["city", "country_code"]
        }),
    }
}

fn stock_spec() -> ToolSpec {
    ToolSpec {
        name: STOCK_TOOL.to_string(),
        description: "Retrieves the previous closing price of a stock.".to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "stock_ticker": {
                    "type": "string",
                    "description": "The ticker symbol of the stock."
                }
            },
            "required": ["stock_ticker"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> LookupToolHost {
        LookupToolHost::new(WeatherClient::new("k"), StocksClient::new("k"))
    }

    #[test]
    fn resolution_is_case_insensitive() {
        assert_eq!(ToolTag::resolve("get_weather"), Some(ToolTag::Weather));
        assert_eq!(ToolTag::resolve("GET_WEATHER"), Some(ToolTag::Weather));
        assert_eq!(
            ToolTag::resolve("Get_Stock_Price"),
            Some(ToolTag::PreviousClose)
        );
        assert_eq!(ToolTag::resolve("teleport"), None);
    }

    #[test]
    fn host_exposes_both_specs() {
        let host = host();
        let names: Vec<&str> = host.specs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["get_weather", "get_stock_price"]);
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let host = host();
        let call = ToolCall {
            id: "call_1".into(),
            name: "teleport".into(),
            input: json!({}),
        };
        let err = host.execute(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(name) if name == "teleport"));
    }

    #[tokio::test]
    async fn missing_argument_is_invalid_input() {
        let host = host();
        let call = ToolCall {
            id: "call_1".into(),
            name: "get_weather".into(),
            input: json!({"city": "Paris"}),
        };
        let err = host.execute(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn empty_argument_is_invalid_input() {
        let host = host();
        let call = ToolCall {
            id: "call_1".into(),
            name: "get_stock_price".into(),
            input: json!({"stock_ticker": "  "}),
        };
        let err = host.execute(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
