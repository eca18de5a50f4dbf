use std::time::Duration;

use qprovider::ToolDefinition;
use qtooling::{Tool, ToolError, ToolExecutionContext, ToolFuture, parse_args};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use super::GET_WEATHER;

pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1";

#[derive(Debug, Deserialize)]
struct GetWeatherArgs {
    latitude: f64,
    longitude: f64,
}

/// Current weather from an Open-Meteo compatible forecast endpoint.
#[derive(Debug, Clone)]
pub struct GetWeatherTool {
    client: Client,
    base_url: String,
}

impl Default for GetWeatherTool {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl GetWeatherTool {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPEN_METEO_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Result<Self, ToolError> {
        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            ToolError::configuration(format!("failed to build weather client: {err}"))
        })?;
        Ok(Self { client, ..self })
    }

    async fn fetch(&self, args: GetWeatherArgs) -> Result<String, ToolError> {
        if !(-90.0..=90.0).contains(&args.latitude) || !(-180.0..=180.0).contains(&args.longitude)
        {
            return Err(ToolError::invalid_arguments(
                "latitude must be within [-90, 90] and longitude within [-180, 180]",
            ));
        }

        let endpoint = format!("{}/forecast", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(endpoint)
            .query(&[
                ("latitude", args.latitude.to_string()),
                ("longitude", args.longitude.to_string()),
                ("current", "temperature_2m".to_string()),
                ("hourly", "temperature_2m".to_string()),
                ("daily", "sunrise,sunset".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ToolError::timeout(err.to_string())
                } else {
                    ToolError::execution(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::execution(format!(
                "weather service returned http {status}"
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|err| ToolError::execution(format!("invalid weather response: {err}")))?;
        Ok(body.to_string())
    }
}

impl Tool for GetWeatherTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: GET_WEATHER.to_string(),
            description: "Get the current weather at a location".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "latitude": { "type": "number" },
                    "longitude": { "type": "number" },
                },
                "required": ["latitude", "longitude"],
            })
            .to_string(),
        }
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            let args = parse_args::<GetWeatherArgs>(args_json)?;
            self.fetch(args).await
        })
    }
}
