use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{FoodMatch, LookupError, Macros, NutritionFacts, NutritionGateway};
use crate::{config::NutritionConfig, estimation::units::Unit};

#[derive(Debug, Deserialize)]
struct NutrientsResponse {
    #[serde(default)]
    foods: Vec<NutritionixFood>,
}

#[derive(Debug, Deserialize)]
struct NutritionixFood {
    #[serde(default)]
    nf_calories: Option<f64>,
    #[serde(default)]
    nf_total_fat: Option<f64>,
    #[serde(default)]
    nf_total_carbohydrate: Option<f64>,
    #[serde(default)]
    nf_protein: Option<f64>,
    #[serde(default)]
    nf_dietary_fiber: Option<f64>,
    #[serde(default)]
    nf_sugars: Option<f64>,
    #[serde(default)]
    nf_sodium: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct InstantSearchResponse {
    #[serde(default)]
    common: Vec<CommonFood>,
}

#[derive(Debug, Deserialize)]
struct CommonFood {
    food_name: String,
    #[serde(default)]
    serving_unit: String,
    #[serde(default)]
    serving_qty: f64,
}

/// Nutritionix natural-language API client.
#[derive(Clone)]
pub struct Nutritionix {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl Nutritionix {
    pub fn new(cfg: &NutritionConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        let credentials = cfg.app_id.clone().zip(cfg.api_key.clone());
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn credentials(&self) -> Result<(&str, &str), LookupError> {
        self.credentials
            .as_ref()
            .map(|(id, key)| (id.as_str(), key.as_str()))
            .ok_or_else(|| {
                LookupError::Unavailable("nutrition provider credentials not configured".into())
            })
    }

    async fn post_nutrients(&self, query: &str) -> Result<Response, LookupError> {
        let (app_id, app_key) = self.credentials()?;
        debug!(%query, "nutritionix nutrients request");
        self.client
            .post(format!("{}/natural/nutrients", self.base_url))
            .header("x-app-id", app_id)
            .header("x-app-key", app_key)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(transport_error)
    }
}

#[async_trait]
impl NutritionGateway for Nutritionix {
    async fn nutrients(
        &self,
        food_name: &str,
        quantity: f64,
        unit: Unit,
    ) -> Result<NutritionFacts, LookupError> {
        let mut response = self.post_nutrients(&lookup_query(quantity, unit, food_name)).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(
                %status,
                %body,
                food = %food_name,
                "nutritionix rejected query, trying catalogue name"
            );

            // The catalogue often knows a common name the parser did not match.
            let alternative = match self.search(food_name).await {
                Ok(matches) => matches.into_iter().next().map(|m| m.food_name),
                Err(e) => {
                    warn!(error = %e, "nutritionix search fallback failed");
                    None
                }
            };
            let Some(alternative) = alternative else {
                return Err(status_error(status, food_name, &body));
            };
            info!(food = %food_name, %alternative, "retrying nutritionix with common name");
            response = self.post_nutrients(&lookup_query(quantity, unit, &alternative)).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, food_name, &body));
        }

        let parsed: NutrientsResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Unavailable(format!("malformed nutritionix response: {e}")))?;
        parsed
            .foods
            .into_iter()
            .next()
            .map(facts_from_food)
            .ok_or_else(|| LookupError::NotRecognized(food_name.to_string()))
    }

    async fn search(&self, query: &str) -> Result<Vec<FoodMatch>, LookupError> {
        let (app_id, app_key) = self.credentials()?;
        let response = self
            .client
            .get(format!("{}/search/instant", self.base_url))
            .query(&[("query", query)])
            .header("x-app-id", app_id)
            .header("x-app-key", app_key)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Unavailable(format!("search returned {status}: {body}")));
        }

        let parsed: InstantSearchResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Unavailable(format!("malformed search response: {e}")))?;
        Ok(parsed
            .common
            .into_iter()
            .map(|c| FoodMatch {
                food_name: c.food_name,
                serving_unit: c.serving_unit,
                serving_qty: c.serving_qty,
            })
            .collect())
    }
}

/// Natural-language query, e.g. `150 grams dal tadka`.
fn lookup_query(quantity: f64, unit: Unit, food_name: &str) -> String {
    format!("{} {} {}", round2(quantity), unit, food_name.trim())
}

fn facts_from_food(food: NutritionixFood) -> NutritionFacts {
    let val = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0);
    NutritionFacts {
        calories: val(food.nf_calories).round() as i32,
        macros: Macros {
            protein: round2(val(food.nf_protein)),
            carbs: round2(val(food.nf_total_carbohydrate)),
            fat: round2(val(food.nf_total_fat)),
            fiber: round2(val(food.nf_dietary_fiber)),
            sugar: round2(val(food.nf_sugars)),
            sodium: round2(val(food.nf_sodium)),
        },
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// Nutritionix answers 404 when the parser matches none of the foods.
fn status_error(status: StatusCode, food_name: &str, body: &str) -> LookupError {
    if status == StatusCode::NOT_FOUND {
        LookupError::NotRecognized(food_name.to_string())
    } else {
        LookupError::Unavailable(format!("nutritionix returned {status}: {body}"))
    }
}

fn transport_error(e: reqwest::Error) -> LookupError {
    if e.is_timeout() {
        LookupError::Unavailable("nutritionix request timed out".into())
    } else {
        LookupError::Unavailable(format!("nutritionix unreachable: {e}"))
    }
}
