use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Nutritionix credentials and transport settings.
///
/// Missing credentials do not stop startup; every lookup then fails as
/// unavailable and estimates fall back to personal baselines.
#[derive(Debug, Clone, Deserialize)]
pub struct NutritionConfig {
    pub app_id: Option<String>,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub nutrition: NutritionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutritrack".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "nutritrack-users".into()),
        };
        let nutrition = NutritionConfig {
            app_id: non_empty_var("NUTRITIONIX_APP_ID"),
            api_key: non_empty_var("NUTRITIONIX_API_KEY"),
            base_url: std::env::var("NUTRITIONIX_BASE_URL")
                .unwrap_or_else(|_| "https://trackapi.nutritionix.com/v2".into()),
            timeout_secs: parsed_var("NUTRITION_TIMEOUT_SECS").unwrap_or(10),
        };
        if nutrition.app_id.is_none() || nutrition.api_key.is_none() {
            tracing::warn!("Nutritionix credentials not configured; lookups will be unavailable");
        }
        Ok(Self {
            database_url,
            jwt,
            nutrition,
        })
    }
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
