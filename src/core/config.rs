use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_fallback_model: String,
    pub system_message: String,
    pub max_iterations: usize,
    pub gcal_api_url: String,
    pub google_token_url: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_refresh_token: Option<String>,
    pub google_access_token: Option<String>,
    // Skips calendar list resolution when set
    pub calendar_id: Option<String>,
}

const DEFAULT_SYSTEM_MESSAGE: &str = "You are a friendly calendar booking assistant. \
You can check the user's calendar, suggest free time slots, book appointments and cancel events \
using the available tools. Always use a tool instead of guessing what is on the calendar. \
Never cancel an event unless exactly one event matches what the user asked for.";

impl Default for AppConfig {
    fn default() -> Self {
        let openai_api_hostname = env::var("BOOKING_LLM_HOST")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_api_key =
            env::var("OPENAI_API_KEY").unwrap_or_else(|_| "thiswontworkforopenai".to_string());
        let openai_model =
            env::var("BOOKING_LLM_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string());
        let openai_fallback_model = env::var("BOOKING_LLM_FALLBACK_MODEL")
            .unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let system_message = env::var("BOOKING_SYSTEM_MESSAGE")
            .unwrap_or_else(|_| DEFAULT_SYSTEM_MESSAGE.to_string());
        let max_iterations = env::var("BOOKING_MAX_ITERATIONS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(3);
        let gcal_api_url = env::var("BOOKING_GCAL_API_URL")
            .unwrap_or_else(|_| "https://www.googleapis.com/calendar/v3".to_string());
        let google_token_url = env::var("BOOKING_GOOGLE_TOKEN_URL")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string());

        Self {
            openai_api_hostname,
            openai_api_key,
            openai_model,
            openai_fallback_model,
            system_message,
            max_iterations,
            gcal_api_url,
            google_token_url,
            google_client_id: env::var("BOOKING_GOOGLE_CLIENT_ID").ok(),
            google_client_secret: env::var("BOOKING_GOOGLE_CLIENT_SECRET").ok(),
            google_refresh_token: env::var("BOOKING_GOOGLE_REFRESH_TOKEN").ok(),
            google_access_token: env::var("BOOKING_GOOGLE_ACCESS_TOKEN").ok(),
            calendar_id: env::var("BOOKING_CALENDAR_ID").ok(),
        }
    }
}

impl AppConfig {
    /// Model identifiers to try in order when connecting to the LLM.
    pub fn model_candidates(&self) -> Vec<String> {
        let mut candidates = vec![self.openai_model.clone()];
        if self.openai_fallback_model != self.openai_model {
            candidates.push(self.openai_fallback_model.clone());
        }
        candidates
    }
}
