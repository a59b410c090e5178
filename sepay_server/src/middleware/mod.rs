mod api_key;

pub use api_key::{check_api_key, ApiKeyMiddlewareFactory, ApiKeyMiddlewareService, API_KEY_PREFIX};
