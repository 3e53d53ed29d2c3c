//! Environment helpers

use tracing::debug;

/// Load `.env` from the working directory if present. Safe to call twice.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(_) => debug!("no .env file found"),
    }
}
