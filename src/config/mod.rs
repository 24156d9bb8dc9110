pub mod schema;

#[cfg(test)]
mod test_env;

pub use schema::{
    API_KEY_ENV, Config, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_OUTPUT_DIR,
};
