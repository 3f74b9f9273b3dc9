mod store;

pub use store::{
    CONFIG_KEY, MAX_DELAY_MS, ResponseConfigError, decode_response_config,
    fallback_response_config, load_response_config, save_response_config,
};
