//! Viewer configuration from the page URL

use boxart_core::ViewerConfig;

/// Query parameters understood by the viewer
pub const QUERY_KEYS: [&str; 8] = [
    "front", "back", "spine", "platform", "title", "proxy", "rotate", "customize",
];

/// Build the config from `?front=...&platform=...` on the current page
#[cfg(target_arch = "wasm32")]
pub fn from_browser() -> ViewerConfig {
    let mut config = ViewerConfig::default();
    let Some(window) = web_sys::window() else {
        return config;
    };
    let search = window.location().search().unwrap_or_default();
    let params = match web_sys::UrlSearchParams::new_with_str(&search) {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!("Could not parse query string: {:?}", e);
            return config;
        }
    };

    let pairs = QUERY_KEYS
        .iter()
        .filter_map(|key| params.get(key).map(|value| (*key, value)));
    config.apply_query_pairs(pairs);
    config
}

#[cfg(not(target_arch = "wasm32"))]
pub fn from_browser() -> ViewerConfig {
    ViewerConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_keys_are_all_understood() {
        let mut config = ViewerConfig::default();
        config.apply_query_pairs(QUERY_KEYS.iter().map(|key| (*key, "1".to_string())));
        assert_eq!(config.front.as_deref(), Some("1"));
        assert_eq!(config.cors_proxy.as_deref(), Some("1"));
        assert!(config.open_customizer);
    }
}
