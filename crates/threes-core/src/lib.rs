#![deny(warnings)]
pub mod deck;
pub mod game;
pub mod mechanics;
pub mod model;
pub mod reconstruct;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "threes-assist"
    }

    pub const fn codename() -> &'static str {
        "Sidecar"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "threes-assist");
        assert_eq!(AppInfo::codename(), "Sidecar");
        assert!(!AppInfo::version().is_empty());
    }
}
