use std::env;
use std::path::PathBuf;

/// Server configuration for the compression service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: "0.0.0.0")
    pub host: String,

    /// Listen port (default: 8080)
    pub port: u16,

    /// Staging directory for raw uploads (default: "./uploads")
    pub upload_dir: PathBuf,

    /// Output directory for compressed artifacts (default: "./uploads/compressed")
    pub compressed_dir: PathBuf,

    /// Static asset directory, holds index.html (default: "./static")
    pub static_dir: PathBuf,

    /// Maximum multipart body size in bytes (default: 10 MB)
    pub max_upload_size: usize,

    /// Target width for resized images in pixels (default: 800)
    pub max_image_width: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            upload_dir: PathBuf::from("./uploads"),
            compressed_dir: PathBuf::from("./uploads/compressed"),
            static_dir: PathBuf::from("./static"),
            max_upload_size: 10 * 1024 * 1024, // 10 MB
            max_image_width: 800,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults
    /// for absent or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(default.host),

            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            compressed_dir: lookup("COMPRESSED_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.compressed_dir),

            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.static_dir),

            max_upload_size: lookup("MAX_UPLOAD_SIZE")
                .and_then(|v| v.parse().ok())
                .filter(|v: &usize| *v > 0)
                .unwrap_or(default.max_upload_size),

            max_image_width: lookup("MAX_IMAGE_WIDTH")
                .and_then(|v| v.parse().ok())
                .filter(|v: &u32| *v > 0)
                .unwrap_or(default.max_image_width),
        }
    }

    /// Config rooted in a scratch directory, used by tests
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            upload_dir: root.join("uploads"),
            compressed_dir: root.join("uploads").join("compressed"),
            static_dir: root.join("static"),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_size, 10 * 1024 * 1024);
        assert_eq!(config.max_image_width, 800);
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.compressed_dir, PathBuf::from("./uploads/compressed"));
    }

    #[test]
    fn test_lookup_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "9090"),
            ("UPLOAD_DIR", "/srv/in"),
            ("MAX_IMAGE_WIDTH", "640"),
        ]));
        assert_eq!(config.port, 9090);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/in"));
        assert_eq!(config.max_image_width, 640);
        assert_eq!(config.static_dir, PathBuf::from("./static"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "not-a-port"),
            ("MAX_UPLOAD_SIZE", "0"),
            ("MAX_IMAGE_WIDTH", "-5"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_size, 10 * 1024 * 1024);
        assert_eq!(config.max_image_width, 800);
    }

    #[test]
    fn test_rooted_at() {
        let config = ServerConfig::rooted_at("/tmp/x");
        assert_eq!(config.compressed_dir, PathBuf::from("/tmp/x/uploads/compressed"));
        assert_eq!(config.port, 8080);
    }
}
