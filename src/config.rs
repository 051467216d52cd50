use std::env;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_IMAGE_SIZE_MB: f64 = 1.0;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub base_path: String,
    pub supabase: Option<SupabaseConfig>,
    pub jwt_secret: String,
    pub parts_table: String,
    pub parts_bucket: String,
    pub max_image_size_mb: f64,
}

/// Connection details for the hosted backend (table, bucket and auth endpoints).
#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenvy::dotenv().ok();

        let supabase = match (env::var("SUPABASE_URL"), env::var("SUPABASE_ANON_KEY")) {
            (Ok(url), Ok(anon_key)) if !url.is_empty() && !anon_key.is_empty() => {
                Some(SupabaseConfig {
                    url: url.trim_end_matches('/').to_string(),
                    anon_key,
                })
            }
            _ => None,
        };

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            base_path: normalize_base_path(&env::var("BASE_PATH").unwrap_or_default()),
            supabase,
            jwt_secret: env::var("SUPABASE_JWT_SECRET")?,
            parts_table: env::var("PARTS_TABLE").unwrap_or_else(|_| "spare_parts".to_string()),
            parts_bucket: env::var("PARTS_BUCKET").unwrap_or_else(|_| "part-images".to_string()),
            max_image_size_mb: parse_size_mb(env::var("MAX_IMAGE_SIZE_MB").ok().as_deref()),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// `""` and `"/"` stay `/`; anything else gets a leading and a trailing slash.
pub fn normalize_base_path(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }

    let mut normalized = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(path);
    if !path.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

fn parse_size_mb(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|mb| mb.is_finite() && *mb > 0.0)
        .unwrap_or(DEFAULT_MAX_IMAGE_SIZE_MB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path(""), "/");
        assert_eq!(normalize_base_path("/"), "/");
        assert_eq!(normalize_base_path("inventory"), "/inventory/");
        assert_eq!(normalize_base_path("/inventory"), "/inventory/");
        assert_eq!(normalize_base_path("inventory/"), "/inventory/");
        assert_eq!(normalize_base_path("/partymate-inventory/"), "/partymate-inventory/");
    }

    #[test]
    fn test_parse_size_mb() {
        assert_eq!(parse_size_mb(None), 1.0);
        assert_eq!(parse_size_mb(Some("0.5")), 0.5);
        assert_eq!(parse_size_mb(Some("abc")), 1.0);
        assert_eq!(parse_size_mb(Some("-2")), 1.0);
        assert_eq!(parse_size_mb(Some("0")), 1.0);
    }
}
