use crate::env::string_or;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        Self::from_list(&string_or(
            "ALLOWED_ORIGINS",
            "http://localhost:3000,http://localhost:5173",
        ))
    }

    pub fn from_list(origins: &str) -> Self {
        let allowed_origins = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_list_trims_and_skips_blanks() {
        let config = CorsConfig::from_list(" https://a.school , ,https://b.school,");
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.school".to_string(), "https://b.school".to_string()]
        );
    }
}
