use anyhow::bail;

/// Backing store for the persistence gateway, chosen once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Local,
    Remote,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_kind: StoreKind,
    pub database_path: String,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub secret_key: String,
    pub uploads_dir: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_kind = match std::env::var("STORE_KIND")
            .unwrap_or_else(|_| "local".into())
            .to_lowercase()
            .as_str()
        {
            "local" => StoreKind::Local,
            "remote" => StoreKind::Remote,
            other => bail!("STORE_KIND must be 'local' or 'remote', got '{other}'"),
        };

        Ok(Self {
            store_kind,
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/healthlog.db".into()),
            supabase_url: std::env::var("SUPABASE_URL").ok().filter(|v| !v.is_empty()),
            supabase_key: std::env::var("SUPABASE_KEY").ok().filter(|v| !v.is_empty()),
            groq_api_key: std::env::var("GROQ_API_KEY").ok().filter(|v| !v.is_empty()),
            secret_key: std::env::var("SECRET_KEY")
                .unwrap_or_else(|_| "change-me-in-production".into()),
            uploads_dir: std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".into()),
        })
    }
}
