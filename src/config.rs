use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub mongodb_uri: String,
    pub db_name: String,
    pub collection_name: String,
    /// Uploads are stored here, and the attendance fallback scan reads from here
    pub upload_dir: String,

    // Rate limiting
    pub rate_upload_per_min: u32,

    /// Cap on simultaneous database writes within one upload
    pub max_concurrent_writes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3030".to_string()),
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            db_name: env::var("DB_NAME").unwrap_or_else(|_| "excelDb".to_string()),
            collection_name: env::var("COLLECTION_NAME").unwrap_or_else(|_| "users".to_string()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),

            rate_upload_per_min: env::var("RATE_UPLOAD_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),

            max_concurrent_writes: env::var("MAX_CONCURRENT_WRITES")
                .unwrap_or_else(|_| "16".to_string())
                .parse::<usize>()
                .unwrap()
                .max(1),
        }
    }
}
