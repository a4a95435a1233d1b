// Single source of truth for all default values.

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "local";
pub const DEFAULT_LOCAL_MODEL: &str = "hashed-tf-384";
pub const DEFAULT_LOCAL_DIMENSIONS: usize = 384;
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 32;
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_REMOTE_MAX_RETRIES: u32 = 2;
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

// --- Index ---
pub const DEFAULT_INDEX_ROOT: &str = "indices";
pub const DEFAULT_CHUNK_SIZE: usize = 100;

// --- Document builder ---
pub const MAX_SUMMARY_EXAMPLES: usize = 3;
pub const OVERVIEW_TOP_ESTABLISHMENTS: usize = 5;

// --- Retrieval ---
pub const DEFAULT_TOP_K: usize = 5;
pub const VECTOR_OVERFETCH: usize = 3;
pub const DIVERSITY_CAP_FACTOR: usize = 2;
pub const GENERIC_EVENT_SUMMARY_LIMIT: usize = 5;
pub const KEYWORD_ROW_FALLBACK_LIMIT: usize = 3;

// --- Similarity assigned to each synthetic retrieval path ---
pub const SCORE_DIRECT_LOOKUP: f32 = 1.0;
pub const SCORE_DIRECT_SUMMARY: f32 = 0.99;
pub const SCORE_KEYWORD_SUMMARY: f32 = 0.95;
pub const SCORE_KEYWORD_ROW: f32 = 0.9;
pub const SCORE_NUMBER_SUMMARY: f32 = 0.9;
pub const SCORE_NUMBER_ROW: f32 = 0.85;
pub const SCORE_ITEM_ROW: f32 = 0.95;
pub const SCORE_ESTABLISHMENT_SUMMARY: f32 = 0.95;
pub const SCORE_ESTABLISHMENT_ROW: f32 = 0.9;
pub const SCORE_OVERVIEW: f32 = 0.95;
pub const SCORE_EVENT_TYPE_SUMMARY: f32 = 0.85;
pub const SCORE_DIVERSITY: f32 = 0.7;

// --- Field bindings (UPU event-feed column layout) ---
pub const DEFAULT_EVENT_CODE_COLUMN: &str = "EVENT_TYPE_CD";
pub const DEFAULT_EVENT_NAME_COLUMN: &str = "EVENT_TYPE_NM";
pub const DEFAULT_ESTABLISHMENT_COLUMN: &str = "établissement_postal";
pub const DEFAULT_ITEM_ID_COLUMN: &str = "MAILITM_FID";
pub const DEFAULT_EVENT_DATE_COLUMN: &str = "date";
