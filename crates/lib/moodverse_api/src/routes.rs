//! Route paths.

pub const GET_HEALTH: &str = "/health";
pub const POST_GENERATE_PORTRAIT: &str = "/api/generate-portrait";
