use serde::{Deserialize, Serialize};

pub const GREETING: &str = "Hello, bank REST API!";

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// Body of the public `/api/hello` endpoint.
#[derive(Serialize, Deserialize, Debug)]
pub struct Greeting {
    pub message: String,
}

impl Default for Greeting {
    fn default() -> Self {
        Self { message: GREETING.to_string() }
    }
}
