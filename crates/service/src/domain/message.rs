use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<i64>,
    pub content: String,
    #[serde(default = "now")]
    pub timestamp: NaiveDateTime,
}

impl Message {
    pub fn new(content: impl Into<String>) -> Self { Self { id: None, content: content.into(), timestamp: now() } }
}

fn now() -> NaiveDateTime { Utc::now().naive_utc() }

impl Entity for Message {
    type Id = i64;
    const NAME: &'static str = "message";

    fn id(&self) -> Option<i64> { self.id }
    fn set_id(&mut self, id: i64) { self.id = Some(id); }
}
