use serde::{Deserialize, Serialize};

/// Public prefix under which uploaded files are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct File {
    pub id: i64,
    pub name: String,
}

impl File {
    pub fn path(&self) -> String {
        format!("{}/{}", UPLOADS_ROUTE, self.name)
    }
}
