use crate::models::file::File;

/// A song joined with the file it points at.
#[derive(sqlx::FromRow, Debug)]
pub struct SongRow {
    pub id: i64,
    pub file_id: i64,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub id: i64,
    pub file: File,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        Song {
            id: row.id,
            file: File {
                id: row.file_id,
                name: row.file_name,
            },
        }
    }
}
