use crate::models::file::File;
use sqlx::SqliteConnection;

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<File>, sqlx::Error> {
    sqlx::query_as::<_, File>("SELECT id, name FROM files WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn insert(conn: &mut SqliteConnection, name: &str) -> Result<File, sqlx::Error> {
    let id = sqlx::query("INSERT INTO files (name) VALUES ($1)")
        .bind(name)
        .execute(conn)
        .await?
        .last_insert_rowid();

    Ok(File {
        id,
        name: name.to_string(),
    })
}
