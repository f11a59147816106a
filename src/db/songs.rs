use crate::models::song::{Song, SongRow};
use sqlx::SqliteConnection;

const SELECT_SONGS: &str = "SELECT songs.id AS id, files.id AS file_id, files.name AS file_name \
     FROM songs JOIN files ON files.id = songs.file_id";

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Song>, sqlx::Error> {
    let sql = format!("{} ORDER BY songs.id ASC", SELECT_SONGS);
    let rows = sqlx::query_as::<_, SongRow>(&sql).fetch_all(conn).await?;
    Ok(rows.into_iter().map(Song::from).collect())
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Song>, sqlx::Error> {
    let sql = format!("{} WHERE songs.id = $1", SELECT_SONGS);
    let row = sqlx::query_as::<_, SongRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(Song::from))
}

/// Inserts a song pointing at `file_id` and returns the new song id.
pub async fn insert(conn: &mut SqliteConnection, file_id: i64) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO songs (file_id) VALUES ($1)")
        .bind(file_id)
        .execute(conn)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_file(conn: &mut SqliteConnection, id: i64, file_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE songs SET file_id = $1 WHERE id = $2")
        .bind(file_id)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM songs WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{files, memory_pool};

    #[tokio::test]
    async fn list_orders_by_id() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let a = files::insert(&mut conn, "A.mp3").await.unwrap();
        let b = files::insert(&mut conn, "B.mp3").await.unwrap();
        insert(&mut conn, b.id).await.unwrap();
        insert(&mut conn, a.id).await.unwrap();

        let songs = list(&mut conn).await.unwrap();
        let ids: Vec<i64> = songs.iter().map(|song| song.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(songs[0].file, b);
        assert_eq!(songs[1].file, a);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let a = files::insert(&mut conn, "A.mp3").await.unwrap();
        let b = files::insert(&mut conn, "B.mp3").await.unwrap();
        let id = insert(&mut conn, a.id).await.unwrap();

        update_file(&mut conn, id, b.id).await.unwrap();
        let song = find_by_id(&mut conn, id).await.unwrap().unwrap();
        assert_eq!(song.file, b);

        delete(&mut conn, id).await.unwrap();
        assert!(find_by_id(&mut conn, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_dangling_file_reference() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        assert!(insert(&mut conn, 42).await.is_err());
    }
}
