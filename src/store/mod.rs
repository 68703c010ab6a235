//! Pooled document store
//!
//! SQLite with an FTS5 mirror for lexical matching and a `vector_distance`
//! scalar function for semantic matching. Access goes through an r2d2
//! connection pool: each retriever checks out its own connection for the
//! duration of one query, so the lexical and semantic paths can run in
//! parallel without serializing on a shared cursor.

use crate::document::{Document, DocumentMetadata};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::params;
use rusqlite::types::ValueRef;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Content decoding failed for document {id}: {message}")]
    Decode { id: String, message: String },

    #[error("Metadata serialization failed: {0}")]
    Metadata(String),
}

/// Database connection pool
pub type StorePool = Pool<SqliteConnectionManager>;

/// A row materialized into a document plus its retrieval score
///
/// Score semantics depend on the query: bm25 rank for full-text (lower is
/// better), vector distance for similarity (lower is closer).
#[derive(Debug, Clone)]
pub struct ScoredRow {
    pub document: Document,
    pub score: f32,
}

const MIGRATIONS: &[&str] = &[
    // v1: documents table, FTS5 mirror, sync triggers
    "
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        content BLOB NOT NULL,
        metadata TEXT NOT NULL DEFAULT '{}',
        embedding BLOB
    );

    CREATE VIRTUAL TABLE IF NOT EXISTS documents_fts USING fts5(
        content,
        content='documents',
        content_rowid='rowid'
    );

    CREATE TRIGGER IF NOT EXISTS documents_ai AFTER INSERT ON documents BEGIN
        INSERT INTO documents_fts(rowid, content) VALUES (new.rowid, new.content);
    END;

    CREATE TRIGGER IF NOT EXISTS documents_ad AFTER DELETE ON documents BEGIN
        INSERT INTO documents_fts(documents_fts, rowid, content)
        VALUES ('delete', old.rowid, old.content);
    END;
    ",
];

/// Document store backed by pooled SQLite connections
#[derive(Debug)]
pub struct DocumentStore {
    pool: StorePool,
}

impl DocumentStore {
    /// Open (or create) a store at `path` with a pool of `max_connections`
    pub fn open(path: &Path, max_connections: u32) -> Result<Self, StoreError> {
        // r2d2 asserts on a zero-sized pool; surface it as a typed error
        if max_connections == 0 {
            return Err(StoreError::Pool(
                "max_connections must be at least 1".to_string(),
            ));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Io(format!("Failed to create store directory: {}", e))
            })?;
        }

        // Every pooled connection gets the pragmas and the vector_distance
        // function; queries can land on any member of the pool.
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA busy_timeout = 5000;
                ",
            )?;
            register_vector_distance(conn)
        });

        let pool = Pool::builder()
            .max_size(max_connections)
            .build(manager)
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        let store = Self { pool };
        store.migrate()?;

        tracing::info!(path = %path.display(), max_connections, "Document store opened");
        Ok(store)
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, StoreError> {
        self.pool.get().map_err(|e| StoreError::Pool(e.to_string()))
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM _migrations",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        for (index, migration) in MIGRATIONS.iter().enumerate() {
            let version = index as i32 + 1;
            if version > current_version {
                tracing::info!("Applying store migration {}", version);
                conn.execute_batch(migration)?;
                conn.execute(
                    "INSERT INTO _migrations (version, applied_at) VALUES (?1, datetime('now'))",
                    params![version],
                )?;
            }
        }

        Ok(())
    }

    /// Execute a boolean full-text predicate, best match first
    ///
    /// `match_expr` is an FTS5 MATCH expression (quoted terms OR-joined).
    /// bm25 scores are lower-is-better, so ascending order yields descending
    /// match quality. Rows are streamed and materialized one by one.
    pub fn full_text_query(&self, match_expr: &str) -> Result<Vec<ScoredRow>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT d.id, d.content, d.metadata, bm25(documents_fts) AS score
             FROM documents_fts
             JOIN documents d ON d.rowid = documents_fts.rowid
             WHERE documents_fts MATCH ?1
             ORDER BY score",
        )?;

        let mut rows = stmt.query(params![match_expr])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(materialize_row(row)?);
        }
        Ok(out)
    }

    /// Execute a similarity query, ascending vector distance
    ///
    /// The limit is applied server-side; documents without an embedding are
    /// excluded.
    pub fn vector_query(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredRow>, StoreError> {
        let conn = self.conn()?;
        let blob = encode_embedding(embedding);

        let mut stmt = conn.prepare(
            "SELECT id, content, metadata, vector_distance(embedding, ?1) AS distance
             FROM documents
             WHERE embedding IS NOT NULL
             ORDER BY distance
             LIMIT ?2",
        )?;

        let mut rows = stmt.query(params![blob, limit as i64])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(materialize_row(row)?);
        }
        Ok(out)
    }

    /// Insert one document, optionally with its embedding
    ///
    /// Ingestion proper lives outside this crate; this helper exists for
    /// corpus loaders and test fixtures.
    pub fn insert_document(
        &self,
        document: &Document,
        embedding: Option<&[f32]>,
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let metadata = serde_json::to_string(&document.metadata)
            .map_err(|e| StoreError::Metadata(e.to_string()))?;

        conn.execute(
            "INSERT INTO documents (id, content, metadata, embedding)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                document.id,
                document.content,
                metadata,
                embedding.map(encode_embedding),
            ],
        )?;
        Ok(())
    }
}

/// Materialize one result row into a document
///
/// Expects columns `(id, content, metadata, score)`. Content stored as a
/// large-object BLOB is read fully and decoded as UTF-8; metadata JSON that
/// fails to parse degrades to the default rather than failing the row.
fn materialize_row(row: &rusqlite::Row<'_>) -> Result<ScoredRow, StoreError> {
    let id: String = row.get(0)?;

    let content = match row.get_ref(1)? {
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec()).map_err(|e| {
            StoreError::Decode {
                id: id.clone(),
                message: e.to_string(),
            }
        })?,
        ValueRef::Blob(bytes) => String::from_utf8(bytes.to_vec()).map_err(|e| {
            StoreError::Decode {
                id: id.clone(),
                message: e.to_string(),
            }
        })?,
        ValueRef::Null => String::new(),
        other => {
            return Err(StoreError::Decode {
                id,
                message: format!("Unexpected content column type: {}", other.data_type()),
            })
        }
    };

    let metadata_json: Option<String> = row.get(2)?;
    let metadata: DocumentMetadata = metadata_json
        .as_deref()
        .map(|json| serde_json::from_str(json).unwrap_or_default())
        .unwrap_or_default();

    let score: f64 = row.get(3)?;

    Ok(ScoredRow {
        document: Document {
            id,
            content,
            metadata,
        },
        score: score as f32,
    })
}

/// Encode an embedding as a little-endian f32 blob
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn decode_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

/// Register the `vector_distance(a, b)` scalar function on a connection
///
/// Cosine distance over little-endian f32 blobs, matching the encoding used
/// at ingestion time.
fn register_vector_distance(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "vector_distance",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let a: Vec<u8> = ctx.get(0)?;
            let b: Vec<u8> = ctx.get(1)?;
            let a = decode_embedding(&a);
            let b = decode_embedding(&b);
            if a.is_empty() || a.len() != b.len() {
                return Err(rusqlite::Error::UserFunctionError(
                    "Embedding dimension mismatch".into(),
                ));
            }
            Ok(cosine_distance(&a, &b) as f64)
        },
    )
}
