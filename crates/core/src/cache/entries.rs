//! Cache entry operations.
//!
//! Provides functions for storing responses under request identities and
//! matching requests against one store or all of them.

use super::connection::CacheDb;
use super::hash::request_key;
use crate::http::{Request, Response};
use crate::Error;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored request/response pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub method: String,
    pub url: String,
    pub response: Response,
}

/// Columns as read from SQLite, before header decoding.
struct RawEntry {
    method: String,
    url: String,
    response_url: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
}

impl RawEntry {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            method: row.get(0)?,
            url: row.get(1)?,
            response_url: row.get(2)?,
            status: row.get(3)?,
            headers_json: row.get(4)?,
            body: row.get(5)?,
        })
    }

    fn decode(self) -> Result<CachedEntry, Error> {
        let headers: Vec<(String, String)> = serde_json::from_str(&self.headers_json)
            .map_err(|e| Error::CorruptEntry(format!("{}: {e}", self.url)))?;
        Ok(CachedEntry {
            method: self.method,
            url: self.url,
            response: Response {
                url: self.response_url,
                status: self.status,
                headers,
                body: Bytes::from(self.body),
            },
        })
    }
}

const SELECT_COLUMNS: &str = "e.method, e.url, e.response_url, e.status, e.headers_json, e.body";

impl CacheDb {
    /// Store every pair in `name` in a single transaction.
    ///
    /// The store is created if needed. Either all pairs land or, on error,
    /// nothing does, including the store itself.
    pub async fn put_all(&self, name: &str, pairs: Vec<(Request, Response)>) -> Result<(), Error> {
        if let Some((request, _)) = pairs.iter().find(|(request, _)| request.method != "GET") {
            return Err(Error::InvalidInput(format!(
                "only GET requests can be cached, got {} {}",
                request.method, request.url
            )));
        }

        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;

                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO cache_entries (
                            cache_name, request_key, method, url, response_url,
                            status, headers_json, body, stored_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                        ON CONFLICT(cache_name, request_key) DO UPDATE SET
                            response_url = excluded.response_url,
                            status = excluded.status,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            stored_at = excluded.stored_at",
                    )?;

                    for (request, response) in &pairs {
                        let url = request.cache_url();
                        let headers_json = serde_json::to_string(&response.headers)
                            .map_err(|e| Error::InvalidInput(format!("unserializable headers: {e}")))?;
                        stmt.execute(params![
                            &name,
                            request_key(&request.method, &url),
                            &request.method,
                            &url,
                            &response.url,
                            response.status,
                            headers_json,
                            response.body.as_ref(),
                            &now,
                        ])?;
                    }
                }

                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store one response in `name`, replacing any entry for the same request.
    pub async fn put(&self, name: &str, request: Request, response: Response) -> Result<(), Error> {
        self.put_all(name, vec![(request, response)]).await
    }

    /// Look up a request in a single store.
    pub async fn match_in(&self, name: &str, request: &Request) -> Result<Option<Response>, Error> {
        let name = name.to_string();
        let key = request_key(&request.method, &request.cache_url());
        let sql = format!("SELECT {SELECT_COLUMNS} FROM cache_entries e WHERE e.cache_name = ?1 AND e.request_key = ?2");
        self.conn
            .call(move |conn| -> Result<Option<RawEntry>, Error> {
                let result = conn.query_row(&sql, params![name, key], RawEntry::from_row);
                match result {
                    Ok(raw) => Ok(Some(raw)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?
            .map(|raw| raw.decode().map(|entry| entry.response))
            .transpose()
    }

    /// Look up a request across all stores, oldest store first.
    pub async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error> {
        let key = request_key(&request.method, &request.cache_url());
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM cache_entries e
             JOIN cache_stores s ON s.name = e.cache_name
             WHERE e.request_key = ?1
             ORDER BY s.rowid
             LIMIT 1"
        );
        self.conn
            .call(move |conn| -> Result<Option<RawEntry>, Error> {
                let result = conn.query_row(&sql, params![key], RawEntry::from_row);
                match result {
                    Ok(raw) => Ok(Some(raw)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?
            .map(|raw| raw.decode().map(|entry| entry.response))
            .transpose()
    }

    /// Every entry of a store, in insertion order.
    pub async fn entries(&self, name: &str) -> Result<Vec<CachedEntry>, Error> {
        let name = name.to_string();
        let sql = format!("SELECT {SELECT_COLUMNS} FROM cache_entries e WHERE e.cache_name = ?1 ORDER BY e.rowid");
        let raws = self
            .conn
            .call(move |conn| -> Result<Vec<RawEntry>, Error> {
                let mut stmt = conn.prepare(&sql)?;
                let raws = stmt
                    .query_map(params![name], RawEntry::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(raws)
            })
            .await
            .map_err(Error::from)?;

        raws.into_iter().map(RawEntry::decode).collect()
    }
}
