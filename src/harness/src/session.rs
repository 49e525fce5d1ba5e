// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Client sessions against the pooler under test.

use std::fmt;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Config, NoTls, SimpleQueryMessage};
use tracing::{debug, warn};

/// The wire protocol used for every statement a session issues.
///
/// A pooler may track session state differently for the two query paths, so
/// each scenario runs under both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// One-shot query messages.
    Simple,
    /// Parse/bind/execute.
    Extended,
}

impl Protocol {
    pub fn label(self) -> &'static str {
        match self {
            Protocol::Simple => "simple",
            Protocol::Extended => "extended",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_postgres::Error,
    },
    #[error("{}", format_query_error(.0))]
    Query(#[from] tokio_postgres::Error),
    #[error("query returned no rows: {0}")]
    EmptyResult(String),
    #[error("malformed value in backend info: {0}")]
    Malformed(String),
}

fn format_query_error(error: &tokio_postgres::Error) -> String {
    if let Some(db_error) = error.as_db_error() {
        format!(
            "database error: {} (code {})",
            db_error.message(),
            db_error.code().code()
        )
    } else {
        format!("query error: {}", error)
    }
}

/// The identity of the server backend currently serving a session.
///
/// The backend process id is the reuse detector: two client sessions served
/// by the same pid share a pooled server connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub addr: Option<String>,
    pub port: Option<i32>,
    pub pid: i32,
    pub user: String,
    pub in_recovery: bool,
}

impl fmt::Display for BackendInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "addr={}, port={}, pid={}, user={}, in_recovery={}",
            self.addr.as_deref().unwrap_or("<local>"),
            self.port.map_or_else(|| "-".into(), |p| p.to_string()),
            self.pid,
            self.user,
            self.in_recovery,
        )
    }
}

const BACKEND_INFO: &str =
    "SELECT inet_server_addr()::text, inet_server_port(), pg_backend_pid(), current_user::text";
const BACKEND_INFO_RECOVERY: &str = "SELECT inet_server_addr()::text, inet_server_port(), \
     pg_backend_pid(), current_user::text, pg_is_in_recovery()";

/// One client connection through the pooler.
///
/// All statements run over the session's configured [`Protocol`]. Sessions
/// pin `DateStyle` at startup so the report-parameter scenarios begin from a
/// known display format, the same way an interactive client would configure
/// its driver.
pub struct Session {
    id: usize,
    protocol: Protocol,
    client: Client,
    conn: JoinHandle<()>,
}

impl Session {
    pub async fn connect(url: &str, protocol: Protocol, id: usize) -> Result<Session, SessionError> {
        let mut config: Config = url.parse().map_err(|source| SessionError::Connect {
            url: url.into(),
            source,
        })?;
        config.options("-c DateStyle=ISO,MDY");
        let (client, connection) =
            config
                .connect(NoTls)
                .await
                .map_err(|source| SessionError::Connect {
                    url: url.into(),
                    source,
                })?;
        let conn = tokio::spawn(async move {
            if let Err(e) = connection.await {
                // Expected when the session is dropped mid-transaction.
                debug!("connection task ended: {e}");
            }
        });
        debug!("[conn{id}] connected ({protocol})");
        Ok(Session {
            id,
            protocol,
            client,
            conn,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// The underlying client, for typed catalog queries.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Executes a statement, discarding any result rows.
    pub async fn execute(&self, sql: &str) -> Result<(), SessionError> {
        debug!("[conn{}/{}] {}", self.id, self.protocol, sql);
        match self.protocol {
            Protocol::Simple => {
                self.client.batch_execute(sql).await?;
            }
            Protocol::Extended => {
                self.client.execute(sql, &[]).await?;
            }
        }
        Ok(())
    }

    /// Returns the value of `SHOW <name>`.
    pub async fn show(&self, name: &str) -> Result<String, SessionError> {
        let sql = format!("SHOW {name}");
        debug!("[conn{}/{}] {}", self.id, self.protocol, sql);
        match self.protocol {
            Protocol::Simple => {
                let messages = self.client.simple_query(&sql).await?;
                let row = first_row(messages)
                    .ok_or_else(|| SessionError::EmptyResult(sql.clone()))?;
                Ok(row.get(0).unwrap_or_default().to_string())
            }
            Protocol::Extended => {
                let row = self.client.query_one(&sql, &[]).await?;
                Ok(row.get(0))
            }
        }
    }

    /// Returns the identity of the backend currently serving this session.
    pub async fn backend_info(&self) -> Result<BackendInfo, SessionError> {
        self.backend(false).await
    }

    /// Like [`Session::backend_info`], additionally reporting whether the
    /// backend is a standby in recovery.
    pub async fn backend_info_with_recovery(&self) -> Result<BackendInfo, SessionError> {
        self.backend(true).await
    }

    async fn backend(&self, with_recovery: bool) -> Result<BackendInfo, SessionError> {
        let sql = if with_recovery {
            BACKEND_INFO_RECOVERY
        } else {
            BACKEND_INFO
        };
        debug!("[conn{}/{}] {}", self.id, self.protocol, sql);
        match self.protocol {
            Protocol::Simple => {
                let messages = self.client.simple_query(sql).await?;
                let row = first_row(messages)
                    .ok_or_else(|| SessionError::EmptyResult(sql.into()))?;
                let text = |i: usize| row.get(i).map(str::to_string);
                let pid = text(2)
                    .unwrap_or_default()
                    .parse()
                    .map_err(|_| SessionError::Malformed("pg_backend_pid".into()))?;
                let port = match text(1) {
                    Some(p) => Some(
                        p.parse()
                            .map_err(|_| SessionError::Malformed("inet_server_port".into()))?,
                    ),
                    None => None,
                };
                Ok(BackendInfo {
                    addr: text(0),
                    port,
                    pid,
                    user: text(3).unwrap_or_default(),
                    in_recovery: with_recovery && text(4).as_deref() == Some("t"),
                })
            }
            Protocol::Extended => {
                let row = self.client.query_one(sql, &[]).await?;
                Ok(BackendInfo {
                    addr: row.get(0),
                    port: row.get(1),
                    pid: row.get(2),
                    user: row.get(3),
                    in_recovery: with_recovery && row.get(4),
                })
            }
        }
    }

    /// Closes the session, waiting for the server connection to wind down so
    /// the pooler sees the release before the next scenario step.
    pub async fn close(self) {
        drop(self.client);
        if let Err(e) = self.conn.await {
            warn!("connection task panicked: {e}");
        }
    }
}

fn first_row(messages: Vec<SimpleQueryMessage>) -> Option<tokio_postgres::SimpleQueryRow> {
    messages.into_iter().find_map(|m| match m {
        SimpleQueryMessage::Row(row) => Some(row),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_labels() {
        assert_eq!(Protocol::Simple.to_string(), "simple");
        assert_eq!(Protocol::Extended.to_string(), "extended");
    }

    #[test]
    fn backend_info_display_handles_local_sockets() {
        let info = BackendInfo {
            addr: None,
            port: None,
            pid: 4242,
            user: "postgres".into(),
            in_recovery: false,
        };
        let rendered = info.to_string();
        assert!(rendered.contains("pid=4242"));
        assert!(rendered.contains("addr=<local>"));
    }
}
