use chatdigest_core::{find_room_id, PipelineError, Result, SourceDoc, TimeRange};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

pub const CHATLOG_PATH: &str = "/api/v1/chatlog";
pub const CHATROOM_PATH: &str = "/api/v1/chatroom";
pub const SESSION_PATH: &str = "/api/v1/session";

/// Read-only client for the chat-log service.
#[derive(Clone, Debug)]
pub struct ChatlogClient {
    server_url: String,
    http: Client,
}

/// Result of fetching several rooms in turn.
#[derive(Clone, Debug, Default)]
pub struct Gathered {
    pub sessions: String,
    pub blocks: Vec<SourceDoc>,
}

impl ChatlogClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            http: Client::new(),
        }
    }

    /// API URL for `path`. The configured URL points at the service's `/sse`
    /// endpoint, which is swapped for the REST path.
    pub fn endpoint(&self, path: &str) -> String {
        if self.server_url.contains("/sse") {
            self.server_url.replace("/sse", path)
        } else {
            format!("{}{path}", self.server_url.trim_end_matches('/'))
        }
    }

    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = self.endpoint(path);
        debug!(%url, ?query, "GET");
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| PipelineError::external(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PipelineError::external(format!("reading {url} failed: {e}")))?;
        let body = String::from_utf8_lossy(&bytes).to_string();
        if status != StatusCode::OK {
            return Err(PipelineError::ExternalToolFailure {
                context: format!("GET {url} returned HTTP {status}"),
                stdout: body,
                stderr: String::new(),
            });
        }
        Ok(body)
    }

    /// Transcript of `talker` over `range`.
    pub async fn fetch_transcript(&self, talker: &str, range: &TimeRange) -> Result<String> {
        info!(talker, time = %range.to_query(), "fetching transcript");
        self.get_text(
            CHATLOG_PATH,
            &[("talker", talker.to_string()), ("time", range.to_query())],
        )
        .await
    }

    /// Last `limit` messages of `chatroom`.
    pub async fn fetch_recent(&self, chatroom: &str, limit: u32) -> Result<String> {
        self.get_text(
            CHATLOG_PATH,
            &[("chatroom", chatroom.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// Comma-separated room listing with a header row.
    pub async fn list_rooms(&self) -> Result<String> {
        self.get_text(CHATROOM_PATH, &[]).await
    }

    pub async fn list_sessions(&self) -> Result<String> {
        self.get_text(SESSION_PATH, &[]).await
    }

    /// Room id whose display name contains `term`. Every failure reads as no match.
    pub async fn lookup_room_id(&self, term: &str) -> Option<String> {
        match self.list_rooms().await {
            Ok(listing) => find_room_id(&listing, term),
            Err(e) => {
                debug!(error = %e, "room listing unavailable");
                None
            }
        }
    }

    /// Sessions overview plus the recent log of every room that answered.
    ///
    /// Rooms that fail are skipped with a warning; a failing session listing aborts.
    pub async fn gather(&self, rooms: &[String], limit: u32) -> Result<Gathered> {
        let sessions = self.list_sessions().await?;
        debug!(preview = %preview(&sessions, 500), "recent sessions");

        let mut blocks = Vec::new();
        for room in rooms {
            match self.fetch_recent(room, limit).await {
                Ok(data) => {
                    info!(room = %room, chars = data.chars().count(), "got chat log");
                    blocks.push(SourceDoc::new(room.clone(), data));
                }
                Err(e) => warn!(room = %room, error = %e, "skipping room"),
            }
        }
        Ok(Gathered { sessions, blocks })
    }
}

fn preview(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_replaces_sse_suffix() {
        let c = ChatlogClient::new("http://127.0.0.1:5030/sse");
        assert_eq!(c.endpoint(CHATLOG_PATH), "http://127.0.0.1:5030/api/v1/chatlog");
    }

    #[test]
    fn endpoint_appends_when_no_sse() {
        let c = ChatlogClient::new("http://127.0.0.1:5030/");
        assert_eq!(c.endpoint(CHATROOM_PATH), "http://127.0.0.1:5030/api/v1/chatroom");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("héllo", 2), "hé");
        assert_eq!(preview("hi", 10), "hi");
    }
}
