//! Leaderboard score submission
//!
//! Submission is fire-and-forget: the caller hands over a completion callback
//! and carries on. The game never waits on the network, and a failure only
//! costs the remote leaderboard entry. Local high scores are written
//! independently by the session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a finished run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub score: u64,
    pub level_index: usize,
    pub coins: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmitOutcome {
    #[serde(rename = "newHighScore", default)]
    pub new_high_score: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// No backend configured or the network is down
    Unreachable,
    /// Server answered with a non-2xx status
    Status(u16),
    /// Response body was not understood
    Decode(String),
    /// The request could not be built or sent
    Request(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Unreachable => write!(f, "Leaderboard unreachable"),
            BackendError::Status(code) => write!(f, "Leaderboard returned HTTP {}", code),
            BackendError::Decode(msg) => write!(f, "Bad leaderboard response: {}", msg),
            BackendError::Request(msg) => write!(f, "Leaderboard request failed: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

pub type SubmitCallback = Box<dyn FnOnce(Result<SubmitOutcome, BackendError>)>;

/// Remote leaderboard
pub trait ScoreBackend {
    fn name(&self) -> &str;

    /// Start a submission. `on_done` runs exactly once, possibly before this
    /// returns.
    fn submit(&self, submission: ScoreSubmission, on_done: SubmitCallback);
}

/// Parse a leaderboard reply. An empty body counts as a plain success.
pub fn parse_response(body: &str) -> Result<SubmitOutcome, BackendError> {
    if body.trim().is_empty() {
        return Ok(SubmitOutcome::default());
    }
    serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Standard completion handler: log and move on
pub fn log_outcome(submission: ScoreSubmission, result: Result<SubmitOutcome, BackendError>) {
    match result {
        Ok(outcome) if outcome.new_high_score => {
            log::info!("Score {} submitted: new leaderboard high score", submission.score)
        }
        Ok(_) => log::info!("Score {} submitted", submission.score),
        Err(e) => log::warn!("Score {} kept local only: {}", submission.score, e),
    }
}

/// No leaderboard. Every submission fails as unreachable, so runs are
/// recorded locally only.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineBackend;

impl ScoreBackend for OfflineBackend {
    fn name(&self) -> &str {
        "offline"
    }

    fn submit(&self, _submission: ScoreSubmission, on_done: SubmitCallback) {
        on_done(Err(BackendError::Unreachable));
    }
}

/// JSON-over-HTTP leaderboard using the browser's `fetch`
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    url: String,
}

#[cfg(target_arch = "wasm32")]
impl HttpBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.url
    }

    fn submit(&self, submission: ScoreSubmission, on_done: SubmitCallback) {
        let url = self.url.clone();
        wasm_bindgen_futures::spawn_local(async move {
            on_done(post_score(&url, submission).await);
        });
    }
}

#[cfg(target_arch = "wasm32")]
async fn post_score(url: &str, submission: ScoreSubmission) -> Result<SubmitOutcome, BackendError> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    let js_err = |e: JsValue| BackendError::Request(format!("{:?}", e));

    let body = serde_json::to_string(&submission).map_err(|e| BackendError::Request(e.to_string()))?;
    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    init.set_mode(web_sys::RequestMode::Cors);
    init.set_body(&JsValue::from_str(&body));

    let request = web_sys::Request::new_with_str_and_init(url, &init).map_err(js_err)?;
    request.headers().set("Content-Type", "application/json").map_err(js_err)?;

    let window = web_sys::window().ok_or(BackendError::Unreachable)?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|_| BackendError::Unreachable)?;
    let response: web_sys::Response = response.dyn_into().map_err(js_err)?;
    if !response.ok() {
        return Err(BackendError::Status(response.status()));
    }

    let text = JsFuture::from(response.text().map_err(js_err)?).await.map_err(js_err)?;
    parse_response(&text.as_string().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_submission_wire_format() {
        let s = ScoreSubmission {
            score: 1200,
            level_index: 2,
            coins: 35,
        };
        assert_eq!(serde_json::to_string(&s).unwrap(), r#"{"score":1200,"levelIndex":2,"coins":35}"#);
    }

    #[test]
    fn test_parse_response() {
        assert_eq!(parse_response("").unwrap(), SubmitOutcome { new_high_score: false });
        assert_eq!(parse_response(r#"{"newHighScore":true}"#).unwrap(), SubmitOutcome { new_high_score: true });
        assert_eq!(parse_response(r#"{"rank":4}"#).unwrap(), SubmitOutcome { new_high_score: false });
        assert!(matches!(parse_response("<html>"), Err(BackendError::Decode(_))));
    }

    #[test]
    fn test_offline_reports_unreachable() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        OfflineBackend.submit(
            ScoreSubmission {
                score: 1,
                level_index: 0,
                coins: 0,
            },
            Box::new(move |r| *sink.borrow_mut() = Some(r)),
        );
        assert_eq!(*seen.borrow(), Some(Err(BackendError::Unreachable)));
    }
}
