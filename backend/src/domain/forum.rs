//! Community threads and replies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::uuid_id;
use super::sanitize::{TextBoundsError, check_bounds, sanitize_inline, sanitize_multiline};
use super::user::{DisplayName, UserId};

pub const THREAD_TITLE_MIN: usize = 3;
pub const THREAD_TITLE_MAX: usize = 160;
pub const THREAD_BODY_MAX: usize = 10_000;

uuid_id!(
    /// Identifier of a thread.
    ThreadId
);
uuid_id!(
    /// Identifier of a reply.
    ReplyId
);

/// Validation errors for threads and replies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThreadValidationError {
    #[error("title {0}")]
    Title(TextBoundsError),
    #[error("body {0}")]
    Body(TextBoundsError),
}

impl ThreadValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Body(_) => "body",
        }
    }
}

fn clean_body(raw: &str) -> Result<String, ThreadValidationError> {
    let body = sanitize_multiline(raw);
    check_bounds(&body, 1, THREAD_BODY_MAX).map_err(ThreadValidationError::Body)?;
    Ok(body)
}

/// Validated thread submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewThread {
    pub title: String,
    pub body: String,
}

impl NewThread {
    pub fn try_new(title: &str, body: &str) -> Result<Self, ThreadValidationError> {
        let title = sanitize_inline(title);
        check_bounds(&title, THREAD_TITLE_MIN, THREAD_TITLE_MAX)
            .map_err(ThreadValidationError::Title)?;
        Ok(Self {
            title,
            body: clean_body(body)?,
        })
    }
}

/// Validated reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReply {
    pub body: String,
}

impl NewReply {
    pub fn try_new(body: &str) -> Result<Self, ThreadValidationError> {
        Ok(Self {
            body: clean_body(body)?,
        })
    }
}

/// Thread as listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: ThreadId,
    pub author_id: UserId,
    pub author_name: DisplayName,
    pub title: String,
    pub body: String,
    pub reply_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Reply within a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: ReplyId,
    pub thread_id: ThreadId,
    pub author_id: UserId,
    pub author_name: DisplayName,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A thread together with its replies, oldest reply first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDetail {
    #[serde(flatten)]
    pub thread: Thread,
    pub replies: Vec<Reply>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn sanitises_thread_content() {
        let thread = NewThread::try_new(
            "Hiring <b>Rust</b> devs",
            "We pay well.<script>steal()</script>\n\n\n\nApply!",
        )
        .expect("valid");
        assert_eq!(thread.title, "Hiring Rust devs");
        assert_eq!(thread.body, "We pay well.\n\nApply!");
    }

    #[rstest]
    #[case("Hi", "Body", "title")]
    #[case("Title", "   ", "body")]
    fn rejects_invalid_threads(#[case] title: &str, #[case] body: &str, #[case] field: &str) {
        let err = NewThread::try_new(title, body).expect_err("invalid");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn rejects_overlong_reply() {
        let err = NewReply::try_new(&"r".repeat(THREAD_BODY_MAX + 1)).expect_err("too long");
        assert_eq!(
            err,
            ThreadValidationError::Body(TextBoundsError::TooLong {
                max: THREAD_BODY_MAX
            })
        );
    }
}
