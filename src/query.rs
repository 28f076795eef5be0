//! Submission pipeline: one query, one spawned task, a strictly ordered
//! reveal of the returned items.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::card::NewsCard;
use crate::client::{QueryRequest, Transport, TransportError};

/// Shown when a failure carries no usable message of its own.
const GENERIC_ERROR: &str = "Error fetching news";

/// Which indicators are visible. Exactly one state holds at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    Idle,
    Loading,
    Error(String),
    Empty,
    Populated(usize),
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }
}

/// Timing knobs for the staged reveal. The defaults give each card a
/// ~400 ms fade (20 steps of 5%) with a 200 ms pause between cards;
/// tests run with zero durations.
#[derive(Debug, Clone, Copy)]
pub struct RevealTiming {
    pub fade_tick: Duration,
    pub fade_step: f32,
    pub pacing: Duration,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            fade_tick: Duration::from_millis(20),
            fade_step: 0.05,
            pacing: Duration::from_millis(200),
        }
    }
}

impl RevealTiming {
    /// Same step sequence, no waiting: zero durations skip their sleeps,
    /// so the pipeline never parks on the timer.
    #[cfg(test)]
    pub fn instant() -> Self {
        Self {
            fade_tick: Duration::ZERO,
            fade_step: 0.05,
            pacing: Duration::ZERO,
        }
    }
}

/// Progress reports from the pipeline task back to the app.
#[derive(Debug, Clone)]
pub enum SubmissionEvent {
    /// A new card entered the output at zero opacity.
    Card(NewsCard),
    /// Opacity update for the most recently inserted card.
    Opacity(f32),
    Failed(String),
    Empty,
    /// Pipeline settled; carries the number of cards revealed.
    Done(usize),
}

/// Run one submission to completion. Always ends with a `Done` event,
/// whichever path was taken, so the receiver can clear its loading state
/// exactly once. Sends fail only when the receiver was replaced by a newer
/// submission, in which case the task just winds down.
pub async fn run_submission(
    transport: Arc<dyn Transport>,
    request: QueryRequest,
    timing: RevealTiming,
    tx: mpsc::UnboundedSender<SubmissionEvent>,
) {
    match fetch_and_reveal(transport, request, timing, &tx).await {
        Ok(revealed) => {
            let _ = tx.send(SubmissionEvent::Done(revealed));
        }
        Err(err) => {
            warn!(error = %err, "news query failed");
            let mut message = err.to_string();
            if message.trim().is_empty() {
                message = GENERIC_ERROR.to_string();
            }
            let _ = tx.send(SubmissionEvent::Failed(message));
            let _ = tx.send(SubmissionEvent::Done(0));
        }
    }
}

async fn fetch_and_reveal(
    transport: Arc<dyn Transport>,
    request: QueryRequest,
    timing: RevealTiming,
    tx: &mpsc::UnboundedSender<SubmissionEvent>,
) -> Result<usize, TransportError> {
    debug!(category = %request.category, date = %request.date, "submitting news query");
    let response = transport.fetch_news(&request).await?;

    if response.news.is_empty() {
        let _ = tx.send(SubmissionEvent::Empty);
        return Ok(0);
    }

    let mut revealed = 0;
    for item in &response.news {
        let card = NewsCard::from_item(item);
        if tx.send(SubmissionEvent::Card(card)).is_err() {
            return Ok(revealed);
        }
        if !fade_in(timing, tx).await {
            return Ok(revealed);
        }
        revealed += 1;
        if !timing.pacing.is_zero() {
            tokio::time::sleep(timing.pacing).await;
        }
    }

    Ok(revealed)
}

/// Drive the newest card from zero to full opacity, one step per tick.
/// A zero tick skips the sleep entirely so the step sequence runs without
/// ever parking on the timer. Returns false when the receiver has gone away.
async fn fade_in(timing: RevealTiming, tx: &mpsc::UnboundedSender<SubmissionEvent>) -> bool {
    let mut opacity = 0.0f32;
    while opacity < 1.0 {
        if !timing.fade_tick.is_zero() {
            tokio::time::sleep(timing.fade_tick).await;
        }
        opacity = (opacity + timing.fade_step).min(1.0);
        if tx.send(SubmissionEvent::Opacity(opacity)).is_err() {
            return false;
        }
    }
    true
}
