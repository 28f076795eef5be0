use chrono::{Days, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::card::NewsCard;
use crate::client::{QueryRequest, Transport};
use crate::config::AppConfig;
use crate::query::{run_submission, QueryState, RevealTiming, SubmissionEvent};

/// Form fields, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Category,
    Date,
    Translation,
    Language,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Category => Field::Date,
            Field::Date => Field::Translation,
            Field::Translation => Field::Language,
            Field::Language => Field::Category,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Category => Field::Language,
            Field::Date => Field::Category,
            Field::Translation => Field::Date,
            Field::Language => Field::Translation,
        }
    }
}

pub struct App {
    transport: Arc<dyn Transport>,
    timing: RevealTiming,

    // Query form
    pub field: Field,
    pub categories: Vec<String>,
    pub selected_category: usize,
    pub date: NaiveDate,
    pub translate: bool,
    pub languages: Vec<String>,
    pub selected_language: usize,

    // Query lifecycle. `state` is the single source of truth for which
    // indicator is visible; `cards` is the output surface.
    pub state: QueryState,
    pub cards: Vec<NewsCard>,
    events: Option<mpsc::UnboundedReceiver<SubmissionEvent>>,

    // Results scroll offset (lines)
    pub scroll: u16,

    pub show_help: bool,
    pub frames: u64,
}

impl App {
    pub fn new(config: &AppConfig, transport: Arc<dyn Transport>, timing: RevealTiming) -> Self {
        let selected_category = config
            .default_category
            .as_ref()
            .and_then(|name| config.categories.iter().position(|c| c == name))
            .unwrap_or(0);
        let selected_language = config
            .default_language
            .as_ref()
            .and_then(|code| config.languages.iter().position(|l| l == code))
            .unwrap_or(0);

        Self {
            transport,
            timing,

            field: Field::Category,
            categories: config.categories.clone(),
            selected_category,
            date: Local::now().date_naive(),
            translate: config.translate_by_default,
            languages: config.languages.clone(),
            selected_language,

            state: QueryState::Idle,
            cards: Vec::new(),
            events: None,

            scroll: 0,

            show_help: false,
            frames: 0,
        }
    }

    /// Select a category by name, appending it if it is not in the
    /// configured list (the category string is free-form on the wire).
    pub fn select_category(&mut self, name: &str) {
        match self.categories.iter().position(|c| c == name) {
            Some(index) => self.selected_category = index,
            None => {
                self.categories.push(name.to_string());
                self.selected_category = self.categories.len() - 1;
            }
        }
    }

    /// Select a translation language by code, appending unknown codes.
    pub fn select_language(&mut self, code: &str) {
        match self.languages.iter().position(|l| l == code) {
            Some(index) => self.selected_language = index,
            None => {
                self.languages.push(code.to_string());
                self.selected_language = self.languages.len() - 1;
            }
        }
    }

    pub fn current_category(&self) -> &str {
        self.categories
            .get(self.selected_category)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn current_language(&self) -> &str {
        self.languages
            .get(self.selected_language)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Snapshot the form into an outbound request. The language code is
    /// only sent when translation is requested.
    pub fn current_request(&self) -> QueryRequest {
        QueryRequest {
            category: self.current_category().to_string(),
            date: self.date,
            translation: self.translate,
            translation_language: if self.translate {
                self.current_language().to_string()
            } else {
                String::new()
            },
        }
    }

    /// Start a submission. Rejected while one is already in flight; the
    /// UI greys out the submit hint for the same reason, but the guard
    /// here holds even if the key handling were bypassed.
    pub fn submit(&mut self) {
        if self.state.is_loading() {
            return;
        }

        // Clear prior output before any async work, so a new query never
        // shows stale cards even transiently.
        self.cards.clear();
        self.scroll = 0;
        self.state = QueryState::Loading;

        let request = self.current_request();
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(rx);
        tokio::spawn(run_submission(
            self.transport.clone(),
            request,
            self.timing,
            tx,
        ));
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        match key.code {
            KeyCode::Tab => self.field = self.field.next(),
            KeyCode::BackTab => self.field = self.field.prev(),

            KeyCode::Left | KeyCode::Char('h') => self.adjust_field(-1),
            KeyCode::Right | KeyCode::Char('l') => self.adjust_field(1),

            KeyCode::Char(' ') => {
                if self.field == Field::Translation {
                    self.translate = !self.translate;
                }
            }

            // Reset the date field to today
            KeyCode::Char('t') => {
                if self.field == Field::Date {
                    self.date = Local::now().date_naive();
                }
            }

            KeyCode::Enter => self.submit(),

            // Results scroll
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),

            KeyCode::Char('?') => self.show_help = true,

            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i64) {
        match self.field {
            Field::Category => {
                self.selected_category = cycle(self.selected_category, self.categories.len(), delta);
            }
            Field::Date => {
                self.date = if delta >= 0 {
                    self.date
                        .checked_add_days(Days::new(delta as u64))
                        .unwrap_or(self.date)
                } else {
                    self.date
                        .checked_sub_days(Days::new(delta.unsigned_abs()))
                        .unwrap_or(self.date)
                };
            }
            Field::Translation => self.translate = !self.translate,
            Field::Language => {
                self.selected_language = cycle(self.selected_language, self.languages.len(), delta);
            }
        }
    }

    /// Drain pipeline events and apply them to the UI state. Called every
    /// frame from the main loop.
    pub fn tick(&mut self) {
        self.frames = self.frames.wrapping_add(1);

        let Some(rx) = self.events.as_mut() else {
            return;
        };

        let mut drained = Vec::new();
        let mut disconnected = false;
        loop {
            match rx.try_recv() {
                Ok(event) => drained.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        for event in drained {
            self.apply(event);
        }

        if disconnected {
            // The pipeline went away without a terminal event. Loading
            // must still clear exactly once.
            if self.state.is_loading() {
                self.state = QueryState::Error("News query stopped unexpectedly".to_string());
            }
            self.events = None;
        }
    }

    fn apply(&mut self, event: SubmissionEvent) {
        match event {
            SubmissionEvent::Card(card) => self.cards.push(card),
            SubmissionEvent::Opacity(value) => {
                if let Some(card) = self.cards.last_mut() {
                    card.opacity = value;
                }
            }
            SubmissionEvent::Failed(message) => self.state = QueryState::Error(message),
            SubmissionEvent::Empty => self.state = QueryState::Empty,
            SubmissionEvent::Done(count) => {
                // Error and Empty already left Loading; don't overwrite them.
                if self.state.is_loading() {
                    self.state = QueryState::Populated(count);
                }
                self.events = None;
            }
        }
    }
}

fn cycle(current: usize, len: usize, delta: i64) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as i64;
    ((current as i64 + delta).rem_euclid(len)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{NewsResponse, TransportError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubTransport {
        response: Mutex<Option<Result<NewsResponse, TransportError>>>,
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn fetch_news(
            &self,
            _request: &QueryRequest,
        ) -> Result<NewsResponse, TransportError> {
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(NewsResponse::default()))
        }
    }

    fn app_with(result: Result<NewsResponse, TransportError>) -> App {
        let transport = Arc::new(StubTransport {
            response: Mutex::new(Some(result)),
        });
        App::new(&AppConfig::default(), transport, RevealTiming::instant())
    }

    fn response(json: &str) -> NewsResponse {
        serde_json::from_str(json).unwrap()
    }

    /// Pump the app until the in-flight submission settles.
    async fn settle(app: &mut App) {
        for _ in 0..10_000 {
            app.tick();
            if !app.state.is_loading() && app.events.is_none() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("submission never settled");
    }

    #[tokio::test]
    async fn test_submit_enters_loading_and_clears_output() {
        let mut app = app_with(Ok(NewsResponse::default()));
        app.cards.push(NewsCard::from_item(&serde_json::from_str(r#"{"title":"stale","url":"u"}"#).unwrap()));
        app.scroll = 7;

        app.submit();

        assert!(app.state.is_loading());
        assert!(app.cards.is_empty());
        assert_eq!(app.scroll, 0);
    }

    #[tokio::test]
    async fn test_populated_path_renders_all_cards_in_order() {
        let mut app = app_with(Ok(response(
            r#"{"news": [
                {"title": "A", "url": "http://x", "source": "S"},
                {"title": "B", "url": "http://y"}
            ]}"#,
        )));

        app.submit();
        settle(&mut app).await;

        assert_eq!(app.state, QueryState::Populated(2));
        let titles: Vec<&str> = app.cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert!(app.cards.iter().all(|c| c.is_faded_in()));
    }

    #[tokio::test]
    async fn test_reveal_with_zero_timing_settles_within_a_short_pump() {
        // Zero durations must skip their sleeps outright: the pipeline
        // then finishes in a handful of polls even on a scheduler that
        // never gets around to the timer.
        let mut app = app_with(Ok(response(
            r#"{"news": [
                {"title": "A", "url": "http://x"},
                {"title": "B", "url": "http://y"},
                {"title": "C", "url": "http://z"}
            ]}"#,
        )));

        app.submit();
        for _ in 0..500 {
            app.tick();
            if !app.state.is_loading() && app.events.is_none() {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert_eq!(app.state, QueryState::Populated(3));
        assert_eq!(app.cards.len(), 3);
        assert!(app.cards.iter().all(|c| c.is_faded_in()));
    }

    #[tokio::test]
    async fn test_empty_path_shows_empty_and_no_cards() {
        let mut app = app_with(Ok(NewsResponse::default()));

        app.submit();
        settle(&mut app).await;

        assert_eq!(app.state, QueryState::Empty);
        assert!(app.cards.is_empty());
    }

    #[tokio::test]
    async fn test_failure_path_shows_error_and_no_cards() {
        let mut app = app_with(Err(TransportError::Http(
            reqwest::StatusCode::BAD_GATEWAY,
        )));

        app.submit();
        settle(&mut app).await;

        match &app.state {
            QueryState::Error(message) => assert!(!message.is_empty()),
            other => panic!("expected Error, got {:?}", other),
        }
        assert!(app.cards.is_empty());
    }

    #[tokio::test]
    async fn test_resubmission_rejected_while_loading() {
        let mut app = app_with(Ok(NewsResponse::default()));

        app.submit();
        let first_events_live = app.events.is_some();
        app.submit(); // guard: still loading, must be a no-op
        assert!(first_events_live && app.events.is_some());

        settle(&mut app).await;
        assert_eq!(app.state, QueryState::Empty);
    }

    #[tokio::test]
    async fn test_resubmission_after_success_clears_prior_cards() {
        let mut app = app_with(Ok(response(
            r#"{"news": [{"title": "A", "url": "http://x"}]}"#,
        )));
        app.submit();
        settle(&mut app).await;
        assert_eq!(app.cards.len(), 1);

        // Second submission (stub yields an empty response this time)
        app.submit();
        assert!(app.cards.is_empty());
        settle(&mut app).await;
        assert_eq!(app.state, QueryState::Empty);
        assert!(app.cards.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_pipeline_still_clears_loading() {
        let mut app = app_with(Ok(NewsResponse::default()));
        app.state = QueryState::Loading;
        // Simulate a pipeline that died without a terminal event.
        let (tx, rx) = mpsc::unbounded_channel();
        drop(tx);
        app.events = Some(rx);

        app.tick();

        assert!(matches!(app.state, QueryState::Error(_)));
        assert!(app.events.is_none());
    }

    #[test]
    fn test_form_navigation_and_adjustment() {
        let transport = Arc::new(StubTransport {
            response: Mutex::new(None),
        });
        let mut app = App::new(
            &AppConfig::default(),
            transport,
            RevealTiming::instant(),
        );

        assert_eq!(app.field, Field::Category);
        app.handle_key(KeyEvent::from(KeyCode::Tab));
        assert_eq!(app.field, Field::Date);

        let before = app.date;
        app.handle_key(KeyEvent::from(KeyCode::Left));
        assert_eq!(app.date, before.pred_opt().unwrap());
        app.handle_key(KeyEvent::from(KeyCode::Char('t')));
        assert_eq!(app.date, Local::now().date_naive());

        app.handle_key(KeyEvent::from(KeyCode::Tab));
        assert_eq!(app.field, Field::Translation);
        assert!(!app.translate);
        app.handle_key(KeyEvent::from(KeyCode::Char(' ')));
        assert!(app.translate);
    }

    #[test]
    fn test_request_omits_language_when_translation_off() {
        let transport = Arc::new(StubTransport {
            response: Mutex::new(None),
        });
        let mut app = App::new(
            &AppConfig::default(),
            transport,
            RevealTiming::instant(),
        );
        app.select_category("tech");
        app.date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        app.translate = false;

        let request = app.current_request();
        assert_eq!(request.category, "tech");
        assert_eq!(request.date.to_string(), "2024-01-15");
        assert!(!request.translation);
        assert_eq!(request.translation_language, "");

        app.translate = true;
        app.select_language("es");
        assert_eq!(app.current_request().translation_language, "es");
    }
}
