use axum::extract::{RawForm, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use research_core::{AppViewModel, Msg, PresetCatalog, CUSTOM_URL_SLOTS};
use research_logging::{research_error, research_warn};
use url::form_urlencoded;

use crate::render::render_page;
use crate::session::{session_cookie, session_id_from_headers, SessionHandle, SessionStore};

#[derive(Clone)]
pub struct ServerState {
    pub sessions: SessionStore,
}

impl ServerState {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }
}

pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/process", post(process))
        .route("/ask", post(ask))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Viewing the page does not start a session; the first form post does.
async fn index(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    let view = match state
        .sessions
        .existing(session_id_from_headers(&headers).as_deref())
    {
        Some(handle) => handle.lock().await.state.view(),
        None => state.sessions.blank_state().view(),
    };
    page_response(&view, None)
}

async fn process(
    State(state): State<ServerState>,
    headers: HeaderMap,
    RawForm(body): RawForm,
) -> Response {
    let form = ProcessForm::parse(&body);
    interact(&state, &headers, form.into_msgs()).await
}

async fn ask(State(state): State<ServerState>, headers: HeaderMap, RawForm(body): RawForm) -> Response {
    let question = form_urlencoded::parse(&body)
        .find(|(key, _)| key == "question")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();
    interact(&state, &headers, vec![Msg::QuestionSubmitted(question)]).await
}

/// One round trip: resolve the session, run the messages, render the page.
async fn interact(state: &ServerState, headers: &HeaderMap, msgs: Vec<Msg>) -> Response {
    let lookup = state
        .sessions
        .resolve(session_id_from_headers(headers).as_deref());

    // Detached, so a client that goes away mid-ingestion cannot leave the
    // session's corpus and its workflow state out of step.
    match tokio::spawn(run_interaction(lookup.handle, msgs)).await {
        Ok(view) => page_response(&view, lookup.created.then_some(lookup.id.as_str())),
        Err(err) => {
            research_error!("Interaction in session {} failed: {}", lookup.id, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn run_interaction(handle: SessionHandle, msgs: Vec<Msg>) -> AppViewModel {
    let mut session = handle.lock().await;
    warn_unknown_presets(session.state.catalog(), &msgs);
    let next = session
        .controller
        .dispatch_all(session.state.clone(), msgs)
        .await;
    session.state = next;
    session.state.view()
}

fn page_response(view: &AppViewModel, new_session: Option<&str>) -> Response {
    let mut response = Html(render_page(view)).into_response();
    if let Some(id) = new_session {
        match HeaderValue::from_str(&session_cookie(id)) {
            Ok(value) => {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            Err(err) => research_error!("Invalid session cookie for {}: {}", id, err),
        }
    }
    response
}

fn warn_unknown_presets(catalog: &PresetCatalog, msgs: &[Msg]) {
    for msg in msgs {
        if let Msg::PresetsSelected(labels) = msg {
            for label in labels.iter().filter(|label| !catalog.contains(label)) {
                research_warn!("Ignoring unknown preset {:?}", label);
            }
        }
    }
}

/// Fields of the "Process URLs" form: repeated `preset` plus `url1`..`url3`.
#[derive(Debug, Default, PartialEq, Eq)]
struct ProcessForm {
    presets: Vec<String>,
    urls: Vec<String>,
}

impl ProcessForm {
    fn parse(body: &[u8]) -> Self {
        let mut form = Self {
            presets: Vec::new(),
            urls: vec![String::new(); CUSTOM_URL_SLOTS],
        };
        for (key, value) in form_urlencoded::parse(body) {
            if key == "preset" {
                form.presets.push(value.into_owned());
            } else if let Some(slot) = key
                .strip_prefix("url")
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| (1..=CUSTOM_URL_SLOTS).contains(n))
            {
                form.urls[slot - 1] = value.into_owned();
            }
        }
        form
    }

    fn into_msgs(self) -> Vec<Msg> {
        let mut msgs = Vec::with_capacity(CUSTOM_URL_SLOTS + 2);
        msgs.push(Msg::PresetsSelected(self.presets));
        msgs.extend(
            self.urls
                .into_iter()
                .enumerate()
                .map(|(slot, text)| Msg::CustomUrlEdited { slot, text }),
        );
        msgs.push(Msg::ProcessClicked);
        msgs
    }
}
