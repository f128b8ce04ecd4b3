use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use research_engine::{
    AnswerError, Answerer, FetchSettings, IndexSettings, IngestError, Ingestor, RagEngine,
    NO_ANSWER,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .mount(server)
        .await;
}

async fn drain(engine: &RagEngine, urls: Vec<String>) -> (Vec<String>, Option<IngestError>) {
    let mut statuses = Vec::new();
    let mut stream = engine.process_urls(urls);
    while let Some(item) = stream.next().await {
        match item {
            Ok(status) => statuses.push(status),
            Err(err) => return (statuses, Some(err)),
        }
    }
    (statuses, None)
}

fn engine() -> RagEngine {
    research_logging::initialize_for_tests();
    RagEngine::new(FetchSettings::default(), IndexSettings::default()).expect("client builds")
}

#[tokio::test]
async fn question_before_ingestion_is_not_processed() {
    let engine = engine();
    let err = engine.generate_answer("30-year rate?").await.unwrap_err();
    assert_eq!(err, AnswerError::NotProcessed);
    assert_eq!(engine.indexed_chunks(), None);
}

#[tokio::test]
async fn ingestion_reports_progress_and_answers_with_sources() {
    let html_a =
        "<html><body><article><p>The 30-year fixed rate is 7.1% this week.</p></article></body></html>";
    let html_b = "<html><body><p>The 15-year fixed rate is 6.4%. The 30-year average was 7.0% last year.</p></body></html>";
    let server = MockServer::start().await;
    page(&server, "/a", html_a).await;
    page(&server, "/b", html_b).await;
    let url_a = format!("{}/a", server.uri());
    let url_b = format!("{}/b", server.uri());

    let engine = engine();
    let (statuses, err) = drain(&engine, vec![url_a.clone(), url_b.clone()]).await;

    assert_eq!(err, None);
    assert_eq!(
        statuses,
        vec![
            "Initializing components...".to_string(),
            format!("Loading data from {url_a}..."),
            format!("Fetched {url_a}: {} bytes", html_a.len()),
            format!("Loading data from {url_b}..."),
            format!("Fetched {url_b}: {} bytes", html_b.len()),
            "Splitting text into chunks...".to_string(),
            "Adding 2 chunks to the index...".to_string(),
            "Resetting document index...".to_string(),
            "Done adding documents to the index.".to_string(),
        ]
    );
    assert_eq!(engine.indexed_chunks(), Some(2));

    let answer = engine.generate_answer("30-year rate this week?").await.unwrap();
    assert_eq!(answer.answer, "The 30-year fixed rate is 7.1% this week.");
    assert_eq!(answer.sources, format!("{url_a}\n{url_b}"));

    let none = engine.generate_answer("weather forecast").await.unwrap();
    assert_eq!(none.answer, NO_ANSWER);
    assert!(none.sources.is_empty());
}

#[tokio::test]
async fn failed_page_stops_the_run_and_keeps_previous_index() {
    let server = MockServer::start().await;
    page(&server, "/good", "<html><body><p>Rates rose today.</p></body></html>").await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let good = format!("{}/good", server.uri());
    let gone = format!("{}/gone", server.uri());

    let engine = engine();
    let (_, err) = drain(&engine, vec![good.clone()]).await;
    assert_eq!(err, None);

    let (statuses, err) = drain(&engine, vec![good.clone(), gone.clone()]).await;
    let err = err.expect("ingestion should fail");
    assert!(err.message.starts_with(&gone), "{}", err.message);
    assert!(err.message.contains("500"), "{}", err.message);
    assert_eq!(statuses.last(), Some(&format!("Loading data from {gone}...")));
    assert!(!statuses.iter().any(|s| s.starts_with("Resetting")));

    let answer = engine.generate_answer("rates").await.unwrap();
    assert_eq!(answer.sources, good);
}

#[tokio::test]
async fn page_without_text_is_an_error() {
    let server = MockServer::start().await;
    page(&server, "/blank", "<html><body><script>app()</script></body></html>").await;
    let blank = format!("{}/blank", server.uri());

    let engine = engine();
    let (_, err) = drain(&engine, vec![blank.clone()]).await;
    assert_eq!(
        err,
        Some(IngestError::new(format!("{blank}: page has no readable text")))
    );
    assert_eq!(engine.indexed_chunks(), None);
}

#[tokio::test]
async fn stream_is_lazy_until_polled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>x</p>", "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine();
    let stream = engine.process_urls(vec![format!("{}/never", server.uri())]);
    drop(stream);
    assert_eq!(engine.indexed_chunks(), None);
    server.verify().await;
}

#[tokio::test]
async fn fresh_corpus_does_not_see_another_engines_pages() {
    let server = MockServer::start().await;
    page(&server, "/alpha", "<html><body><p>Alpha quotes a 30-year rate of 7.1%.</p></body></html>").await;
    let alpha = format!("{}/alpha", server.uri());

    let first = engine();
    let second = first.with_fresh_corpus();
    let (_, err) = drain(&first, vec![alpha.clone()]).await;
    assert_eq!(err, None);

    assert_eq!(first.generate_answer("30-year rate").await.unwrap().sources, alpha);
    assert_eq!(
        second.generate_answer("30-year rate").await.unwrap_err(),
        AnswerError::NotProcessed
    );
    assert_eq!(second.indexed_chunks(), None);
}
