use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stay_scout::config::{load_config, Config};
use stay_scout::extract::{Extractor, PageQuery, Site, SourceBinding};
use stay_scout::output::{ExportSink, MarkdownExporter, SessionReport};
use stay_scout::session::{
    Orchestrator, Property, SearchTerms, SessionSettings, StopReason, WorkerSettings,
};
use stay_scout::storage::{SqliteStorage, SummaryStore};
use stay_scout::ExtractionResult;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn terms() -> SearchTerms {
    SearchTerms {
        destination: "Chania".to_string(),
        checkin: NaiveDate::from_ymd_opt(2030, 7, 14).unwrap(),
    }
}

/// Writes a config whose sites all point at `base_url`
fn write_config(base_url: &str, sites: &[&str], db_path: &str) -> NamedTempFile {
    let mut content = format!(
        r#"
[session]
poll-interval-ms = 10
join-timeout-secs = 5
request-timeout-secs = 2

[user-agent]
client-name = "TestScout"
client-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "test@example.com"

[output]
database-path = "{}"
"#,
        db_path
    );
    for site in sites {
        content.push_str(&format!(
            "\n[[source]]\nsite = \"{}\"\nbase-url = \"{}\"\n",
            site, base_url
        ));
    }

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn booking_page(listings: &[(&str, &str, &str)]) -> String {
    let mut html = String::from("<html><body>");
    for (name, score, price) in listings {
        html.push_str(&format!(
            r#"<div class="sr_property_block">
                <span class="sr-hotel__name">{}</span>
                <div class="bui-review-score__badge">{}</div>
                <div class="bui-price-display__value">{}</div>
            </div>"#,
            name, score, price
        ));
    }
    html.push_str("</body></html>");
    html
}

async fn run_session(config: &Config) -> SessionReport {
    let orchestrator = Orchestrator::from_config(config, terms()).unwrap();

    tokio::time::timeout(Duration::from_secs(20), orchestrator.run(tokio::io::empty()))
        .await
        .expect("session did not finish")
        .expect("session failed")
}

#[tokio::test]
async fn test_booking_session_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/searchresults.en.html"))
        .and(query_param("offset", "0"))
        .and(query_param("ss", "Chania"))
        .respond_with(ResponseTemplate::new(200).set_body_string(booking_page(&[
            ("Villa Elia", "8.6", "€ 120"),
            ("Anemos", "9.0", "Sold out"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/searchresults.en.html"))
        .and(query_param("offset", "25"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(booking_page(&[("Thalassa", "7.4", "€ 80")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Every later page fails; five failures end the worker
    Mock::given(method("GET"))
        .and(path("/searchresults.en.html"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(503))
        .expect(5)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("scout.db");
    let config_file = write_config(&server.uri(), &["booking"], db_path.to_str().unwrap());
    let config = load_config(config_file.path()).unwrap();

    let report = run_session(&config).await;

    assert_eq!(report.outcomes.len(), 1);
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.site, Site::Booking);
    assert_eq!(outcome.stop_reason, StopReason::RetriesExhausted);
    assert_eq!(outcome.pages_fetched, 7);
    assert_eq!(outcome.properties.get("Anemos").unwrap().price, None);

    let summary = &report.summary;
    assert_eq!(summary.properties_found, 3);
    assert_eq!(summary.unavailable_properties, 1);
    assert!((summary.price_mean.unwrap() - 200.0 / 3.0).abs() < 1e-9);
    assert!((summary.score_mean.unwrap() - 25.0 / 3.0).abs() < 1e-9);

    // Store, read back, and export
    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let id = storage.store(summary).unwrap();
    let history = storage.list_history("Chania", terms().checkin).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, Some(id));
    assert_eq!(history[0].properties_found, 3);

    let report = SessionReport {
        summary: report.summary.with_id(id),
        ..report
    };
    let exporter = MarkdownExporter::new(dir.path().join("exports"));
    let export_path = exporter.export_session(&report).unwrap();
    let markdown = std::fs::read_to_string(export_path).unwrap();
    assert!(markdown.contains(&format!("- **Search id**: {}", id)));
    assert!(markdown.contains("## Properties found in booking.com"));
    assert!(markdown.contains("| Villa Elia | 8.60 | 120.00 |"));
}

#[tokio::test]
async fn test_cycling_pagination_stops_on_duplicate_page() {
    let server = MockServer::start().await;

    let page = r#"<html><body>
        <div class="_8ssblpx">
            <div class="_bzh5lkq">Olive Grove Studio</div>
            <span class="_10fy1f8">4.8</span>
            <span class="_1p7iugi">Price:€65</span>
        </div>
    </body></html>"#;

    // The site keeps serving the same listing whatever the offset
    Mock::given(method("GET"))
        .and(path("/s/Chania/homes"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("scout.db");
    let config_file = write_config(&server.uri(), &["airbnb"], db_path.to_str().unwrap());
    let config = load_config(config_file.path()).unwrap();

    let report = run_session(&config).await;
    let outcome = &report.outcomes[0];

    assert_eq!(outcome.stop_reason, StopReason::NoNewRecords);
    assert_eq!(outcome.pages_fetched, 2);
    let studio = outcome.properties.get("Olive Grove Studio").unwrap();
    assert!((studio.score.unwrap() - 9.6).abs() < 1e-9);
    assert_eq!(studio.price, Some(65.0));
}

#[tokio::test]
async fn test_rate_limited_results_count_as_empty_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Hotels/Search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(5)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Hotels/SearchResults"))
        .and(query_param("pageIndex", "0"))
        .respond_with(ResponseTemplate::new(429))
        .expect(5)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("scout.db");
    let config_file = write_config(&server.uri(), &["hotels-scanner"], db_path.to_str().unwrap());
    let config = load_config(config_file.path()).unwrap();

    let report = run_session(&config).await;

    assert_eq!(report.outcomes[0].stop_reason, StopReason::RetriesExhausted);
    assert_eq!(report.summary.properties_found, 0);
    assert_eq!(report.summary.price_mean, None);
}

#[tokio::test]
async fn test_two_sites_run_concurrently() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.do"))
        .and(query_param("pn", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="hotel-wrap"><h3 class="p-name">Harbour Inn</h3>
               <span class="guest-reviews-badge">Superb 9,2</span>
               <span class="price">€85</span></div>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/searchresults.en.html"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(booking_page(&[("Harbour Inn", "8.0", "€ 95")])),
        )
        .mount(&server)
        .await;

    // Anything else: no listings
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("scout.db");
    let config_file = write_config(
        &server.uri(),
        &["hotels", "booking"],
        db_path.to_str().unwrap(),
    );
    let config = load_config(config_file.path()).unwrap();

    let report = run_session(&config).await;

    let sites: Vec<_> = report.outcomes.iter().map(|o| o.site).collect();
    assert_eq!(sites, vec![Site::Hotels, Site::Booking]);

    // The same name on two sites is counted once per site
    assert_eq!(report.summary.properties_found, 2);
    assert_eq!(report.summary.price_mean, Some(90.0));
}

/// Extractor that returns one scripted page per call, recording page indexes
struct ScriptedExtractor {
    pages: Mutex<Vec<Vec<Property>>>,
    seen: Mutex<Vec<u32>>,
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn fetch_page(&self, query: &PageQuery) -> ExtractionResult<Vec<Property>> {
        self.seen.lock().unwrap().push(query.page_index);
        let mut pages = self.pages.lock().unwrap();
        if pages.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(pages.remove(0))
        }
    }
}

#[tokio::test]
async fn test_summary_from_one_productive_and_one_empty_source() {
    let productive = Arc::new(ScriptedExtractor {
        pages: Mutex::new(vec![vec![
            Property::new("Kastro Suites", Some(9.0), Some(100.0)),
            Property::new("Lemon Tree", Some(7.0), Some(200.0)),
            Property::new("Fisherman's Loft", None, None),
        ]]),
        seen: Mutex::new(Vec::new()),
    });
    let empty = Arc::new(ScriptedExtractor {
        pages: Mutex::new(Vec::new()),
        seen: Mutex::new(Vec::new()),
    });

    let settings = SessionSettings {
        poll_interval: Duration::from_millis(10),
        join_timeout: Duration::from_secs(2),
        pause_notice_interval: Duration::from_secs(5),
        worker: WorkerSettings::default(),
    };
    let orchestrator = Orchestrator::new(
        terms(),
        vec![
            SourceBinding {
                site: Site::Booking,
                extractor: productive.clone(),
            },
            SourceBinding {
                site: Site::Airbnb,
                extractor: empty.clone(),
            },
        ],
        settings,
    );

    let report = orchestrator.run(tokio::io::empty()).await.unwrap();

    assert_eq!(report.summary.properties_found, 3);
    assert_eq!(report.summary.unavailable_properties, 1);
    assert_eq!(report.summary.price_mean, Some(100.0));
    assert_eq!(report.summary.score_mean, Some(16.0 / 3.0));

    // Empty pages retry the same index; the productive site moves on
    assert_eq!(*empty.seen.lock().unwrap(), vec![0, 0, 0, 0, 0]);
    assert_eq!(*productive.seen.lock().unwrap(), vec![0, 1, 1, 1, 1, 1]);
}
