//! Tests for the batch rehost driver against a mock vendor and a
//! filesystem object store.

use image::{DynamicImage, ImageFormat, RgbImage};
use rehost::{
    BatchOptions, BatchRehoster, Credentials, RehostConfig, StoreBackend, build_cache,
};
use rehost_core::sha256_hex;
use serde_json::Value;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const MIRROR_BASE: &str = "http://mirror.test/media";

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

/// Dry-run configuration: vendor is the mock server's host, store is a
/// temp directory, no delays between retries.
fn test_config(dir: &TempDir) -> RehostConfig {
    let mut config = RehostConfig::default();
    config.vendor.domain = "127.0.0.1".to_string();
    config.store.backend = StoreBackend::Filesystem;
    config.store.root = dir.path().join("store");
    config.store.public_base_url = MIRROR_BASE.to_string();
    config.store.mirror_host = "mirror.test".to_string();
    config.cache.retry = config.cache.retry.clone().without_delays();
    config
}

fn rehoster(config: &RehostConfig) -> BatchRehoster {
    let cache = build_cache(config, &Credentials::default()).unwrap();
    BatchRehoster::from_config(cache, config)
}

fn options(dir: &TempDir) -> BatchOptions {
    BatchOptions {
        input: dir.path().join("in.jsonl"),
        output: dir.path().join("out.jsonl"),
        limit: 0,
        concurrency: 3,
        resume: false,
        progress_every: 0,
    }
}

fn write_lines(path: &Path, lines: &[String]) {
    let mut text = lines.join("\n");
    text.push('\n');
    std::fs::write(path, text).unwrap();
}

fn read_records(path: &PathBuf) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn rewrites_vendor_photo_to_content_addressed_url() {
    let server = MockServer::start().await;
    let body = jpeg(4, 3);
    Mock::given(method("GET"))
        .and(path("/img.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.clone())
                .insert_header("content-type", "image/jpeg"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let opts = options(&dir);
    write_lines(
        &opts.input,
        &[format!(
            r#"{{"sourceAnimalId":"42","photos":[{{"url":"{}/img.jpg?w=100"}}]}}"#,
            server.uri()
        )],
    );

    let summary = rehoster(&config).run(&opts).await.unwrap();

    assert_eq!(summary.records_processed, 1);
    assert_eq!(summary.photos_rehosted, 1);
    assert_eq!(summary.photos_failed, 0);

    let records = read_records(&opts.output);
    let photo = &records[0]["photos"][0];
    let expected_path = format!("assets/{}.jpg", sha256_hex(&body));
    assert_eq!(photo["url"], format!("{}/{}", MIRROR_BASE, expected_path));
    assert!(photo.get("rehostError").is_none());
    assert_eq!(records[0]["sourceAnimalId"], "42");

    let stored = std::fs::read(config.store.root.join(&expected_path)).unwrap();
    assert_eq!(stored, body);
}

#[tokio::test]
async fn failures_are_annotated_and_other_entries_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg(2, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let opts = options(&dir);
    let gone = format!("{}/gone.jpg", server.uri());
    let line = serde_json::json!({
        "m2mId": 7,
        "name": "Rex",
        "photos": [
            {"url": gone.clone(), "order": 1},
            {"url": format!("{}/ok.png", server.uri()), "order": 2, "rehostError": "stale"},
            {"url": "https://example.com/elsewhere.jpg"},
            {"url": format!("{}/assets/done.jpg", MIRROR_BASE)},
            "legacy-string",
            null
        ]
    });
    write_lines(&opts.input, &[line.to_string()]);

    let summary = rehoster(&config).run(&opts).await.unwrap();

    assert_eq!(summary.photos_rehosted, 1);
    assert_eq!(summary.photos_failed, 1);
    assert_eq!(summary.photos_skipped, 2);

    let record = &read_records(&opts.output)[0];
    let photos = record["photos"].as_array().unwrap();
    assert_eq!(photos.len(), 6);

    assert_eq!(photos[0]["url"], gone.as_str());
    assert_eq!(photos[0]["order"], 1);
    let diagnostic = photos[0]["rehostError"].as_str().unwrap();
    assert!(diagnostic.contains("404"));
    assert!(diagnostic.chars().count() <= 200);

    assert!(photos[1]["url"].as_str().unwrap().starts_with(MIRROR_BASE));
    assert!(photos[1].get("rehostError").is_none());
    assert_eq!(photos[1]["order"], 2);

    assert_eq!(photos[2]["url"], "https://example.com/elsewhere.jpg");
    assert_eq!(photos[4], "legacy-string");
    assert!(photos[5].is_null());
    assert_eq!(record["name"], "Rex");
}

#[tokio::test]
async fn resume_skips_records_already_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let mut opts = options(&dir);
    opts.resume = true;

    write_lines(
        &opts.input,
        &[
            r#"{"n":1}"#.to_string(),
            r#"{"n":2}"#.to_string(),
            r#"{"n":3}"#.to_string(),
        ],
    );
    write_lines(&opts.output, &[r#"{"n":1,"already":true}"#.to_string()]);

    let summary = rehoster(&config).run(&opts).await.unwrap();

    assert_eq!(summary.records_resumed, 1);
    assert_eq!(summary.records_processed, 2);

    let text = std::fs::read_to_string(&opts.output).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], r#"{"n":1,"already":true}"#);
    assert_eq!(lines[1], r#"{"n":2}"#);
    assert_eq!(lines[2], r#"{"n":3}"#);
}

#[tokio::test]
async fn resume_discards_a_torn_final_line() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let mut opts = options(&dir);
    opts.resume = true;

    write_lines(
        &opts.input,
        &[
            r#"{"n":1}"#.to_string(),
            r#"{"n":2}"#.to_string(),
            r#"{"n":3}"#.to_string(),
        ],
    );
    std::fs::write(&opts.output, "{\"n\":1}\n{\"n\":").unwrap();

    let summary = rehoster(&config).run(&opts).await.unwrap();

    assert_eq!(summary.records_resumed, 1);
    assert_eq!(summary.records_processed, 2);
    assert_eq!(
        std::fs::read_to_string(&opts.output).unwrap(),
        "{\"n\":1}\n{\"n\":2}\n{\"n\":3}\n"
    );
}

#[tokio::test]
async fn resume_without_output_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let mut opts = options(&dir);
    opts.resume = true;
    write_lines(&opts.input, &[r#"{"n":1}"#.to_string()]);

    let summary = rehoster(&config).run(&opts).await.unwrap();

    assert_eq!(summary.records_resumed, 0);
    assert_eq!(read_records(&opts.output).len(), 1);
}

#[tokio::test]
async fn limit_caps_records_and_blank_lines_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let mut opts = options(&dir);
    opts.limit = 2;
    write_lines(
        &opts.input,
        &[
            r#"{"n":1}"#.to_string(),
            String::new(),
            r#"{"n":2}"#.to_string(),
            r#"{"n":3}"#.to_string(),
        ],
    );

    let summary = rehoster(&config).run(&opts).await.unwrap();

    assert_eq!(summary.records_processed, 2);
    let records = read_records(&opts.output);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["n"], 2);
}

#[tokio::test]
async fn odd_photos_values_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let opts = options(&dir);
    let lines = vec![
        r#"{"n":1,"photos":null}"#.to_string(),
        r#"{"n":2,"photos":{"url":"x"}}"#.to_string(),
        r#"{"n":3,"photos":"a.jpg"}"#.to_string(),
    ];
    write_lines(&opts.input, &lines);

    let summary = rehoster(&config).run(&opts).await.unwrap();

    assert_eq!(summary.records_processed, 3);
    assert_eq!(summary.photos_rehosted, 0);
    assert_eq!(summary.photos_failed, 0);
    let text = std::fs::read_to_string(&opts.output).unwrap();
    assert_eq!(text.lines().collect::<Vec<_>>(), lines);
}

#[tokio::test]
async fn malformed_line_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let opts = options(&dir);
    write_lines(
        &opts.input,
        &[r#"{"n":1}"#.to_string(), "{broken".to_string()],
    );

    let err = rehoster(&config).run(&opts).await.unwrap_err();
    assert!(err.diagnostic().contains("input line 2"));

    // The good record before the bad line was still written
    assert_eq!(read_records(&opts.output).len(), 1);
}

#[tokio::test]
async fn photo_order_survives_out_of_order_completion() {
    let server = MockServer::start().await;
    let bodies: Vec<Vec<u8>> = (1..=3).map(|n| jpeg(n, n)).collect();
    for (i, body) in bodies.iter().enumerate() {
        // The first photo is the slowest to answer
        let delay = Duration::from_millis(150 - 50 * i as u64);
        Mock::given(method("GET"))
            .and(path(format!("/p{}.jpg", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(body.clone())
                    .set_delay(delay),
            )
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let opts = options(&dir);
    let photos: Vec<Value> = (0..3)
        .map(|i| serde_json::json!({ "url": format!("{}/p{}.jpg", server.uri(), i) }))
        .collect();
    write_lines(
        &opts.input,
        &[serde_json::json!({ "sourceAnimalId": "1", "photos": photos }).to_string()],
    );

    let summary = rehoster(&config).run(&opts).await.unwrap();
    assert_eq!(summary.photos_rehosted, 3);

    let record = &read_records(&opts.output)[0];
    for (i, body) in bodies.iter().enumerate() {
        let url = record["photos"][i]["url"].as_str().unwrap();
        assert!(url.contains(&sha256_hex(body)), "photo {} out of place", i);
    }
}

#[tokio::test]
async fn missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let opts = options(&dir);

    assert!(rehoster(&config).run(&opts).await.is_err());
}
