//! Tests for the repair driver.

use image::{DynamicImage, ImageFormat, RgbImage};
use rehost::{
    Credentials, RehostConfig, RepairOptions, Repairer, StoreBackend, build_cache,
};
use serde_json::{Value, json};
use std::io::Cursor;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const MIRROR_BASE: &str = "http://mirror.test/media";

fn jpeg() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(3, 3))
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

fn setup(dir: &TempDir) -> (Repairer, RepairOptions) {
    let mut config = RehostConfig::default();
    config.vendor.domain = "127.0.0.1".to_string();
    config.store.backend = StoreBackend::Filesystem;
    config.store.root = dir.path().join("store");
    config.store.public_base_url = MIRROR_BASE.to_string();
    config.store.mirror_host = "mirror.test".to_string();
    config.cache.retry = config.cache.retry.clone().without_delays();

    let cache = build_cache(&config, &Credentials::default()).unwrap();
    let options = RepairOptions {
        input: dir.path().join("rehosted.jsonl"),
        output: dir.path().join("repaired.jsonl"),
        limit: 0,
        concurrency: 6,
        progress_every: 0,
    };
    (Repairer::from_config(cache, &config), options)
}

fn write_records(path: &std::path::Path, records: &[Value]) {
    let text: String = records.iter().map(|r| format!("{}\n", r)).collect();
    std::fs::write(path, text).unwrap();
}

fn read_records(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn vanished_source_is_marked_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (repairer, options) = setup(&dir);
    write_records(
        &options.input,
        &[json!({
            "sourceAnimalId": "42",
            "photos": [{
                "url": format!("{}/gone.jpg", server.uri()),
                "rehostError": "http_503:earlier failure"
            }]
        })],
    );

    let summary = repairer.run(&options).await.unwrap();

    assert_eq!(summary.records_processed, 1);
    assert_eq!(summary.photos_repaired, 1);
    assert_eq!(summary.photos_marked_missing, 1);
    assert_eq!(summary.photos_still_failed, 0);

    let photo = &read_records(&options.output)[0]["photos"][0];
    assert_eq!(photo["url"], "");
    assert_eq!(photo["missing"], true);
    assert!(photo.get("rehostError").is_none());
}

#[tokio::test]
async fn only_unfinished_photos_are_attempted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/retry.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forbidden.jpg"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (repairer, options) = setup(&dir);
    let mirrored = format!("{}/assets/already.jpg", MIRROR_BASE);
    write_records(
        &options.input,
        &[
            json!({"m2mId": "1", "photos": [
                {"url": format!("{}/retry.jpg", server.uri()), "rehostError": "timeout:old"},
                {"url": mirrored.clone()},
                {"url": "https://elsewhere.example/a.jpg"}
            ]}),
            json!({"m2mId": "2", "photos": [
                {"url": format!("{}/forbidden.jpg", server.uri()), "rehostError": "old"}
            ]}),
            json!({"m2mId": "3"}),
        ],
    );

    let summary = repairer.run(&options).await.unwrap();

    assert_eq!(summary.records_processed, 3);
    assert_eq!(summary.photos_repaired, 1);
    assert_eq!(summary.photos_marked_missing, 0);
    assert_eq!(summary.photos_still_failed, 1);

    let records = read_records(&options.output);
    let first = records[0]["photos"].as_array().unwrap();
    assert!(first[0]["url"].as_str().unwrap().starts_with(MIRROR_BASE));
    assert!(first[0].get("rehostError").is_none());
    assert_eq!(first[1]["url"], mirrored.as_str());
    assert_eq!(first[2]["url"], "https://elsewhere.example/a.jpg");

    let second = &records[1]["photos"][0];
    assert!(second["url"].as_str().unwrap().ends_with("/forbidden.jpg"));
    assert!(second["rehostError"].as_str().unwrap().starts_with("http_403"));
    assert!(second.get("missing").is_none());

    assert_eq!(records[2], json!({"m2mId": "3"}));
}

#[tokio::test]
async fn output_is_rewritten_from_scratch() {
    let dir = tempfile::tempdir().unwrap();
    let (repairer, options) = setup(&dir);
    write_records(&options.input, &[json!({"n": 1})]);
    std::fs::write(&options.output, "stale\nstale\nstale\n").unwrap();

    repairer.run(&options).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(&options.output).unwrap(),
        "{\"n\":1}\n"
    );
    // Input is untouched
    assert_eq!(
        std::fs::read_to_string(&options.input).unwrap(),
        "{\"n\":1}\n"
    );
}
