#![cfg(feature = "pdf")]

use std::fs;
use std::path::PathBuf;

use pagesnap::{Error, ExportConfig, ExportRequest, ExportService, ExportStatus, RasterOptions, StyleTree};

fn config(name: &str) -> (ExportConfig, PathBuf) {
    let dir = std::env::temp_dir().join(format!("pagesnap-service-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    let config = ExportConfig {
        output_dir: dir.clone(),
        file_prefix: name.to_string(),
        raster: RasterOptions {
            scale: 1.0,
            ..Default::default()
        },
        ..Default::default()
    };
    (config, dir)
}

fn dashboard() -> StyleTree {
    let json = fs::read_to_string("tests/fixtures/dashboard.json").expect("read fixture");
    StyleTree::from_json(&json).expect("valid snapshot")
}

#[tokio::test]
async fn service_exports_on_worker_thread() {
    let (cfg, dir) = config("worker");
    let service = ExportService::new(move || pagesnap::new_pdf_exporter(cfg))
        .await
        .unwrap();

    let outcome = service
        .export(dashboard(), ExportRequest::element("chart"))
        .await
        .unwrap();
    assert!(outcome.path.starts_with(&dir));
    assert!(outcome.path.exists());
    // 190 x 300 px scaled to 210 mm wide -> ~331.6 mm -> 2 pages
    assert_eq!(outcome.page_count, 2);
    assert_eq!(service.status(), ExportStatus::Idle);

    service.close().await.unwrap();
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn missing_target_writes_nothing() {
    let (cfg, dir) = config("missing");
    let service = ExportService::new(move || pagesnap::new_pdf_exporter(cfg))
        .await
        .unwrap();

    let err = service
        .export(dashboard(), ExportRequest::element("no-such-widget"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingTarget(ref id) if id == "no-such-widget"));
    assert!(!dir.exists());
    assert_eq!(service.status(), ExportStatus::Idle);

    // the worker survives a failed export
    let again = service.export(StyleTree::new(), ExportRequest::whole_tree()).await;
    assert!(matches!(again, Err(Error::MissingTarget(_))));
    service.close().await.unwrap();
}

#[tokio::test]
async fn concurrent_requests_are_serialized() {
    let (cfg, dir) = config("queue");
    let service = ExportService::new(move || pagesnap::new_pdf_exporter(cfg))
        .await
        .unwrap();

    let a = service.export(dashboard(), ExportRequest::element("chart"));
    let b = service.export(dashboard(), ExportRequest::whole_tree());
    let (a, b) = tokio::join!(a, b);
    assert_eq!(a.unwrap().page_count, 2);
    assert_eq!(b.unwrap().page_count, 3);

    service.close().await.unwrap();
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn invalid_config_fails_service_creation() {
    let (mut cfg, _) = config("invalid");
    cfg.page_size.width = 0.0;
    let res = ExportService::new(move || pagesnap::new_pdf_exporter(cfg)).await;
    assert!(matches!(res, Err(Error::ConfigError(_))));
}
