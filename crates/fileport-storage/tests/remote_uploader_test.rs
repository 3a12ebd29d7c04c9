//! Round trips against real buckets. Each test is skipped unless the
//! provider's credentials are present in the environment (or a `.env` file).

mod helpers;

use fileport_core::{AliyunConfig, BackendConfig, QiniuConfig, TencentConfig};
use fileport_storage::{create_uploader_from_config, UploadedFile, Uploader};
use helpers::{extract_key, init_tracing, is_date_sharded_key};
use std::sync::Arc;

async fn round_trip(uploader: Arc<dyn Uploader>) {
    // Delete with the bare key, as callers of the URL-returning API always could.
    let url = uploader
        .upload_binary("fileport_test.bin", b"fileport test data".to_vec())
        .await
        .unwrap();
    assert!(url.starts_with("https://") || url.starts_with("http://"));
    let key = extract_key(&url);
    assert!(is_date_sharded_key(&key, "fileport_test", ".bin"), "unexpected key {key}");
    assert!(uploader.exists(&key).await.unwrap());
    uploader.delete(&key).await.unwrap();
    assert!(!uploader.exists(&key).await.unwrap());

    // Delete with the URL the upload returned.
    let file = UploadedFile::from_bytes("fileport_test.txt", "test file content");
    let url = uploader.upload_file(file).await.unwrap();
    assert!(uploader.exists(&url).await.unwrap());
    uploader.delete(&url).await.unwrap();
    assert!(!uploader.exists(&url).await.unwrap());

    let url = uploader
        .upload_base64("fileport_test.txt", "dGVzdCBkYXRh")
        .await
        .unwrap();
    uploader.delete(&extract_key(&url)).await.unwrap();
}

#[tokio::test]
async fn qiniu_round_trip() {
    init_tracing();
    let Some(config) = QiniuConfig::from_env() else {
        eprintln!("Skipping Qiniu test due to missing environment variables");
        return;
    };

    let uploader = create_uploader_from_config(BackendConfig::Qiniu(config))
        .await
        .unwrap();
    round_trip(uploader).await;
}

#[tokio::test]
async fn aliyun_round_trip() {
    init_tracing();
    let Some(config) = AliyunConfig::from_env() else {
        eprintln!("Skipping Aliyun test due to missing environment variables");
        return;
    };

    let uploader = create_uploader_from_config(BackendConfig::Aliyun(config))
        .await
        .unwrap();
    round_trip(uploader).await;
}

#[tokio::test]
async fn tencent_round_trip() {
    init_tracing();
    let Some(config) = TencentConfig::from_env() else {
        eprintln!("Skipping Tencent test due to missing environment variables");
        return;
    };

    let uploader = create_uploader_from_config(BackendConfig::Tencent(config))
        .await
        .unwrap();
    round_trip(uploader).await;
}
