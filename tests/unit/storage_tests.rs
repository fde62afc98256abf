/*!
 * Tests for object storage backends
 */

use anyhow::Result;
use bytes::Bytes;

use storyfy::app_config::{StorageBackendKind, StorageConfig};
use storyfy::errors::StorageError;
use storyfy::storage::{build_store, LocalStore, MemoryStore, ObjectStore, CONTENT_TYPE_JSON};

use crate::common;

/// Objects written to the local store land in a directory per bucket
#[tokio::test]
async fn test_localStore_putThenGet_shouldRoundTripBody() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = LocalStore::new(temp_dir.path());

    store
        .put("storyfyscripts", "converted_file.json", Bytes::from(r#"{"content":[]}"#), CONTENT_TYPE_JSON)
        .await?;

    let body = store.get("storyfyscripts", "converted_file.json").await?;
    assert_eq!(&body[..], br#"{"content":[]}"#);
    assert_eq!(
        store.object_path("storyfyscripts", "converted_file.json")?,
        temp_dir.path().join("storyfyscripts").join("converted_file.json")
    );
    Ok(())
}

/// Writing the same key twice keeps the last body
#[tokio::test]
async fn test_localStore_overwrite_shouldKeepLatestBody() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = LocalStore::new(temp_dir.path());

    store.put("b", "k.txt", Bytes::from("first"), "text/plain").await?;
    store.put("b", "k.txt", Bytes::from("second"), "text/plain").await?;

    assert_eq!(&store.get("b", "k.txt").await?[..], b"second");
    Ok(())
}

/// Reading an absent object reports which one
#[tokio::test]
async fn test_memoryStore_missingObject_shouldNameBucketAndKey() {
    let store = MemoryStore::new();

    let error = store.get("storyfyscripts", "uploaded_script.fdx").await.unwrap_err();

    assert!(matches!(error, StorageError::NotFound { .. }));
    assert_eq!(error.to_string(), "Object not found: storyfyscripts/uploaded_script.fdx");
}

/// The configured backend kind decides the store
#[test]
fn test_buildStore_memoryBackend_shouldStartEmpty() {
    let config = StorageConfig {
        backend: StorageBackendKind::Memory,
        ..StorageConfig::default()
    };

    let store = build_store(&config);
    let result = tokio_test::block_on(store.get(&config.upload_bucket, &config.original_key));

    assert!(matches!(result, Err(StorageError::NotFound { .. })));
}

/// The local backend honours an explicit root directory
#[test]
fn test_buildStore_localBackend_shouldWriteUnderRootDir() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = StorageConfig {
        backend: StorageBackendKind::Local,
        root_dir: Some(temp_dir.path().to_path_buf()),
        ..StorageConfig::default()
    };

    let store = build_store(&config);
    tokio_test::block_on(store.put("storifyresponse", "plot_structure_claude.txt", Bytes::from("{}"), "text/plain"))?;

    assert!(temp_dir.path().join("storifyresponse/plot_structure_claude.txt").exists());
    Ok(())
}
