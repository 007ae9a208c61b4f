use std::collections::HashMap;
use std::sync::Arc;

use object_store::ObjectStore;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;

use kerf::application::ports::{Loader, LoaderError, Persister};
use kerf::domain::Reference;
use kerf::infrastructure::storage::{ObjectStoreTransfer, StoreResolver};

fn reference(raw: &str) -> Reference {
    Reference::parse(raw).unwrap()
}

fn memory_transfer(prefix: &str) -> (Arc<InMemory>, ObjectStoreTransfer) {
    let store = Arc::new(InMemory::new());
    let resolver = StoreResolver::new(HashMap::new())
        .with_default_store(store.clone(), StorePath::from(prefix));
    (store, ObjectStoreTransfer::new(Arc::new(resolver)))
}

#[tokio::test]
async fn given_default_store_when_loading_path_then_key_is_prefixed() {
    let (store, transfer) = memory_transfer("audio");
    store
        .put(&StorePath::from("audio/in/a.wav"), b"wave bytes".to_vec().into())
        .await
        .unwrap();
    let dir = tempfile::TempDir::new().unwrap();
    let destination = dir.path().join("scratch.wav");

    transfer
        .load(&reference("/in/a.wav"), &destination)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&destination).unwrap(), b"wave bytes");
}

#[tokio::test]
async fn given_missing_object_when_loading_then_not_found() {
    let (_store, transfer) = memory_transfer("");
    let dir = tempfile::TempDir::new().unwrap();

    let err = transfer
        .load(&reference("missing.wav"), &dir.path().join("x.wav"))
        .await
        .unwrap_err();

    assert!(matches!(err, LoaderError::NotFound(_)));
}

#[tokio::test]
async fn given_small_file_when_persisting_then_object_holds_file_bytes() {
    let (store, transfer) = memory_transfer("out");
    let dir = tempfile::TempDir::new().unwrap();
    let source = dir.path().join("encoded.mp3");
    std::fs::write(&source, b"encoded").unwrap();

    transfer
        .persist(&reference("clips/a.mp3"), &source)
        .await
        .unwrap();

    let stored = store
        .get(&StorePath::from("out/clips/a.mp3"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(stored.as_ref(), b"encoded");
}

#[tokio::test]
async fn given_file_above_threshold_when_persisting_then_multipart_upload_round_trips() {
    let (store, transfer) = memory_transfer("");
    let transfer = transfer.with_multipart_threshold(1024);
    let dir = tempfile::TempDir::new().unwrap();
    let source = dir.path().join("big.wav");
    let payload: Vec<u8> = (0..3 * 1024 * 1024 + 17).map(|i| (i % 251) as u8).collect();
    std::fs::write(&source, &payload).unwrap();

    transfer
        .persist(&reference("big.wav"), &source)
        .await
        .unwrap();

    let stored = store
        .get(&StorePath::from("big.wav"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(stored.len(), payload.len());
    assert_eq!(stored.as_ref(), payload.as_slice());
}

#[tokio::test]
async fn given_no_default_store_when_persisting_path_then_local_file_is_written() {
    let transfer = ObjectStoreTransfer::new(Arc::new(StoreResolver::new(HashMap::new())));
    let dir = tempfile::TempDir::new().unwrap();
    let source = dir.path().join("encoded.ogg");
    std::fs::write(&source, b"vorbis").unwrap();
    let target = dir.path().join("nested/out.ogg");

    transfer
        .persist(&reference(target.to_str().unwrap()), &source)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&target).unwrap(), b"vorbis");
}

#[tokio::test]
async fn given_file_url_when_loading_then_local_file_is_copied() {
    let transfer = ObjectStoreTransfer::new(Arc::new(StoreResolver::new(HashMap::new())));
    let dir = tempfile::TempDir::new().unwrap();
    let source = dir.path().join("in.flac");
    std::fs::write(&source, b"flac bytes").unwrap();
    let url = url::Url::from_file_path(&source).unwrap();
    let destination = dir.path().join("scratch.flac");

    transfer
        .load(&reference(url.as_str()), &destination)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&destination).unwrap(), b"flac bytes");
}

#[test]
fn given_default_store_when_resolving_path_then_prefix_is_prepended() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    let resolver = StoreResolver::new(HashMap::new())
        .with_default_store(store, StorePath::from("prefix"));

    let resolved = resolver.resolve(&reference("/a/b.wav")).unwrap();
    assert_eq!(resolved.path.as_ref(), "prefix/a/b.wav");
    assert!(resolver.has_default_store());
}
