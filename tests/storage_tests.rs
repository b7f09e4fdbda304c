use bytes::Bytes;
use cloud_storage_facade::{
    AppBuilder, BackendKind, BucketName, CloudStorageService, CloudStorageServiceImpl,
    ContentSource, Lookup, ObjectKey, StorageError, create_in_memory_app,
};
use futures::TryStreamExt;
use std::collections::BTreeSet;

fn app() -> CloudStorageServiceImpl {
    create_in_memory_app().unwrap()
}

fn bucket(name: &str) -> BucketName {
    BucketName::new(name).unwrap()
}

fn key(raw: &str) -> ObjectKey {
    ObjectKey::new(raw).unwrap()
}

async fn listed_names(service: &CloudStorageServiceImpl, bucket: &BucketName) -> Vec<String> {
    service
        .list_files(bucket)
        .map_ok(|blob| blob.name().to_string())
        .try_collect()
        .await
        .unwrap()
}

#[tokio::test]
async fn readme_scenario() {
    let service = app();
    let dir = tempfile::tempdir().unwrap();
    let b1 = bucket("b1");

    service.create_bucket(&b1).await.unwrap();

    let blob = service
        .add_file_in_folder(
            &b1,
            "docs",
            "readme.txt",
            ContentSource::from("hello"),
            Some("text/plain"),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(blob.name(), "docs/readme.txt");
    assert_eq!(blob.content_type.as_deref(), Some("text/plain"));

    let path = service.download(&blob, dir.path()).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"hello");

    let readme = key("docs/readme.txt");
    assert!(service.delete_file(&b1, &readme).await.unwrap());
    assert!(service.get_file(&b1, &readme).await.unwrap().is_none());
}

#[tokio::test]
async fn create_bucket_is_idempotent() {
    let service = app();
    let name = bucket("idempotent");

    assert!(service.get_bucket(&name).await.unwrap().is_none());
    assert!(!service.bucket_exists(&name).await.unwrap());

    let first = service.create_bucket(&name).await.unwrap();
    let second = service.create_bucket(&name).await.unwrap();

    assert_eq!(first.name, name);
    assert_eq!(first, second);
    assert_eq!(service.get_bucket(&name).await.unwrap().unwrap().name, name);
    assert!(service.bucket_exists(&name).await.unwrap());
}

#[tokio::test]
async fn folder_marker_has_single_trailing_separator() {
    let service = app();
    let b = bucket("folders");
    service.create_bucket(&b).await.unwrap();

    let folder = service.create_folder(&b, "test1").await.unwrap();
    assert_eq!(folder.name(), "test1/");
    assert_eq!(folder.size, 0);
    assert!(folder.is_folder());

    let nested = service.create_folder(&b, "a/b").await.unwrap();
    assert_eq!(nested.name(), "a/b/");

    assert!(service.get_file(&b, &key("test1/")).await.unwrap().is_some());
}

#[tokio::test]
async fn create_folder_in_missing_bucket_fails() {
    let service = app();
    let err = service
        .create_folder(&bucket("nowhere"), "docs")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::BucketNotFound { .. }));
}

#[tokio::test]
async fn round_trip_from_every_source() {
    let service = app();
    let dir = tempfile::tempdir().unwrap();
    let b = bucket("sources");
    service.create_bucket(&b).await.unwrap();

    let local = dir.path().join("upload.bin");
    let large: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    tokio::fs::write(&local, &large).await.unwrap();

    let cases = vec![
        ("bytes.txt", ContentSource::from(Bytes::from_static(b"from bytes")), b"from bytes".to_vec()),
        (
            "reader.txt",
            ContentSource::reader(std::io::Cursor::new(b"from reader".to_vec())),
            b"from reader".to_vec(),
        ),
        ("file.bin", ContentSource::path(&local), large.clone()),
    ];

    for (name, source, expected) in cases {
        let k = key(name);
        let stored = service
            .add_file(&b, &k, source, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.key, k);
        assert_eq!(stored.size, expected.len() as u64);

        let fetched = service.get_file(&b, &k).await.unwrap().unwrap();
        assert_eq!(fetched.key, k);
        assert_eq!(
            service.read_file(&b, &k).await.unwrap().unwrap(),
            Bytes::from(expected)
        );
    }
}

#[tokio::test]
async fn add_file_overwrites() {
    let service = app();
    let b = bucket("overwrite");
    let k = key("notes.txt");
    service.create_bucket(&b).await.unwrap();

    service
        .add_file(&b, &k, ContentSource::from("first"), None)
        .await
        .unwrap();
    service
        .add_file(&b, &k, ContentSource::from("second version"), None)
        .await
        .unwrap();

    let content = service.read_file(&b, &k).await.unwrap().unwrap();
    assert_eq!(&content[..], b"second version");
    assert_eq!(listed_names(&service, &b).await, vec!["notes.txt"]);
}

#[tokio::test]
async fn missing_bucket_reads_as_empty() {
    let service = app();
    let b = bucket("absent");
    let k = key("a.txt");

    assert!(service
        .add_file(&b, &k, ContentSource::from("x"), None)
        .await
        .unwrap()
        .is_none());
    assert!(service.get_file(&b, &k).await.unwrap().is_none());
    assert!(service.read_file(&b, &k).await.unwrap().is_none());
    assert_eq!(
        service.lookup_file(&b, &k).await.unwrap(),
        Lookup::BucketNotFound
    );
    assert_eq!(
        service.get_files(&b, &[key("a"), key("b")]).await.unwrap(),
        vec![None, None]
    );
    assert!(listed_names(&service, &b).await.is_empty());
}

#[tokio::test]
async fn delete_missing_targets_returns_false() {
    let service = app();
    let b = bucket("deletes");

    assert!(!service.delete_bucket(&b).await.unwrap());
    assert!(!service.delete_file(&b, &key("ghost.txt")).await.unwrap());

    service.create_bucket(&b).await.unwrap();
    assert!(!service.delete_file(&b, &key("ghost.txt")).await.unwrap());
    assert!(service.delete_bucket(&b).await.unwrap());
    assert!(!service.bucket_exists(&b).await.unwrap());
}

#[tokio::test]
async fn non_empty_bucket_is_not_deleted() {
    let service = app();
    let b = bucket("occupied");
    service.create_bucket(&b).await.unwrap();
    service.create_folder(&b, "keep").await.unwrap();

    let err = service.delete_bucket(&b).await.unwrap_err();
    assert!(matches!(err, StorageError::BucketNotEmpty { .. }));
    assert!(service.bucket_exists(&b).await.unwrap());
}

#[tokio::test]
async fn get_files_keeps_input_order() {
    let service = app();
    let b = bucket("batch");
    service.create_bucket(&b).await.unwrap();

    for name in ["one.txt", "three.txt"] {
        service
            .add_file(&b, &key(name), ContentSource::from("x"), None)
            .await
            .unwrap();
    }

    let results = service
        .get_files(&b, &[key("three.txt"), key("two.txt"), key("one.txt")])
        .await
        .unwrap();

    let names: Vec<Option<&str>> = results
        .iter()
        .map(|slot| slot.as_ref().map(|blob| blob.name()))
        .collect();
    assert_eq!(names, vec![Some("three.txt"), None, Some("one.txt")]);
}

#[tokio::test]
async fn listing_spans_pages_and_restarts() {
    let service = AppBuilder::new()
        .with_backend(BackendKind::InMemory)
        .with_page_size(3)
        .build()
        .unwrap();
    let b = bucket("listing");
    service.create_bucket(&b).await.unwrap();

    let mut expected = BTreeSet::new();
    for i in 0..10 {
        let name = format!("dir{}/file-{:02}.dat", i % 3, i);
        service
            .add_file(&b, &key(&name), ContentSource::from(vec![0u8; i]), None)
            .await
            .unwrap();
        expected.insert(name);
    }

    let listed = listed_names(&service, &b).await;
    assert_eq!(listed.len(), 10);
    assert_eq!(listed.iter().cloned().collect::<BTreeSet<_>>(), expected);

    // A fresh listing reflects the current contents
    service.delete_file(&b, &key("dir0/file-00.dat")).await.unwrap();
    service
        .add_file(&b, &key("late.txt"), ContentSource::from("x"), None)
        .await
        .unwrap();

    let relisted = listed_names(&service, &b).await;
    assert_eq!(relisted.len(), 10);
    assert!(relisted.contains(&"late.txt".to_string()));
    assert!(!relisted.contains(&"dir0/file-00.dat".to_string()));
}

#[tokio::test]
async fn list_buckets_enumerates_all() {
    let service = AppBuilder::new()
        .with_backend(BackendKind::InMemory)
        .with_page_size(2)
        .build()
        .unwrap();

    for name in ["alpha", "beta", "gamma", "delta", "epsilon"] {
        service.create_bucket(&bucket(name)).await.unwrap();
    }

    let names: BTreeSet<String> = service
        .list_buckets()
        .map_ok(|b| b.name.to_string())
        .try_collect()
        .await
        .unwrap();
    assert_eq!(names.len(), 5);
    assert!(names.contains("gamma"));

    let page = service.list_buckets_page(None).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.next_page_token.is_some());
}

#[tokio::test]
async fn download_rejects_invalid_destination() {
    let service = app();
    let dir = tempfile::tempdir().unwrap();
    let b = bucket("downloads");
    service.create_bucket(&b).await.unwrap();

    let blob = service
        .add_file(&b, &key("data.txt"), ContentSource::from("payload"), None)
        .await
        .unwrap()
        .unwrap();

    let missing = dir.path().join("missing");
    let err = service.download(&blob, &missing).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidDestination { .. }));
    assert!(!missing.exists());

    let plain_file = dir.path().join("plain.txt");
    tokio::fs::write(&plain_file, b"x").await.unwrap();
    let err = service
        .get_as_local_file(&b, &key("data.txt"), &plain_file)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidDestination { .. }));
    assert_eq!(tokio::fs::read(&plain_file).await.unwrap(), b"x");
}

#[tokio::test]
async fn get_as_local_file_mirrors_key() {
    let service = app();
    let dir = tempfile::tempdir().unwrap();
    let b = bucket("mirror");
    service.create_bucket(&b).await.unwrap();
    service
        .add_file_in_folder(&b, "reports/2024", "q1.csv", ContentSource::from("a,b\n"), Some("text/csv"))
        .await
        .unwrap();

    let path = service
        .get_as_local_file(&b, &key("reports/2024/q1.csv"), dir.path())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(path, dir.path().join("reports").join("2024").join("q1.csv"));
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"a,b\n");

    assert!(service
        .get_as_local_file(&b, &key("reports/missing.csv"), dir.path())
        .await
        .unwrap()
        .is_none());

    let folder = service.create_folder(&b, "empty").await.unwrap();
    let folder_path = service.download(&folder, dir.path()).await.unwrap();
    assert!(folder_path.is_dir());
}

#[tokio::test]
async fn get_file_in_folder_composes_key() {
    let service = app();
    let b = bucket("compose");
    service.create_bucket(&b).await.unwrap();
    service
        .add_file(&b, &key("docs/readme.txt"), ContentSource::from("hello"), None)
        .await
        .unwrap();

    let blob = service
        .get_file_in_folder(&b, "docs", "readme.txt")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(blob.name(), "docs/readme.txt");

    let err = service
        .get_file_in_folder(&b, "docs", "")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::ValidationError { .. }));
}
