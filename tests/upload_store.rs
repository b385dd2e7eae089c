use asset_server::assets::{destination_for, sanitize_filename, store_file, PendingAsset};
use std::path::PathBuf;

fn temp_base(tag: &str) -> PathBuf {
    let crate_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    crate_root.join("tests").join("tmp").join(format!(
        "{}_{}",
        tag,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn sanitize_replaces_whitespace_and_strips_paths() {
    assert_eq!(sanitize_filename("my photo.jpg"), "my_photo.jpg");
    assert_eq!(sanitize_filename("a\tb c.png"), "a_b_c.png");
    assert_eq!(sanitize_filename("../../etc/pass wd"), "pass_wd");
    assert_eq!(sanitize_filename("C:\\Users\\x\\clip 1.mov"), "clip_1.mov");
    assert_eq!(sanitize_filename("   "), "upload");
    assert_eq!(sanitize_filename("plain.jpg"), "plain.jpg");
}

#[test]
fn destination_routes_by_content_type() {
    assert_eq!(destination_for("image/jpeg"), "content/img");
    assert_eq!(destination_for("image/png"), "content/img");
    assert_eq!(destination_for("video/mp4"), "content/mov");
    assert_eq!(destination_for("application/octet-stream"), "content/img");
}

#[tokio::test]
async fn stored_file_is_retrievable_under_returned_path() {
    let base = temp_base("store_roundtrip");
    let rel = store_file(&base, "content/img", "photo.jpg", b"0123456789")
        .await
        .expect("store");
    assert!(rel.starts_with("content/img/"), "got {}", rel);
    assert!(rel.ends_with("_photo.jpg"), "got {}", rel);

    let bytes = std::fs::read(base.join(&rel)).expect("read back");
    assert_eq!(bytes, b"0123456789");

    // no stray temp files left behind
    let leftovers: Vec<_> = std::fs::read_dir(base.join("content/img"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    let _ = std::fs::remove_dir_all(&base);
}

#[tokio::test]
async fn chunked_writes_assemble_into_one_file() {
    let base = temp_base("store_chunked");

    let mut pending = PendingAsset::create(&base, "content/mov", "clip.mp4")
        .await
        .expect("create");
    pending.write_chunk(b"hello ").await.expect("chunk 1");
    pending.write_chunk(b"world").await.expect("chunk 2");
    let rel = pending.commit().await.expect("commit");

    assert!(rel.starts_with("content/mov/"), "got {}", rel);
    assert_eq!(std::fs::read(base.join(&rel)).unwrap(), b"hello world");

    let _ = std::fs::remove_dir_all(&base);
}

#[tokio::test]
async fn discard_leaves_nothing_behind() {
    let base = temp_base("store_discard");

    let mut pending = PendingAsset::create(&base, "content/img", "aborted.jpg")
        .await
        .expect("create");
    pending.write_chunk(b"partial").await.expect("chunk");
    pending.discard().await;

    // neither the temp file nor the name reservation survives
    let entries: Vec<_> = std::fs::read_dir(base.join("content/img"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert!(entries.is_empty(), "leftovers: {:?}", entries);

    let _ = std::fs::remove_dir_all(&base);
}

#[tokio::test]
async fn same_millisecond_uploads_get_distinct_names() {
    let base = temp_base("store_collision");

    // identical original names, fired concurrently: the create_new
    // reservation must keep them apart even within one millisecond
    let (a, b) = tokio::join!(
        store_file(&base, "content/img", "photo.jpg", b"aaaa"),
        store_file(&base, "content/img", "photo.jpg", b"bbbb"),
    );
    let a = a.expect("first store");
    let b = b.expect("second store");
    assert_ne!(a, b);
    assert_eq!(std::fs::read(base.join(&a)).unwrap(), b"aaaa");
    assert_eq!(std::fs::read(base.join(&b)).unwrap(), b"bbbb");

    let _ = std::fs::remove_dir_all(&base);
}

#[tokio::test]
async fn distinct_names_never_collide() {
    let base = temp_base("store_distinct");
    let (a, b) = tokio::join!(
        store_file(&base, "content/img", "one.jpg", b"1"),
        store_file(&base, "content/img", "two.jpg", b"2"),
    );
    let a = a.expect("store one");
    let b = b.expect("store two");
    assert_ne!(a, b);
    assert!(base.join(&a).exists());
    assert!(base.join(&b).exists());

    let _ = std::fs::remove_dir_all(&base);
}
