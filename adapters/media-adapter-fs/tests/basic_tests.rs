//! Media resolution tests

use pausegate::media_adapter::MediaAdapter;
use pausegate_media_adapter_fs::MediaAdapterFs;
use tempfile::TempDir;

async fn create_test_adapter() -> (MediaAdapterFs, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MediaAdapterFs::new(temp_dir.path().into(), "/media/")
		.await
		.expect("Failed to create adapter");
	(adapter, temp_dir)
}

#[tokio::test]
async fn test_resolves_existing_file() {
	let (adapter, temp) = create_test_adapter().await;
	tokio::fs::write(temp.path().join("7.webp"), b"img").await.expect("write");

	let url = adapter.resolve_media_url(7).await.expect("resolve");
	assert_eq!(url.as_deref(), Some("/media/7.webp"));
}

#[tokio::test]
async fn test_prefers_extension_order() {
	let (adapter, temp) = create_test_adapter().await;
	tokio::fs::write(temp.path().join("3.jpg"), b"img").await.expect("write");
	tokio::fs::write(temp.path().join("3.png"), b"img").await.expect("write");

	let url = adapter.resolve_media_url(3).await.expect("resolve");
	assert_eq!(url.as_deref(), Some("/media/3.png"));
}

#[tokio::test]
async fn test_missing_media_is_none() {
	let (adapter, temp) = create_test_adapter().await;
	tokio::fs::create_dir(temp.path().join("9.png")).await.expect("mkdir");

	assert_eq!(adapter.resolve_media_url(9).await.expect("resolve"), None);
	assert_eq!(adapter.resolve_media_url(42).await.expect("resolve"), None);
	assert_eq!(adapter.resolve_media_url(0).await.expect("resolve"), None);
}

// vim: ts=4
