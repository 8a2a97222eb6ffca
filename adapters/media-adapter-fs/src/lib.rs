use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{create_dir_all, metadata};

use pausegate::{media_adapter, prelude::*};

/// Image extensions tried for a media id, in order
const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

/// Media stored as `<base_dir>/<id>.<ext>` and served under `base_url`
#[derive(Debug)]
pub struct MediaAdapterFs {
	base_dir: Box<Path>,
	base_url: Box<str>,
}

impl MediaAdapterFs {
	pub async fn new(base_dir: Box<Path>, base_url: &str) -> ClResult<Self> {
		create_dir_all(&base_dir).await?;
		Ok(Self { base_dir, base_url: base_url.trim_end_matches('/').into() })
	}

	fn file_path(&self, media_id: u64, ext: &str) -> PathBuf {
		self.base_dir.join(format!("{}.{}", media_id, ext))
	}
}

#[async_trait]
impl media_adapter::MediaAdapter for MediaAdapterFs {
	async fn resolve_media_url(&self, media_id: u64) -> ClResult<Option<Box<str>>> {
		if media_id == 0 {
			return Ok(None);
		}

		for ext in EXTENSIONS {
			match metadata(self.file_path(media_id, ext)).await {
				Ok(meta) if meta.is_file() => {
					return Ok(Some(format!("{}/{}.{}", self.base_url, media_id, ext).into()));
				}
				Ok(_) => {}
				Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
				Err(err) => return Err(err.into()),
			}
		}

		debug!("media {} not found in {}", media_id, self.base_dir.display());
		Ok(None)
	}
}

// vim: ts=4
