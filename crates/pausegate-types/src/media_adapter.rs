//! Adapter that turns media references (the logo id) into public URLs.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait MediaAdapter: Debug + Send + Sync {
	/// Resolve a media id. `Ok(None)` means the asset does not exist.
	async fn resolve_media_url(&self, media_id: u64) -> ClResult<Option<Box<str>>>;
}

/// Media adapter for deployments without a media library
#[derive(Debug, Default)]
pub struct NoMedia;

#[async_trait]
impl MediaAdapter for NoMedia {
	async fn resolve_media_url(&self, _media_id: u64) -> ClResult<Option<Box<str>>> {
		Ok(None)
	}
}

// vim: ts=4
