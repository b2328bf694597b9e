use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use image::ImageFormat;
use uuid::Uuid;

/// URL prefix under which the media root is served.
pub const MEDIA_URL: &str = "/media";
/// Directory (relative to the media root) that post images are stored in.
const POST_IMAGE_DIR: &str = "posts";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("image is not valid base64: {0}")]
	Base64(#[from] base64::DecodeError),
	#[error("unsupported image format")]
	UnsupportedFormat,
	#[error("image could not be decoded: {0}")]
	Decode(#[from] image::ImageError),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

/// Stores uploaded files below a root directory.
#[derive(Debug, Clone)]
pub struct Media {
	root: PathBuf,
}

impl Media {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Decodes a base64 image (optionally a `data:` URL), checks that it is a
	/// real GIF, PNG or JPEG image and writes it below the media root.
	///
	/// Returns the stored path relative to the media root.
	pub async fn save_post_image(&self, encoded: &str) -> Result<String, Error> {
		let encoded = encoded
			.split_once(";base64,")
			.map_or(encoded, |(_, data)| data)
			.trim();
		let bytes = STANDARD.decode(encoded)?;

		let (format, bytes) =
			tokio::task::spawn_blocking(move || verify_image(&bytes).map(|format| (format, bytes)))
				.await
				.map_err(std::io::Error::other)??;

		let extension = format.extensions_str().first().copied().unwrap_or("img");
		let name = format!("{POST_IMAGE_DIR}/{}.{extension}", Uuid::new_v4().simple());

		tokio::fs::create_dir_all(self.root.join(POST_IMAGE_DIR)).await?;
		tokio::fs::write(self.root.join(&name), bytes).await?;

		tracing::debug!(path = %name, "stored post image");

		Ok(name)
	}
}

/// Returns the public URL of a stored media path.
pub fn url(path: &str) -> String {
	format!("{MEDIA_URL}/{path}")
}

fn verify_image(bytes: &[u8]) -> Result<ImageFormat, Error> {
	let format = image::guess_format(bytes).map_err(|_| Error::UnsupportedFormat)?;

	if !matches!(format, ImageFormat::Gif | ImageFormat::Png | ImageFormat::Jpeg) {
		return Err(Error::UnsupportedFormat);
	}

	image::load_from_memory_with_format(bytes, format)?;

	Ok(format)
}

#[cfg(test)]
pub mod test {
	use base64::{engine::general_purpose::STANDARD, Engine};

	use super::*;

	/// A 2x1 GIF image.
	pub const SMALL_GIF: &[u8] = &[
		0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
		0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
		0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
	];

	/// Encodes a blank 4x4 image in `format`.
	pub fn encoded(format: ImageFormat) -> Vec<u8> {
		let mut bytes = std::io::Cursor::new(Vec::new());

		image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 4))
			.write_to(&mut bytes, format)
			.unwrap();

		bytes.into_inner()
	}

	#[test]
	fn test_verify_image() {
		assert_eq!(verify_image(SMALL_GIF).unwrap(), ImageFormat::Gif);
		assert_eq!(verify_image(&encoded(ImageFormat::Png)).unwrap(), ImageFormat::Png);
		assert_eq!(verify_image(&encoded(ImageFormat::Jpeg)).unwrap(), ImageFormat::Jpeg);
		assert!(matches!(
			verify_image(b"definitely not an image"),
			Err(Error::UnsupportedFormat)
		));
	}

	#[tokio::test]
	async fn test_save_post_image() {
		let dir = tempfile::tempdir().unwrap();
		let media = Media::new(dir.path());

		let name = media
			.save_post_image(&format!("data:image/gif;base64,{}", STANDARD.encode(SMALL_GIF)))
			.await
			.unwrap();

		assert!(name.starts_with("posts/"));
		assert!(name.ends_with(".gif"));
		assert_eq!(std::fs::read(dir.path().join(&name)).unwrap(), SMALL_GIF);
		assert_eq!(url(&name), format!("/media/{name}"));
	}

	#[tokio::test]
	async fn test_save_rejects_garbage() {
		let dir = tempfile::tempdir().unwrap();
		let media = Media::new(dir.path());

		assert!(matches!(
			media.save_post_image("%%%").await,
			Err(Error::Base64(..))
		));
	}
}
