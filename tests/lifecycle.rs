//! End-to-end entity lifecycle through the public API: construct, derive,
//! resize, save, and release.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use mediadoc::config::{Config, FetchConfig};
use mediadoc::file::{AttributeError, DerivedAttributes, FileAttributes};
use mediadoc::id_generator::{ALPHABET_HEX, IdGenerator, RandomStringIdGenerator};
use mediadoc::image::ImageAttributes;
use mediadoc::imaging::Dimensions;
use mediadoc::readable_id::{ReadableId, SlugError};
use mediadoc::source::{ContentSource, FetchError, Fetcher, MemoryBlob};
use std::collections::HashSet;
use std::io::Write;
use tempfile::TempDir;

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    });
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

struct ServeBytes(Vec<u8>);

impl Fetcher for ServeBytes {
    fn fetch(&self, _url: &str, limit: u64, sink: &mut dyn Write) -> Result<u64, FetchError> {
        let end = self.0.len().min(limit as usize);
        sink.write_all(&self.0[..end])?;
        Ok(end as u64)
    }
}

/// Application entity: an image with a title-derived slug.
struct Photo {
    image: ImageAttributes,
    title: String,
    slug: Option<String>,
    existing_slugs: HashSet<String>,
}

impl ReadableId for Photo {
    fn readable_id(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    fn set_readable_id(&mut self, readable_id: String) {
        self.slug = Some(readable_id);
    }

    fn name(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn readable_id_exists(&self, candidate: &str) -> bool {
        self.existing_slugs.contains(candidate)
    }
}

#[test]
fn fetched_photo_is_resized_saved_and_released() {
    let tmp = TempDir::new().unwrap();
    let config = Config::from_toml_str(&format!(
        "[fetch]\ntemp_dir = {:?}\n\n[images]\nbest_fill = true\njpeg_quality = 70\n",
        tmp.path()
    ))
    .unwrap();

    let fetcher = ServeBytes(jpeg(1000, 500));
    let image = ImageAttributes::from_reference("https://cdn.test/sunset.jpg", &fetcher, &config.fetch)
        .unwrap()
        .with_config(&config.images);
    let mut photo = Photo {
        image,
        title: "Sunset over Lac Léman".into(),
        slug: None,
        existing_slugs: HashSet::from(["sunset-over-lac-leman".to_string()]),
    };

    assert!(photo.image.file().source().is_owned());
    assert_eq!(photo.image.width().unwrap(), Some(1000));
    assert_eq!(photo.image.resize(400, 400).unwrap(), Dimensions { width: 400, height: 400 });

    photo.update_readable_id().unwrap();
    assert_eq!(photo.readable_id(), Some("sunset-over-lac-leman-2"));

    let generator = RandomStringIdGenerator::from_config(&config.ids).unwrap();
    photo.image.file_mut().assign_id(&generator);

    let record = photo.image.to_record().unwrap();
    assert_eq!(record.width, Some(400));
    assert_eq!(record.height, Some(400));
    assert_eq!(record.file.mime_type.as_deref(), Some("image/jpeg"));
    assert_eq!(record.file.id.as_ref().map(String::len), Some(22));

    let staged = photo.image.file().source().local_path().unwrap().to_path_buf();
    assert_eq!(
        std::fs::metadata(&staged).unwrap().len(),
        record.file.length.unwrap()
    );

    photo.image.cleanup();
    assert!(!staged.exists());
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn same_bytes_hash_identically_across_sources() {
    let tmp = TempDir::new().unwrap();
    let data = b"identical payload".to_vec();
    let path = tmp.path().join("payload.txt");
    std::fs::write(&path, &data).unwrap();

    let mut on_disk = FileAttributes::from_path(&path);
    let mut in_store = FileAttributes::from_blob(MemoryBlob::new(data));

    assert_eq!(
        on_disk.content_hash().unwrap().map(str::to_owned),
        in_store.content_hash().unwrap().map(str::to_owned)
    );
}

#[test]
fn reassigning_content_never_leaks_old_values() {
    let mut file: Box<dyn DerivedAttributes> =
        Box::new(FileAttributes::from_blob(MemoryBlob::new(jpeg(10, 10))));
    assert_eq!(file.mime_type().unwrap(), Some("image/jpeg"));

    file.set_source(ContentSource::blob(MemoryBlob::new(b"plain words".to_vec())));
    assert_eq!(file.attributes().cached_mime_type(), None);
    assert_eq!(file.attributes().cached_length(), None);
    assert_eq!(file.mime_type().unwrap(), Some("text/plain"));
    assert_eq!(file.length().unwrap(), Some(11));
}

#[test]
fn empty_remote_body_is_a_fetch_error() {
    let tmp = TempDir::new().unwrap();
    let config = FetchConfig {
        temp_dir: Some(tmp.path().to_path_buf()),
        ..FetchConfig::default()
    };

    let result = FileAttributes::from_reference("http://cdn.test/empty", &ServeBytes(Vec::new()), &config);
    assert!(matches!(
        result,
        Err(AttributeError::RemoteFetch(FetchError::Empty(_)))
    ));
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn untitled_entity_needs_variants() {
    struct Untitled(Option<String>);

    impl ReadableId for Untitled {
        fn readable_id(&self) -> Option<&str> {
            self.0.as_deref()
        }

        fn set_readable_id(&mut self, readable_id: String) {
            self.0 = Some(readable_id);
        }
    }

    let mut untitled = Untitled(None);
    assert_eq!(untitled.update_readable_id(), Err(SlugError::MissingName));
}

#[test]
fn hex_ids_have_expected_shape() {
    let generator = RandomStringIdGenerator::new(ALPHABET_HEX, 64).unwrap();
    let id = generator.generate();
    assert_eq!(id.len(), 16);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}
