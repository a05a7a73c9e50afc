//! Builders shared by the unit tests of the service modules.

use crate::collaborators::{
    Collaborators, MemoryFaceCollection, MemoryObjectStore, UrlSigner,
};
use crate::database::MemoryPersonStore;
use app_state::{AppSettings, load_settings_from_path};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

pub fn settings() -> AppSettings {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../config/settings.yaml");
    load_settings_from_path(&path, false).expect("repo settings load")
}

pub fn memory_collaborators() -> Collaborators {
    Collaborators::new(
        Arc::new(MemoryFaceCollection::new()),
        Arc::new(MemoryObjectStore::new()),
        Arc::new(MemoryPersonStore::new()),
        UrlSigner::new("http://localhost:8000", b"unit-test-secret", 60),
    )
}

/// A base64 PNG "face". Shades further than ~80 apart don't match each other.
pub fn face_image(shade: u8) -> String {
    sized_image(64, 64, shade)
}

pub fn sized_image(width: u32, height: u32, shade: u8) -> String {
    let img = RgbImage::from_pixel(width, height, Rgb([shade, shade, shade]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .expect("png encoding");
    STANDARD.encode(out.into_inner())
}
