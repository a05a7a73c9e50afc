use crate::runner::context::test_context::TestContext;
use crate::test_constants::{AGE, ANN_SHADE, NAME, NOTES, RELATIONSHIP};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use color_eyre::Result;
use color_eyre::eyre::ensure;
use common_services::api::people::interfaces::AddPersonResponse;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{Value, json};
use std::io::Cursor;

/// A solid gray 64x64 PNG, base64 encoded.
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

pub async fn add_person(context: &TestContext, body: &Value) -> Result<AddPersonResponse> {
    let response = context
        .http_client
        .post(context.url("/add_person"))
        .json(body)
        .send()
        .await?;
    ensure!(
        response.status().is_success(),
        "add_person failed with {}",
        response.status()
    );
    Ok(response.json().await?)
}

/// Enroll Ann with every field filled in.
pub async fn enroll_ann(context: &TestContext) -> Result<AddPersonResponse> {
    add_person(
        context,
        &json!({
            "image": face_image(ANN_SHADE),
            "name": NAME,
            "relationship": RELATIONSHIP,
            "age": AGE,
            "notes": NOTES,
        }),
    )
    .await
}

pub async fn error_message(response: reqwest::Response) -> Result<String> {
    let body: Value = response.json().await?;
    Ok(body["error"].as_str().unwrap_or_default().to_string())
}
