use super::*;

fn image(content_type: Option<&str>) -> GeneratedImage {
    GeneratedImage { content_type: content_type.map(str::to_string), bytes: vec![0xff, 0xd8, 0xff] }
}

#[test]
fn mime_uses_image_content_type() {
    assert_eq!(image(Some("image/png")).mime(), "image/png");
}

#[test]
fn mime_strips_parameters() {
    assert_eq!(image(Some("image/webp; charset=binary")).mime(), "image/webp");
}

#[test]
fn mime_falls_back_to_jpeg() {
    assert_eq!(image(None).mime(), "image/jpeg");
    assert_eq!(image(Some("text/html")).mime(), "image/jpeg");
    assert_eq!(image(Some("application/octet-stream")).mime(), "image/jpeg");
}

#[test]
fn data_url_encodes_bytes() {
    assert_eq!(image(Some("image/jpeg")).to_data_url(), "data:image/jpeg;base64,/9j/");
}

#[test]
fn provider_errors_have_codes() {
    assert_eq!(ProviderError::Status { status: 503 }.error_code(), "E_PROVIDER_STATUS");
    assert!(ProviderError::Status { status: 503 }.retryable());
    assert!(!ProviderError::Status { status: 404 }.retryable());
    assert!(!ProviderError::Body("eof".into()).retryable());
}
