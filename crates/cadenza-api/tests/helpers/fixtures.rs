use axum_test::multipart::Part;
use bytes::Bytes;

pub fn mp3_part(name: &str, data: &'static [u8]) -> Part {
    Part::bytes(Bytes::from_static(data))
        .file_name(name)
        .mime_type("audio/mpeg")
}

pub fn png_part(name: &str, data: &'static [u8]) -> Part {
    Part::bytes(Bytes::from_static(data))
        .file_name(name)
        .mime_type("image/png")
}
