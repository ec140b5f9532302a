//! Media upload endpoint.

use crate::errors::ApiError;
use crate::models::MediaUpload;
use crate::pipeline::ApiClient;

impl ApiClient {
    /// Upload a media file for use in questions.
    ///
    /// The bytes are cloned per attempt because a multipart body cannot be
    /// reused after a send; question media is small enough for that to be
    /// acceptable.
    pub async fn upload_media(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<MediaUpload, ApiError> {
        // Reject a malformed content type before any network attempt, so
        // the per-attempt form builder is infallible.
        drop(reqwest::multipart::Part::bytes(Vec::new()).mime_str(content_type)?);

        let file_name = file_name.to_string();
        let content_type = content_type.to_string();
        self.post_multipart("/media/upload", move || {
            let part = reqwest::multipart::Part::bytes(bytes.clone())
                .file_name(file_name.clone())
                .mime_str(&content_type)
                .unwrap_or_else(|_| {
                    reqwest::multipart::Part::bytes(bytes.clone()).file_name(file_name.clone())
                });
            reqwest::multipart::Form::new().part("file", part)
        })
        .await
    }
}
