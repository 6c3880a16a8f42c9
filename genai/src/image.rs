//! Single-shot image editing.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::client::Client;
use crate::error::Error;
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Part};

impl Client {
    /// Edit a still image with a natural-language instruction.
    ///
    /// One call, one artifact: the first inline image of the response is
    /// decoded and returned. There is no streaming or polling here.
    pub async fn edit_image(
        &self,
        model: &str,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<Vec<u8>, Error> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::inline(mime_type, BASE64.encode(image)),
                    Part::text(instruction),
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
                ..GenerationConfig::default()
            }),
        };

        let response = self.generate_content(model, &request).await?;
        let inline = response
            .candidates
            .into_iter()
            .flat_map(|candidate| {
                candidate
                    .content
                    .map(|content| content.parts)
                    .unwrap_or_default()
            })
            .filter_map(|part| part.inline_data)
            .find_map(|inline| inline.data.filter(|data| !data.is_empty()));

        let Some(data) = inline else {
            return Err(Error::Empty("image payload"));
        };
        Ok(BASE64.decode(data.as_bytes())?)
    }
}
