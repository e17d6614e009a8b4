//! Blocking REST client for the Gemini `generateContent` endpoint.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{
    CollaboratorError, CredentialSource, DeckGenerator, GeminiSettings, SpeechSynthesizer,
};
use crate::http_client::{self, RetryConfig};
use crate::soundboard::{COLOR_TAGS, SoundboardItem};

// A few seconds of 24 kHz PCM in base64 stays well below this.
const MAX_SPEECH_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
const MAX_DECK_RESPONSE_BYTES: usize = 512 * 1024;
const ENTITY_NOT_FOUND: &str = "requested entity was not found";
/// Markers Gemini puts in a 400 body when the key itself is bad.
const INVALID_KEY_MARKERS: [&str; 2] = ["api_key_invalid", "api key not valid"];

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("No API key configured")]
    MissingKey,
    #[error("API key rejected: {0}")]
    Unauthorized(String),
    #[error("Rate limited; try again later")]
    RateLimited,
    #[error("Server error {code}: {body}")]
    Server { code: u16, body: String },
    #[error("HTTP {code}: {body}")]
    Http { code: u16, body: String },
    #[error("HTTP error: {0}")]
    Transport(String),
    #[error("JSON error: {0}")]
    Json(String),
}

impl GeminiError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Server { .. } | Self::Transport(_)
        )
    }
}

impl From<GeminiError> for CollaboratorError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingKey | GeminiError::Unauthorized(_) => Self::CredentialMissing,
            other => Self::Failed(other.to_string()),
        }
    }
}

/// Client for speech synthesis and deck generation.
///
/// The key is read from the credential source on every request, so a key
/// entered after startup is picked up without rebuilding the client.
pub struct GeminiClient {
    settings: GeminiSettings,
    credentials: Arc<dyn CredentialSource>,
    retry: RetryConfig,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            settings: settings.normalized(),
            credentials,
            retry: RetryConfig::default(),
        }
    }

    #[cfg(test)]
    fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn generate_content(
        &self,
        model: &str,
        body: &Value,
        max_bytes: usize,
    ) -> Result<String, GeminiError> {
        let key = self
            .credentials
            .api_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GeminiError::MissingKey)?;
        let url = format!("{}/models/{model}:generateContent", self.settings.base_url);
        http_client::retry_with_backoff(
            self.retry,
            || post_json(&url, key.trim(), body, max_bytes),
            |err: &GeminiError| {
                let retry = err.is_retryable();
                if retry {
                    debug!("Gemini request failed, retrying: {err}");
                }
                retry
            },
        )
    }

    fn speech_request(&self, prompt: &str) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.settings.voice }
                    }
                }
            }
        })
    }
}

impl SpeechSynthesizer for GeminiClient {
    fn synthesize(&self, prompt: &str) -> Result<Option<String>, CollaboratorError> {
        let body = self.generate_content(
            &self.settings.speech_model,
            &self.speech_request(prompt),
            MAX_SPEECH_RESPONSE_BYTES,
        )?;
        Ok(parse_speech_payload(&body)?)
    }
}

impl DeckGenerator for GeminiClient {
    fn generate_deck(&self, count: usize) -> Result<Vec<SoundboardItem>, CollaboratorError> {
        let body = self.generate_content(
            &self.settings.deck_model,
            &deck_request(count),
            MAX_DECK_RESPONSE_BYTES,
        )?;
        let items = parse_deck_response(&body)?;
        if items.len() != count {
            warn!("Deck generator returned {} items, asked for {count}", items.len());
        }
        Ok(items)
    }
}

/// Instruction sent to the deck model.
pub fn deck_instruction(count: usize) -> String {
    format!(
        "Generate {count} viral, trending, or classic internet meme soundboard items. \
         Include labels, relevant emojis, and descriptive prompts for a TTS engine to speak \
         the meme perfectly. Mix classic 2010s memes with 2024 brainrot and viral TikTok \
         trends. Assign a distinct color class from: {}.",
        COLOR_TAGS.join(", ")
    )
}

fn deck_request(count: usize) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": deck_instruction(count) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "label": { "type": "STRING" },
                        "prompt": { "type": "STRING" },
                        "emoji": { "type": "STRING" },
                        "color": { "type": "STRING" }
                    },
                    "required": ["id", "label", "prompt", "emoji", "color"]
                }
            }
        }
    })
}

fn post_json(url: &str, key: &str, body: &Value, max_bytes: usize) -> Result<String, GeminiError> {
    let request = http_client::agent()
        .post(url)
        .set("Accept", "application/json")
        .set("Content-Type", "application/json")
        .set("x-goog-api-key", key);
    let response = match request.send_json(body) {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            let body = read_body_limited(response, max_bytes).unwrap_or_else(|err| err);
            return Err(map_status_error(code, body));
        }
        Err(ureq::Error::Transport(err)) => {
            return Err(GeminiError::Transport(err.to_string()));
        }
    };
    read_body_limited(response, max_bytes).map_err(GeminiError::Json)
}

fn map_status_error(code: u16, body: String) -> GeminiError {
    if is_entity_not_found(&body) || is_invalid_key(&body) {
        return GeminiError::Unauthorized(body);
    }
    match code {
        401 | 403 => GeminiError::Unauthorized(body),
        429 => GeminiError::RateLimited,
        500..=599 => GeminiError::Server { code, body },
        _ => GeminiError::Http { code, body },
    }
}

fn is_entity_not_found(message: &str) -> bool {
    message.to_ascii_lowercase().contains(ENTITY_NOT_FOUND)
}

fn is_invalid_key(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    INVALID_KEY_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

fn read_body_limited(response: ureq::Response, max_bytes: usize) -> Result<String, String> {
    http_client::read_response_text(response, max_bytes).map_err(|err| err.to_string())
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponseWire {
    #[serde(default)]
    candidates: Vec<CandidateWire>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateWire {
    content: Option<ContentWire>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentWire {
    #[serde(default)]
    parts: Vec<PartWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartWire {
    text: Option<String>,
    inline_data: Option<InlineDataWire>,
}

#[derive(Debug, Default, Deserialize)]
struct InlineDataWire {
    data: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeckItemWire {
    id: String,
    label: String,
    prompt: String,
    emoji: String,
    color: String,
}

fn parse_response(body: &str) -> Result<GenerateResponseWire, GeminiError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(GeminiError::Json("Empty response body".to_string()));
    }
    serde_json::from_str(trimmed).map_err(|err| GeminiError::Json(err.to_string()))
}

fn first_parts(response: GenerateResponseWire) -> Vec<PartWire> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
}

/// Audio payload of the first part of the first candidate, if any.
fn parse_speech_payload(body: &str) -> Result<Option<String>, GeminiError> {
    let parts = first_parts(parse_response(body)?);
    Ok(parts
        .into_iter()
        .next()
        .and_then(|part| part.inline_data)
        .and_then(|inline| inline.data)
        .filter(|data| !data.trim().is_empty()))
}

fn parse_deck_response(body: &str) -> Result<Vec<SoundboardItem>, GeminiError> {
    let text: String = first_parts(parse_response(body)?)
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    let text = text.trim();
    if text.is_empty() {
        return Err(GeminiError::Json("Empty response from deck model".to_string()));
    }
    let items: Vec<DeckItemWire> =
        serde_json::from_str(text).map_err(|err| GeminiError::Json(format!("{err}: {text}")))?;
    Ok(items
        .into_iter()
        .map(|item| SoundboardItem {
            id: item.id,
            label: item.label,
            prompt: item.prompt,
            emoji: item.emoji,
            color: item.color,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::ApiKeyStoreError;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    struct FixedKey(Mutex<Option<String>>);

    impl CredentialSource for FixedKey {
        fn api_key(&self) -> Option<String> {
            self.0.lock().unwrap().clone()
        }

        fn store_api_key(&self, key: &str) -> Result<(), ApiKeyStoreError> {
            *self.0.lock().unwrap() = Some(key.to_string());
            Ok(())
        }
    }

    fn serve_once(status: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let _ = stream.write_all(response.as_bytes());
            request
        });
        (format!("http://{addr}"), handle)
    }

    // Read headers and the full body so the socket is drained before replying.
    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let read = stream.read(&mut buf).unwrap_or(0);
            if read == 0 {
                break;
            }
            data.extend_from_slice(&buf[..read]);
            let text = String::from_utf8_lossy(&data);
            if let Some(split) = text.find("\r\n\r\n") {
                let length = text[..split]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= split + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn client(base_url: String, key: Option<&str>) -> GeminiClient {
        let settings = GeminiSettings {
            base_url,
            ..GeminiSettings::default()
        };
        let credentials = Arc::new(FixedKey(Mutex::new(key.map(str::to_string))));
        GeminiClient::new(settings, credentials).with_retry(RetryConfig {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        })
    }

    #[test]
    fn extracts_inline_audio_data() {
        let body = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"audio/L16;rate=24000","data":"AAAA"}}]}}]}"#;
        assert_eq!(parse_speech_payload(body).unwrap().as_deref(), Some("AAAA"));
    }

    #[test]
    fn missing_audio_is_none_not_error() {
        assert_eq!(parse_speech_payload(r#"{"candidates":[]}"#).unwrap(), None);
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"no audio"}]}}]}"#;
        assert_eq!(parse_speech_payload(body).unwrap(), None);
    }

    #[test]
    fn parses_deck_from_text_parts() {
        let items = r#"[{"id":"sus","label":"Sus","prompt":"Say sus","emoji":"📮","color":"bg-red-600"}]"#;
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": items }] } }]
        })
        .to_string();
        let deck = parse_deck_response(&body).unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(deck[0].id, "sus");
        assert_eq!(deck[0].color, "bg-red-600");
    }

    #[test]
    fn empty_deck_text_is_an_error() {
        let err = parse_deck_response(r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(err, GeminiError::Json(_)));
    }

    #[test]
    fn auth_failures_map_to_missing_credentials() {
        for code in [401, 403] {
            let err = map_status_error(code, String::new());
            assert_eq!(CollaboratorError::from(err), CollaboratorError::CredentialMissing);
        }
        let err = map_status_error(400, "Requested entity was not found.".into());
        assert!(matches!(err, GeminiError::Unauthorized(_)));
        let err = map_status_error(404, "Requested entity was not found.".into());
        assert!(matches!(err, GeminiError::Unauthorized(_)));
        assert!(map_status_error(503, String::new()).is_retryable());
        assert!(map_status_error(429, String::new()).is_retryable());
        assert!(!map_status_error(400, "bad".into()).is_retryable());
    }

    #[test]
    fn invalid_key_body_maps_to_missing_credentials() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        let err = map_status_error(400, body.to_string());
        assert!(matches!(err, GeminiError::Unauthorized(_)));
        assert_eq!(CollaboratorError::from(err), CollaboratorError::CredentialMissing);

        let reason_only = r#"{"error":{"details":[{"reason":"API_KEY_INVALID"}]}}"#;
        assert!(matches!(
            map_status_error(400, reason_only.to_string()),
            GeminiError::Unauthorized(_)
        ));
    }

    #[test]
    fn unknown_model_is_not_a_credential_problem() {
        let body = r#"{"error":{"code":404,"message":"models/gemini-typo is not found for API version v1beta","status":"NOT_FOUND"}}"#;
        let err = map_status_error(404, body.to_string());
        assert!(matches!(err, GeminiError::Http { code: 404, .. }));
        assert!(matches!(CollaboratorError::from(err), CollaboratorError::Failed(_)));
    }

    #[test]
    fn instruction_lists_every_color() {
        let text = deck_instruction(12);
        assert!(text.starts_with("Generate 12 viral"));
        for tag in COLOR_TAGS {
            assert!(text.contains(tag));
        }
    }

    #[test]
    fn synthesize_posts_prompt_with_key() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"data":"UklGRg=="}}]}}]}"#,
        );
        let payload = client(url, Some("test-key")).synthesize("Say bruh").unwrap();
        assert_eq!(payload.as_deref(), Some("UklGRg=="));
        let request = server.join().unwrap();
        assert!(request.starts_with("POST /models/gemini-2.5-flash-preview-tts:generateContent"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
    }

    #[test]
    fn not_found_response_requires_credentials() {
        let (url, _server) = serve_once(
            "404 Not Found",
            r#"{"error":{"message":"Requested entity was not found."}}"#,
        );
        let err = client(url, Some("stale")).generate_deck(12).unwrap_err();
        assert_eq!(err, CollaboratorError::CredentialMissing);
    }

    #[test]
    fn missing_key_fails_without_a_request() {
        let err = client("http://127.0.0.1:9".into(), None)
            .synthesize("Say wow")
            .unwrap_err();
        assert_eq!(err, CollaboratorError::CredentialMissing);
    }
}
