use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::OnceLock;
use url::Url;

use super::{timedtext, FetchedTranscript, LookupError, TranscriptSource};

/// Public YouTube endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

const CONSENT_FORM_MARKER: &str = r#"action="https://consent.youtube.com/s""#;
const RECAPTCHA_MARKER: &str = r#"class="g-recaptcha""#;

const BOT_CHECK_REASON: &str = "not a bot";
const AGE_RESTRICTED_REASON: &str = "inappropriate for some users";
const UNAVAILABLE_REASON: &str = "unavailable";

fn api_key_regex() -> &'static Regex {
    static API_KEY_REGEX: OnceLock<Regex> = OnceLock::new();
    API_KEY_REGEX.get_or_init(|| {
        Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#)
            .expect("Failed to compile innertube key regex")
    })
}

fn consent_value_regex() -> &'static Regex {
    static CONSENT_VALUE_REGEX: OnceLock<Regex> = OnceLock::new();
    CONSENT_VALUE_REGEX.get_or_init(|| {
        Regex::new(r#"name="v" value="([^"]*)""#).expect("Failed to compile consent value regex")
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<TrackName>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    #[serde(default)]
    runs: Vec<TextRun>,
    simple_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn display_name(&self) -> String {
        self.name
            .as_ref()
            .and_then(|name| {
                name.runs
                    .first()
                    .map(|run| run.text.clone())
                    .or_else(|| name.simple_text.clone())
            })
            .unwrap_or_else(|| self.language_code.clone())
    }
}

/// Caption client that scrapes the watch page and queries the innertube player API
pub struct YoutubeTranscriptClient {
    client: Client,
    base_url: String,
    languages: Vec<String>,
}

impl YoutubeTranscriptClient {
    pub fn new(base_url: impl Into<String>, languages: Vec<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            languages,
        }
    }

    /// Fetch the watch page HTML, accepting the consent interstitial if shown
    async fn fetch_watch_page(&self, video_id: &str) -> Result<String, LookupError> {
        let url = Url::parse_with_params(&format!("{}/watch", self.base_url), &[("v", video_id)])
            .map_err(|e| LookupError::UnexpectedResponse(format!("Invalid watch URL: {}", e)))?;

        let html = self.get_text(url.clone(), None).await?;
        if !html.contains(CONSENT_FORM_MARKER) {
            return Ok(html);
        }

        tracing::debug!("Accepting YouTube consent for: {}", video_id);
        let consent = consent_value_regex()
            .captures(&html)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| {
                LookupError::UnexpectedResponse("Consent form without value".to_string())
            })?;

        let html = self.get_text(url, Some(format!("CONSENT=YES+{}", consent))).await?;
        if html.contains(CONSENT_FORM_MARKER) {
            return Err(LookupError::UnexpectedResponse(
                "YouTube consent could not be accepted".to_string(),
            ));
        }

        Ok(html)
    }

    async fn get_text(&self, url: Url, cookie: Option<String>) -> Result<String, LookupError> {
        let mut request = self.client.get(url).header(ACCEPT_LANGUAGE, "en-US");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::RequestBlocked("HTTP 429".to_string()));
        }

        Ok(response.error_for_status()?.text().await?)
    }

    /// Query the innertube player endpoint for the video
    async fn fetch_player_data(&self, video_id: &str, api_key: &str) -> Result<Value, LookupError> {
        let url = Url::parse_with_params(
            &format!("{}/youtubei/v1/player", self.base_url),
            &[("key", api_key)],
        )
        .map_err(|e| LookupError::UnexpectedResponse(format!("Invalid player URL: {}", e)))?;

        let body = json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": "20.10.38",
                }
            },
            "videoId": video_id,
        });

        let response = self.client.post(url).json(&body).send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::RequestBlocked(video_id.to_string()));
        }

        Ok(response.error_for_status()?.json::<Value>().await?)
    }

    /// Pick a track for the preferred languages, manual tracks before generated ones
    fn select_track<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        self.languages.iter().find_map(|lang| {
            tracks
                .iter()
                .find(|t| &t.language_code == lang && !t.is_generated())
                .or_else(|| tracks.iter().find(|t| &t.language_code == lang && t.is_generated()))
        })
    }
}

fn extract_api_key(html: &str, video_id: &str) -> Result<String, LookupError> {
    match api_key_regex().captures(html) {
        Some(caps) => Ok(caps[1].to_string()),
        None if html.contains(RECAPTCHA_MARKER) => {
            Err(LookupError::RequestBlocked(video_id.to_string()))
        }
        None => Err(LookupError::UnexpectedResponse(
            "INNERTUBE_API_KEY not found in watch page".to_string(),
        )),
    }
}

fn check_playability(data: &Value, video_id: &str) -> Result<(), LookupError> {
    let status = &data["playabilityStatus"];
    let reason = status["reason"].as_str().unwrap_or_default();

    match status["status"].as_str().unwrap_or("OK") {
        "OK" => Ok(()),
        "LOGIN_REQUIRED" if reason.contains(BOT_CHECK_REASON) => {
            Err(LookupError::RequestBlocked(video_id.to_string()))
        }
        "LOGIN_REQUIRED" if reason.contains(AGE_RESTRICTED_REASON) => {
            Err(LookupError::AgeRestricted(video_id.to_string()))
        }
        "ERROR" if reason.contains(UNAVAILABLE_REASON) => {
            if video_id.starts_with("http://") || video_id.starts_with("https://") {
                Err(LookupError::InvalidVideoId(video_id.to_string()))
            } else {
                Err(LookupError::VideoUnavailable(video_id.to_string()))
            }
        }
        other => Err(LookupError::VideoUnplayable {
            video_id: video_id.to_string(),
            reason: if reason.is_empty() { other.to_string() } else { reason.to_string() },
        }),
    }
}

fn caption_tracks(data: &Value, video_id: &str) -> Result<Vec<CaptionTrack>, LookupError> {
    let tracks = &data["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"];
    if tracks.is_null() {
        return Err(LookupError::TranscriptsDisabled(video_id.to_string()));
    }

    serde_json::from_value(tracks.clone())
        .map_err(|e| LookupError::UnexpectedResponse(format!("Malformed caption tracks: {}", e)))
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptClient {
    async fn fetch(&self, video_id: &str) -> Result<FetchedTranscript, LookupError> {
        tracing::debug!("Fetching caption tracks for: {}", video_id);

        let html = self.fetch_watch_page(video_id).await?;
        let api_key = extract_api_key(&html, video_id)?;
        let data = self.fetch_player_data(video_id, &api_key).await?;

        check_playability(&data, video_id)?;
        let tracks = caption_tracks(&data, video_id)?;

        let track = self.select_track(&tracks).ok_or_else(|| LookupError::NoTranscriptFound {
            video_id: video_id.to_string(),
            requested: self.languages.clone(),
            available: tracks.iter().map(|t| t.language_code.clone()).collect(),
        })?;

        tracing::debug!(
            "Using {} track '{}' for: {}",
            if track.is_generated() { "generated" } else { "manual" },
            track.language_code,
            video_id
        );

        let track_url = track.base_url.replace("&fmt=srv3", "");
        let url = Url::parse(&track_url)
            .map_err(|e| LookupError::UnexpectedResponse(format!("Invalid track URL: {}", e)))?;
        let document = self.get_text(url, None).await?;

        Ok(FetchedTranscript {
            video_id: video_id.to_string(),
            language: track.display_name(),
            language_code: track.language_code.clone(),
            is_generated: track.is_generated(),
            segments: timedtext::parse(&document),
        })
    }

    fn source_name(&self) -> &'static str {
        "YouTube"
    }
}
