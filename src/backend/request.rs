//! Generation request payload and form-value extraction.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::ClientError;

/// Model label used when the form leaves the model blank.
pub const DEFAULT_MODEL: &str = "cinematic";

/// Clip length used when the form carries no usable duration.
pub const DEFAULT_DURATION_SECS: u32 = 5;

/// Validate a prompt before anything is sent to the backend.
///
/// Whitespace-only prompts are rejected the same as empty ones.
pub fn validate_prompt(prompt: &str) -> Result<(), ClientError> {
    if prompt.trim().is_empty() {
        return Err(ClientError::EmptyPrompt);
    }
    Ok(())
}

/// Output aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Classic,
    #[serde(rename = "3:4")]
    ClassicPortrait,
    #[serde(rename = "21:9")]
    Ultrawide,
}

impl AspectRatio {
    /// All supported ratios, in display order.
    pub const ALL: [AspectRatio; 6] = [
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Square,
        AspectRatio::Classic,
        AspectRatio::ClassicPortrait,
        AspectRatio::Ultrawide,
    ];

    /// The wire label, e.g. `"16:9"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Square => "1:1",
            Self::Classic => "4:3",
            Self::ClassicPortrait => "3:4",
            Self::Ultrawide => "21:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|ratio| ratio.as_str() == trimmed)
            .ok_or_else(|| format!("unsupported aspect ratio '{}'", trimmed))
    }
}

/// Raw form values as they come off a form or a command line.
///
/// Every field is optional and unvalidated; [`GenerationRequest::from_form`]
/// applies defaults and rejects an empty prompt.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub duration: Option<String>,
    pub aspect_ratio: Option<String>,
}

impl FormInput {
    /// Form with only a prompt filled in.
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }
}

/// Request body for `POST /generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub duration_seconds: u32,
    pub aspect_ratio: AspectRatio,
}

impl GenerationRequest {
    /// Build a request from raw form values.
    ///
    /// Blank model, unparseable or zero duration, and unknown aspect ratios
    /// fall back to their defaults. Only the prompt can make this fail.
    pub fn from_form(form: &FormInput) -> Result<Self, ClientError> {
        let prompt = form.prompt.as_deref().unwrap_or_default().trim();
        validate_prompt(prompt)?;

        let model = form
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string();

        Ok(Self {
            prompt: prompt.to_string(),
            model,
            duration_seconds: parse_duration(form.duration.as_deref()),
            aspect_ratio: parse_aspect_ratio(form.aspect_ratio.as_deref()),
        })
    }
}

fn parse_duration(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|d| !d.is_empty()) else {
        return DEFAULT_DURATION_SECS;
    };
    match raw.parse::<u32>() {
        Ok(secs) if secs > 0 => secs,
        _ => {
            log::warn!(
                "Ignoring invalid duration '{}', using {}s",
                raw,
                DEFAULT_DURATION_SECS
            );
            DEFAULT_DURATION_SECS
        }
    }
}

fn parse_aspect_ratio(raw: Option<&str>) -> AspectRatio {
    let Some(raw) = raw.map(str::trim).filter(|a| !a.is_empty()) else {
        return AspectRatio::default();
    };
    raw.parse().unwrap_or_else(|e| {
        log::warn!("{}, using {}", e, AspectRatio::default());
        AspectRatio::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(prompt: &str, model: &str, duration: &str, aspect: &str) -> FormInput {
        FormInput {
            prompt: Some(prompt.to_string()),
            model: Some(model.to_string()),
            duration: Some(duration.to_string()),
            aspect_ratio: Some(aspect.to_string()),
        }
    }

    #[test]
    fn test_validate_prompt_rejects_blank() {
        assert!(matches!(validate_prompt(""), Err(ClientError::EmptyPrompt)));
        assert!(matches!(
            validate_prompt(" \t\n "),
            Err(ClientError::EmptyPrompt)
        ));
        assert!(validate_prompt("a fox").is_ok());
    }

    #[test]
    fn test_from_form_missing_prompt_is_rejected() {
        let result = GenerationRequest::from_form(&FormInput::default());
        assert!(matches!(result, Err(ClientError::EmptyPrompt)));
    }

    #[test]
    fn test_from_form_applies_defaults() {
        let request = GenerationRequest::from_form(&FormInput::with_prompt("a fox")).unwrap();
        assert_eq!(request.prompt, "a fox");
        assert_eq!(request.model, "cinematic");
        assert_eq!(request.duration_seconds, 5);
        assert_eq!(request.aspect_ratio, AspectRatio::Landscape);
    }

    #[test]
    fn test_from_form_trims_prompt() {
        let request =
            GenerationRequest::from_form(&FormInput::with_prompt("  neon rain  ")).unwrap();
        assert_eq!(request.prompt, "neon rain");
    }

    #[test]
    fn test_from_form_keeps_valid_values() {
        let request =
            GenerationRequest::from_form(&form("a fox", "anime", "12", "9:16")).unwrap();
        assert_eq!(request.model, "anime");
        assert_eq!(request.duration_seconds, 12);
        assert_eq!(request.aspect_ratio, AspectRatio::Portrait);
    }

    #[test]
    fn test_from_form_unparseable_values_fall_back() {
        for (duration, aspect) in [("abc", "5:5"), ("0", "wide"), ("-3", ""), ("2.5", "16x9")] {
            let request =
                GenerationRequest::from_form(&form("a fox", "   ", duration, aspect)).unwrap();
            assert_eq!(request.model, DEFAULT_MODEL);
            assert_eq!(request.duration_seconds, DEFAULT_DURATION_SECS, "{duration}");
            assert_eq!(request.aspect_ratio, AspectRatio::Landscape, "{aspect}");
        }
    }

    #[test]
    fn test_aspect_ratio_from_str() {
        assert_eq!("21:9".parse::<AspectRatio>(), Ok(AspectRatio::Ultrawide));
        assert_eq!(" 1:1 ".parse::<AspectRatio>(), Ok(AspectRatio::Square));
        assert!("2:1".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_request_serialization_uses_pinned_field_names() {
        let request = GenerationRequest::from_form(&form("city", "cinematic", "8", "4:3")).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "prompt": "city",
                "model": "cinematic",
                "duration_seconds": 8,
                "aspect_ratio": "4:3"
            })
        );
    }
}
