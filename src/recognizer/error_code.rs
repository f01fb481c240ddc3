//! Recognizer error code classification

/// How the session controller recovers from a recognizer error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Expected to clear on retry; restart after the retry delay
    Transient,
    /// Needs user action; stop listening
    Fatal,
    /// Dedicated recovery path with a manual retry control
    Network,
}

/// Error codes reported by the platform recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorCode {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    ServiceNotAllowed,
    BadGrammar,
    LanguageNotSupported,
    /// Any code this daemon does not know; treated as transient
    Other(String),
}

impl RecognitionErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "bad-grammar" => Self::BadGrammar,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Network => ErrorClass::Network,
            Self::AudioCapture
            | Self::NotAllowed
            | Self::ServiceNotAllowed
            | Self::LanguageNotSupported => ErrorClass::Fatal,
            Self::NoSpeech | Self::Aborted | Self::BadGrammar | Self::Other(_) => {
                ErrorClass::Transient
            }
        }
    }

    /// Status line shown for this error
    pub fn message(&self) -> String {
        let detail = match self {
            Self::NoSpeech => "No speech detected. Please try again.",
            Self::Aborted => "Speech recognition was aborted.",
            Self::AudioCapture => "Microphone access denied. Please allow microphone access.",
            Self::Network => "Network error. Please check your connection.",
            Self::NotAllowed => "Microphone access denied. Please refresh and allow access.",
            Self::ServiceNotAllowed => "Speech recognition service not available.",
            Self::BadGrammar => "Speech grammar error.",
            Self::LanguageNotSupported => "Language not supported.",
            Self::Other(code) => return format!("Error: {code}"),
        };
        format!("Error: {detail}")
    }
}

impl std::fmt::Display for RecognitionErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::NoSpeech => "no-speech",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::Network => "network",
            Self::NotAllowed => "not-allowed",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::BadGrammar => "bad-grammar",
            Self::LanguageNotSupported => "language-not-supported",
            Self::Other(code) => code.as_str(),
        };
        f.write_str(code)
    }
}
