//! Contact hand-offs: the `mailto:` inquiry, the founder's vCard, share with
//! clipboard degradation, and the flip state of the digital business card.
//!
//! Nothing here talks to a backend. Each hand-off produces a value (a URI,
//! a file, an outcome) for the platform layer to act on.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ShareError;

/// Where site inquiries go.
pub const CONTACT_EMAIL: &str = "setlyhq@gmail.com";

pub const SITE_URL: &str = "https://setly.net";

const TAGLINE: &str = "From landing to belonging. Helping students and expats settle into a new place — faster, calmer, together.";

const INSTALL_HINT: &str = "Tap the Share button, then 'Add to Home Screen' to save Setly";

// ── mailto ─────────────────────────────────────────────────────────

/// The contact page form. Submitting opens the visitor's mail client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn subject(&self) -> String {
        format!("Setly.net inquiry — {}", self.name).trim().to_string()
    }

    pub fn body(&self) -> String {
        format!("Name: {}\nEmail: {}\n\n{}", self.name, self.email, self.message)
            .trim()
            .to_string()
    }

    /// `mailto:` URI with percent-encoded subject and body.
    pub fn mailto_uri(&self, recipient: &str) -> String {
        format!(
            "mailto:{recipient}?subject={}&body={}",
            urlencoding::encode(&self.subject()),
            urlencoding::encode(&self.body())
        )
    }
}

// ── vCard ──────────────────────────────────────────────────────────

/// A labelled URL on a contact card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardUrl {
    pub label: Option<String>,
    pub url: String,
}

/// Contact details exported as a vCard 3.0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactCard {
    pub given_name: String,
    pub family_name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub urls: Vec<CardUrl>,
    pub note: Option<String>,
}

/// An in-memory file ready to hand to the platform's download mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VCardFile {
    pub file_name: String,
    pub mime: &'static str,
    pub contents: String,
}

impl ContactCard {
    /// The card handed out from the business card overlay.
    pub fn founder() -> Self {
        Self {
            given_name: "Kiran".to_string(),
            family_name: "Revally".to_string(),
            title: Some("Founder, Setly".to_string()),
            email: Some(CONTACT_EMAIL.to_string()),
            urls: vec![
                CardUrl {
                    label: None,
                    url: SITE_URL.to_string(),
                },
                CardUrl {
                    label: Some("LinkedIn".to_string()),
                    url: "https://linkedin.com/in/kiranrevally".to_string(),
                },
            ],
            note: Some(TAGLINE.to_string()),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_string()
    }

    /// Serialise as vCard 3.0 with CRLF line endings, escaped text values and
    /// lines folded at 75 octets.
    pub fn to_vcard(&self) -> String {
        let mut lines = vec![
            "BEGIN:VCARD".to_string(),
            "VERSION:3.0".to_string(),
            format!("FN:{}", escape_text(&self.full_name())),
            format!(
                "N:{};{};;;",
                escape_text(&self.family_name),
                escape_text(&self.given_name)
            ),
        ];
        if let Some(title) = &self.title {
            lines.push(format!("TITLE:{}", escape_text(title)));
        }
        if let Some(email) = &self.email {
            lines.push(format!("EMAIL;TYPE=INTERNET:{email}"));
        }
        for url in &self.urls {
            match &url.label {
                Some(label) => lines.push(format!("URL;TYPE={label}:{}", url.url)),
                None => lines.push(format!("URL:{}", url.url)),
            }
        }
        if let Some(note) = &self.note {
            lines.push(format!("NOTE:{}", escape_text(note)));
        }
        lines.push("END:VCARD".to_string());

        let mut out = String::new();
        for line in &lines {
            out.push_str(&fold_line(line));
            out.push_str("\r\n");
        }
        out
    }

    /// Download file name, e.g. `kiran-revally-setly.vcf`.
    pub fn file_name(&self) -> String {
        let slug: String = self
            .full_name()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        let slug = slug
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        if slug.is_empty() {
            "contact-setly.vcf".to_string()
        } else {
            format!("{slug}-setly.vcf")
        }
    }

    pub fn download(&self) -> VCardFile {
        VCardFile {
            file_name: self.file_name(),
            mime: "text/vcard",
            contents: self.to_vcard(),
        }
    }
}

/// Escape a vCard text value (backslash, comma, semicolon, newline).
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Fold a content line so no physical line exceeds 75 octets. Continuation
/// lines start with a single space and never split a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    const LIMIT: usize = 75;
    if line.len() <= LIMIT {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / LIMIT * 3);
    let mut width = 0;
    let mut limit = LIMIT;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > limit {
            out.push_str("\r\n ");
            width = 0;
            // The leading space counts toward the continuation line.
            limit = LIMIT - 1;
        }
        out.push(c);
        width += len;
    }
    out
}

// ── share ──────────────────────────────────────────────────────────

/// What gets shared from the business card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl SharePayload {
    pub fn founder() -> Self {
        Self {
            title: "Kiran Revally — Setly".to_string(),
            text: TAGLINE.to_string(),
            url: SITE_URL.to_string(),
        }
    }
}

/// Platform capabilities the hand-offs degrade across.
#[async_trait]
pub trait SharePlatform: Send + Sync {
    fn has_native_share(&self) -> bool;

    async fn native_share(&self, payload: &SharePayload) -> Result<(), ShareError>;

    fn has_clipboard(&self) -> bool;

    async fn copy_to_clipboard(&self, text: &str) -> Result<(), ShareError>;

    /// Whether the platform can install the site to the home screen.
    fn supports_install(&self) -> bool {
        false
    }
}

/// How a share attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ShareOutcome {
    Shared,
    /// The visitor dismissed the native sheet. Nothing is shown.
    Cancelled,
    /// The URL was copied; the view shows a confirmation.
    Copied { notice: &'static str },
    Unavailable,
}

/// Native share, then clipboard copy of the URL, then nothing.
pub async fn share(platform: &dyn SharePlatform, payload: &SharePayload) -> ShareOutcome {
    if platform.has_native_share() {
        match platform.native_share(payload).await {
            Ok(()) => {
                info!(url = %payload.url, "Shared via native sheet");
                return ShareOutcome::Shared;
            }
            Err(ShareError::Cancelled) => {
                debug!("Native share cancelled");
                return ShareOutcome::Cancelled;
            }
            Err(e) => {
                warn!(error = %e, "Native share failed, trying clipboard");
            }
        }
    }

    if platform.has_clipboard() {
        match platform.copy_to_clipboard(&payload.url).await {
            Ok(()) => {
                return ShareOutcome::Copied {
                    notice: "Link copied to clipboard",
                };
            }
            Err(e) => warn!(error = %e, "Clipboard copy failed"),
        }
    }

    ShareOutcome::Unavailable
}

/// Result of the "save to phone" control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SaveAction {
    InstallHint { message: &'static str },
    Download(VCardFile),
}

pub fn save_to_phone(platform: &dyn SharePlatform, card: &ContactCard) -> SaveAction {
    if platform.supports_install() {
        SaveAction::InstallHint {
            message: INSTALL_HINT,
        }
    } else {
        SaveAction::Download(card.download())
    }
}

// ── business card ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardFace {
    #[default]
    Front,
    Back,
}

/// Overlay state of the digital business card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusinessCard {
    open: bool,
    face: CardFace,
}

impl BusinessCard {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn face(&self) -> CardFace {
        self.face
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closing always shows the front next time.
    pub fn close(&mut self) {
        self.open = false;
        self.face = CardFace::Front;
    }

    /// Turn the card over. Ignored while closed.
    pub fn flip(&mut self) -> CardFace {
        if self.open {
            self.face = match self.face {
                CardFace::Front => CardFace::Back,
                CardFace::Back => CardFace::Front,
            };
        }
        self.face
    }
}
