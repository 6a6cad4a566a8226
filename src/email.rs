//! Email container parsing.
//!
//! Extracts plain-text and HTML bodies from `.eml` files. The classifier
//! consumes the plain text when present and falls back to the HTML body
//! stripped to text; the link check consumes the raw HTML.

use std::path::Path;

/// Error type for email reading
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse email: {0}")]
    Parse(String),
}

/// Text and HTML bodies of one email, concatenated across MIME parts.
#[derive(Debug, Clone, Default)]
pub struct EmailContent {
    pub text_body: String,
    pub html_body: String,
}

impl EmailContent {
    /// Text used for embedding: plain body preferred, stripped HTML as
    /// fallback, empty string when neither is present.
    pub fn embedding_text(&self) -> String {
        if !self.text_body.trim().is_empty() {
            return self.text_body.clone();
        }
        if !self.html_body.trim().is_empty() {
            return html_to_text(&self.html_body);
        }
        String::new()
    }
}

/// Read and parse an `.eml` file.
pub fn read_email(path: &Path) -> Result<EmailContent, EmailError> {
    let raw = std::fs::read(path).map_err(|e| EmailError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_email(&raw)
}

/// Parse a raw RFC 822 message into its text and HTML bodies.
pub fn parse_email(raw: &[u8]) -> Result<EmailContent, EmailError> {
    let mail = mailparse::parse_mail(raw).map_err(|e| EmailError::Parse(e.to_string()))?;

    let mut content = EmailContent::default();
    collect_bodies(&mail, &mut content)?;
    Ok(content)
}

/// Walk the MIME tree, appending every text/plain and text/html leaf body.
fn collect_bodies(part: &mailparse::ParsedMail, content: &mut EmailContent) -> Result<(), EmailError> {
    if part.subparts.is_empty() {
        let mimetype = part.ctype.mimetype.to_lowercase();
        if mimetype == "text/plain" {
            content
                .text_body
                .push_str(&part.get_body().map_err(|e| EmailError::Parse(e.to_string()))?);
        } else if mimetype == "text/html" {
            content
                .html_body
                .push_str(&part.get_body().map_err(|e| EmailError::Parse(e.to_string()))?);
        }
        return Ok(());
    }

    for sub in &part.subparts {
        collect_bodies(sub, content)?;
    }
    Ok(())
}

/// Strip HTML to whitespace-joined text.
pub fn html_to_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_email() {
        let raw = b"From: a@example.com\r\nSubject: Hello\r\nContent-Type: text/plain\r\n\r\nJust a plain body.\r\n";
        let content = parse_email(raw).unwrap();
        assert!(content.text_body.contains("Just a plain body."));
        assert!(content.html_body.is_empty());
        assert!(content.embedding_text().contains("Just a plain body."));
    }

    #[test]
    fn test_multipart_collects_both_bodies() {
        let raw = b"From: a@example.com\r\n\
Subject: Multi\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/alternative; boundary=\"sep\"\r\n\
\r\n\
--sep\r\n\
Content-Type: text/plain\r\n\
\r\n\
plain part\r\n\
--sep\r\n\
Content-Type: text/html\r\n\
\r\n\
<html><body><p>html part</p></body></html>\r\n\
--sep--\r\n";
        let content = parse_email(raw).unwrap();
        assert!(content.text_body.contains("plain part"));
        assert!(content.html_body.contains("<p>html part</p>"));
        // Plain text wins for embedding
        assert!(content.embedding_text().contains("plain part"));
    }

    #[test]
    fn test_html_only_email_falls_back_to_stripped_html() {
        let raw = b"From: a@example.com\r\n\
Subject: Html\r\n\
Content-Type: text/html\r\n\
\r\n\
<html><body><h1>Account notice</h1><p>Please review.</p></body></html>\r\n";
        let content = parse_email(raw).unwrap();
        assert!(content.text_body.is_empty());

        let text = content.embedding_text();
        assert!(text.contains("Account notice"));
        assert!(text.contains("Please review."));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_empty_email_yields_empty_text() {
        let raw = b"From: a@example.com\r\nSubject: Empty\r\n\r\n";
        let content = parse_email(raw).unwrap();
        assert_eq!(content.embedding_text(), "");
    }

    #[test]
    fn test_read_email_missing_file() {
        let result = read_email(Path::new("/nonexistent/mail.eml"));
        assert!(matches!(result, Err(EmailError::Io { .. })));
    }

    #[test]
    fn test_read_email_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mail.eml");
        std::fs::write(
            &path,
            b"From: a@example.com\r\nContent-Type: text/plain\r\n\r\nbody on disk\r\n",
        )
        .unwrap();

        let content = read_email(&path).unwrap();
        assert!(content.text_body.contains("body on disk"));
    }

    #[test]
    fn test_html_to_text_joins_fragments() {
        let text = html_to_text("<div>first</div><div>second <b>bold</b></div>");
        assert_eq!(text, "first second bold");
    }
}
