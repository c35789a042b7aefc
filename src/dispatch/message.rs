//! Per-attempt message assembly: body resolution and attachment loading.

use crate::core::error::{AppError, Result};
use crate::core::models::{BodySource, MessageTemplate};
use std::path::Path;

/// A file attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub filename: String,
    pub content: Vec<u8>,
}

/// A fully resolved message addressed to one recipient.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub html: bool,
    pub attachments: Vec<AttachmentFile>,
}

impl OutgoingMessage {
    /// Reads the body file and attachments named by the template.
    pub async fn assemble(template: &MessageTemplate, recipient: &str) -> Result<Self> {
        let body = match &template.body {
            BodySource::Inline(text) => text.clone(),
            BodySource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| AppError::BodyFile {
                        path: path.clone(),
                        source,
                    })?
            }
        };

        let mut attachments = Vec::with_capacity(template.attachments.len());
        for path in &template.attachments {
            attachments.push(load_attachment(path).await?);
        }

        Ok(Self {
            from: template.sender.clone(),
            to: recipient.to_string(),
            subject: template.subject.clone(),
            body,
            html: template.html,
            attachments,
        })
    }
}

async fn load_attachment(path: &Path) -> Result<AttachmentFile> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|source| AppError::Attachment {
            path: path.to_path_buf(),
            source,
        })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(AttachmentFile { filename, content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn template(body: BodySource, attachments: Vec<PathBuf>) -> MessageTemplate {
        MessageTemplate {
            sender: "archive@mail.example.com".to_string(),
            subject: "Report".to_string(),
            body,
            html: false,
            attachments,
        }
    }

    #[tokio::test]
    async fn reads_body_file_and_attachments() {
        let mut body = tempfile::NamedTempFile::new().unwrap();
        write!(body, "<p>Hello</p>").unwrap();
        let mut attachment = tempfile::NamedTempFile::new().unwrap();
        attachment.write_all(b"\x00\x01binary").unwrap();

        let tpl = template(
            BodySource::File(body.path().to_path_buf()),
            vec![attachment.path().to_path_buf()],
        );
        let message = OutgoingMessage::assemble(&tpl, "a@x.com").await.unwrap();

        assert_eq!(message.to, "a@x.com");
        assert_eq!(message.body, "<p>Hello</p>");
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.attachments[0].content, b"\x00\x01binary");
        assert_eq!(
            message.attachments[0].filename,
            attachment.path().file_name().unwrap().to_string_lossy()
        );
    }

    #[tokio::test]
    async fn missing_files_fail_the_attempt() {
        let tpl = template(BodySource::File(PathBuf::from("/no/such/body.txt")), vec![]);
        assert!(matches!(
            OutgoingMessage::assemble(&tpl, "a@x.com").await,
            Err(AppError::BodyFile { .. })
        ));

        let tpl = template(
            BodySource::Inline("Hello".to_string()),
            vec![PathBuf::from("/no/such/report.pdf")],
        );
        assert!(matches!(
            OutgoingMessage::assemble(&tpl, "a@x.com").await,
            Err(AppError::Attachment { .. })
        ));
    }
}
