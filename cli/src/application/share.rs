use std::path::PathBuf;

use chrono::Utc;
use dietchat_core::domain::{
    common::entities::app_errors::CoreError,
    share::{ImageExporter, ShareCard},
};

const SHARE_FILE_PREFIX: &str = "食友记分享_";

/// Writes share cards as standalone HTML pages into a directory.
#[derive(Debug, Clone)]
pub struct HtmlCardExporter {
    dir: PathBuf,
}

impl HtmlCardExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn document(card: &ShareCard) -> String {
        format!(
            concat!(
                "<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n",
                "<title>食友记分享</title>\n</head>\n<body>\n",
                "<div class=\"share-card\" data-message-id=\"{id}\">\n",
                "<div class=\"share-header\">🥗 食友记</div>\n",
                "<div class=\"share-content\">{content}</div>\n",
                "<div class=\"share-footer\">AI 饮食助手</div>\n",
                "</div>\n</body>\n</html>\n"
            ),
            id = card.message_id,
            content = card.markup,
        )
    }
}

impl ImageExporter for HtmlCardExporter {
    async fn export(&self, card: &ShareCard) -> Result<String, CoreError> {
        let path = self.dir.join(format!(
            "{}{}.html",
            SHARE_FILE_PREFIX,
            Utc::now().timestamp_millis()
        ));

        tokio::fs::write(&path, Self::document(card))
            .await
            .map_err(|e| {
                tracing::error!("Failed to write share card {}: {}", path.display(), e);
                CoreError::ExportFailed(e.to_string())
            })?;

        tracing::info!("Share card written to {}", path.display());
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn test_export_writes_formatted_card() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = HtmlCardExporter::new(dir.path());
        let card = ShareCard::new(Uuid::nil(), "**少糖** <多喝水>".to_string());

        let location = exporter.export(&card).await.unwrap();

        assert!(location.contains(SHARE_FILE_PREFIX));
        let html = std::fs::read_to_string(&location).unwrap();
        assert!(html.contains("<p><strong>少糖</strong> &lt;多喝水&gt;</p>"));
    }

    #[tokio::test]
    async fn test_missing_directory_fails_export() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = HtmlCardExporter::new(dir.path().join("missing"));
        let card = ShareCard::new(Uuid::nil(), "hi".to_string());

        let err = exporter.export(&card).await.unwrap_err();
        assert!(matches!(err, CoreError::ExportFailed(_)));
    }
}
