//! PDF generation for quote documents.
//!
//! Renders the quote HTML template with Tera and converts it to PDF with
//! wkhtmltopdf when available. Without wkhtmltopdf the rendered HTML is
//! written instead, so local development still produces a retrievable
//! document.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{error, info, warn};

use freightbot_core::config::BrandingConfig;
use freightbot_core::{DocumentRenderer, QuoteRequest, RenderError};

const QUOTE_TEMPLATE: &str = "quote.html.tera";

pub struct QuoteDocumentRenderer {
    tera: Tera,
    wkhtmltopdf_path: Option<String>,
    public_dir: PathBuf,
    branding: BrandingConfig,
}

impl QuoteDocumentRenderer {
    /// Renderer with the embedded quote template. `template_dir`, when
    /// given, overrides the embedded copy.
    pub fn new(
        template_dir: Option<&str>,
        public_dir: PathBuf,
        branding: BrandingConfig,
    ) -> Result<Self, RenderError> {
        let mut tera = match template_dir {
            Some(dir) => Tera::new(&format!("{dir}/**/*"))
                .map_err(|error| RenderError::Template(error.to_string()))?,
            None => Tera::default(),
        };
        if tera.get_template_names().all(|name| name != QUOTE_TEMPLATE) {
            tera.add_raw_template(QUOTE_TEMPLATE, include_str!("../../../templates/quote.html.tera"))
                .map_err(|error| RenderError::Template(error.to_string()))?;
        }

        let wkhtmltopdf_path =
            which::which("wkhtmltopdf").ok().map(|path| path.to_string_lossy().to_string());
        match &wkhtmltopdf_path {
            Some(path) => info!(path = %path, "wkhtmltopdf found"),
            None => warn!("wkhtmltopdf not found in PATH, falling back to HTML documents"),
        }

        Ok(Self { tera, wkhtmltopdf_path, public_dir, branding })
    }

    fn render_html(&self, quote: &QuoteRequest) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("quote", quote);
        context.insert("company_name", &self.branding.company_name);
        context.insert("logo_url", &self.branding.logo_url);
        self.tera
            .render(QUOTE_TEMPLATE, &context)
            .map_err(|error| RenderError::Template(error.to_string()))
    }

    async fn convert_html_to_pdf(
        &self,
        html: &str,
        wkhtmltopdf_path: &str,
        pdf_path: &std::path::Path,
    ) -> Result<(), RenderError> {
        let temp_dir = std::env::temp_dir();
        let html_path = temp_dir.join(format!("quote_{}.html", uuid::Uuid::new_v4()));
        tokio::fs::write(&html_path, html).await?;

        let output = Command::new(wkhtmltopdf_path)
            .arg("--page-size")
            .arg("A4")
            .arg("--margin-top")
            .arg("10mm")
            .arg("--margin-bottom")
            .arg("10mm")
            .arg("--margin-left")
            .arg("10mm")
            .arg("--margin-right")
            .arg("10mm")
            .arg("--encoding")
            .arg("utf-8")
            .arg("--enable-local-file-access")
            .arg(&html_path)
            .arg(pdf_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let _ = tokio::fs::remove_file(&html_path).await;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(stderr = %stderr, "wkhtmltopdf failed");
            return Err(RenderError::Conversion(stderr.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentRenderer for QuoteDocumentRenderer {
    async fn render(&self, quote: &QuoteRequest) -> Result<String, RenderError> {
        let html = self.render_html(quote)?;
        tokio::fs::create_dir_all(&self.public_dir).await?;

        if let Some(wkhtmltopdf) = &self.wkhtmltopdf_path {
            let filename = quote.filename();
            let pdf_path = self.public_dir.join(&filename);
            self.convert_html_to_pdf(&html, wkhtmltopdf, &pdf_path).await?;
            info!(
                event_name = "pdf.document_generated",
                quote_number = %quote.number,
                "quote pdf generated"
            );
            return Ok(format!("/public/{filename}"));
        }

        let filename = quote.filename().replace(".pdf", ".html");
        tokio::fs::write(self.public_dir.join(&filename), &html).await?;
        Ok(format!("/public/{filename}"))
    }
}
