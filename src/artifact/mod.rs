/// External artifact hosting
///
/// Certificates may be mirrored to an external host as a rendered document.
/// The upload is strictly best-effort: certificates are durable and
/// verifiable before any upload starts, and a missing or failing host leaves
/// them in an "artifact pending" state.

mod remote;

pub use remote::HttpArtifactBackend;

use crate::{
    config::ArtifactStoreConfig,
    db::models::Certificate,
    error::ApiResult,
};
use async_trait::async_trait;

/// Storage backend for rendered artifacts
#[async_trait]
pub trait ArtifactBackend: Send + Sync {
    /// Upload a rendered document and return its hosted URL
    async fn upload(
        &self,
        public_id: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ApiResult<String>;
}

/// Artifact store: renders certificate documents and hands them to the
/// configured backend.
pub struct ArtifactStore {
    backend: Box<dyn ArtifactBackend>,
}

impl ArtifactStore {
    pub fn new(backend: Box<dyn ArtifactBackend>) -> Self {
        Self { backend }
    }

    /// Build a store from config, if artifact credentials were provided
    pub fn from_config(config: Option<&ArtifactStoreConfig>) -> Option<Self> {
        config.map(|c| Self::new(Box::new(HttpArtifactBackend::new(c.clone()))))
    }

    /// Render the certificate document and upload it, returning the hosted
    /// URL.
    pub async fn upload(&self, certificate: &Certificate) -> ApiResult<String> {
        let document = render_certificate_svg(certificate);

        self.backend
            .upload(
                &certificate.certificate_id,
                document.into_bytes(),
                "image/svg+xml",
            )
            .await
    }
}

/// Render a certificate as a standalone SVG document
fn render_certificate_svg(cert: &Certificate) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="1000" height="700" viewBox="0 0 1000 700">
  <rect width="1000" height="700" fill="#fdfbf7" stroke="#1a2b4a" stroke-width="12"/>
  <text x="500" y="150" text-anchor="middle" font-family="Georgia, serif" font-size="44" fill="#1a2b4a">Certificate of Completion</text>
  <text x="500" y="280" text-anchor="middle" font-family="Georgia, serif" font-size="36" fill="#333">{intern}</text>
  <text x="500" y="350" text-anchor="middle" font-family="Georgia, serif" font-size="22" fill="#555">has successfully completed the internship</text>
  <text x="500" y="410" text-anchor="middle" font-family="Georgia, serif" font-size="30" fill="#1a2b4a">{title}</text>
  <text x="500" y="520" text-anchor="middle" font-family="Georgia, serif" font-size="18" fill="#555">Issued on {issued}</text>
  <text x="500" y="620" text-anchor="middle" font-family="monospace" font-size="16" fill="#888">{id}</text>
</svg>"##,
        intern = escape_xml(&cert.intern_name),
        title = escape_xml(&cert.internship_title),
        issued = cert.issued_at.format("%B %e, %Y"),
        id = escape_xml(&cert.certificate_id),
    )
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_certificate() -> Certificate {
        Certificate {
            id: "row-1".to_string(),
            certificate_id: "NEX-abcd1234-A1B2C3".to_string(),
            internship_id: "internship-1".to_string(),
            intern_id: "intern-1".to_string(),
            intern_name: "Ada <Lovelace>".to_string(),
            internship_title: "Systems & Tools".to_string(),
            issued_at: Utc::now(),
            artifact_url: None,
            artifact_uploaded_at: None,
        }
    }

    #[test]
    fn rendered_document_escapes_markup() {
        let svg = render_certificate_svg(&sample_certificate());

        assert!(svg.contains("Ada &lt;Lovelace&gt;"));
        assert!(svg.contains("Systems &amp; Tools"));
        assert!(svg.contains("NEX-abcd1234-A1B2C3"));
        assert!(!svg.contains("<Lovelace>"));
    }
}
