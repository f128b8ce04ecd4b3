use url::Url;

use crate::PresetCatalog;

/// Number of free-text URL fields on the page.
pub const CUSTOM_URL_SLOTS: usize = 3;

/// Ordered URL batch: resolved presets first, then custom URLs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlBatch {
    /// `(label, url)` pairs in selection order.
    pub predefined: Vec<(String, String)>,
    /// Trimmed, non-blank custom URLs in field order.
    pub custom: Vec<String>,
}

impl UrlBatch {
    pub fn urls(&self) -> Vec<String> {
        self.predefined
            .iter()
            .map(|(_, url)| url.clone())
            .chain(self.custom.iter().cloned())
            .collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.predefined
            .iter()
            .map(|(label, _)| label.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.predefined.is_empty() && self.custom.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("You must provide at least one valid url")]
    EmptyBatch,
    #[error("Invalid URL(s): {}", .0.join(", "))]
    InvalidUrls(Vec<String>),
}

/// Resolves the selected labels and gathers the non-blank custom fields.
///
/// Labels missing from the catalog are skipped. Duplicates are kept.
pub fn collect_urls(catalog: &PresetCatalog, selected: &[String], custom: &[String]) -> UrlBatch {
    let predefined = selected
        .iter()
        .filter_map(|label| {
            catalog
                .resolve(label)
                .map(|url| (label.clone(), url.to_string()))
        })
        .collect();

    let custom = custom
        .iter()
        .map(|field| field.trim())
        .filter(|field| !field.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    UrlBatch { predefined, custom }
}

/// Syntactic check only: absolute http(s) URL with a host.
pub fn is_well_formed(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// Rejects an empty batch, or a batch with any malformed URL (all of them listed).
pub fn validate(batch: &UrlBatch) -> Result<(), IntakeError> {
    if batch.is_empty() {
        return Err(IntakeError::EmptyBatch);
    }
    let invalid: Vec<String> = batch
        .urls()
        .into_iter()
        .filter(|url| !is_well_formed(url))
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(IntakeError::InvalidUrls(invalid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Preset;

    fn catalog() -> PresetCatalog {
        PresetCatalog::new(vec![
            Preset::new("rates", "https://rates.example.com/today"),
            Preset::new("survey", "https://survey.example.com/pmms"),
        ])
    }

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn predefined_come_before_custom_in_input_order() {
        let batch = collect_urls(
            &catalog(),
            &fields(&["survey", "rates"]),
            &fields(&["  https://b.example.com ", "", "https://a.example.com"]),
        );
        assert_eq!(
            batch.urls(),
            fields(&[
                "https://survey.example.com/pmms",
                "https://rates.example.com/today",
                "https://b.example.com",
                "https://a.example.com",
            ])
        );
        assert_eq!(batch.labels(), fields(&["survey", "rates"]));
    }

    #[test]
    fn duplicates_are_passed_through() {
        let batch = collect_urls(
            &catalog(),
            &fields(&["rates"]),
            &fields(&["https://rates.example.com/today"]),
        );
        assert_eq!(batch.urls().len(), 2);
    }

    #[test]
    fn unknown_labels_are_skipped() {
        let batch = collect_urls(&catalog(), &fields(&["nope"]), &fields(&["", " "]));
        assert!(batch.is_empty());
        assert_eq!(validate(&batch), Err(IntakeError::EmptyBatch));
    }

    #[test]
    fn well_formedness_is_syntactic() {
        assert!(is_well_formed("https://example.com/rates"));
        assert!(is_well_formed("http://localhost:8080/a?b=c"));
        assert!(!is_well_formed("not a url"));
        assert!(!is_well_formed("example.com"));
        assert!(!is_well_formed("ftp://example.com/file"));
        assert!(!is_well_formed("mailto:someone@example.com"));
        assert!(!is_well_formed("https://"));
    }

    #[test]
    fn every_invalid_url_is_reported() {
        let batch = collect_urls(
            &catalog(),
            &[],
            &fields(&["not a url", "https://ok.example.com", "also bad"]),
        );
        let err = validate(&batch).unwrap_err();
        assert_eq!(
            err,
            IntakeError::InvalidUrls(fields(&["not a url", "also bad"]))
        );
        assert_eq!(err.to_string(), "Invalid URL(s): not a url, also bad");
    }
}
