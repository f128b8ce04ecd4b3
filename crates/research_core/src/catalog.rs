/// A predefined catalog entry offered for quick selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub label: String,
    pub url: String,
}

impl Preset {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Immutable label -> URL mapping, defined once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    /// Builds a catalog; later entries reusing an earlier label are dropped.
    pub fn new(presets: Vec<Preset>) -> Self {
        let mut unique: Vec<Preset> = Vec::with_capacity(presets.len());
        for preset in presets {
            if !unique.iter().any(|p| p.label == preset.label) {
                unique.push(preset);
            }
        }
        Self { presets: unique }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            Preset::new(
                "Mortgage News Daily: current rates",
                "https://www.mortgagenewsdaily.com/mortgage-rates",
            ),
            Preset::new(
                "Freddie Mac: mortgage market survey",
                "https://www.freddiemac.com/pmms",
            ),
            Preset::new(
                "Bankrate: today's mortgage rates",
                "https://www.bankrate.com/mortgages/mortgage-rates/",
            ),
        ])
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn resolve(&self, label: &str) -> Option<&str> {
        self.presets
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.url.as_str())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.resolve(label).is_some()
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
