//! Export platform descriptors.
//!
//! A host (editor, build server, the bundled CLI) keeps a [`PlatformRegistry`]
//! of the platforms it can export to and invokes the matching exporter. This
//! crate only contributes the Wii descriptor; the export itself is
//! [`crate::pipeline::export`].

use std::collections::BTreeMap;

const WII_LOGO: &[u8] = include_bytes!("logo.png");

/// What a host needs to know to list a platform and pick templates for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub name: &'static str,
    pub os_name: &'static str,
    /// Extensions accepted for export templates and the exported binary.
    pub binary_extensions: &'static [&'static str],
    /// PNG image shown next to the platform name.
    pub logo: &'static [u8],
}

pub fn wii_platform() -> PlatformInfo {
    PlatformInfo {
        name: "Nintendo Wii",
        os_name: "Wii",
        binary_extensions: &["elf", "dol"],
        logo: WII_LOGO,
    }
}

/// Platforms known to a host, keyed by display name.
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    platforms: BTreeMap<&'static str, PlatformInfo>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a platform, replacing any previous one with the same name.
    pub fn register(&mut self, info: PlatformInfo) {
        self.platforms.insert(info.name, info);
    }

    pub fn get(&self, name: &str) -> Option<&PlatformInfo> {
        self.platforms.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformInfo> {
        self.platforms.values()
    }
}

pub fn register_wii(registry: &mut PlatformRegistry) {
    registry.register(wii_platform());
}
