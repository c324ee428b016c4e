use limn_core::Error;
use limn_semver::Constraint;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// `[package]` section of the root manifest.
#[derive(Clone, Debug, Deserialize)]
pub struct PackageMeta {
    pub name: String,
    #[serde(rename = "source-directories", default = "default_source_directories")]
    pub source_directories: Vec<String>,
}

fn default_source_directories() -> Vec<String> {
    vec!["src".to_string()]
}

/// The parsed form of a root manifest: package metadata plus direct
/// dependency constraints.
#[derive(Clone, Debug, Deserialize)]
pub struct Manifest {
    pub package: PackageMeta,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

impl Manifest {
    /// Read and parse a manifest file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectMisconfigured`] if the file cannot be read,
    /// is not valid TOML, or declares a dependency constraint that
    /// [`Constraint::parse`] rejects.
    pub fn load(path: impl AsRef<Path>) -> Result<Manifest, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ProjectMisconfigured(format!("{}: {}", path.display(), e)))?;
        Manifest::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Manifest, Error> {
        let manifest: Manifest =
            toml::from_str(raw).map_err(|e| Error::ProjectMisconfigured(e.to_string()))?;

        // Eagerly validate every constraint string so a malformed manifest
        // fails at load time rather than surfacing mid-solve.
        for (name, raw_constraint) in &manifest.dependencies {
            Constraint::parse(raw_constraint).map_err(|e| {
                Error::ProjectMisconfigured(format!("dependency {}: {}", name, e))
            })?;
        }

        Ok(manifest)
    }

    /// Direct dependency constraints, parsed.
    pub fn dependencies(&self) -> Result<BTreeMap<String, Constraint>, Error> {
        self.dependencies
            .iter()
            .map(|(name, raw)| {
                Constraint::parse(raw)
                    .map(|c| (name.clone(), c))
                    .map_err(|e| Error::ProjectMisconfigured(format!("dependency {}: {}", name, e)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_package_and_dependencies() {
        let manifest = Manifest::parse(
            r#"
            [package]
            name = "author/name"
            source-directories = ["src"]

            [dependencies]
            "author/other" = ">=1.0.0 <2.0.0"
            "#,
        )
        .unwrap();

        assert_eq!(manifest.package.name, "author/name");
        let deps = manifest.dependencies().unwrap();
        assert!(deps.contains_key("author/other"));
    }

    #[test]
    fn defaults_source_directories_to_src() {
        let manifest = Manifest::parse(
            r#"
            [package]
            name = "author/name"
            "#,
        )
        .unwrap();
        assert_eq!(manifest.package.source_directories, vec!["src".to_string()]);
    }

    #[test]
    fn rejects_malformed_constraint() {
        let result = Manifest::parse(
            r#"
            [package]
            name = "author/name"

            [dependencies]
            "author/other" = "not a constraint"
            "#,
        );
        assert!(matches!(result, Err(Error::ProjectMisconfigured(_))));
    }
}
