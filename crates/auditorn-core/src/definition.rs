use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

/// A web service whose resources are audited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub name: String,
    pub origin: String,
    /// Cookie the CDN passes through to the origin. When set, every resource
    /// is audited a second time with the cookie to measure cache misses.
    #[serde(
        rename = "cdn-whitelist-cookie",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cdn_whitelist_cookie: Option<String>,
    #[serde(default)]
    pub resources: Vec<ResourceTarget>,
}

/// A page of a service, addressed relative to the service origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTarget {
    pub name: String,
    pub path: String,
}

impl ServiceTarget {
    /// URL audited for a resource of this service
    pub fn url_for(&self, resource: &ResourceTarget) -> String {
        format!("{}{}", self.origin, resource.path)
    }

    /// Cache-bypass cookie name, ignoring blank values
    pub fn cache_bypass_cookie(&self) -> Option<&str> {
        self.cdn_whitelist_cookie
            .as_deref()
            .filter(|cookie| !cookie.trim().is_empty())
    }

    /// Keep only the selected resources, preserving definition order
    pub fn with_resources(mut self, selected: &[ResourceTarget]) -> Self {
        self.resources.retain(|resource| selected.contains(resource));
        self
    }
}

pub struct DefinitionReader;

impl DefinitionReader {
    /// Read, parse and validate a service definition file
    pub fn from_file(path: &Path) -> Result<ServiceTarget> {
        tracing::debug!("Reading service definition from: {}", path.display());

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let service: ServiceTarget = serde_json::from_reader(reader)?;
        Self::validate(&service)?;

        tracing::info!(
            "Loaded service '{}' with {} resources",
            service.name,
            service.resources.len()
        );

        Ok(service)
    }

    /// Parse a service definition from a JSON string
    pub fn from_str(content: &str) -> Result<ServiceTarget> {
        let service: ServiceTarget = serde_json::from_str(content)?;
        Self::validate(&service)?;
        Ok(service)
    }

    /// Validate that a definition can be audited
    pub fn validate(service: &ServiceTarget) -> Result<()> {
        if service.name.trim().is_empty() {
            return Err(Error::InvalidDefinition("Missing service name".to_string()));
        }

        Url::parse(&service.origin).map_err(|e| {
            Error::InvalidDefinition(format!(
                "Service '{}' has an invalid origin '{}': {}",
                service.name, service.origin, e
            ))
        })?;

        if service.resources.is_empty() {
            return Err(Error::InvalidDefinition(format!(
                "Service '{}' defines no resources",
                service.name
            )));
        }

        for (idx, resource) in service.resources.iter().enumerate() {
            if resource.name.trim().is_empty() {
                return Err(Error::InvalidDefinition(format!(
                    "Resource {} of '{}' has an empty name",
                    idx, service.name
                )));
            }
        }

        Ok(())
    }

    /// Load every `*.json` definition in a directory, sorted by service name
    pub fn list(dir: &Path) -> Result<Vec<ServiceTarget>> {
        let pattern = dir.join("*.json");
        let pattern = pattern.to_string_lossy();
        tracing::debug!("Listing service definitions matching {}", pattern);

        let mut services = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = match entry {
                Ok(path) if path.is_file() => path,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("Skipping unreadable definition: {}", e);
                    continue;
                }
            };

            match Self::from_file(&path) {
                Ok(service) => services.push(service),
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }

        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    /// Resolve a definition argument to a file path.
    ///
    /// The argument is used as-is when it names an existing file, otherwise it
    /// is looked up in the definitions directory, with `.json` appended if the
    /// name has no extension.
    pub fn resolve(name: &str, dir: &Path) -> Result<PathBuf> {
        let direct = PathBuf::from(name);
        if direct.is_file() {
            return Ok(direct);
        }

        let mut candidates = vec![dir.join(name)];
        if Path::new(name).extension().is_none() {
            candidates.push(dir.join(format!("{}.json", name)));
        }

        candidates
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                Error::DefinitionNotFound(format!("'{}' (searched {})", name, dir.display()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOP: &str = r#"{
        "name": "shop",
        "origin": "https://shop.example.com",
        "cdn-whitelist-cookie": "cdn-bypass",
        "resources": [
            {"name": "top", "path": "/"},
            {"name": "item", "path": "/items/1"}
        ]
    }"#;

    #[test]
    fn test_parse_definition() {
        let service = DefinitionReader::from_str(SHOP).unwrap();
        assert_eq!(service.name, "shop");
        assert_eq!(service.cache_bypass_cookie(), Some("cdn-bypass"));
        assert_eq!(service.resources.len(), 2);
        assert_eq!(
            service.url_for(&service.resources[1]),
            "https://shop.example.com/items/1"
        );
    }

    #[test]
    fn test_cookie_is_optional() {
        let json = r#"{"name": "blog", "origin": "https://blog.example.com",
            "resources": [{"name": "top", "path": "/"}]}"#;
        let service = DefinitionReader::from_str(json).unwrap();
        assert_eq!(service.cache_bypass_cookie(), None);
    }

    #[test]
    fn test_blank_cookie_is_ignored() {
        let json = r#"{"name": "blog", "origin": "https://blog.example.com",
            "cdn-whitelist-cookie": "", "resources": [{"name": "top", "path": "/"}]}"#;
        let service = DefinitionReader::from_str(json).unwrap();
        assert_eq!(service.cache_bypass_cookie(), None);
    }

    #[test]
    fn test_rejects_empty_resources() {
        let json = r#"{"name": "blog", "origin": "https://blog.example.com", "resources": []}"#;
        let err = DefinitionReader::from_str(json).unwrap_err();
        assert!(err.to_string().contains("no resources"));
    }

    #[test]
    fn test_rejects_invalid_origin() {
        let json = r#"{"name": "blog", "origin": "blog", "resources": [{"name": "top", "path": "/"}]}"#;
        let err = DefinitionReader::from_str(json).unwrap_err();
        assert!(err.to_string().contains("invalid origin"));
    }

    #[test]
    fn test_with_resources_keeps_definition_order() {
        let service = DefinitionReader::from_str(SHOP).unwrap();
        let selected = vec![service.resources[1].clone(), service.resources[0].clone()];
        let narrowed = service.clone().with_resources(&selected);
        assert_eq!(narrowed.resources, service.resources);

        let only_item = service.clone().with_resources(&service.resources[1..]);
        assert_eq!(only_item.resources.len(), 1);
        assert_eq!(only_item.resources[0].name, "item");
    }

    #[test]
    fn test_list_sorts_and_skips_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b.json"),
            r#"{"name": "zeta", "origin": "https://z.example.com", "resources": [{"name": "top", "path": "/"}]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.json"),
            r#"{"name": "alpha", "origin": "https://a.example.com", "resources": [{"name": "top", "path": "/"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let services = DefinitionReader::list(dir.path()).unwrap();
        let names: Vec<_> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_resolve_in_definitions_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");
        std::fs::write(&path, SHOP).unwrap();

        assert_eq!(DefinitionReader::resolve("shop.json", dir.path()).unwrap(), path);
        assert_eq!(DefinitionReader::resolve("shop", dir.path()).unwrap(), path);
        assert!(DefinitionReader::resolve("missing", dir.path()).is_err());
    }
}
