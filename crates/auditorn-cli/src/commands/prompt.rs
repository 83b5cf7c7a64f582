//! Interactive selection of the service and resources to audit.

use anyhow::{Result, bail};
use auditorn_core::definition::{DefinitionReader, ResourceTarget, ServiceTarget};
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{MultiSelect, Select};
use std::path::Path;

/// Ask which service to audit, then which of its resources
pub fn select_target(definitions_dir: &Path) -> Result<ServiceTarget> {
    let mut services = DefinitionReader::list(definitions_dir)?;
    if services.is_empty() {
        bail!(
            "No service definitions found in {}",
            definitions_dir.display()
        );
    }

    let theme = ColorfulTheme::default();
    let names: Vec<String> = services.iter().map(|s| s.name.clone()).collect();
    let picked = Select::with_theme(&theme)
        .with_prompt("Target service")
        .items(&names)
        .default(0)
        .interact()?;
    let service = services.swap_remove(picked);

    let items: Vec<(String, bool)> = service
        .resources
        .iter()
        .map(|r| (r.name.clone(), true))
        .collect();

    loop {
        let checked = MultiSelect::with_theme(&theme)
            .with_prompt("Target resources")
            .items_checked(&items)
            .interact()?;

        match narrow_resources(&service, &checked) {
            Some(target) => return Ok(target),
            None => println!("{}", style("Select at least one resource").yellow()),
        }
    }
}

/// Restrict a service to the resources at `checked`, `None` if nothing is checked
pub fn narrow_resources(service: &ServiceTarget, checked: &[usize]) -> Option<ServiceTarget> {
    let selected: Vec<ResourceTarget> = checked
        .iter()
        .filter_map(|&idx| service.resources.get(idx).cloned())
        .collect();

    if selected.is_empty() {
        return None;
    }

    Some(service.clone().with_resources(&selected))
}
