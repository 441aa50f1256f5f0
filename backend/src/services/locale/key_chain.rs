//! Maps the configured source names onto concrete lookup descriptors.

use crate::config::NameOf;
use crate::models::{LocaleSource, LookupDescriptor, ResolutionOrder};
use crate::utils::ConfigError;

/// Derive the resolution order from configured source names, once at start-up.
///
/// Unknown names fail with `ConfigError::UnknownSource` before anything else is checked.
pub fn derive_order(names: &[String], name_of: &NameOf) -> Result<ResolutionOrder, ConfigError> {
    names
        .iter()
        .map(|name| {
            let source: LocaleSource =
                name.parse().map_err(ConfigError::UnknownSource)?;
            Ok(descriptor_for(source, name_of))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ResolutionOrder::new)
}

fn descriptor_for(source: LocaleSource, name_of: &NameOf) -> LookupDescriptor {
    match source {
        LocaleSource::Path => LookupDescriptor::new(source, &name_of.path),
        LocaleSource::Query => LookupDescriptor::new(source, &name_of.query),
        LocaleSource::Header => LookupDescriptor::new(source, name_of.header.to_ascii_lowercase()),
        LocaleSource::Cookie if name_of.cookie_key.is_empty() => {
            LookupDescriptor::new(source, &name_of.cookie)
        },
        LocaleSource::Cookie => {
            LookupDescriptor::nested(source, &name_of.cookie, &name_of.cookie_key)
        },
    }
}
