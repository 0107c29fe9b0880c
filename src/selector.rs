//! Device selection criteria for peripheral discovery
//!
//! A `DeviceSelector` tells the transport which peripherals are acceptable
//! during a scan. Exactly one selection mode is active per request: either
//! every device is accepted, or at least one filter must match. The legacy
//! request-options JSON encodings (`{"acceptAllDevices": true}` and
//! `{"filters": [...]}`) are supported for interop with existing callers.

use serde::{Deserialize, Serialize};

use crate::uuids::ServiceId;

/// Advertised properties of a peripheral, as observed during a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Advertisement {
    pub local_name: Option<String>,
    pub services: Vec<ServiceId>,
}

impl Advertisement {
    pub fn named(name: &str) -> Self {
        Self {
            local_name: Some(name.to_string()),
            services: Vec::new(),
        }
    }

    pub fn with_service(mut self, service: ServiceId) -> Self {
        self.services.push(service);
        self
    }
}

/// Criteria used to pick a peripheral during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    /// Accept any device the chooser offers
    AcceptAll,
    /// Accept a device matching at least one of the filters (non-empty)
    Filters(Vec<DeviceFilter>),
}

/// A single discovery filter. All present criteria must hold for a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFilter {
    /// Exact advertised name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Advertised name prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,

    /// Service UUIDs that must all appear in the advertisement
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceId>,
}

impl DeviceFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.name_prefix.is_none() && self.services.is_empty()
    }

    pub fn matches(&self, advertisement: &Advertisement) -> bool {
        if let Some(name) = &self.name {
            if advertisement.local_name.as_deref() != Some(name.as_str()) {
                return false;
            }
        }
        if let Some(prefix) = &self.name_prefix {
            let starts = advertisement
                .local_name
                .as_deref()
                .map(|value| value.starts_with(prefix.as_str()))
                .unwrap_or(false);
            if !starts {
                return false;
            }
        }
        if !self.services.is_empty() {
            if !self
                .services
                .iter()
                .all(|service| advertisement.services.contains(service))
            {
                return false;
            }
        }
        true
    }
}

impl DeviceSelector {
    /// Filter by exact advertised name
    pub fn by_name(name: &str) -> Self {
        DeviceSelector::Filters(vec![DeviceFilter {
            name: Some(name.to_string()),
            ..DeviceFilter::default()
        }])
    }

    /// Filter by advertised name prefix
    pub fn by_name_prefix(prefix: &str) -> Self {
        DeviceSelector::Filters(vec![DeviceFilter {
            name_prefix: Some(prefix.to_string()),
            ..DeviceFilter::default()
        }])
    }

    /// Filter by advertised service UUID
    pub fn by_service(service: ServiceId) -> Self {
        DeviceSelector::Filters(vec![DeviceFilter {
            services: vec![service],
            ..DeviceFilter::default()
        }])
    }

    pub fn matches(&self, advertisement: &Advertisement) -> bool {
        match self {
            DeviceSelector::AcceptAll => true,
            DeviceSelector::Filters(filters) => {
                filters.iter().any(|filter| filter.matches(advertisement))
            }
        }
    }
}

/// Wire form of the selector, shaped like the legacy request-options object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SelectorOptions {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    accept_all_devices: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    filters: Vec<DeviceFilter>,
}

impl TryFrom<SelectorOptions> for DeviceSelector {
    type Error = String;

    fn try_from(options: SelectorOptions) -> std::result::Result<Self, Self::Error> {
        if options.accept_all_devices && !options.filters.is_empty() {
            return Err("acceptAllDevices cannot be combined with filters".to_string());
        }
        if options.accept_all_devices {
            return Ok(DeviceSelector::AcceptAll);
        }
        if options.filters.is_empty() {
            return Err(
                "either acceptAllDevices must be true or filters must be provided".to_string(),
            );
        }
        if options.filters.iter().any(|filter| filter.is_empty()) {
            return Err("a filter must name at least one criterion".to_string());
        }
        Ok(DeviceSelector::Filters(options.filters))
    }
}

impl From<DeviceSelector> for SelectorOptions {
    fn from(selector: DeviceSelector) -> Self {
        match selector {
            DeviceSelector::AcceptAll => SelectorOptions {
                accept_all_devices: true,
                filters: Vec::new(),
            },
            DeviceSelector::Filters(filters) => SelectorOptions {
                accept_all_devices: false,
                filters,
            },
        }
    }
}

impl Serialize for DeviceSelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        SelectorOptions::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DeviceSelector {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let options = SelectorOptions::deserialize(deserializer)?;
        DeviceSelector::try_from(options).map_err(serde::de::Error::custom)
    }
}
