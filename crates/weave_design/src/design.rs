//! The design container.

use crate::error::DesignError;
use crate::net::Net;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use weave_device::SiteId;

/// A placed primitive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Instance {
    /// Unique instance name.
    pub name: String,
    /// Primitive type, matching the type of its site.
    pub primitive_type: String,
    /// Site the instance is placed on, if any.
    #[serde(default)]
    pub site: Option<SiteId>,
    /// Element configuration: element name to setting.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Instance {
    /// Creates an instance placed on `site`.
    pub fn placed(name: &str, primitive_type: &str, site: SiteId) -> Self {
        Self {
            name: name.to_string(),
            primitive_type: primitive_type.to_string(),
            site: Some(site),
            attributes: BTreeMap::new(),
        }
    }

    /// Sets an element attribute.
    pub fn with_attribute(mut self, element: &str, value: &str) -> Self {
        self.attributes.insert(element.to_string(), value.to_string());
        self
    }

    /// An element is enabled when its attribute is present, non-empty, and not `#OFF`.
    pub fn is_element_enabled(&self, element: &str) -> bool {
        self.attributes
            .get(element)
            .is_some_and(|v| !v.is_empty() && v != "#OFF")
    }
}

/// A placed, possibly partially routed design.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Design {
    /// Design name.
    pub name: String,
    /// Target part number.
    pub part: String,
    /// Instances by name.
    #[serde(default)]
    pub instances: BTreeMap<String, Instance>,
    /// Nets by name.
    #[serde(default)]
    pub nets: BTreeMap<String, Net>,
    #[serde(skip)]
    by_site: HashMap<SiteId, String>,
}

impl Design {
    /// Creates an empty design.
    pub fn new(name: &str, part: &str) -> Self {
        Self {
            name: name.to_string(),
            part: part.to_string(),
            ..Self::default()
        }
    }

    /// Rebuilds the site index, rejecting two instances on one site.
    pub fn rebuild_indices(&mut self) -> Result<(), DesignError> {
        let mut by_site = HashMap::new();
        for inst in self.instances.values() {
            if let Some(site) = inst.site {
                if let Some(occupant) = by_site.insert(site, inst.name.clone()) {
                    return Err(DesignError::SiteOccupied { site, occupant });
                }
            }
        }
        self.by_site = by_site;
        Ok(())
    }

    /// Adds an instance. Its name and site must be free.
    pub fn add_instance(&mut self, inst: Instance) -> Result<(), DesignError> {
        if self.instances.contains_key(&inst.name) {
            return Err(DesignError::DuplicateInstance(inst.name));
        }
        if let Some(site) = inst.site {
            if let Some(occupant) = self.by_site.get(&site) {
                return Err(DesignError::SiteOccupied {
                    site,
                    occupant: occupant.clone(),
                });
            }
            self.by_site.insert(site, inst.name.clone());
        }
        self.instances.insert(inst.name.clone(), inst);
        Ok(())
    }

    /// Looks up an instance by name.
    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.instances.get(name)
    }

    /// The instance placed on `site`, if any.
    pub fn instance_at(&self, site: SiteId) -> Option<&Instance> {
        self.by_site.get(&site).and_then(|n| self.instances.get(n))
    }

    /// Adds a net. Its name must be free and every pin must name an existing instance.
    pub fn add_net(&mut self, net: Net) -> Result<(), DesignError> {
        if self.nets.contains_key(&net.name) {
            return Err(DesignError::DuplicateNet(net.name));
        }
        if let Some(pin) = net.pins.iter().find(|p| !self.instances.contains_key(&p.instance)) {
            return Err(DesignError::UnknownInstance(pin.instance.clone()));
        }
        self.nets.insert(net.name.clone(), net);
        Ok(())
    }

    /// Removes and returns a net.
    pub fn remove_net(&mut self, name: &str) -> Option<Net> {
        self.nets.remove(name)
    }

    /// Looks up a net by name.
    pub fn net(&self, name: &str) -> Option<&Net> {
        self.nets.get(name)
    }

    /// Looks up a net by name for editing.
    pub fn net_mut(&mut self, name: &str) -> Option<&mut Net> {
        self.nets.get_mut(name)
    }

    /// Every `(instance, pin)` pair attached to some net.
    pub fn used_pins(&self) -> HashSet<(&str, &str)> {
        self.nets
            .values()
            .flat_map(|n| n.pins.iter())
            .map(|p| (p.instance.as_str(), p.name.as_str()))
            .collect()
    }

    /// Clears the PIPs of every net.
    pub fn unroute_all(&mut self) {
        for net in self.nets.values_mut() {
            net.unroute();
        }
    }

    /// Total number of PIPs over all nets.
    pub fn pip_count(&self) -> usize {
        self.nets.values().map(|n| n.pips.len()).sum()
    }
}
