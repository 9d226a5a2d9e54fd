use crate::config::{PortalConfig, RoutingConfig};

pub type PortalId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalInfo {
    pub portal_id: PortalId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalAlias {
    pub portal_id: PortalId,
    /// Host plus optional child path, e.g. `www.foo.com/child`.
    pub http_alias: String,
}

impl PortalAlias {
    pub fn new(portal_id: PortalId, http_alias: impl Into<String>) -> Self {
        Self {
            portal_id,
            http_alias: http_alias.into(),
        }
    }

    /// Number of child-path segments after the host.
    pub fn child_depth(&self) -> usize {
        let alias = self
            .http_alias
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.http_alias);

        alias
            .split('/')
            .skip(1)
            .filter(|segment| !segment.is_empty())
            .count()
    }
}

/// Source of the active portals and their aliases.
///
/// Owned by the hosting platform; routing only reads from it.
pub trait PortalDirectory: Send + Sync {
    fn portals(&self) -> Vec<PortalInfo>;

    fn aliases(&self, portal_id: PortalId) -> Vec<PortalAlias>;

    /// Distinct child-path depths of a portal's aliases, deepest first.
    ///
    /// Each depth needs its own route variant. A portal without aliases
    /// still gets the unprefixed variant.
    fn prefix_depths(&self, portal_id: PortalId) -> Vec<usize> {
        let mut depths: Vec<usize> = self
            .aliases(portal_id)
            .iter()
            .map(PortalAlias::child_depth)
            .collect();
        depths.sort_unstable_by(|a, b| b.cmp(a));
        depths.dedup();
        if depths.is_empty() {
            depths.push(0);
        }
        depths
    }
}

/// A fixed portal list, usually built from `RoutingConfig`.
#[derive(Debug, Clone, Default)]
pub struct StaticPortalDirectory {
    portals: Vec<PortalConfig>,
}

impl StaticPortalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self {
            portals: config.portals.clone(),
        }
    }

    pub fn with_portal<I, S>(mut self, id: PortalId, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.portals.push(PortalConfig {
            id,
            aliases: aliases.into_iter().map(Into::into).collect(),
        });
        self
    }
}

impl PortalDirectory for StaticPortalDirectory {
    fn portals(&self) -> Vec<PortalInfo> {
        self.portals
            .iter()
            .map(|p| PortalInfo { portal_id: p.id })
            .collect()
    }

    fn aliases(&self, portal_id: PortalId) -> Vec<PortalAlias> {
        self.portals
            .iter()
            .filter(|p| p.id == portal_id)
            .flat_map(|p| p.aliases.iter().map(move |a| PortalAlias::new(p.id, a.clone())))
            .collect()
    }
}
