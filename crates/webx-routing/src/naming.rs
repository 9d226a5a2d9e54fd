use webx_core::{PortalId, RoutingConfig};

const FOLDER_PLACEHOLDER: &str = "{folder}";
const LEGACY_SUFFIX: &str = "-old";

/// `{folder}-{fragment}-{portal_id}`
pub fn route_full_name(module_folder: &str, route_fragment: &str, portal_id: PortalId) -> String {
    format!("{}-{}-{}", module_folder, route_fragment, portal_id)
}

/// Name of an extra alias-depth variant: `{primary}-p{depth}`.
///
/// The first (deepest) variant of a portal keeps the plain primary name.
pub fn variant_route_name(primary: &str, prefix_depth: usize) -> String {
    format!("{}-p{}", primary, prefix_depth)
}

/// Name of the backward-compatible alias of a primary route.
pub fn legacy_route_name(primary: &str) -> String {
    format!("{}{}", primary, LEGACY_SUFFIX)
}

/// Strips the leading `/` so `"/url"` and `"url"` share one pattern.
pub fn normalize_url(url: &str) -> &str {
    url.trim_start_matches('/')
}

/// `{prefix0}/{prefix1}/...` for portals whose aliases carry child paths.
pub fn alias_prefix(depth: usize) -> String {
    (0..depth).map(|i| format!("{{prefix{}}}/", i)).collect()
}

/// Renders the primary and legacy URL shapes of a module's routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLayout {
    service: String,
    legacy: String,
}

impl Default for RouteLayout {
    fn default() -> Self {
        Self::from_config(&RoutingConfig::default())
    }
}

impl RouteLayout {
    pub fn from_config(config: &RoutingConfig) -> Self {
        Self {
            service: config.service_route_template.trim_matches('/').to_string(),
            legacy: config.legacy_route_template.trim_matches('/').to_string(),
        }
    }

    pub fn route_url(&self, prefix_depth: usize, module_folder: &str, url: &str) -> String {
        render(&self.service, prefix_depth, module_folder, url)
    }

    pub fn legacy_url(&self, prefix_depth: usize, module_folder: &str, url: &str) -> String {
        render(&self.legacy, prefix_depth, module_folder, url)
    }
}

fn render(template: &str, prefix_depth: usize, module_folder: &str, url: &str) -> String {
    let mut out = alias_prefix(prefix_depth);
    out.push_str(&template.replace(FOLDER_PLACEHOLDER, module_folder));

    let url = normalize_url(url);
    if !url.is_empty() {
        out.push('/');
        out.push_str(url);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_portal_scoped() {
        assert_eq!(route_full_name("folder", "default", 0), "folder-default-0");
        assert_eq!(route_full_name("folder", "default", 1), "folder-default-1");
        assert_eq!(legacy_route_name("folder-default-0"), "folder-default-0-old");
        assert_eq!(variant_route_name("folder-default-0", 0), "folder-default-0-p0");
    }

    #[test]
    fn default_layout() {
        let layout = RouteLayout::default();
        assert_eq!(layout.route_url(0, "folder", "url"), "API/folder/url");
        assert_eq!(layout.legacy_url(0, "folder", "/url"), "DesktopModules/folder/API/url");
        assert_eq!(layout.route_url(0, "folder", ""), "API/folder");
    }

    #[test]
    fn prefix_placeholders_precede_the_template() {
        let layout = RouteLayout::default();
        assert_eq!(
            layout.route_url(2, "folder", "{controller}/{action}"),
            "{prefix0}/{prefix1}/API/folder/{controller}/{action}"
        );
    }
}
