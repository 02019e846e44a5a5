//! Turns controller descriptors into the flat endpoint table, and indexes
//! the table by route name for URL generation.

use crate::error::{AdminError, ConfigError};
use crate::routing::{ControllerDescriptor, Endpoint};
use std::collections::HashMap;

pub struct EndpointProcessor;

impl EndpointProcessor {
    /// Derives endpoints from descriptors. Controllers with neither a class
    /// prefix nor a project prefix cannot be routed and are skipped.
    ///
    /// Each (route declaration × HTTP verb) pair yields one endpoint; verbs
    /// declared together share a name and path and differ only in verb, the
    /// way a dispatch layer keyed on (verb, path) expects.
    pub fn process(controllers: &[ControllerDescriptor], project_prefix: &str) -> Vec<Endpoint> {
        let mut endpoints = Vec::new();
        for descriptor in controllers {
            let class_prefix = descriptor.class_prefix();
            if class_prefix.is_empty() && project_prefix.is_empty() {
                continue;
            }
            for method in &descriptor.methods {
                for route in &method.routes {
                    for verb in route.methods {
                        endpoints.push(build_endpoint(
                            project_prefix,
                            &class_prefix,
                            descriptor,
                            method.method,
                            route.path,
                            route.name,
                            verb,
                            &method.middleware,
                            &method.where_,
                        ));
                    }
                }
            }
        }
        endpoints
    }
}

#[allow(clippy::too_many_arguments)]
fn build_endpoint(
    project_prefix: &str,
    class_prefix: &str,
    descriptor: &ControllerDescriptor,
    method: &'static str,
    route_path: &str,
    route_name: &str,
    verb: &'static str,
    method_middleware: &[&'static str],
    where_: &[(&'static str, &'static str)],
) -> Endpoint {
    let name = format!("{}.{}.{}", project_prefix, class_prefix, route_name).replace('/', ".");

    let path = [project_prefix, class_prefix, route_path.trim_matches('/')]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");

    // De-duplicated union, class middleware first.
    let mut middleware: Vec<String> = Vec::new();
    for m in descriptor.middleware.iter().chain(method_middleware) {
        if !middleware.iter().any(|existing| existing == m) {
            middleware.push((*m).to_string());
        }
    }

    Endpoint {
        path,
        controller: descriptor.controller,
        method,
        http_methods: vec![verb],
        name: Some(name),
        middleware,
        where_: where_
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
    }
}

/// Name-indexed endpoint table for URL generation. Endpoints split per verb
/// share a name and path, so first registration wins.
pub struct RouteTable {
    endpoints: Vec<Endpoint>,
    by_name: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        let mut by_name = HashMap::new();
        for (i, ep) in endpoints.iter().enumerate() {
            if let Some(name) = &ep.name {
                by_name.entry(name.clone()).or_insert(i);
            }
        }
        RouteTable { endpoints, by_name }
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn get(&self, name: &str) -> Option<&Endpoint> {
        self.by_name.get(name).map(|&i| &self.endpoints[i])
    }

    /// Absolute URL for a named route, with `{param}` placeholders filled
    /// from `params`. Unknown routes and missing parameters are
    /// configuration errors.
    pub fn url(&self, name: &str, params: &[(&str, String)]) -> Result<String, AdminError> {
        let endpoint = self
            .get(name)
            .ok_or_else(|| ConfigError::UnknownRoute(name.to_string()))?;
        let mut path = endpoint.path.clone();
        for (key, value) in params {
            path = path.replace(&format!("{{{}}}", key), value);
        }
        if let Some(start) = path.find('{') {
            let end = path[start..].find('}').map(|e| start + e).unwrap_or(path.len());
            return Err(ConfigError::MissingRouteParam {
                route: name.to_string(),
                param: path[start + 1..end].to_string(),
            }
            .into());
        }
        Ok(format!("/{}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{admin_controller_descriptor, ControllerDescriptor, MethodRoutes, RouteDef};
    use pretty_assertions::assert_eq;

    #[test]
    fn admin_descriptor_emits_one_endpoint_per_declaration_verb_pair() {
        let descriptor = admin_controller_descriptor("TenantAdminController", "tenants");
        let endpoints = EndpointProcessor::process(std::slice::from_ref(&descriptor), "landlord");
        // list GET + create GET/POST + edit GET/PUT + delete GET/DELETE
        assert_eq!(endpoints.len(), 7);
        let list = &endpoints[0];
        assert_eq!(list.path, "landlord/admin/tenants/list");
        assert_eq!(list.name.as_deref(), Some("landlord.admin.tenants.list"));
        assert_eq!(list.http_methods, vec!["GET"]);
        assert_eq!(list.controller, "TenantAdminController");
        assert_eq!(list.method, "list");
    }

    #[test]
    fn multi_verb_declarations_share_name_and_path() {
        let descriptor = admin_controller_descriptor("TenantAdminController", "tenants");
        let endpoints = EndpointProcessor::process(std::slice::from_ref(&descriptor), "landlord");
        let edits: Vec<_> = endpoints
            .iter()
            .filter(|e| e.name.as_deref() == Some("landlord.admin.tenants.edit"))
            .collect();
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].path, edits[1].path);
        assert_eq!(edits[0].http_methods, vec!["GET"]);
        assert_eq!(edits[1].http_methods, vec!["PUT"]);
        assert_eq!(edits[0].where_, vec![("id".to_string(), "[0-9]+".to_string())]);
    }

    #[test]
    fn class_prefix_chain_is_root_to_leaf() {
        let descriptor = ControllerDescriptor::new("C", vec!["x", "", "y"]).method(
            MethodRoutes::new(
                "index",
                vec![RouteDef {
                    path: "go",
                    methods: &["GET"],
                    name: "go",
                }],
            ),
        );
        assert_eq!(descriptor.class_prefix(), "x/y");
        let endpoints = EndpointProcessor::process(std::slice::from_ref(&descriptor), "p");
        assert_eq!(endpoints[0].path, "p/x/y/go");
        assert_eq!(endpoints[0].name.as_deref(), Some("p.x.y.go"));
    }

    #[test]
    fn controllers_without_any_prefix_are_skipped() {
        let descriptor = ControllerDescriptor::new("C", vec![]).method(MethodRoutes::new(
            "index",
            vec![RouteDef {
                path: "go",
                methods: &["GET"],
                name: "go",
            }],
        ));
        let endpoints = EndpointProcessor::process(std::slice::from_ref(&descriptor), "");
        assert!(endpoints.is_empty());
    }

    #[test]
    fn methods_without_route_declarations_emit_nothing() {
        let descriptor = ControllerDescriptor::new("C", vec!["admin"])
            .method(MethodRoutes::new("helper", vec![]));
        let endpoints = EndpointProcessor::process(std::slice::from_ref(&descriptor), "p");
        assert!(endpoints.is_empty());
    }

    #[test]
    fn middleware_union_deduplicates() {
        let descriptor = ControllerDescriptor::new("C", vec!["admin"])
            .middleware(&["auth", "web"])
            .method(
                MethodRoutes::new(
                    "index",
                    vec![RouteDef {
                        path: "go",
                        methods: &["GET"],
                        name: "go",
                    }],
                )
                .middleware(&["auth", "throttle"]),
            );
        let endpoints = EndpointProcessor::process(std::slice::from_ref(&descriptor), "p");
        assert_eq!(endpoints[0].middleware, vec!["auth", "web", "throttle"]);
    }

    #[test]
    fn route_table_builds_urls_with_params() {
        let descriptor = admin_controller_descriptor("TenantAdminController", "tenants");
        let table = RouteTable::new(EndpointProcessor::process(
            std::slice::from_ref(&descriptor),
            "landlord",
        ));
        let url = table
            .url("landlord.admin.tenants.edit", &[("id", "7".to_string())])
            .unwrap();
        assert_eq!(url, "/landlord/admin/tenants/edit/7");
    }

    #[test]
    fn route_table_flags_missing_params() {
        let descriptor = admin_controller_descriptor("TenantAdminController", "tenants");
        let table = RouteTable::new(EndpointProcessor::process(
            std::slice::from_ref(&descriptor),
            "landlord",
        ));
        let err = table.url("landlord.admin.tenants.edit", &[]).unwrap_err();
        assert!(matches!(
            err,
            AdminError::Config(ConfigError::MissingRouteParam { .. })
        ));
    }
}
