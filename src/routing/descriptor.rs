//! Declarative routing metadata per controller. Plain data structures stand
//! in for the attribute/reflection scanning of classic admin frameworks: a
//! controller declares its prefix chain and per-method route declarations,
//! and the processor turns them into endpoints.

/// One route declaration on a controller method.
#[derive(Clone, Debug)]
pub struct RouteDef {
    pub path: &'static str,
    pub methods: &'static [&'static str],
    pub name: &'static str,
}

/// Routing metadata of one public controller method.
#[derive(Clone, Debug)]
pub struct MethodRoutes {
    pub method: &'static str,
    pub routes: Vec<RouteDef>,
    pub middleware: Vec<&'static str>,
    pub where_: Vec<(&'static str, &'static str)>,
}

impl MethodRoutes {
    pub fn new(method: &'static str, routes: Vec<RouteDef>) -> Self {
        MethodRoutes {
            method,
            routes,
            middleware: Vec::new(),
            where_: Vec::new(),
        }
    }

    pub fn middleware(mut self, middleware: &[&'static str]) -> Self {
        self.middleware = middleware.to_vec();
        self
    }

    pub fn where_param(mut self, param: &'static str, pattern: &'static str) -> Self {
        self.where_.push((param, pattern));
        self
    }
}

/// Routing metadata of one controller type.
#[derive(Clone, Debug)]
pub struct ControllerDescriptor {
    pub controller: &'static str,
    /// Prefix segments root→leaf (base controller first), mirroring
    /// prefix inheritance along an ancestor chain.
    pub prefix_chain: Vec<&'static str>,
    pub middleware: Vec<&'static str>,
    pub methods: Vec<MethodRoutes>,
}

impl ControllerDescriptor {
    pub fn new(controller: &'static str, prefix_chain: Vec<&'static str>) -> Self {
        ControllerDescriptor {
            controller,
            prefix_chain,
            middleware: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn middleware(mut self, middleware: &[&'static str]) -> Self {
        self.middleware = middleware.to_vec();
        self
    }

    pub fn method(mut self, method: MethodRoutes) -> Self {
        self.methods.push(method);
        self
    }

    /// Non-empty prefix segments joined root→leaf with `/`.
    pub fn class_prefix(&self) -> String {
        self.prefix_chain
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// The standard admin action set: list, create (GET form + POST submit),
/// edit (GET form + PUT submit), delete (GET confirmation + DELETE submit).
/// `entity_prefix` is the adapter's route-prefix segment under `admin`.
pub fn admin_controller_descriptor(
    controller: &'static str,
    entity_prefix: &'static str,
) -> ControllerDescriptor {
    ControllerDescriptor::new(controller, vec!["admin", entity_prefix])
        .method(MethodRoutes::new(
            "list",
            vec![RouteDef {
                path: "list",
                methods: &["GET"],
                name: "list",
            }],
        ))
        .method(MethodRoutes::new(
            "create",
            vec![RouteDef {
                path: "create",
                methods: &["GET", "POST"],
                name: "create",
            }],
        ))
        .method(
            MethodRoutes::new(
                "edit",
                vec![RouteDef {
                    path: "edit/{id}",
                    methods: &["GET", "PUT"],
                    name: "edit",
                }],
            )
            .where_param("id", "[0-9]+"),
        )
        .method(
            MethodRoutes::new(
                "delete",
                vec![RouteDef {
                    path: "delete/{id}",
                    methods: &["GET", "DELETE"],
                    name: "delete",
                }],
            )
            .where_param("id", "[0-9]+"),
        )
}
