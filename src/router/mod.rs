//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea (método, path) a un handler.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → negotiate → Router → Handler → compress → Response
//! ```
//!
//! La tabla de rutas es una lista de datos que se arma una sola vez al
//! arrancar y no cambia después. El match es un recorrido lineal: gana la
//! primera entrada cuyo método coincide y cuyo path coincide (exacto o
//! por prefijo). El orden importa: los prefijos más específicos van
//! antes. Sin match → 404.
//!
//! El path que se compara es el target sin query string.

use crate::handlers::{self, Context, Handler};
use crate::http::{encoding, Method, Request, Response, StatusCode};
use crate::storage::FileStore;

/// Restricción de método de una ruta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodMatch {
    /// Cualquier método soportado
    Any,

    /// Solo este método
    Only(Method),
}

impl MethodMatch {
    fn matches(&self, method: Method) -> bool {
        match self {
            MethodMatch::Any => true,
            MethodMatch::Only(expected) => *expected == method,
        }
    }
}

/// Forma de comparar el path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    /// El path debe ser igual
    Exact,

    /// El path debe empezar con el patrón; el resto pasa al handler
    Prefix,
}

/// Una entrada de la tabla de rutas
#[derive(Clone, Copy)]
pub struct Route {
    pub method: MethodMatch,
    pub pattern: &'static str,
    pub kind: PathMatch,
    pub handler: Handler,
}

impl Route {
    /// Ruta con path exacto
    pub fn exact(method: Method, pattern: &'static str, handler: Handler) -> Self {
        Self {
            method: MethodMatch::Only(method),
            pattern,
            kind: PathMatch::Exact,
            handler,
        }
    }

    /// Ruta por prefijo
    pub fn prefix(method: Method, pattern: &'static str, handler: Handler) -> Self {
        Self {
            method: MethodMatch::Only(method),
            pattern,
            kind: PathMatch::Prefix,
            handler,
        }
    }

    /// Si la ruta aplica, retorna el resto del path para el handler
    fn match_path<'p>(&self, method: Method, path: &'p str) -> Option<&'p str> {
        if !self.method.matches(method) {
            return None;
        }
        match self.kind {
            PathMatch::Exact => (path == self.pattern).then_some(""),
            PathMatch::Prefix => path.strip_prefix(self.pattern),
        }
    }
}

/// Tabla de rutas del servidor
///
/// `/echo/` y `/files/` no se solapan con `/` ni `/user-agent` porque
/// esas dos son exactas.
pub fn default_routes() -> Vec<Route> {
    vec![
        Route::exact(Method::GET, "/", handlers::root_handler),
        Route::exact(Method::GET, "/user-agent", handlers::user_agent_handler),
        Route::prefix(Method::GET, "/echo/", handlers::echo_handler),
        Route::prefix(Method::GET, "/files/", handlers::file_get_handler),
        Route::prefix(Method::POST, "/files/", handlers::file_put_handler),
    ]
}

/// Router que mapea requests a handlers
///
/// No tiene estado mutable: se comparte entre workers detrás de un `Arc`.
pub struct Router {
    routes: Vec<Route>,
    store: FileStore,
}

impl Router {
    /// Crea un router vacío sobre el directorio servido
    pub fn new(store: FileStore) -> Self {
        Self {
            routes: Vec::new(),
            store,
        }
    }

    /// Crea el router con la tabla de rutas por defecto
    pub fn with_default_routes(store: FileStore) -> Self {
        Self {
            routes: default_routes(),
            store,
        }
    }

    /// Registra una ruta al final de la tabla
    pub fn register(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Busca la primera ruta que aplica y el resto del path
    fn find<'r, 'p>(&'r self, method: Method, path: &'p str) -> Option<(&'r Route, &'p str)> {
        self.routes
            .iter()
            .find_map(|route| route.match_path(method, path).map(|tail| (route, tail)))
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// La codificación se negocia antes de despachar y se aplica al
    /// final a cualquier respuesta, incluida la de 404.
    ///
    /// # Ejemplo
    /// ```
    /// use raw_http_server::http::{Request, StatusCode};
    /// use raw_http_server::router::Router;
    /// use raw_http_server::storage::FileStore;
    ///
    /// let router = Router::with_default_routes(FileStore::new(std::env::temp_dir()));
    /// let request = Request::parse(b"GET /echo/hi HTTP/1.1\r\n\r\n").unwrap();
    /// let response = router.dispatch(&request);
    ///
    /// assert_eq!(response.status(), StatusCode::Ok);
    /// assert_eq!(response.body(), b"hi");
    /// ```
    pub fn dispatch(&self, request: &Request) -> Response {
        let encoding = encoding::negotiate(request.accepted_encodings());

        let response = match self.find(request.method(), request.path()) {
            Some((route, tail)) => {
                let ctx = Context {
                    request,
                    tail,
                    store: &self.store,
                };
                (route.handler)(&ctx).unwrap_or_else(|e| handlers::error_response(&e))
            }
            None => handlers::not_found(),
        };

        encoding::apply(response, encoding).unwrap_or_else(|e| {
            tracing::error!(error = %e, "response compression failed");
            handlers::status_response(StatusCode::InternalServerError)
        })
    }
}
