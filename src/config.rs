/// Tree inventory listing. Status-scoped variants live under `/find/{code}`.
pub const DEFAULT_TREES_API: &str = "https://greenmin-apis.onrender.com/api/trees";
pub const DEFAULT_ORDERS_API: &str = "http://localhost:8080/api/order";
pub const DEFAULT_DETECT_API: &str = "http://localhost:8080/api/detect";

/// User recorded on orders when none is given.
pub const DEFAULT_USER: &str = "Ginura";

/// Base URLs of the remote services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub trees: String,
    pub orders: String,
    pub detect: String,
}

impl Endpoints {
    pub fn new(
        trees: impl Into<String>,
        orders: impl Into<String>,
        detect: impl Into<String>,
    ) -> Self {
        Self {
            trees: trim(trees.into()),
            orders: trim(orders.into()),
            detect: trim(detect.into()),
        }
    }

    /// All three services behind one base, e.g. a local stub: `{base}/api/trees`, ...
    pub fn under(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self::new(
            format!("{}/api/trees", base),
            format!("{}/api/order", base),
            format!("{}/api/detect", base),
        )
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_TREES_API, DEFAULT_ORDERS_API, DEFAULT_DETECT_API)
    }
}

fn trim(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_dropped() {
        let e = Endpoints::new("http://a/trees/", "http://b/order//", "http://c/detect");
        assert_eq!(e.trees, "http://a/trees");
        assert_eq!(e.orders, "http://b/order");
        assert_eq!(e.detect, "http://c/detect");
    }

    #[test]
    fn under_lays_out_api_paths() {
        let e = Endpoints::under("http://127.0.0.1:9000/");
        assert_eq!(e.trees, "http://127.0.0.1:9000/api/trees");
        assert_eq!(e.orders, "http://127.0.0.1:9000/api/order");
        assert_eq!(e.detect, "http://127.0.0.1:9000/api/detect");
    }
}
