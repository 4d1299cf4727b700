use strum::{AsRefStr, EnumIter};

/// Top-level view, resolved once from the page path and then driven in-app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, EnumIter)]
pub enum Route {
    #[default]
    #[strum(serialize = "/")]
    Input,
    #[strum(serialize = "/predictor")]
    Predictor,
    #[strum(serialize = "/portfolio")]
    Portfolio,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/predictor" => Route::Predictor,
            "/portfolio" => Route::Portfolio,
            _ => Route::Input,
        }
    }

    pub fn path(&self) -> &str {
        self.as_ref()
    }

    /// Where a symbol submission lands.
    pub fn after_submit(self) -> Self {
        match self {
            Route::Input | Route::Predictor => Route::Predictor,
            Route::Portfolio => Route::Portfolio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn resolves_known_paths() {
        assert_eq!(Route::from_path("/predictor"), Route::Predictor);
        assert_eq!(Route::from_path("/predictor/"), Route::Predictor);
        assert_eq!(Route::from_path("/portfolio"), Route::Portfolio);
        assert_eq!(Route::from_path("/"), Route::Input);
        assert_eq!(Route::from_path("/anything-else"), Route::Input);
    }

    #[test]
    fn paths_round_trip() {
        for route in Route::iter() {
            assert_eq!(Route::from_path(route.path()), route);
        }
    }

    #[test]
    fn submission_moves_to_predictor() {
        assert_eq!(Route::Input.after_submit(), Route::Predictor);
        assert_eq!(Route::Predictor.after_submit(), Route::Predictor);
    }
}
