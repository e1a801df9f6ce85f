use url::Url;

/// Join `route` under the base URL's path, keeping any prefix such as `/api`.
pub(crate) fn route(base: &Url, route: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(route.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_keeps_base_prefix() -> Result<(), url::ParseError> {
        let base = Url::parse("http://localhost:8000/api")?;
        assert_eq!(route(&base, "/upload")?.as_str(), "http://localhost:8000/api/upload");
        Ok(())
    }

    #[test]
    fn route_on_bare_host() -> Result<(), url::ParseError> {
        let base = Url::parse("http://localhost:8000")?;
        assert_eq!(route(&base, "health")?.as_str(), "http://localhost:8000/health");
        Ok(())
    }
}
