//! Request URI construction: resource URI + path suffix + ordered, percent-encoded query.

use url::Url;

/// Ordered query parameters; values are raw and get encoded by [`build`].
pub type Params<'a> = [(&'a str, String)];

/// Build the request URI for one call on the resource at `base`.
///
/// `suffix` is appended to the path verbatim (`"/start"`, or `""` for the resource
/// itself). Each value in `params` is percent-encoded as a query component, so
/// `myrepo/myimage` travels as `myrepo%2Fmyimage`. Keys are used as given.
/// No network activity; a well-formed `base` always yields a well-formed URI.
pub fn build(base: &Url, suffix: &str, params: &Params<'_>) -> Url {
    let mut url = base.clone();
    if !suffix.is_empty() {
        let path = format!("{}{}", base.path().trim_end_matches('/'), suffix);
        url.set_path(&path);
    }
    if params.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&encode_query(params)));
    }
    url
}

/// URI of the entity `id` inside the collection at `collection`.
pub fn child(collection: &Url, id: &str) -> Url {
    build(collection, &format!("/{id}"), &[])
}

/// `k1=v1&k2=v2` with percent-encoded values, in the given order.
pub fn encode_query(params: &Params<'_>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Wire form of a boolean query flag.
pub fn flag(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}
