//! # AR hand-off
//!
//! A finished design is handed to a phone as a link to the AR viewer, carrying the texture
//! URL as a query parameter: `{base}/ar/{session}?image={texture url}`.

/// Used when neither configuration nor environment name a public URL.
pub const FALLBACK_BASE_URL: &str = "http://localhost:3000";
pub const APP_URL_VAR: &str = "NEXT_PUBLIC_APP_URL";
pub const VERCEL_URL_VAR: &str = "VERCEL_URL";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ArLinkError {
    #[error("image URL is required")]
    MissingImage,
    #[error("invalid URL: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("{0:?} cannot hold a path")]
    CannotBeABase(String),
    #[error("not an AR viewer link")]
    NotViewerLink,
}

/// Public base URL of the app: the configured one, else `NEXT_PUBLIC_APP_URL`, else
/// `https://$VERCEL_URL`, else [`FALLBACK_BASE_URL`]. Trailing slashes are trimmed.
pub fn resolve_base_url(configured: Option<&str>, env: impl Fn(&str) -> Option<String>) -> String {
    let non_empty = |value: String| (!value.trim().is_empty()).then_some(value);
    let base = configured
        .map(str::to_owned)
        .and_then(non_empty)
        .or_else(|| env(APP_URL_VAR).and_then(non_empty))
        .or_else(|| {
            env(VERCEL_URL_VAR)
                .and_then(non_empty)
                .map(|host| format!("https://{host}"))
        })
        .unwrap_or_else(|| FALLBACK_BASE_URL.to_owned());
    base.trim().trim_end_matches('/').to_owned()
}

fn base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    // Only ASCII digits were pushed.
    String::from_utf8(out).unwrap_or_default()
}

/// Base36 milliseconds since the epoch, followed by a base36 random suffix. Sorts roughly by
/// creation time.
#[must_use]
pub fn session_id() -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|since| since.as_millis())
        .unwrap_or_default();
    // 52 random bits, like a double's mantissa.
    let random = uuid::Uuid::new_v4().as_u128() & ((1 << 52) - 1);
    base36(millis) + &base36(random)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArLink {
    pub session_id: String,
    pub url: url::Url,
}

#[derive(Clone, Debug)]
pub struct ArLinkBuilder {
    base: url::Url,
}
impl ArLinkBuilder {
    pub fn new(base: &str) -> Result<Self, ArLinkError> {
        let base = url::Url::parse(base.trim().trim_end_matches('/'))?;
        if base.cannot_be_a_base() {
            return Err(ArLinkError::CannotBeABase(base.into()));
        }
        Ok(Self { base })
    }
    /// Builder for the base URL found by [`resolve_base_url`] in the process environment.
    pub fn from_env(configured: Option<&str>) -> Result<Self, ArLinkError> {
        let base = resolve_base_url(configured, |var| std::env::var(var).ok());
        log::debug!("AR links based at {base}");
        Self::new(&base)
    }
    #[must_use]
    pub fn base(&self) -> &url::Url {
        &self.base
    }
    /// A link under a fresh session.
    pub fn link(&self, image_url: &str) -> Result<ArLink, ArLinkError> {
        self.link_for(session_id(), image_url)
    }
    pub fn link_for(&self, session_id: String, image_url: &str) -> Result<ArLink, ArLinkError> {
        if image_url.is_empty() {
            return Err(ArLinkError::MissingImage);
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ArLinkError::CannotBeABase(self.base.to_string()))?
            .pop_if_empty()
            .push("ar")
            .push(&session_id);
        url.query_pairs_mut().clear().append_pair("image", image_url);
        url.set_fragment(None);
        Ok(ArLink { session_id, url })
    }
}

/// Split a viewer link back into its session and image URL.
pub fn parse_link(link: &str) -> Result<(String, String), ArLinkError> {
    let url = url::Url::parse(link)?;
    let segments: Vec<&str> = url
        .path_segments()
        .ok_or(ArLinkError::NotViewerLink)?
        .filter(|segment| !segment.is_empty())
        .collect();
    let [.., "ar", session] = segments.as_slice() else {
        return Err(ArLinkError::NotViewerLink);
    };
    let image = url
        .query_pairs()
        .find_map(|(key, value)| (key == "image").then(|| value.into_owned()))
        .filter(|image| !image.is_empty())
        .ok_or(ArLinkError::MissingImage)?;
    Ok(((*session).to_owned(), image))
}

/// Body of a link request. A missing or `null` URL is reported as [`ArLinkError::MissingImage`]
/// by the builder rather than failing to parse.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArUrlRequest {
    #[serde(default)]
    pub image_url: Option<String>,
}
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArUrlDebug {
    pub base_url: String,
    /// In UTF-16 code units, as a browser counts string length.
    pub image_url_length: usize,
}
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArUrlResponse {
    pub url: String,
    pub session_id: String,
    pub debug: ArUrlDebug,
}
impl ArUrlResponse {
    #[must_use]
    pub fn new(link: ArLink, builder: &ArLinkBuilder, image_url: &str) -> Self {
        Self {
            url: link.url.into(),
            session_id: link.session_id,
            debug: ArUrlDebug {
                base_url: builder.base().as_str().trim_end_matches('/').to_owned(),
                image_url_length: image_url.encode_utf16().count(),
            },
        }
    }
}
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;
    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned())
        }
    }
    #[test]
    fn base_url_precedence() {
        let all = [
            (APP_URL_VAR, "https://app.example//"),
            (VERCEL_URL_VAR, "mug.vercel.app"),
        ];
        assert_eq!(
            resolve_base_url(Some("https://mine.example/"), env(&all)),
            "https://mine.example"
        );
        assert_eq!(resolve_base_url(None, env(&all)), "https://app.example");
        assert_eq!(
            resolve_base_url(Some(" "), env(&all[1..])),
            "https://mug.vercel.app"
        );
        assert_eq!(resolve_base_url(None, env(&[])), FALLBACK_BASE_URL);
    }
    #[test]
    fn session_ids_are_base36() {
        let a = session_id();
        let b = session_id();
        assert_ne!(a, b);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36 * 36), "100");
    }
    #[test]
    fn link_encodes_image() {
        let builder = ArLinkBuilder::new("https://mugs.example/shop/").unwrap();
        let image = "https://cdn.example/t.png?size=big&v=2";
        let link = builder.link_for("abc".to_owned(), image).unwrap();
        assert!(link
            .url
            .as_str()
            .starts_with("https://mugs.example/shop/ar/abc?image=https%3A%2F%2Fcdn.example"));
        assert_eq!(
            parse_link(link.url.as_str()).unwrap(),
            ("abc".to_owned(), image.to_owned())
        );
    }
    #[test]
    fn link_errors() {
        let builder = ArLinkBuilder::new(FALLBACK_BASE_URL).unwrap();
        assert_eq!(builder.link(""), Err(ArLinkError::MissingImage));
        assert!(matches!(
            ArLinkBuilder::new("not a url"),
            Err(ArLinkError::Invalid(_))
        ));
        assert!(matches!(
            ArLinkBuilder::new("mailto:me@example.com"),
            Err(ArLinkError::CannotBeABase(_))
        ));
        assert_eq!(
            parse_link("http://localhost:3000/editor?image=x"),
            Err(ArLinkError::NotViewerLink)
        );
        assert_eq!(
            parse_link("http://localhost:3000/ar/abc"),
            Err(ArLinkError::MissingImage)
        );
    }
    #[test]
    fn response_json_is_camel_case() {
        let builder = ArLinkBuilder::new(FALLBACK_BASE_URL).unwrap();
        let link = builder.link_for("s1".to_owned(), "data:x").unwrap();
        let response = ArUrlResponse::new(link, &builder, "data:x");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["debug"]["imageUrlLength"], 6);
        assert_eq!(json["debug"]["baseUrl"], FALLBACK_BASE_URL);
        let request: ArUrlRequest =
            serde_json::from_str(r#"{"imageUrl": "https://x/y.png"}"#).unwrap();
        assert_eq!(request.image_url.as_deref(), Some("https://x/y.png"));
        for empty in ["{}", r#"{"imageUrl": null}"#] {
            let request: ArUrlRequest = serde_json::from_str(empty).unwrap();
            assert_eq!(request.image_url, None);
        }
    }
    #[test]
    fn only_empty_url_is_missing() {
        let builder = ArLinkBuilder::new(FALLBACK_BASE_URL).unwrap();
        let link = builder.link_for("s2".to_owned(), " ").unwrap();
        assert_eq!(parse_link(link.url.as_str()).unwrap().1, " ");
        // One astral character is two UTF-16 units, but four bytes.
        let image = "https://x/\u{1F37A}.png";
        let link = builder.link_for("s3".to_owned(), image).unwrap();
        let response = ArUrlResponse::new(link, &builder, image);
        assert_eq!(response.debug.image_url_length, 16);
    }
}
