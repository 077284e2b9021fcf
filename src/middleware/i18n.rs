// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::{I18nStore, DEFAULT_LANGUAGE};

// Extrator de idioma: o primeiro idioma do Accept-Language que temos catálogo
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANGUAGE.to_string())
    }
}

impl Locale {
    pub fn from_parts(parts: &Parts) -> Self {
        let supported = I18nStore::languages();

        parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                // "pt-BR" -> "pt"; mantém a ordem de preferência do cliente
                accept_language::parse(header_str)
                    .into_iter()
                    .map(|tag| tag.split('-').next().unwrap_or(&tag).to_lowercase())
                    .find(|lang| supported.contains(&lang.as_str()))
            })
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(accept: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = accept {
            builder = builder.header(header::ACCEPT_LANGUAGE, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn picks_first_supported_language() {
        assert_eq!(Locale::from_parts(&parts_with(Some("pt-BR,en;q=0.8"))).0, "pt");
        assert_eq!(Locale::from_parts(&parts_with(Some("de-DE,pt;q=0.5"))).0, "pt");
    }

    #[test]
    fn defaults_to_english() {
        assert_eq!(Locale::from_parts(&parts_with(None)).0, "en");
        assert_eq!(Locale::from_parts(&parts_with(Some("fr"))).0, "en");
    }
}
