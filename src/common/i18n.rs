// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

pub const DEFAULT_LANGUAGE: &str = "en";

// Catálogos embutidos no binário: código do erro -> mensagem
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("catálogo de mensagens '{}' inválido", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    pub fn languages() -> Vec<&'static str> {
        CATALOGS.iter().map(|(lang, _)| *lang).collect()
    }

    /// Idioma pedido -> idioma padrão -> a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        [lang, DEFAULT_LANGUAGE]
            .iter()
            .filter_map(|l| self.catalogs.get(*l))
            .find_map(|catalog| catalog.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
