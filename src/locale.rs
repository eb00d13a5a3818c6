//! Per-language display strings: class labels, server names and the
//! literal UI labels drawn on the banner.

use std::collections::HashMap;

/// Display language of a userbar. Selected by the API region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Ru,
    En,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::Ru => "ru",
            Lang::En => "en",
        }
    }

    /// First letter of the language code; picks the localized `type_*`
    /// badge asset.
    pub fn initial(self) -> char {
        match self {
            Lang::Ru => 'r',
            Lang::En => 'e',
        }
    }
}

/// Localized strings for one language. Immutable after construction; one
/// bundle is resolved per composer.
#[derive(Debug, Clone)]
pub struct Bundle {
    classes: HashMap<&'static str, &'static str>,
    servers: HashMap<u32, &'static str>,
    no_class: &'static str,
    /// Suffix of the playtime line.
    pub hours: &'static str,
    /// Label of the server line.
    pub server: &'static str,
}

impl Bundle {
    pub fn new(lang: Lang) -> Self {
        match lang {
            Lang::Ru => Self {
                classes: HashMap::from([
                    ("rifleman", "Штурмовик"),
                    ("medic", "Медик"),
                    ("engineer", "Инженер"),
                    ("sniper", "Снайпер"),
                    ("sed", "СЭД"),
                ]),
                servers: HashMap::from([(1, "Альфа"), (2, "Браво"), (3, "Чарли")]),
                no_class: "нет класса",
                hours: "ч",
                server: "сервер",
            },
            Lang::En => Self {
                classes: HashMap::from([
                    ("rifleman", "Rifleman"),
                    ("medic", "Medic"),
                    ("engineer", "Engineer"),
                    ("sniper", "Sniper"),
                    ("sed", "SED"),
                ]),
                servers: HashMap::from([(1, "EU"), (2, "NA")]),
                no_class: "no class",
                hours: "h",
                server: "server",
            },
        }
    }

    /// Label for a class code; unknown or absent codes fall back to the
    /// "no class" label.
    pub fn class_label(&self, code: Option<&str>) -> &str {
        code.and_then(|c| self.classes.get(c).copied())
            .unwrap_or(self.no_class)
    }

    /// Server display name; `None` when the id is unmapped.
    pub fn server_name(&self, id: u32) -> Option<&str> {
        self.servers.get(&id).copied()
    }
}
