//! Item metadata lookups over the system document.
//!
//! [`ItemCatalog`] bundles everything spawn entries need to validate and
//! price themselves: the system document, the inventory class table, trader
//! coefficients and the set of ignored section ids.

mod trade;

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::document::{Document, Section, SectionFilter};
use crate::error::SpawnError;

pub use trade::BuyCoefficients;

/// Inventory item type, as mapped from an engine class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum ItemType {
    Ammo,
    Weapon,
    Other(String),
}

impl ItemType {
    pub fn parse(name: &str) -> Self {
        match name {
            "T_AMMO" => ItemType::Ammo,
            "T_WPN" => ItemType::Weapon,
            other => ItemType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ItemType::Ammo => "T_AMMO",
            ItemType::Weapon => "T_WPN",
            ItemType::Other(name) => name,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ItemType> for String {
    fn from(value: ItemType) -> Self {
        value.as_str().to_string()
    }
}

/// The system document plus the tables used to interpret it.
#[derive(Debug, Clone)]
pub struct ItemCatalog {
    system: Document,
    class_to_type: HashMap<String, ItemType>,
    trade: BuyCoefficients,
    ignored: HashSet<String>,
}

impl ItemCatalog {
    pub fn new<I, K, V>(system: Document, class_to_type: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self {
            system,
            class_to_type: class_to_type
                .into_iter()
                .map(|(class, ty)| (class.into(), ItemType::parse(ty.as_ref())))
                .collect(),
            trade: BuyCoefficients::new(),
            ignored: HashSet::new(),
        }
    }

    pub fn with_trade(mut self, trade: BuyCoefficients) -> Self {
        self.trade = trade;
        self
    }

    pub fn with_ignored<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored = ids.into_iter().map(|id| id.into().to_lowercase()).collect();
        self
    }

    pub fn system(&self) -> &Document {
        &self.system
    }

    pub fn trade(&self) -> &BuyCoefficients {
        &self.trade
    }

    pub fn type_of_class(&self, class: &str) -> Option<&ItemType> {
        self.class_to_type.get(class)
    }

    /// Item type of a system section, checking that the section exists, has
    /// a class, and that the class is mapped.
    pub fn item_type(&self, id: &str) -> Result<&ItemType, SpawnError> {
        let section = self
            .system
            .get_section(id)
            .ok_or_else(|| SpawnError::UnknownSection(id.to_string()))?;
        let class = section
            .get("class")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SpawnError::MissingClass(id.to_string()))?;
        self.type_of_class(class)
            .ok_or_else(|| SpawnError::UnexpectedClass {
                section: id.to_string(),
                class: class.to_string(),
            })
    }

    /// Buy coefficient for `id`, or 1.0 outside trade mode.
    pub fn buy_k(&self, id: &str, trade: bool) -> f64 {
        if trade {
            self.trade.get(id)
        } else {
            1.0
        }
    }

    fn section_type(&self, section: &Section) -> Option<&ItemType> {
        self.type_of_class(section.get_string_or("class", "-"))
    }

    /// Whether the section is an inventory item, judged by its class.
    pub fn is_inv_item(&self, section: &Section) -> bool {
        self.section_type(section).is_some()
    }

    /// Inventory items other than multiscope helper sections.
    pub fn is_inv_item_primary(&self, section: &Section) -> bool {
        self.is_inv_item(section) && !is_multiscope(section)
    }

    pub fn is_of_type(&self, section: &Section, ty: &ItemType) -> bool {
        self.section_type(section) == Some(ty)
    }

    pub fn is_ignored(&self, section: &Section) -> bool {
        self.ignored.contains(section.id())
    }

    pub fn is_ignored_id(&self, id: &str) -> bool {
        self.ignored.contains(id.to_lowercase().as_str())
    }

    /// A filter selecting inventory items of one type that are not ignored.
    pub fn items_of_type<'a>(&'a self, ty: &'a ItemType) -> Box<SectionFilter<'a>> {
        Box::new(move |s: &Section| self.is_of_type(s, ty) && !self.is_ignored(s))
    }
}

/// A weapon section that only exists to carry a scope (`scope_respawn` set).
pub fn is_multiscope(section: &Section) -> bool {
    !section.get_string_or("scope_respawn", "").is_empty()
}
