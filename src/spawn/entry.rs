//! One loot occurrence: `name = count[, option ...]`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::catalog::{is_multiscope, ItemCatalog, ItemType};
use crate::document::{Document, FieldValue, Section};
use crate::error::SpawnError;
use crate::number::Number;

static OPTION_EQ_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*=\s*").expect("invalid regex"));

/// Scope placeholder used by weapons that cannot take a real scope.
const SCOPE_DUMMY: &str = "wpn_addon_scope_dummy";
/// Engine status code for an attachable addon.
const ATTACHABLE: &str = "2";

/// A validated spawn entry.
///
/// Percentages are stored as integers in `0..=100`; a value of 100 is
/// stored as `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnEntry {
    pub(super) name: String,
    pub(super) count: Number,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) prob: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) cond: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) box_size: Option<Number>,
    pub(super) scope: bool,
    pub(super) silencer: bool,
    pub(super) launcher: bool,
    pub(super) unload: bool,
    #[serde(rename = "type")]
    pub(super) item_type: ItemType,
}

/// Options parsed from a parameter string, before validation.
#[derive(Debug, Default, PartialEq)]
struct Params {
    count: Option<Number>,
    prob: Option<u8>,
    cond: Option<u8>,
    box_size: Option<Number>,
    scope: bool,
    silencer: bool,
    launcher: bool,
    unload: bool,
}

impl SpawnEntry {
    /// Parse and validate `name = params`. A bare key (`params` is `None`)
    /// or an empty value means a count of 1.
    pub fn new(catalog: &ItemCatalog, name: &str, params: Option<&str>) -> Result<Self, SpawnError> {
        Self::build(catalog, name, parse_params(params.unwrap_or_default())?)
    }

    /// Build an entry from a field of a `[spawn]` section.
    pub fn from_field(catalog: &ItemCatalog, key: &str, value: &FieldValue) -> Result<Self, SpawnError> {
        Self::new(catalog, key, value.as_str())
    }

    /// An entry with only a count.
    pub fn with_count(catalog: &ItemCatalog, name: &str, count: Number) -> Result<Self, SpawnError> {
        Self::build(
            catalog,
            name,
            Params {
                count: Some(count),
                ..Params::default()
            },
        )
    }

    fn build(catalog: &ItemCatalog, name: &str, params: Params) -> Result<Self, SpawnError> {
        let item_type = catalog.item_type(name)?.clone();
        let section = catalog.system().section(name)?;

        if params.box_size.is_some() && item_type != ItemType::Ammo {
            return Err(SpawnError::InapplicableOption {
                option: "box_size",
                expected: "ammo",
            });
        }

        let flags = [
            ("scope", params.scope),
            ("silencer", params.silencer),
            ("launcher", params.launcher),
            ("unload", params.unload),
        ];
        if item_type != ItemType::Weapon {
            if let Some((option, _)) = flags.iter().find(|(_, set)| *set) {
                return Err(SpawnError::InapplicableOption {
                    option: *option,
                    expected: "weapon",
                });
            }
        } else {
            check_weapon(section, &params)?;
        }

        Ok(Self {
            name: section.id().to_string(),
            count: params.count.unwrap_or(Number::ONE),
            prob: params.prob.filter(|p| *p != 100),
            cond: params.cond.filter(|c| *c != 100),
            box_size: params.box_size,
            scope: params.scope,
            silencer: params.silencer,
            launcher: params.launcher,
            unload: params.unload,
            item_type,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> Number {
        self.count
    }

    /// Spawn probability in percent, `None` meaning 100.
    pub fn prob(&self) -> Option<u8> {
        self.prob
    }

    /// Condition in percent, `None` meaning 100.
    pub fn cond(&self) -> Option<u8> {
        self.cond
    }

    pub fn box_size(&self) -> Option<Number> {
        self.box_size
    }

    pub fn scope(&self) -> bool {
        self.scope
    }

    pub fn silencer(&self) -> bool {
        self.silencer
    }

    pub fn launcher(&self) -> bool {
        self.launcher
    }

    pub fn unload(&self) -> bool {
        self.unload
    }

    pub fn item_type(&self) -> &ItemType {
        &self.item_type
    }

    /// Key shared by entries that differ only in count.
    pub fn signature(&self) -> String {
        let mut parts = vec![self.name.clone()];
        if let Some(prob) = self.prob {
            parts.push(format!("prob={prob}"));
        }
        if let Some(cond) = self.cond {
            parts.push(format!("cond={cond}"));
        }
        if let Some(box_size) = self.box_size {
            parts.push(format!("box_size={box_size}"));
        }
        parts.extend(
            self.flags()
                .into_iter()
                .filter(|(_, set)| *set)
                .map(|(name, _)| name.to_string()),
        );
        parts.join("|")
    }

    /// The parameter string in loot-file syntax, e.g. `1, prob=0.50 scope`.
    pub fn params_string(&self) -> String {
        let mut params = Vec::new();
        if let Some(prob) = self.prob {
            params.push(format!("prob={:.2}", f64::from(prob) / 100.0));
        }
        if let Some(cond) = self.cond {
            params.push(format!("cond={:.2}", f64::from(cond) / 100.0));
        }
        if let Some(box_size) = self.box_size {
            params.push(format!("box_size={}", fixed(box_size)));
        }
        params.extend(
            self.flags()
                .into_iter()
                .filter(|(_, set)| *set)
                .map(|(name, _)| name.to_string()),
        );

        let count = fixed(self.count);
        if params.is_empty() {
            count
        } else {
            format!("{}, {}", count, params.join(" "))
        }
    }

    fn flags(&self) -> [(&'static str, bool); 4] {
        [
            ("scope", self.scope),
            ("silencer", self.silencer),
            ("launcher", self.launcher),
            ("unload", self.unload),
        ]
    }

    /// Value of the occurrence, including attached addons and, unless
    /// unloaded, a full magazine. With `trade`, prices are scaled by the
    /// trader buy coefficients.
    pub fn cost(&self, catalog: &ItemCatalog, trade: bool) -> Result<f64, SpawnError> {
        let system = catalog.system();
        let count = self.count.as_f64();
        let prob = percent(self.prob);
        let cond = condition_factor(self.cond);
        let buy_k = catalog.buy_k(&self.name, trade);
        let base_cost = system.get_uint(&self.name, "cost")? as f64;

        match self.item_type {
            ItemType::Ammo => {
                let base_box = base_box_size(system, &self.name)? as f64;
                let box_size = self.box_size.map_or(base_box, Number::as_f64);
                Ok(base_cost * (count * box_size / base_box) * prob * cond * buy_k)
            }
            ItemType::Weapon => {
                let mut total = base_cost * count * prob * cond * buy_k;

                for addon in self.attached_addons(system)? {
                    let addon_cost = system.get_uint(addon, "cost")? as f64;
                    total += addon_cost * count * prob * catalog.buy_k(addon, trade);
                }

                if !self.unload {
                    let ammo = first_ammo_class(system, &self.name)?;
                    let mag_size = system.get_uint(&self.name, "ammo_mag_size")? as f64;
                    let ammo_cost = system.get_uint(ammo, "cost")? as f64;
                    let ammo_box = base_box_size(system, ammo)? as f64;
                    let boxes = count * mag_size / ammo_box;
                    total += ammo_cost * boxes * prob * catalog.buy_k(ammo, trade);
                }

                Ok(total)
            }
            ItemType::Other(_) => Ok(base_cost * count * prob * cond * buy_k),
        }
    }

    fn attached_addons<'a>(&self, system: &'a Document) -> Result<Vec<&'a str>, SpawnError> {
        let mut addons = Vec::new();
        for (set, field) in [
            (self.scope, "scope_name"),
            (self.silencer, "silencer_name"),
            (self.launcher, "grenade_launcher_name"),
        ] {
            if set {
                addons.push(system.get_string(&self.name, field)?);
            }
        }
        Ok(addons)
    }
}

impl fmt::Display for SpawnEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.params_string())
    }
}

/// Engine durability discount: `(0.9c + 0.1)^0.75`.
pub fn condition_factor(cond: Option<u8>) -> f64 {
    (percent(cond) * 0.9 + 0.1).powf(0.75)
}

fn percent(value: Option<u8>) -> f64 {
    value.map_or(1.0, |v| f64::from(v) / 100.0)
}

/// Integers as is, floats with two decimals.
fn fixed(number: Number) -> String {
    match number {
        Number::Int(i) => i.to_string(),
        Number::Float(f) => format!("{f:.2}"),
    }
}

pub(super) fn base_box_size(system: &Document, id: &str) -> Result<u64, SpawnError> {
    match system.get_uint(id, "box_size")? {
        0 => Err(SpawnError::ZeroBoxSize(id.to_string())),
        size => Ok(size),
    }
}

pub(super) fn first_ammo_class<'a>(system: &'a Document, weapon: &str) -> Result<&'a str, SpawnError> {
    system
        .get_strings(weapon, "ammo_class")?
        .first()
        .copied()
        .ok_or_else(|| SpawnError::NoAmmoClass(weapon.to_string()))
}

fn check_weapon(section: &Section, params: &Params) -> Result<(), SpawnError> {
    for (set, field, addon) in [
        (params.scope, "scope_status", "Scope"),
        (params.silencer, "silencer_status", "Silencer"),
        (params.launcher, "grenade_launcher_status", "Launcher"),
    ] {
        let status = section.get(field).and_then(FieldValue::as_str).unwrap_or("0");
        if set && status != ATTACHABLE {
            return Err(SpawnError::NotAttachable { addon });
        }
    }

    if params.scope {
        match section.get("scope_name").and_then(FieldValue::as_str) {
            None => return Err(SpawnError::ScopeNameMissing),
            Some("") | Some(SCOPE_DUMMY) => return Err(SpawnError::ScopeOnBaseSection),
            Some(_) => {}
        }
    } else if is_multiscope(section) {
        return Err(SpawnError::ScopeRequired);
    }
    Ok(())
}

fn parse_params(raw: &str) -> Result<Params, SpawnError> {
    let raw = raw.trim();
    let mut params = Params::default();
    if raw.is_empty() {
        return Ok(params);
    }

    let (count, options) = match raw.find(',') {
        Some(0) => return Err(SpawnError::Syntax("count is missing".to_string())),
        Some(pos) => (&raw[..pos], &raw[pos + 1..]),
        None => (raw, ""),
    };
    params.count = Some(
        Number::parse_non_negative(count)
            .ok_or_else(|| SpawnError::Syntax(format!("invalid count '{}'", count.trim())))?,
    );

    let options = OPTION_EQ_REGEX.replace_all(options, "=");
    let mut seen: Vec<&str> = Vec::new();
    for token in options
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let name = token.split_once('=').map_or(token, |(name, _)| name);
        if seen.contains(&name) {
            return Err(SpawnError::Syntax(format!("duplicate option '{name}'")));
        }
        seen.push(name);

        match token.split_once('=') {
            Some(("prob", value)) => params.prob = Some(parse_percent("prob", value)?),
            Some(("cond", value)) => params.cond = Some(parse_percent("cond", value)?),
            Some(("box_size", value)) => {
                params.box_size = Some(
                    Number::parse_non_negative(value)
                        .ok_or_else(|| SpawnError::Syntax(format!("invalid box_size '{value}'")))?,
                )
            }
            Some(_) => return Err(SpawnError::Syntax(format!("unknown option '{token}'"))),
            None => match token {
                "scope" => params.scope = true,
                "silencer" => params.silencer = true,
                "launcher" => params.launcher = true,
                "unload" => params.unload = true,
                _ => return Err(SpawnError::Syntax(format!("unknown option '{token}'"))),
            },
        }
    }
    Ok(params)
}

/// A fraction in `[0, 1]` as a rounded percentage.
fn parse_percent(option: &'static str, value: &str) -> Result<u8, SpawnError> {
    let out_of_range = || SpawnError::OutOfRange {
        option,
        value: value.to_string(),
    };
    let fraction: f64 = value.parse().map_err(|_| out_of_range())?;
    if !fraction.is_finite() {
        return Err(out_of_range());
    }
    let pct = (100.0 * fraction + 0.5).trunc();
    if (0.0..=100.0).contains(&pct) {
        Ok(pct as u8)
    } else {
        Err(out_of_range())
    }
}
