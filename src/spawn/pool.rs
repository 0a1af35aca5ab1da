//! Aggregation of spawn entries by signature.

use indexmap::IndexMap;

use crate::catalog::{ItemCatalog, ItemType};
use crate::error::SpawnError;
use crate::number::Number;

use super::entry::{base_box_size, first_ammo_class, SpawnEntry};

/// Spawn entries keyed by [`SpawnEntry::signature`], with counts summed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnPool {
    entries: IndexMap<String, SpawnEntry>,
}

impl SpawnPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a copy of `entry`, summing its count into an existing entry with
    /// the same signature.
    pub fn add(&mut self, entry: &SpawnEntry) {
        self.add_owned(entry.clone());
    }

    fn add_owned(&mut self, entry: SpawnEntry) {
        match self.entries.get_mut(&entry.signature()) {
            Some(existing) => existing.count += entry.count,
            None => {
                self.entries.insert(entry.signature(), entry);
            }
        }
    }

    /// Add every entry of `other`.
    pub fn merge(&mut self, other: &SpawnPool) {
        for entry in other.entries() {
            self.add(entry);
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &SpawnEntry> {
        self.entries.values()
    }

    pub fn get(&self, signature: &str) -> Option<&SpawnEntry> {
        self.entries.get(signature)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total value of all entries. Meaningful before [`SpawnPool::compress`].
    pub fn cost(&self, catalog: &ItemCatalog, trade: bool) -> Result<f64, SpawnError> {
        self.entries().map(|e| e.cost(catalog, trade)).sum()
    }

    /// Number of game objects the entries spawn.
    ///
    /// Ammo with an explicit box size counts whole boxes, rounding a partial
    /// box up. Unless `ignore_prob`, each count is weighted by its
    /// probability (and the result is a float).
    pub fn game_objects_count(
        &self,
        catalog: &ItemCatalog,
        ignore_prob: bool,
    ) -> Result<Number, SpawnError> {
        let mut total = Number::ZERO;
        for entry in self.entries() {
            let objects = match entry.box_size {
                Some(box_size) => {
                    let base = base_box_size(catalog.system(), &entry.name)?;
                    (entry.count * box_size).div_ceil(Number::from(base))
                }
                None => entry.count,
            };
            total += if ignore_prob {
                objects
            } else {
                let prob = entry.prob.map_or(1.0, |p| f64::from(p) / 100.0);
                Number::Float(objects.as_f64() * prob)
            };
        }
        Ok(total)
    }

    /// Rewrite the pool into independent, probability-free items.
    ///
    /// Condition is dropped and probability folded into the count. Attached
    /// addons and loaded magazines become entries of their own, every weapon
    /// ends up unloaded, and ammo carries its total round count in
    /// `box_size` with a count of 1. On error the pool is left unchanged.
    pub fn compress(&mut self, catalog: &ItemCatalog) -> Result<(), SpawnError> {
        let system = catalog.system();
        let mut items = SpawnPool::new();
        // keyed without box_size; counts are rounds until the final pass
        let mut ammo = SpawnPool::new();

        for entry in self.entries() {
            let mut entry = entry.clone();
            entry.cond = None;
            if let Some(prob) = entry.prob.take() {
                entry.count = Number::Float(entry.count.as_f64() * f64::from(prob) / 100.0);
            }

            if entry.scope {
                let addon = system.get_string(&entry.name, "scope_name")?;
                items.add_owned(SpawnEntry::with_count(catalog, addon, entry.count)?);
                entry.scope = false;
                let base = system.section(&entry.name)?.get_string_or("scope_respawn", "");
                if !base.is_empty() {
                    entry.name = base.to_lowercase();
                }
            }
            if entry.silencer {
                let addon = system.get_string(&entry.name, "silencer_name")?;
                items.add_owned(SpawnEntry::with_count(catalog, addon, entry.count)?);
                entry.silencer = false;
            }
            if entry.launcher {
                let addon = system.get_string(&entry.name, "grenade_launcher_name")?;
                items.add_owned(SpawnEntry::with_count(catalog, addon, entry.count)?);
                entry.launcher = false;
            }

            if !entry.unload && entry.item_type == ItemType::Weapon {
                let ammo_class = first_ammo_class(system, &entry.name)?;
                let mag_size = system.get_uint(&entry.name, "ammo_mag_size")?;
                let rounds = Number::from(mag_size) * entry.count;
                let loaded = SpawnEntry::with_count(catalog, ammo_class, rounds)?;
                if loaded.item_type == ItemType::Ammo {
                    ammo.add_owned(loaded);
                } else {
                    items.add_owned(loaded);
                }
                entry.unload = true;
            }

            if entry.item_type == ItemType::Ammo {
                let box_size = match entry.box_size.take() {
                    Some(size) => size,
                    None => Number::from(base_box_size(system, &entry.name)?),
                };
                entry.count = entry.count * box_size;
                ammo.add_owned(entry);
            } else {
                items.add_owned(entry);
            }
        }

        for entry in ammo.entries.values_mut() {
            entry.box_size = Some(entry.count);
            entry.count = Number::ONE;
        }
        *self = items;
        self.merge(&ammo);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::entry::tests::catalog;
    use pretty_assertions::assert_eq;

    fn pool(catalog: &ItemCatalog, lines: &[(&str, &str)]) -> SpawnPool {
        let mut pool = SpawnPool::new();
        for (name, params) in lines {
            pool.add(&SpawnEntry::new(catalog, name, Some(params)).unwrap());
        }
        pool
    }

    fn summary(pool: &SpawnPool) -> Vec<String> {
        pool.entries().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_add_sums_by_signature() {
        let c = catalog();
        let p = pool(&c, &[("wpn_pm", "1"), ("wpn_pm", "1.0"), ("wpn_pm", "1, unload")]);

        assert_eq!(p.len(), 2);
        let pm = p.get("wpn_pm").unwrap();
        assert_eq!(pm.count(), Number::Float(2.0));
    }

    #[test]
    fn test_integer_counts_stay_integral() {
        let c = catalog();
        let p = pool(&c, &[("bread", "1"), ("bread", "2")]);
        assert_eq!(summary(&p), vec!["bread = 3"]);
    }

    #[test]
    fn test_merge() {
        let c = catalog();
        let mut a = pool(&c, &[("bread", "1")]);
        let b = pool(&c, &[("bread", "2"), ("ammo_x", "1")]);

        a.merge(&b);
        assert_eq!(summary(&a), vec!["bread = 3", "ammo_x = 1"]);
    }

    #[test]
    fn test_cost_sums_entries() {
        let c = catalog();
        let p = pool(&c, &[("bread", "2"), ("wpn_pm", "1, unload")]);
        assert_eq!(p.cost(&c, false).unwrap(), 580.0);
    }

    #[test]
    fn test_game_objects_count() {
        let c = catalog();
        let p = pool(
            &c,
            &[("bread", "3, prob=0.5"), ("ammo_x", "1, box_size=15"), ("ammo_x", "2")],
        );

        // bread 3, ammo_x box_size=15 -> 2 boxes, plain ammo_x 2
        assert_eq!(p.game_objects_count(&c, true).unwrap(), Number::Int(7));
        assert_eq!(p.game_objects_count(&c, false).unwrap(), Number::Float(5.5));
    }

    #[test]
    fn test_compress_drops_prob_and_cond() {
        let c = catalog();
        let mut p = pool(&c, &[("bread", "2, prob=0.5 cond=0.3")]);

        p.compress(&c).unwrap();

        let bread: Vec<&SpawnEntry> = p.entries().collect();
        assert_eq!(bread.len(), 1);
        assert_eq!(bread[0].prob(), None);
        assert_eq!(bread[0].cond(), None);
        assert_eq!(bread[0].count(), Number::Float(1.0));
    }

    #[test]
    fn test_compress_detaches_scope_and_unloads() {
        let c = catalog();
        let mut p = pool(&c, &[("wpn_ak74", "1, scope unload")]);

        p.compress(&c).unwrap();

        assert_eq!(
            summary(&p),
            vec!["wpn_addon_scope = 1", "wpn_ak74 = 1, unload"]
        );
        assert!(p.entries().all(|e| e.prob().is_none() && e.cond().is_none()));
    }

    #[test]
    fn test_compress_multiscope_falls_back_to_base() {
        let c = catalog();
        let mut p = pool(&c, &[("wpn_ak74_scope", "2, scope launcher")]);

        p.compress(&c).unwrap();

        assert_eq!(
            summary(&p),
            vec![
                "wpn_addon_scope = 2",
                "wpn_addon_grenade_launcher = 2",
                "wpn_ak74 = 2, unload",
                "ammo_5.45x39_fmj = 1, box_size=60",
            ]
        );
    }

    #[test]
    fn test_compress_expresses_ammo_as_box_size() {
        let c = catalog();
        let mut p = pool(
            &c,
            &[
                ("ammo_x", "2"),
                ("ammo_x", "1, box_size=5"),
                ("wpn_pm", "1"),
                ("ammo_9x18_fmj", "1"),
            ],
        );

        p.compress(&c).unwrap();

        assert_eq!(
            summary(&p),
            vec![
                "wpn_pm = 1, unload",
                "ammo_x = 1, box_size=25",
                "ammo_9x18_fmj = 1, box_size=16",
            ]
        );
        for entry in p.entries().filter(|e| *e.item_type() == ItemType::Ammo) {
            assert_eq!(entry.count(), Number::ONE);
        }
    }

    #[test]
    fn test_compress_keeps_pool_on_error() {
        let c = catalog();
        let mut system = c.system().clone();
        let mut broken = system.section("wpn_pm").unwrap().clone();
        broken.remove("ammo_mag_size");
        system.insert_section(broken);
        let c = ItemCatalog::new(system, [("WP_PM", "T_WPN"), ("AMMO", "T_AMMO")]);
        let mut p = pool(&c, &[("wpn_pm", "1")]);
        let before = p.clone();

        assert!(p.compress(&c).is_err());
        assert_eq!(p, before);
    }
}
