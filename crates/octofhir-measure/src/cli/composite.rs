//! Make-composite command implementation

use super::output;
use crate::compose::{make_composite, ComponentOverride, CompositeOptions};
use crate::criteria::CompositeScoring;
use anyhow::{bail, Result};
use rust_decimal::Decimal;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// A per-component flag value: `<value>` pairs with components by position,
/// `<n>=<value>` targets the n-th component bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentValue<T> {
    /// 1-based component position, when given explicitly
    pub position: Option<usize>,
    pub value: T,
}

impl<T> ComponentValue<T> {
    pub fn positional(value: T) -> Self {
        Self {
            position: None,
            value,
        }
    }

    pub fn at(position: usize, value: T) -> Self {
        Self {
            position: Some(position),
            value,
        }
    }
}

/// Parse `<value>` or `<n>=<value>`
pub fn parse_component_value<T>(raw: &str) -> std::result::Result<ComponentValue<T>, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let parse = |value: &str| {
        value
            .parse::<T>()
            .map_err(|e| format!("invalid value '{}': {}", value, e))
    };

    match raw.split_once('=') {
        Some((position, value)) => {
            let position = position
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| format!("invalid component position '{}' (expected 1, 2, ...)", position))?;
            Ok(ComponentValue::at(position, parse(value)?))
        }
        None => Ok(ComponentValue::positional(parse(raw)?)),
    }
}

/// Configuration for the make-composite command
pub struct CompositeConfig {
    pub bundles: Vec<PathBuf>,
    pub output: PathBuf,
    pub composite_scoring: CompositeScoring,
    pub canonical_base: String,
    pub id: Option<String>,
    pub group_ids: Vec<ComponentValue<String>>,
    pub weights: Vec<ComponentValue<Decimal>>,
    pub summary: bool,
}

impl CompositeConfig {
    /// Per-component overrides, one per component bundle
    pub fn components(&self) -> Result<Vec<ComponentOverride>> {
        let count = self.bundles.len();
        let group_ids = place(&self.group_ids, count, "group id")?;
        let weights = place(&self.weights, count, "weight")?;

        Ok(group_ids
            .into_iter()
            .zip(weights)
            .map(|(group_id, weight)| ComponentOverride {
                group_id: group_id.cloned(),
                weight: weight.copied(),
            })
            .collect())
    }
}

/// Slot each value into its component; positional values fill components in
/// order
fn place<'a, T>(
    values: &'a [ComponentValue<T>],
    count: usize,
    kind: &str,
) -> Result<Vec<Option<&'a T>>> {
    let mut slots: Vec<Option<&T>> = vec![None; count];
    let mut next = 0;

    for item in values {
        let position = item.position.unwrap_or_else(|| {
            next += 1;
            next
        });
        let Some(index) = position.checked_sub(1).filter(|i| *i < count) else {
            bail!(
                "{} for component {} is out of range: there are {} component bundles",
                kind,
                position,
                count
            );
        };
        if slots[index].replace(&item.value).is_some() {
            bail!("Component {} has more than one {}", position, kind);
        }
    }
    Ok(slots)
}

/// Build a composite measure bundle from component measure bundles
pub async fn run(config: CompositeConfig) -> Result<()> {
    if config.bundles.is_empty() {
        bail!("make-composite needs at least one component bundle");
    }

    let mut options = CompositeOptions::new(config.composite_scoring, config.canonical_base.clone());
    options.id = config.id.clone();
    options.components = config.components()?;

    let components = config
        .bundles
        .iter()
        .map(|path| output::read_bundle(path))
        .collect::<Result<Vec<_>>>()?;
    info!(count = components.len(), "Building composite measure");

    let composite = make_composite(&components, &options)?;

    output::write_bundle(&composite, &config.output)?;
    if config.summary {
        println!("{}", output::format_bundle_summary(&composite));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(
        group_ids: Vec<ComponentValue<String>>,
        weights: Vec<ComponentValue<Decimal>>,
    ) -> CompositeConfig {
        CompositeConfig {
            bundles: vec!["a.json".into(), "b.json".into()],
            output: "out.json".into(),
            composite_scoring: CompositeScoring::Weighted,
            canonical_base: "http://example.com".into(),
            id: None,
            group_ids,
            weights,
            summary: false,
        }
    }

    fn positional<T>(values: Vec<T>) -> Vec<ComponentValue<T>> {
        values.into_iter().map(ComponentValue::positional).collect()
    }

    #[test]
    fn test_components_paired_by_position() {
        let components = config(
            positional(vec!["g1".to_string()]),
            positional(vec![Decimal::new(5, 1), Decimal::new(5, 1)]),
        )
        .components()
        .unwrap();

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].group_id.as_deref(), Some("g1"));
        assert_eq!(components[1].group_id, None);
        assert_eq!(components[1].weight, Some(Decimal::new(5, 1)));
    }

    #[test]
    fn test_components_by_explicit_position() {
        let components = config(
            vec![ComponentValue::at(2, "g2".to_string())],
            vec![ComponentValue::at(2, Decimal::new(25, 2))],
        )
        .components()
        .unwrap();

        assert_eq!(components[0], ComponentOverride::default());
        assert_eq!(components[1].group_id.as_deref(), Some("g2"));
        assert_eq!(components[1].weight, Some(Decimal::new(25, 2)));
    }

    #[test]
    fn test_too_many_overrides() {
        let ids = positional(vec!["g1".to_string(), "g2".to_string(), "g3".to_string()]);
        assert!(config(ids, vec![]).components().is_err());
        assert!(config(vec![ComponentValue::at(3, "g3".to_string())], vec![])
            .components()
            .is_err());
    }

    #[test]
    fn test_component_set_twice() {
        let ids = vec![
            ComponentValue::positional("g1".to_string()),
            ComponentValue::at(1, "other".to_string()),
        ];

        let err = config(ids, vec![]).components().unwrap_err();

        assert!(err.to_string().contains("more than one group id"));
    }

    #[test]
    fn test_parse_component_value() {
        assert_eq!(
            parse_component_value::<String>("group-1"),
            Ok(ComponentValue::positional("group-1".to_string()))
        );
        assert_eq!(
            parse_component_value::<Decimal>("2=0.5"),
            Ok(ComponentValue::at(2, Decimal::new(5, 1)))
        );
        assert!(parse_component_value::<Decimal>("0=0.5").is_err());
        assert!(parse_component_value::<Decimal>("heavy").is_err());
    }
}
