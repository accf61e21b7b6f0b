//! Named atomic tag sets.
//!
//! A catalog is an ordered list of tags, each with an interval form and a
//! derived bitmask form. Position 0 is the universe ("All": every valid frame
//! of every entity) and position 1 the empty tag ("None").

pub mod grid;

use crate::query::{QueryExpression, TagLookup};
use crate::set::{range_set_rasterize, ranges::is_canonical, EntityId, MaskSet, RangeSet};
use ahash::AHashMap;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Position of the universe tag
pub const UNIVERSE_TAG: usize = 0;

/// Position of the empty tag
pub const EMPTY_TAG: usize = 1;

/// Errors reported when building a catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("catalog needs at least the universe and empty tags, found {0} tag(s)")]
    TooFewTags(usize),

    #[error("duplicate tag name: \"{0}\"")]
    DuplicateTag(String),

    #[error("universe tag must hold one interval starting at frame 0 for entity {0}")]
    UniverseShape(EntityId),

    #[error("tag \"{0}\" at the empty position must not contain any frames")]
    EmptyTagNotEmpty(String),

    #[error("tag \"{tag}\" has frames outside the universe for entity {entity}")]
    OutOfUniverse { tag: String, entity: EntityId },

    #[error("tag \"{tag}\" has unsorted or overlapping intervals for entity {entity}")]
    NotCanonical { tag: String, entity: EntityId },

    #[error("unknown built-in catalog: \"{0}\"")]
    UnknownBuiltin(String),
}

/// Ordered collection of named tag sets
#[derive(Debug, Clone)]
pub struct TagCatalog {
    names: Vec<String>,
    index: AHashMap<String, usize>,
    ranges: Vec<RangeSet>,
    masks: Vec<MaskSet>,
}

impl TagCatalog {
    /// Build from `(name, set)` pairs, validating the catalog layout and
    /// deriving the bitmask form of every tag.
    pub fn from_sets(tags: Vec<(String, RangeSet)>) -> Result<Self, CatalogError> {
        if tags.len() < 2 {
            return Err(CatalogError::TooFewTags(tags.len()));
        }

        let mut names = Vec::with_capacity(tags.len());
        let mut ranges = Vec::with_capacity(tags.len());
        let mut index = AHashMap::with_capacity(tags.len());
        for (i, (name, set)) in tags.into_iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateTag(name));
            }
            names.push(name);
            ranges.push(set);
        }

        validate_universe(&ranges[UNIVERSE_TAG])?;
        // No entities at all, not even ones with an empty interval list
        if !ranges[EMPTY_TAG].is_empty() {
            return Err(CatalogError::EmptyTagNotEmpty(names[EMPTY_TAG].clone()));
        }
        for (name, set) in names.iter().zip(&ranges).skip(EMPTY_TAG + 1) {
            validate_tag(name, set, &ranges[UNIVERSE_TAG])?;
        }

        let universe = &ranges[UNIVERSE_TAG];
        let masks: Vec<MaskSet> = ranges
            .iter()
            .map(|set| range_set_rasterize(set, universe))
            .collect();

        info!(
            tags = names.len(),
            entities = universe.len(),
            frames = universe.frame_count(),
            "tag catalog loaded"
        );

        Ok(Self {
            names,
            index,
            ranges,
            masks,
        })
    }

    /// Build from grid text (see [`grid`])
    pub fn from_grid(text: &str) -> Result<Self, CatalogError> {
        Self::from_sets(grid::parse_grid(text)?)
    }

    /// One of the catalogs shipped with the crate
    pub fn builtin(name: &str) -> Result<Self, CatalogError> {
        match grid::builtin_grid(name) {
            Some(text) => Self::from_grid(text),
            None => Err(CatalogError::UnknownBuiltin(name.to_string())),
        }
    }

    /// Names of the catalogs available through [`builtin`](Self::builtin)
    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        grid::BUILTIN_GRIDS.iter().map(|(name, _)| *name)
    }

    /// Load a grid file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_grid(&text)
            .with_context(|| format!("Invalid catalog {}", path.display()))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Interval form of every tag, indexed like [`names`](Self::names)
    pub fn range_sets(&self) -> &[RangeSet] {
        &self.ranges
    }

    /// Bitmask form of every tag, indexed like [`names`](Self::names)
    pub fn mask_sets(&self) -> &[MaskSet] {
        &self.masks
    }

    pub fn universe(&self) -> &RangeSet {
        &self.ranges[UNIVERSE_TAG]
    }

    /// The empty tag's set, used as the fallback query result
    pub fn empty_set(&self) -> &RangeSet {
        &self.ranges[EMPTY_TAG]
    }

    /// Position of the tag called `name`
    pub fn tag_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Atomic expression referencing the tag called `name`
    pub fn tag(&self, name: &str) -> Option<QueryExpression> {
        self.tag_index(name).map(QueryExpression::atom)
    }

    /// Interval form of the tag called `name`
    pub fn range_set(&self, name: &str) -> Option<&RangeSet> {
        self.tag_index(name).map(|i| &self.ranges[i])
    }

    /// Number of entities in the universe
    pub fn entity_count(&self) -> usize {
        self.universe().len()
    }

    /// Frame count of `entity`, or `None` if it is not part of the universe
    pub fn entity_length(&self, entity: EntityId) -> Option<usize> {
        let range = self.universe().get(entity)?.last()?;
        Some(range.stop as usize)
    }
}

impl TagLookup for TagCatalog {
    fn tag_index(&self, name: &str) -> Option<usize> {
        TagCatalog::tag_index(self, name)
    }
}

fn validate_universe(universe: &RangeSet) -> Result<(), CatalogError> {
    for (entity, intervals) in universe.iter() {
        match intervals {
            [only] if only.start == 0 && only.stop > 0 => {}
            _ => return Err(CatalogError::UniverseShape(entity)),
        }
    }
    Ok(())
}

fn validate_tag(name: &str, set: &RangeSet, universe: &RangeSet) -> Result<(), CatalogError> {
    for (entity, intervals) in set.iter() {
        if !is_canonical(intervals) {
            return Err(CatalogError::NotCanonical {
                tag: name.to_string(),
                entity,
            });
        }
        let extent = universe.get(entity).and_then(|r| r.first()).map(|r| r.stop);
        let inside = match (extent, intervals.last()) {
            (Some(stop), Some(last)) => last.stop <= stop,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !inside {
            return Err(CatalogError::OutOfUniverse {
                tag: name.to_string(),
                entity,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::Interval;

    fn single(entity: EntityId, start: i32, stop: i32) -> RangeSet {
        RangeSet::from_entries([(entity, &[Interval::new(start, stop)][..])])
    }

    #[test]
    fn test_builtin_locomotion() {
        let catalog = TagCatalog::builtin("locomotion").unwrap();
        assert_eq!(catalog.len(), 15);
        assert_eq!(catalog.entity_count(), 5);
        assert_eq!(catalog.entity_length(0), Some(34));
        assert_eq!(catalog.entity_length(4), Some(22));
        assert_eq!(catalog.tag_index("All"), Some(UNIVERSE_TAG));
        assert_eq!(catalog.tag_index("None"), Some(EMPTY_TAG));
        assert!(catalog.empty_set().is_empty());
        assert_eq!(catalog.mask_sets().len(), catalog.range_sets().len());
    }

    #[test]
    fn test_masks_are_sized_from_universe() {
        let catalog = TagCatalog::builtin("gait").unwrap();
        let male = &catalog.mask_sets()[catalog.tag_index("Male").unwrap()];
        // Male only covers entity 0, whose timeline is 31 frames long
        assert_eq!(male.entities(), &[0]);
        assert_eq!(male.bit_count(), 31);
        let all = &catalog.mask_sets()[UNIVERSE_TAG];
        assert_eq!(all.bit_count(), 31 + 29);
    }

    #[test]
    fn test_unknown_builtin() {
        assert_eq!(
            TagCatalog::builtin("missing").unwrap_err(),
            CatalogError::UnknownBuiltin("missing".to_string())
        );
        assert_eq!(TagCatalog::builtin_names().count(), 3);
    }

    #[test]
    fn test_too_few_tags() {
        let err = TagCatalog::from_sets(vec![("All".into(), single(0, 0, 8))]).unwrap_err();
        assert_eq!(err, CatalogError::TooFewTags(1));
    }

    #[test]
    fn test_duplicate_tag() {
        let err = TagCatalog::from_grid("All |####|\nNone |    |\nAll |##  |").unwrap_err();
        assert_eq!(err, CatalogError::DuplicateTag("All".to_string()));
    }

    #[test]
    fn test_universe_with_gap_rejected() {
        let err = TagCatalog::from_grid("All |## #|\nNone |    |").unwrap_err();
        assert_eq!(err, CatalogError::UniverseShape(0));
    }

    #[test]
    fn test_empty_tag_must_be_empty() {
        let err = TagCatalog::from_grid("All |####|\nNone | #  |").unwrap_err();
        assert_eq!(err, CatalogError::EmptyTagNotEmpty("None".to_string()));
    }

    #[test]
    fn test_empty_tag_with_empty_entry_rejected() {
        let mut none = RangeSet::new();
        none.push(5, &[]);
        let err = TagCatalog::from_sets(vec![
            ("All".into(), single(0, 0, 8)),
            ("None".into(), none),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::EmptyTagNotEmpty("None".to_string()));
    }

    #[test]
    fn test_empty_entry_outside_universe_rejected() {
        let mut stray = RangeSet::new();
        stray.push(3, &[]);
        let err = TagCatalog::from_sets(vec![
            ("All".into(), single(0, 0, 8)),
            ("None".into(), RangeSet::new()),
            ("Stray".into(), stray),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::OutOfUniverse { entity: 3, .. }));
    }

    #[test]
    fn test_frames_outside_universe_rejected() {
        let err = TagCatalog::from_grid("All |####|\nNone |    |\nLong |  ####|").unwrap_err();
        assert!(matches!(err, CatalogError::OutOfUniverse { entity: 0, .. }));

        let err = TagCatalog::from_grid("All |####|\nNone |    |\nExtra |    | |##|").unwrap_err();
        assert!(matches!(err, CatalogError::OutOfUniverse { entity: 1, .. }));
    }

    #[test]
    fn test_non_canonical_rejected() {
        let touching = RangeSet::from_entries([(
            0,
            &[Interval::new(0, 2), Interval::new(2, 4)][..],
        )]);
        let err = TagCatalog::from_sets(vec![
            ("All".into(), single(0, 0, 8)),
            ("None".into(), RangeSet::new()),
            ("Odd".into(), touching),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::NotCanonical { entity: 0, .. }));
    }

    #[test]
    fn test_tag_lookup_trait() {
        let catalog = TagCatalog::builtin("simple").unwrap();
        assert_eq!(TagLookup::tag_index(&catalog, "Ranges1"), Some(3));
        assert_eq!(catalog.tag("Ranges0"), Some(QueryExpression::atom(2)));
        assert!(catalog.tag("Ranges2").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.tags");
        fs::write(&path, "All |######|\nNone |      |\nA |##    |\n").unwrap();
        let catalog = TagCatalog::load(&path).unwrap();
        assert_eq!(catalog.names(), &["All", "None", "A"]);

        let missing = TagCatalog::load(&dir.path().join("missing.tags"));
        assert!(missing.is_err());
    }
}
